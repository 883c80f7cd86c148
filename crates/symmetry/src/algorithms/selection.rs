use tracing::debug;

use crate::{
    config::CandidateRanking,
    error::{Result, SymmetryError},
    traits::CandidateRanker,
    types::ContourCandidate,
};

/// Ranks by number of boundary points, favoring the most detailed outline
#[derive(Debug, Clone, Default)]
pub struct PointCountRanker;

impl CandidateRanker for PointCountRanker {
    fn rank(&self, candidate: &ContourCandidate) -> f64 {
        candidate.point_count() as f64
    }
}

/// Ranks by enclosed polygon area
#[derive(Debug, Clone, Default)]
pub struct AreaRanker;

impl CandidateRanker for AreaRanker {
    fn rank(&self, candidate: &ContourCandidate) -> f64 {
        use geo::Area;
        candidate.to_geo_polygon().unsigned_area()
    }
}

/// Ranks by area of the axis-aligned bounding rectangle
#[derive(Debug, Clone, Default)]
pub struct BoundingBoxAreaRanker;

impl CandidateRanker for BoundingBoxAreaRanker {
    fn rank(&self, candidate: &ContourCandidate) -> f64 {
        use geo::{Area, BoundingRect};
        candidate
            .to_geo_polygon()
            .bounding_rect()
            .map(|rect| rect.unsigned_area())
            .unwrap_or(0.0)
    }
}

pub fn ranker_for(ranking: CandidateRanking) -> Box<dyn CandidateRanker> {
    match ranking {
        CandidateRanking::PointCount => Box::new(PointCountRanker),
        CandidateRanking::Area => Box::new(AreaRanker),
        CandidateRanking::BoundingBoxArea => Box::new(BoundingBoxAreaRanker),
    }
}

/// Pick the object outline: the highest ranked closed contour.
///
/// Ties keep the candidate discovered first.
pub fn select_contour(
    candidates: &[ContourCandidate],
    ranker: &dyn CandidateRanker,
) -> Result<ContourCandidate> {
    let mut best: Option<(&ContourCandidate, f64)> = None;

    for candidate in candidates.iter().filter(|c| c.is_closed()) {
        let rank = ranker.rank(candidate);
        match best {
            Some((_, best_rank)) if rank <= best_rank => {}
            _ => best = Some((candidate, rank)),
        }
    }

    let (selected, rank) = best.ok_or(SymmetryError::NoClosedContour {
        candidates: candidates.len(),
    })?;

    debug!(
        rank,
        points = selected.point_count(),
        candidates = candidates.len(),
        "contour selected"
    );
    Ok(selected.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BorderKind;

    fn square(origin: [i32; 2], size: i32) -> ContourCandidate {
        let [x, y] = origin;
        ContourCandidate {
            points: vec![[x, y], [x + size, y], [x + size, y + size], [x, y + size]],
            kind: BorderKind::Outer,
            has_child: false,
        }
    }

    fn jagged(origin: [i32; 2]) -> ContourCandidate {
        let [x, y] = origin;
        ContourCandidate {
            points: vec![
                [x, y],
                [x + 1, y + 1],
                [x + 2, y],
                [x + 3, y + 1],
                [x + 4, y],
                [x + 4, y + 3],
                [x, y + 3],
            ],
            kind: BorderKind::Outer,
            has_child: false,
        }
    }

    #[test]
    fn test_open_contours_are_ignored() {
        let mut ring = jagged([0, 0]);
        ring.has_child = true;
        let candidates = vec![ring, square([50, 50], 10)];

        let selected = select_contour(&candidates, &PointCountRanker).unwrap();
        assert_eq!(selected, candidates[1]);
    }

    #[test]
    fn test_no_closed_contour_is_an_error() {
        let mut ring = square([0, 0], 10);
        ring.has_child = true;

        let err = select_contour(&[ring], &PointCountRanker).unwrap_err();
        assert!(matches!(err, SymmetryError::NoClosedContour { candidates: 1 }));

        let err = select_contour(&[], &PointCountRanker).unwrap_err();
        assert!(matches!(err, SymmetryError::NoClosedContour { candidates: 0 }));
    }

    #[test]
    fn test_point_count_prefers_detail_over_size() {
        // Known limitation: a small jagged speck beats a large smooth outline
        let candidates = vec![square([0, 0], 100), jagged([200, 200])];
        let selected = select_contour(&candidates, &PointCountRanker).unwrap();
        assert_eq!(selected, candidates[1]);
    }

    #[test]
    fn test_area_rankers_prefer_size() {
        let candidates = vec![jagged([200, 200]), square([0, 0], 100)];
        assert_eq!(select_contour(&candidates, &AreaRanker).unwrap(), candidates[1]);
        assert_eq!(
            select_contour(&candidates, &BoundingBoxAreaRanker).unwrap(),
            candidates[1]
        );
    }

    #[test]
    fn test_tie_break_is_first_discovered() {
        let candidates = vec![square([0, 0], 10), square([40, 40], 30), square([90, 0], 5)];

        for _ in 0..5 {
            let selected = select_contour(&candidates, &PointCountRanker).unwrap();
            assert_eq!(selected, candidates[0]);
        }
    }

    #[test]
    fn test_ranker_for_config() {
        let candidates = vec![jagged([200, 200]), square([0, 0], 100)];
        let ranker = ranker_for(CandidateRanking::Area);
        assert_eq!(select_contour(&candidates, ranker.as_ref()).unwrap(), candidates[1]);
    }
}
