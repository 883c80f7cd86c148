use image::GrayImage;
use imageproc::contours::BorderType;
use tracing::debug;

use crate::{
    config::ChainApproximation,
    error::Result,
    traits::ContourExtractor,
    types::{BorderKind, ContourCandidate},
};

/// Imageproc-based contour extractor with a two-level hierarchy.
///
/// Outer borders own the hole borders traced directly inside them. Hole
/// borders never own anything: a foreground island inside a hole is its own
/// top-level component.
///
/// `find_contours` traces no border for the foreground region that contains
/// the canvas corner. With white padding that region is the background, so
/// a blank image produces no candidates and the object shows up as a hole.
#[derive(Debug, Clone, Default)]
pub struct ImageprocContourExtractor {
    pub approximation: ChainApproximation,
}

impl ContourExtractor for ImageprocContourExtractor {
    fn extract_contours(&self, binary_image: &GrayImage) -> Result<Vec<ContourCandidate>> {
        let contours = imageproc::contours::find_contours::<i32>(binary_image);

        let mut owns_hole = vec![false; contours.len()];
        for contour in &contours {
            if let (BorderType::Hole, Some(parent)) = (contour.border_type, contour.parent) {
                owns_hole[parent] = true;
            }
        }

        let candidates: Vec<ContourCandidate> = contours
            .into_iter()
            .zip(owns_hole)
            .map(|(contour, has_hole)| {
                let points: Vec<[i32; 2]> = contour.points.iter().map(|p| [p.x, p.y]).collect();
                let points = match self.approximation {
                    ChainApproximation::Simple => compress_chain(&points),
                    ChainApproximation::None => points,
                };
                let kind = match contour.border_type {
                    BorderType::Outer => BorderKind::Outer,
                    BorderType::Hole => BorderKind::Hole,
                };

                ContourCandidate {
                    points,
                    kind,
                    has_child: kind == BorderKind::Outer && has_hole,
                }
            })
            .collect();

        debug!(count = candidates.len(), "contours extracted");
        Ok(candidates)
    }
}

/// Keep only the points where a closed 8-connected chain changes direction.
pub fn compress_chain(points: &[[i32; 2]]) -> Vec<[i32; 2]> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let step = |from: [i32; 2], to: [i32; 2]| {
        [(to[0] - from[0]).signum(), (to[1] - from[1]).signum()]
    };

    let kept: Vec<[i32; 2]> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            step(prev, points[i]) != step(points[i], next)
        })
        .map(|i| points[i])
        .collect();

    if kept.is_empty() {
        points.to_vec()
    } else {
        kept
    }
}
