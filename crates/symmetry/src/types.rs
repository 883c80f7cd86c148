use geo_types::{Coord, LineString, Polygon};
use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

/// Which side of the hierarchy a traced border belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BorderKind {
    /// Boundary between a foreground region and the background around it
    Outer,
    /// Boundary of a background region enclosed by foreground
    Hole,
}

/// A traced boundary curve together with its hierarchy metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourCandidate {
    /// Boundary vertices as `[x, y]`, in discovery order
    pub points: Vec<[i32; 2]>,
    pub kind: BorderKind,
    /// Whether another contour is nested directly under this one
    pub has_child: bool,
}

impl ContourCandidate {
    /// A closed contour has no nested child: a solid silhouette rather than a
    /// ring around a hole.
    pub fn is_closed(&self) -> bool {
        !self.has_child
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.points)
    }

    /// Convert to a geo-types polygon for area and extent computations
    pub fn to_geo_polygon(&self) -> Polygon<f64> {
        let coords: Vec<Coord<f64>> = self
            .points
            .iter()
            .map(|&[x, y]| Coord {
                x: x as f64,
                y: y as f64,
            })
            .collect();

        Polygon::new(LineString::new(coords), vec![])
    }
}

/// Axis-aligned bounds of a contour, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: [i32; 2],
    pub max: [i32; 2],
}

impl BoundingBox {
    pub fn from_points(points: &[[i32; 2]]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bbox = Self {
            min: *first,
            max: *first,
        };
        for &[x, y] in rest {
            bbox.min[0] = bbox.min[0].min(x);
            bbox.min[1] = bbox.min[1].min(y);
            bbox.max[0] = bbox.max[0].max(x);
            bbox.max[1] = bbox.max[1].max(y);
        }
        Some(bbox)
    }

    /// `round((max + min) / 2)` per axis, halves rounded to even
    pub fn center(&self) -> [i64; 2] {
        [0usize, 1].map(|axis| {
            let sum = self.max[axis] as i64 + self.min[axis] as i64;
            (sum as f64 / 2.0).round_ties_even() as i64
        })
    }

    /// `round((max - min) / 2)` per axis, halves rounded to even
    pub fn extent(&self) -> [i64; 2] {
        [0usize, 1].map(|axis| {
            let span = self.max[axis] as i64 - self.min[axis] as i64;
            (span as f64 / 2.0).round_ties_even() as i64
        })
    }

    pub fn width(&self) -> u32 {
        (self.max[0] - self.min[0]) as u32 + 1
    }

    pub fn height(&self) -> u32 {
        (self.max[1] - self.min[1]) as u32 + 1
    }
}

/// Direction a crop is mirrored in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flip {
    /// Rows reversed: reflection across the horizontal center line
    Vertical,
    /// Columns reversed: reflection across the vertical center line
    Horizontal,
}

#[derive(Debug, Clone)]
pub struct AsymmetryResult {
    /// Asymmetric pixels over foreground pixels; exactly 1.0 when the crop is empty
    pub score: f64,
    /// 255 where a pixel differs from its mirror counterpart
    pub diff_mask: GrayImage,
    pub flip: Flip,
    pub asymmetric_pixels: u64,
    pub foreground_pixels: u64,
}

impl AsymmetryResult {
    /// True when the score is the empty-silhouette sentinel rather than a ratio
    pub fn is_degenerate(&self) -> bool {
        self.foreground_pixels == 0
    }
}

/// Everything the pipeline produces for one image
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Filled, centered crop of the selected object
    pub silhouette: GrayImage,
    pub score: f64,
    pub degenerate: bool,
    pub flip: Flip,
    /// The selected contour, in padded coordinates
    pub contour: ContourCandidate,
    /// Width and height of the raster handed to the pipeline
    pub source_dimensions: (u32, u32),
    pub diff_mask: Option<GrayImage>,
    pub contour_overlay: Option<RgbImage>,
}

impl Analysis {
    pub fn crop_dimensions(&self) -> (u32, u32) {
        self.silhouette.dimensions()
    }
}
