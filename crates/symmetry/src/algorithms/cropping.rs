use image::{GrayImage, Luma, imageops};
use imageproc::{
    drawing::{draw_line_segment_mut, draw_polygon_mut},
    point::Point,
};
use tracing::debug;

use crate::{
    error::{Result, SymmetryError},
    types::{BoundingBox, ContourCandidate},
};

const FILL: Luma<u8> = Luma([255u8]);

/// Paint the contour's interior and boundary white on a black canvas
pub fn fill_contour(width: u32, height: u32, contour: &ContourCandidate) -> GrayImage {
    let mut canvas = GrayImage::new(width, height);

    let mut polygon: Vec<Point<i32>> = contour
        .points
        .iter()
        .map(|&[x, y]| Point::new(x, y))
        .collect();
    polygon.dedup();
    while polygon.len() > 1 && polygon.first() == polygon.last() {
        polygon.pop();
    }

    match polygon.as_slice() {
        [] => {}
        [only] => {
            if only.x >= 0 && only.y >= 0 && (only.x as u32) < width && (only.y as u32) < height {
                canvas.put_pixel(only.x as u32, only.y as u32, FILL);
            }
        }
        [start, end] => draw_line_segment_mut(
            &mut canvas,
            (start.x as f32, start.y as f32),
            (end.x as f32, end.y as f32),
            FILL,
        ),
        _ => draw_polygon_mut(&mut canvas, &polygon, FILL),
    }

    canvas
}

/// Crop `[center - extent, center + extent]` on both axes, inclusive.
///
/// The window is centered on the bounding-box midpoint, so the result is
/// `2 * extent + 1` pixels along each axis. Windows reaching outside the
/// canvas are rejected instead of truncated.
pub fn centered_crop(filled: &GrayImage, bbox: &BoundingBox) -> Result<GrayImage> {
    let [cx, cy] = bbox.center();
    let [ex, ey] = bbox.extent();
    let (width, height) = filled.dimensions();

    let x_range = (cx - ex, cx + ex);
    let y_range = (cy - ey, cy + ey);

    let out_of_bounds = || SymmetryError::CropOutOfBounds {
        x_range,
        y_range,
        width,
        height,
    };
    let to_pixel = |value: i64, limit: u32| u32::try_from(value).ok().filter(|&v| v < limit);

    let left = to_pixel(x_range.0, width).ok_or_else(out_of_bounds)?;
    let right = to_pixel(x_range.1, width).ok_or_else(out_of_bounds)?;
    let top = to_pixel(y_range.0, height).ok_or_else(out_of_bounds)?;
    let bottom = to_pixel(y_range.1, height).ok_or_else(out_of_bounds)?;

    debug!(center = ?[cx, cy], extent = ?[ex, ey], "centered crop");

    let crop = imageops::crop_imm(filled, left, top, right - left + 1, bottom - top + 1);
    Ok(crop.to_image())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BorderKind;

    fn contour(points: Vec<[i32; 2]>) -> ContourCandidate {
        ContourCandidate {
            points,
            kind: BorderKind::Hole,
            has_child: false,
        }
    }

    fn count_filled(image: &GrayImage) -> usize {
        image.pixels().filter(|p| p[0] == 255).count()
    }

    #[test]
    fn test_fill_rectangle_includes_boundary() {
        let rect = contour(vec![[10, 10], [19, 10], [19, 14], [10, 14]]);
        let filled = fill_contour(40, 30, &rect);

        assert_eq!(count_filled(&filled), 10 * 5);
        assert_eq!(filled.get_pixel(10, 10)[0], 255);
        assert_eq!(filled.get_pixel(19, 14)[0], 255);
        assert_eq!(filled.get_pixel(20, 14)[0], 0);
    }

    #[test]
    fn test_fill_degenerate_contours() {
        let single = fill_contour(10, 10, &contour(vec![[3, 4]]));
        assert_eq!(count_filled(&single), 1);
        assert_eq!(single.get_pixel(3, 4)[0], 255);

        let closed_twice = fill_contour(10, 10, &contour(vec![[3, 4], [3, 4]]));
        assert_eq!(count_filled(&closed_twice), 1);

        let segment = fill_contour(10, 10, &contour(vec![[2, 5], [6, 5]]));
        assert_eq!(count_filled(&segment), 5);
    }

    #[test]
    fn test_crop_size_follows_extent() {
        let rect = contour(vec![[10, 20], [40, 20], [40, 31], [10, 31]]);
        let filled = fill_contour(100, 100, &rect);
        let bbox = rect.bounding_box().unwrap();
        let [ex, ey] = bbox.extent();

        let crop = centered_crop(&filled, &bbox).unwrap();
        assert_eq!(crop.width() as i64, 2 * ex + 1);
        assert_eq!(crop.height() as i64, 2 * ey + 1);
    }

    #[test]
    fn test_crop_size_for_many_boxes() {
        let filled = GrayImage::from_pixel(200, 200, Luma([255u8]));
        let boxes = [
            ([10, 10], [11, 11]),
            ([13, 57], [90, 60]),
            ([40, 40], [40, 40]),
            ([5, 8], [64, 121]),
        ];
        for (min, max) in boxes {
            let bbox = BoundingBox { min, max };
            let [ex, ey] = bbox.extent();
            let crop = centered_crop(&filled, &bbox).unwrap();
            assert_eq!(crop.dimensions(), ((2 * ex + 1) as u32, (2 * ey + 1) as u32));
        }
    }

    #[test]
    fn test_crop_out_of_bounds_is_rejected() {
        let filled = GrayImage::new(20, 20);
        // x: min 17, max 19 -> center 18, extent 1 fits
        // y: min 0, max 3 -> center 2 (ties to even), extent 2 fits
        let fits = BoundingBox {
            min: [17, 0],
            max: [19, 3],
        };
        assert!(centered_crop(&filled, &fits).is_ok());

        // x: min 16, max 19 -> center 18 (17.5 to even), extent 2 (1.5 to even) -> 16..=20
        let overflow = BoundingBox {
            min: [16, 0],
            max: [19, 3],
        };
        let err = centered_crop(&filled, &overflow).unwrap_err();
        assert!(matches!(
            err,
            SymmetryError::CropOutOfBounds { x_range: (16, 20), width: 20, .. }
        ));
    }

    #[test]
    fn test_crop_window_before_origin_is_rejected() {
        let filled = GrayImage::new(20, 20);
        // y: min 0, max 5 -> center 2 (2.5 to even), extent 2 (2.5 to even) fits
        let fits = BoundingBox {
            min: [4, 0],
            max: [6, 5],
        };
        let crop = centered_crop(&filled, &fits).unwrap();
        assert_eq!(crop.dimensions(), (3, 5));

        // x: min -3, max 1 -> center -1, extent 2 -> -3..=1
        let before_origin = BoundingBox {
            min: [-3, 0],
            max: [1, 2],
        };
        let err = centered_crop(&filled, &before_origin).unwrap_err();
        assert!(matches!(
            err,
            SymmetryError::CropOutOfBounds { x_range: (-3, 1), width: 20, .. }
        ));
    }

}
