use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;

use crate::types::ContourCandidate;

const CONTOUR_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Draw the selected contour over the source image.
///
/// `offset` is the padding the contour was traced with; it is subtracted so
/// the outline lands on the unpadded source. Segments leaving the canvas are
/// clipped.
pub fn draw_contour_overlay(
    source: &GrayImage,
    contour: &ContourCandidate,
    offset: u32,
) -> RgbImage {
    let mut canvas = RgbImage::from_fn(source.width(), source.height(), |x, y| {
        let v = source.get_pixel(x, y)[0];
        Rgb([v, v, v])
    });

    let shift = offset as f32;
    let points: Vec<(f32, f32)> = contour
        .points
        .iter()
        .map(|&[x, y]| (x as f32 - shift, y as f32 - shift))
        .collect();

    match points.as_slice() {
        [] => {}
        [only] => draw_line_segment_mut(&mut canvas, *only, *only, CONTOUR_COLOR),
        _ => {
            for (i, &start) in points.iter().enumerate() {
                let end = points[(i + 1) % points.len()];
                draw_line_segment_mut(&mut canvas, start, end, CONTOUR_COLOR);
            }
        }
    }

    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BorderKind;
    use image::Luma;

    #[test]
    fn test_overlay_shifts_out_of_padding() {
        let source = GrayImage::from_pixel(30, 20, Luma([90u8]));
        let contour = ContourCandidate {
            points: vec![[15, 15], [24, 15], [24, 24], [15, 24]],
            kind: BorderKind::Hole,
            has_child: false,
        };

        let overlay = draw_contour_overlay(&source, &contour, 10);

        assert_eq!(overlay.dimensions(), (30, 20));
        assert_eq!(*overlay.get_pixel(5, 5), CONTOUR_COLOR);
        assert_eq!(*overlay.get_pixel(14, 14), CONTOUR_COLOR);
        assert_eq!(*overlay.get_pixel(10, 10), Rgb([90, 90, 90]));
    }

    #[test]
    fn test_overlay_clips_outside_points() {
        let source = GrayImage::from_pixel(10, 10, Luma([0u8]));
        let contour = ContourCandidate {
            points: vec![[-5, 3], [20, 3]],
            kind: BorderKind::Outer,
            has_child: false,
        };

        let overlay = draw_contour_overlay(&source, &contour, 0);
        assert!((0..10).all(|x| *overlay.get_pixel(x, 3) == CONTOUR_COLOR));
    }
}
