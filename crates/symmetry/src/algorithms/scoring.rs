use image::{GrayImage, Luma, imageops};
use tracing::debug;

use crate::{
    config::MirrorAxis,
    types::{AsymmetryResult, Flip},
};

/// Choose the flip for a crop with the given `[x, y]` half-extents.
///
/// Reflecting across the longest axis means reversing rows when the object is
/// at least as wide as it is tall, and columns otherwise.
pub fn flip_for(extent: [i64; 2], axis: MirrorAxis) -> Flip {
    let wide = extent[0] >= extent[1];
    match (axis, wide) {
        (MirrorAxis::Longest, true) | (MirrorAxis::Shortest, false) => Flip::Vertical,
        (MirrorAxis::Longest, false) | (MirrorAxis::Shortest, true) => Flip::Horizontal,
    }
}

pub fn mirror(image: &GrayImage, flip: Flip) -> GrayImage {
    match flip {
        Flip::Vertical => imageops::flip_vertical(image),
        Flip::Horizontal => imageops::flip_horizontal(image),
    }
}

/// Fraction of silhouette pixels that differ from their mirror image.
///
/// An empty silhouette scores exactly 1.0.
pub fn score_asymmetry(crop: &GrayImage, flip: Flip) -> AsymmetryResult {
    let flipped = mirror(crop, flip);

    let mut diff_1 = GrayImage::new(crop.width(), crop.height());
    for ((out, a), b) in diff_1.pixels_mut().zip(crop.pixels()).zip(flipped.pixels()) {
        *out = Luma([a[0].wrapping_sub(b[0])]);
    }
    let diff_2 = mirror(&diff_1, flip);

    let mut diff_mask = GrayImage::new(crop.width(), crop.height());
    let mut asymmetric_pixels = 0u64;
    for ((out, d1), d2) in diff_mask.pixels_mut().zip(diff_1.pixels()).zip(diff_2.pixels()) {
        if d1[0] != 0 || d2[0] != 0 {
            *out = Luma([255u8]);
            asymmetric_pixels += 1;
        }
    }

    let foreground_pixels = crop.pixels().filter(|p| p[0] != 0).count() as u64;
    let score = if foreground_pixels == 0 {
        1.0
    } else {
        asymmetric_pixels as f64 / foreground_pixels as f64
    };

    debug!(
        ?flip,
        asymmetric_pixels,
        foreground_pixels,
        score,
        "asymmetry scored"
    );

    AsymmetryResult {
        score,
        diff_mask,
        flip,
        asymmetric_pixels,
        foreground_pixels,
    }
}
