//! Pixel diff engine.
//!
//! Compares a reference raster against a candidate and produces a diff
//! raster plus the share of pixels whose colour moved by more than a
//! threshold.
//!
//! ## Algorithm
//!
//! 1. The canvas is `max(ref.w, cand.w) x max(ref.h, cand.h)`. Both inputs
//!    sit at the origin at native resolution; anything outside an input's
//!    bounds reads as transparent black `(0, 0, 0, 0)`.
//! 2. Per pixel, the Euclidean RGB distance `sqrt(dr² + dg² + db²)` is
//!    taken (alpha ignored), range `[0, ~441.7]`.
//! 3. `distance > threshold` marks the pixel changed and paints
//!    [`CHANGED_COLOR`]; otherwise the reference luminance
//!    `0.3R + 0.59G + 0.11B` is painted grey at [`UNCHANGED_ALPHA`].
//! 4. `percentage = changed / total * 100`, rounded to two decimals.
//!
//! Rows are scanned in parallel; every task writes only its own output
//! rows and reads the inputs through shared references.

use rayon::prelude::*;
use rgb::RGBA8;

use crate::raster::Raster;
use crate::settings::Threshold;

/// Colour painted over changed pixels.
pub const CHANGED_COLOR: RGBA8 = RGBA8 {
    r: 255,
    g: 50,
    b: 50,
    a: 200,
};

/// Alpha of the greyscale backdrop painted over unchanged pixels.
pub const UNCHANGED_ALPHA: u8 = 128;

/// Fill for canvas area outside an input's native bounds.
pub const PADDING: RGBA8 = RGBA8 {
    r: 0,
    g: 0,
    b: 0,
    a: 0,
};

/// Minimum rows handed to one rayon task.
const ROWS_PER_TASK: usize = 16;

/// Output of one engine invocation.
#[derive(Debug, Clone)]
pub struct DiffOutput {
    /// Diff overlay, sized to the padded canvas.
    pub raster: Raster,
    /// Changed pixels as a percentage of the canvas, two decimals.
    pub percentage: f64,
    /// Number of pixels over the threshold.
    pub changed_pixels: usize,
    /// Canvas pixel count.
    pub total_pixels: usize,
}

/// Canvas size shared by two rasters.
#[must_use]
pub fn canvas_size(reference: &Raster, candidate: &Raster) -> (usize, usize) {
    (
        reference.width().max(candidate.width()),
        reference.height().max(candidate.height()),
    )
}

/// Squared Euclidean RGB distance, alpha ignored.
#[inline]
#[must_use]
pub fn distance_squared(a: RGBA8, b: RGBA8) -> u32 {
    let dr = u32::from(a.r.abs_diff(b.r));
    let dg = u32::from(a.g.abs_diff(b.g));
    let db = u32::from(a.b.abs_diff(b.b));
    dr * dr + dg * dg + db * db
}

/// Euclidean RGB distance, alpha ignored.
#[must_use]
pub fn distance(a: RGBA8, b: RGBA8) -> f64 {
    f64::from(distance_squared(a, b)).sqrt()
}

/// Luminance `0.3R + 0.59G + 0.11B`, rounded.
#[inline]
#[must_use]
pub fn luminance(p: RGBA8) -> u8 {
    (0.3 * f64::from(p.r) + 0.59 * f64::from(p.g) + 0.11 * f64::from(p.b)).round() as u8
}

/// Round a ratio of pixel counts to a two-decimal percentage.
#[must_use]
pub fn percentage(changed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (changed as f64 / total as f64 * 10_000.0).round() / 100.0
}

/// Diff `candidate` against `reference`.
///
/// Pure and deterministic; the output raster always has the padded canvas
/// size returned by [`canvas_size`].
#[must_use]
pub fn diff(reference: &Raster, candidate: &Raster, threshold: Threshold) -> DiffOutput {
    let (width, height) = canvas_size(reference, candidate);
    let limit = threshold.squared();

    let mut out = vec![PADDING; width * height];

    let changed_pixels: usize = out
        .par_chunks_mut(width)
        .with_min_len(ROWS_PER_TASK)
        .enumerate()
        .map(|(y, out_row)| {
            let ref_row = row_or_empty(reference, y);
            let cand_row = row_or_empty(candidate, y);
            scan_row(ref_row, cand_row, out_row, limit)
        })
        .sum();

    let total_pixels = width * height;

    DiffOutput {
        raster: Raster::from_parts(width, height, out),
        percentage: percentage(changed_pixels, total_pixels),
        changed_pixels,
        total_pixels,
    }
}

/// Only the percentage of [`diff`].
#[must_use]
pub fn diff_percentage(reference: &Raster, candidate: &Raster, threshold: Threshold) -> f64 {
    diff(reference, candidate, threshold).percentage
}

fn row_or_empty(raster: &Raster, y: usize) -> &[RGBA8] {
    if y < raster.height() {
        raster.row(y)
    } else {
        &[]
    }
}

/// Fill one output row, returning how many of its pixels changed.
#[inline]
fn scan_row(ref_row: &[RGBA8], cand_row: &[RGBA8], out_row: &mut [RGBA8], limit: u64) -> usize {
    let mut changed = 0;
    for (x, out) in out_row.iter_mut().enumerate() {
        let a = ref_row.get(x).copied().unwrap_or(PADDING);
        let b = cand_row.get(x).copied().unwrap_or(PADDING);

        if u64::from(distance_squared(a, b)) > limit {
            *out = CHANGED_COLOR;
            changed += 1;
        } else {
            let gray = luminance(a);
            *out = RGBA8::new(gray, gray, gray, UNCHANGED_ALPHA);
        }
    }
    changed
}
