//! Reading order for detected boxes.
//!
//! The target script runs vertically and columns are read right to left, so
//! the order is column-major: rightmost column first, top to bottom within
//! a column. Column width is not known a priori; it is estimated from the
//! boxes themselves via a robust per-page glyph size.

use std::cmp::Ordering;

use crate::types::DetectedBox;

/// Estimate the size of one glyph in a box.
///
/// The dominant edge (the longer of the box's vertical and horizontal
/// extents) divided by the glyph count. Returns `None` when the estimate is
/// unusable: empty transcription, a degenerate quad, or an estimate that
/// disagrees with the box's other extent by a factor of 2 or more.
pub fn estimate_glyph_size(b: &DetectedBox) -> Option<f64> {
    let glyphs = b.glyph_count();
    if glyphs == 0 {
        return None;
    }
    let vertical = b.points[0].distance(&b.points[3]);
    let horizontal = b.points[0].distance(&b.points[1]);
    let (dominant, other) = if vertical > horizontal {
        (vertical, horizontal)
    } else {
        (horizontal, vertical)
    };
    if other <= 0.0 {
        return None;
    }
    let size = dominant / glyphs as f64;
    if size / other >= 2.0 || other / size >= 2.0 {
        return None;
    }
    Some(size)
}

/// Page-level reference glyph size: the mean of the valid per-box
/// estimates after a single excluding pass.
///
/// An estimate is excluded when it deviates from the mean of the remaining
/// estimates by a factor of 2 or more in either direction. With fewer than
/// 2 valid estimates the refinement is skipped and the unrefined mean is
/// used; with none at all there is no reference size.
pub fn reference_glyph_size(boxes: &[DetectedBox]) -> Option<f64> {
    let valid: Vec<f64> = boxes.iter().filter_map(estimate_glyph_size).collect();
    if valid.is_empty() {
        return None;
    }
    let sum: f64 = valid.iter().sum();
    let unrefined = sum / valid.len() as f64;
    if valid.len() < 2 {
        return Some(unrefined);
    }

    let mut kept_sum = sum;
    let mut excluded = 0usize;
    for &size in &valid {
        let rest_mean = (sum - size) / (valid.len() - 1) as f64;
        if size / rest_mean >= 2.0 || rest_mean / size >= 2.0 {
            tracing::debug!(size, rest_mean, "excluding glyph size outlier from page mean");
            kept_sum -= size;
            excluded += 1;
        }
    }

    let kept = valid.len() - excluded;
    if kept == 0 {
        return Some(unrefined);
    }
    Some(kept_sum / kept as f64)
}

/// Sort boxes into reading order in place.
///
/// Primary key is the column index `-round(mid.x / reference_size)` so the
/// rightmost column comes first, secondary key is `mid.y` ascending.
/// Remaining ties fall through to `mid.x` and the transcription, making
/// the result a function of the box set alone: any permutation of the same
/// boxes sorts to the same sequence. Without a usable reference size every
/// box lands in column 0, degrading to pure top-to-bottom order.
pub fn sort_reading_order(boxes: &mut [DetectedBox]) {
    let reference = reference_glyph_size(boxes);
    if reference.is_none() && !boxes.is_empty() {
        tracing::warn!(
            box_count = boxes.len(),
            "no valid glyph size estimate on page, falling back to top-to-bottom order"
        );
    }
    boxes.sort_by(|a, b| compare_reading_order(a, b, reference));
}

fn column_index(mid_x: f64, reference: Option<f64>) -> i64 {
    match reference {
        Some(size) if size > 0.0 => -((mid_x / size).round() as i64),
        _ => 0,
    }
}

fn compare_reading_order(a: &DetectedBox, b: &DetectedBox, reference: Option<f64>) -> Ordering {
    let (mid_a, mid_b) = (a.midpoint(), b.midpoint());
    column_index(mid_a.x, reference)
        .cmp(&column_index(mid_b.x, reference))
        .then_with(|| mid_a.y.total_cmp(&mid_b.y))
        .then_with(|| mid_a.x.total_cmp(&mid_b.x))
        .then_with(|| a.transcription.cmp(&b.transcription))
}
