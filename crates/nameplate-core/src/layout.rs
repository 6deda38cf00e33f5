//! Layout math for the title, player name and image layers
//!
//! Everything here is pure: text widths come in through closures so the
//! same code runs against a real surface or a test double.

use crate::constants::{NAME_RANK_ANCHOR, NAME_RANK_GUTTER};
use crate::traits::{ImageData, Rect};
use unicode_segmentation::UnicodeSegmentation;

/// Largest size in `[min_size, max_size]` at which the text fits `max_width`,
/// stepping down one pixel at a time.
///
/// Text that still overflows at `min_size` is accepted at `min_size`. A floor
/// above the ceiling is clamped to the ceiling. `measure_at` is called at most
/// `max_size - min_size + 1` times.
pub fn fit_title<M>(max_width: f64, max_size: f64, min_size: f64, mut measure_at: M) -> f64
where
    M: FnMut(f64) -> f64,
{
    let min_size = min_size.min(max_size);
    let mut size = max_size;
    while size > min_size && measure_at(size) > max_width {
        size = (size - 1.0).max(min_size);
    }
    size
}

/// Where the player name is anchored (center alignment)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NamePlacement {
    pub x: f64,
    pub y: f64,
}

/// Anchor for the player name.
///
/// Without a rank decoration the name sits on the canvas midline. With one
/// it moves to 26% of the width, and anything wider than half the canvas
/// minus a gutter shifts left by half its overflow.
pub fn place_name(text_width: f64, show_rank: bool, canvas_width: f64, baseline_y: f64) -> NamePlacement {
    if !show_rank {
        return NamePlacement { x: canvas_width / 2.0, y: baseline_y };
    }

    let mut x = canvas_width * NAME_RANK_ANCHOR;
    let max_width = canvas_width / 2.0 - NAME_RANK_GUTTER;
    if text_width > max_width {
        x -= (text_width - max_width) / 2.0;
    }
    NamePlacement { x, y: baseline_y }
}

/// One grapheme of a letter-spaced title, left-aligned at `x`
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedGlyph {
    pub text: String,
    pub x: f64,
}

/// Font size for the letter-spaced title: smaller once the grapheme count
/// passes the threshold
pub fn letter_spaced_size(text: &str, long_threshold: usize, size: f64, long_size: f64) -> f64 {
    if text.graphemes(true).count() > long_threshold {
        long_size
    } else {
        size
    }
}

/// Per-grapheme positions with a fixed gap, centered as a block
pub fn letter_spaced_title<M>(text: &str, canvas_width: f64, spacing: f64, mut measure: M) -> Vec<PlacedGlyph>
where
    M: FnMut(&str) -> f64,
{
    let widths: Vec<(&str, f64)> = text.graphemes(true).map(|g| (g, measure(g))).collect();
    let total: f64 = widths.iter().map(|(_, w)| w + spacing).sum();

    let mut x = (canvas_width - total + spacing) / 2.0;
    widths
        .into_iter()
        .map(|(g, w)| {
            let glyph = PlacedGlyph { text: g.to_string(), x };
            x += w + spacing;
            glyph
        })
        .collect()
}

/// Background layer: full canvas width, anchored to the bottom edge
pub fn background_rect(canvas_width: f64, canvas_height: f64, image: &ImageData) -> Rect {
    let height = image.height as f64;
    Rect {
        x: 0.0,
        y: canvas_height - height,
        width: canvas_width,
        height,
    }
}

/// Decoration layer: scaled, anchored to the bottom-right with margins
pub fn decoration_rect(
    canvas_width: f64,
    canvas_height: f64,
    image: &ImageData,
    scale: f64,
    margin_right: f64,
    margin_bottom: f64,
) -> Rect {
    let width = image.width as f64 * scale;
    let height = image.height as f64 * scale;
    Rect {
        x: canvas_width - width - margin_right,
        y: canvas_height - height - margin_bottom,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Width model: every char is half the font size wide
    fn half_em(text: &str) -> impl FnMut(f64) -> f64 + '_ {
        move |size| text.chars().count() as f64 * size * 0.5
    }

    #[test]
    fn test_fitting_text_keeps_max_size() {
        assert_eq!(fit_title(320.0, 20.0, 10.0, half_em("Champion")), 20.0);
    }

    #[test]
    fn test_long_text_shrinks_to_first_fit() {
        // 40 chars: width = 20 * size, fits 320 at size 16
        let text = "x".repeat(40);
        assert_eq!(fit_title(320.0, 20.0, 10.0, half_em(&text)), 16.0);
    }

    #[test]
    fn test_overflow_accepted_at_floor() {
        let text = "x".repeat(500);
        assert_eq!(fit_title(320.0, 20.0, 10.0, half_em(&text)), 10.0);
    }

    #[test]
    fn test_measurement_count_is_bounded() {
        let mut calls = 0;
        fit_title(1.0, 20.0, 10.0, |_| {
            calls += 1;
            f64::MAX
        });
        assert!(calls <= 11);
    }

    #[test]
    fn test_inverted_bounds_clamp_to_max() {
        assert_eq!(fit_title(1.0, 12.0, 18.0, |_| 100.0), 12.0);
    }

    #[test]
    fn test_name_centered_without_rank() {
        let placement = place_name(900.0, false, 400.0, 91.5);
        assert_eq!(placement, NamePlacement { x: 200.0, y: 91.5 });
    }

    #[test]
    fn test_name_left_biased_with_rank() {
        let placement = place_name(100.0, true, 400.0, 91.5);
        assert!((placement.x - 104.0).abs() < 1e-9);
    }

    #[test]
    fn test_wide_name_shifts_by_half_overflow() {
        // max width = 400/2 - 20 = 180; overflow 40 -> shift 20
        let placement = place_name(220.0, true, 400.0, 91.5);
        assert!((placement.x - (104.0 - 20.0)).abs() < 1e-9);
    }

    #[test]
    fn test_letter_spaced_size_threshold() {
        assert_eq!(letter_spaced_size(&"a".repeat(23), 23, 20.0, 14.0), 20.0);
        assert_eq!(letter_spaced_size(&"a".repeat(24), 23, 20.0, 14.0), 14.0);
        // graphemes, not bytes
        assert_eq!(letter_spaced_size(&"あ".repeat(23), 23, 20.0, 14.0), 20.0);
    }

    #[test]
    fn test_letter_spaced_positions() {
        // three 10px glyphs, 1px gap: total 33, start (100 - 33 + 1) / 2 = 34
        let glyphs = letter_spaced_title("abc", 100.0, 1.0, |_| 10.0);
        let xs: Vec<f64> = glyphs.iter().map(|g| g.x).collect();
        assert_eq!(xs, [34.0, 45.0, 56.0]);
        assert_eq!(glyphs[2].text, "c");
    }

    #[test]
    fn test_background_is_bottom_anchored() {
        let rect = background_rect(400.0, 117.0, &ImageData::blank(380, 100));
        assert_eq!(rect, Rect { x: 0.0, y: 17.0, width: 400.0, height: 100.0 });
    }

    #[test]
    fn test_decoration_scaled_bottom_right() {
        let rect = decoration_rect(400.0, 117.0, &ImageData::blank(100, 80), 0.85, 100.0, 7.5);
        assert!((rect.width - 85.0).abs() < 1e-9);
        assert!((rect.height - 68.0).abs() < 1e-9);
        assert!((rect.x - 215.0).abs() < 1e-9);
        assert!((rect.y - 41.5).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_fit_title_within_bounds(
            chars in 0usize..200,
            max_size in 1u32..60,
            span in 0u32..40,
            max_width in 1.0f64..1000.0,
        ) {
            let max_size = max_size as f64;
            let min_size = (max_size - span as f64).max(1.0);
            let mut calls = 0u32;
            let size = fit_title(max_width, max_size, min_size, |s| {
                calls += 1;
                chars as f64 * s * 0.5
            });
            prop_assert!(size >= min_size && size <= max_size);
            prop_assert!(calls as f64 <= max_size - min_size + 1.0);
            if chars as f64 * max_size * 0.5 <= max_width {
                prop_assert_eq!(size, max_size);
            }
        }
    }
}
