// THEORY:
// The skin classifier is a fixed heuristic, not a trained model. A pixel is skin
// when either of two independent rule sets accepts it:
//
// 1.  **HSV rule**: a hue/saturation window on top of an RGB/alpha gate.
// 2.  **YCbCr rule**: the same gate, minimum Y/Cb/Cr levels, and five linear
//     bands in the Cb-Cr plane.
//
// The gate (R>95, G>40, B>20, R dominant, |R-G|>15, A>15) is shared by both.
// All thresholds are used exactly as written. In particular the hue bound of 50
// is compared against a hue in [0, 1), and the YCbCr transform is fed raw 0..255
// channels; both are reproduced as-is.
//
// The `PixelClassifier` trait is the seam the cluster engine is written against,
// so any per-pixel predicate can drive region extraction.

use crate::core_modules::color_space::color_space::{Hsv, YCbCr, rgb_to_hsv, rgb_to_ycbcr};
use crate::core_modules::pixel_buffer::pixel_buffer::Color;

/// A pure per-pixel predicate.
pub trait PixelClassifier {
    fn classify(&self, color: &Color) -> bool;
}

impl<F> PixelClassifier for F
where
    F: Fn(&Color) -> bool,
{
    fn classify(&self, color: &Color) -> bool {
        self(color)
    }
}

/// The two-rule heuristic skin detector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkinClassifier;

impl PixelClassifier for SkinClassifier {
    fn classify(&self, color: &Color) -> bool {
        is_skin(color)
    }
}

/// The full verdict for one pixel, with the intermediate color spaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkinVerdict {
    pub hsv: Hsv,
    pub ycbcr: YCbCr,
    pub hsv_rule: bool,
    pub ycbcr_rule: bool,
}

impl SkinVerdict {
    pub fn is_skin(&self) -> bool {
        self.hsv_rule || self.ycbcr_rule
    }
}

pub fn is_skin(color: &Color) -> bool {
    evaluate(color).is_skin()
}

/// Computes both color spaces and both rules for a pixel.
pub fn evaluate(color: &Color) -> SkinVerdict {
    let [r, g, b, _] = *color;
    let hsv = rgb_to_hsv(r as f64, g as f64, b as f64);
    let ycbcr = rgb_to_ycbcr(r as f64, g as f64, b as f64);
    SkinVerdict {
        hsv,
        ycbcr,
        hsv_rule: hsv_rule(color, &hsv),
        ycbcr_rule: ycbcr_rule(color, &ycbcr),
    }
}

/// The RGB/alpha preconditions shared by both rules.
pub fn rgb_gate(color: &Color) -> bool {
    let [r, g, b, a] = *color;
    r > 95 && g > 40 && b > 20 && r > g && r > b && (r - g).abs() > 15 && a > 15
}

pub fn hsv_rule(color: &Color, hsv: &Hsv) -> bool {
    hsv.h > 0.0 && hsv.h <= 50.0 && hsv.s > 0.23 && hsv.s <= 0.68 && rgb_gate(color)
}

pub fn ycbcr_rule(color: &Color, ycbcr: &YCbCr) -> bool {
    let YCbCr { y, cb, cr } = *ycbcr;
    rgb_gate(color)
        && cr > 135.0
        && cb > 85.0
        && y > 80.0
        && cr <= 1.5862 * cb + 20.0
        && cr >= 0.3448 * cb + 76.2069
        && cr >= -4.5652 * cb + 234.5652
        && cr <= -1.15 * cb + 301.75
        && cr <= -2.2857 * cb + 432.85
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPSILON,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn warm_skin_tone_passes_the_hsv_rule() {
        let verdict = evaluate(&[200, 150, 120, 255]);
        assert!(verdict.hsv_rule);
        assert!(verdict.is_skin());
        assert!(is_skin(&[200, 150, 120, 255]));
    }

    #[test]
    fn gate_boundary_pixel_matches_both_rules() {
        let color = [96, 41, 21, 255];
        assert!(rgb_gate(&color));

        let verdict = evaluate(&color);
        assert_close(verdict.hsv.h, 20.0 / 75.0 / 6.0);
        assert_close(verdict.hsv.s, 75.0 / 96.0);
        assert_close(verdict.hsv.v, 96.0 / 255.0);
        assert!((verdict.ycbcr.y - 12097.135).abs() < 1e-6);
        assert!((verdict.ycbcr.cb - -4190.835).abs() < 1e-6);
        assert!((verdict.ycbcr.cr - 6652.28).abs() < 1e-6);

        // Saturation 0.78 is above the HSV window and Cb is far below 85.
        assert!(!verdict.hsv_rule);
        assert!(!verdict.ycbcr_rule);
        assert_eq!(is_skin(&color), verdict.hsv_rule || verdict.ycbcr_rule);
        assert!(!is_skin(&color));
    }

    #[test]
    fn gate_rejects_each_failed_precondition() {
        assert!(!rgb_gate(&[95, 41, 21, 255]));
        assert!(!rgb_gate(&[96, 40, 21, 255]));
        assert!(!rgb_gate(&[96, 41, 20, 255]));
        assert!(!rgb_gate(&[120, 110, 21, 255]));
        assert!(!rgb_gate(&[96, 41, 21, 15]));
        assert!(!rgb_gate(&[100, 60, 100, 255]));
    }

    #[test]
    fn transparent_skin_tone_is_rejected() {
        assert!(!is_skin(&[200, 150, 120, 10]));
    }

    #[test]
    fn markers_are_never_skin() {
        for color in [[0, 0, 0, 255], [255, 255, 255, 255], [0, 255, 0, 255], [255, 0, 0, 255]] {
            assert!(!is_skin(&color), "{color:?} classified as skin");
        }
    }

    #[test]
    fn closures_act_as_classifiers() {
        let red_only = |color: &Color| color[0] == 255;
        assert!(red_only.classify(&[255, 0, 0, 255]));
        assert!(!red_only.classify(&[0, 0, 0, 255]));
        assert!(SkinClassifier.classify(&[200, 150, 120, 255]));
    }
}
