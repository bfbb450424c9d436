// THEORY (single-pixel color transforms):
// Two pure conversions from an RGB triple, both consumed by the skin classifier.
//
// - HSV: the usual max/min construction. Hue is returned as a fraction of a full
//   turn in [0, 1), i.e. the sector value has already been divided by 6. Gray
//   pixels (max == min) get hue 0 and black gets saturation 0, so neither
//   conversion ever divides by zero.
// - YCbCr: a fixed-coefficient BT.601-style linear transform. It is neither
//   clamped nor rounded, and its coefficients are applied to whatever scale the
//   caller feeds in. The classifier feeds raw 0..255 channels.
//
// Both functions take raw 0..255 channel values. `rgb_to_hsv` normalizes
// internally, so passing already-normalized input would normalize twice.

pub mod color_space {
    pub type Hue = f64;
    pub type Saturation = f64;
    pub type Value = f64;

    /// Hue, saturation and value. `h` is in [0, 1), `s` and `v` in [0, 1].
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Hsv {
        pub h: Hue,
        pub s: Saturation,
        pub v: Value,
    }

    /// Luma and the two chroma differences, unbounded.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct YCbCr {
        pub y: f64,
        pub cb: f64,
        pub cr: f64,
    }

    /// Converts raw 0..255 channels to HSV.
    pub fn rgb_to_hsv(r: f64, g: f64, b: f64) -> Hsv {
        let (r, g, b) = (r / 255.0, g / 255.0, b / 255.0);

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let s = if max == 0.0 { 0.0 } else { delta / max };

        let h = if max == min {
            0.0 // achromatic
        } else {
            let sector = if max == r {
                (g - b) / delta + if g < b { 6.0 } else { 0.0 }
            } else if max == g {
                (b - r) / delta + 2.0
            } else {
                (r - g) / delta + 4.0
            };
            sector / 6.0
        };

        Hsv { h, s, v: max }
    }

    pub fn rgb_to_ycbcr(r: f64, g: f64, b: f64) -> YCbCr {
        YCbCr {
            y: 16.0 + (65.481 * r + 128.553 * g + 24.966 * b),
            cb: 128.0 + (-37.797 * r - 74.203 * g + 112.0 * b),
            cr: 128.0 + (112.0 * r - 93.786 * g - 18.214 * b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::color_space::*;

    const EPSILON: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPSILON,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn gray_pixels_have_no_hue_or_saturation() {
        for level in [0.0, 1.0, 64.0, 128.0, 255.0] {
            let hsv = rgb_to_hsv(level, level, level);
            assert_eq!(hsv.h, 0.0);
            assert_eq!(hsv.s, 0.0);
            assert_close(hsv.v, level / 255.0);
        }
    }

    #[test]
    fn primaries_land_on_sector_boundaries() {
        assert_close(rgb_to_hsv(255.0, 0.0, 0.0).h, 0.0);
        assert_close(rgb_to_hsv(0.0, 255.0, 0.0).h, 2.0 / 6.0);
        assert_close(rgb_to_hsv(0.0, 0.0, 255.0).h, 4.0 / 6.0);
        // Magenta wraps through the red sector.
        assert_close(rgb_to_hsv(255.0, 0.0, 255.0).h, 5.0 / 6.0);
    }

    #[test]
    fn skin_tone_hsv() {
        let hsv = rgb_to_hsv(200.0, 150.0, 120.0);
        assert_close(hsv.h, 0.0625);
        assert_close(hsv.s, 0.4);
        assert_close(hsv.v, 200.0 / 255.0);
    }

    #[test]
    fn ycbcr_uses_raw_channel_scale() {
        let black = rgb_to_ycbcr(0.0, 0.0, 0.0);
        assert_eq!(black, YCbCr { y: 16.0, cb: 128.0, cr: 128.0 });

        let unit = rgb_to_ycbcr(1.0, 1.0, 1.0);
        assert_close(unit.y, 16.0 + 219.0);
        assert_close(unit.cb, 128.0);
        assert_close(unit.cr, 128.0);
    }

    #[test]
    fn conversions_are_deterministic() {
        let a = rgb_to_hsv(96.0, 41.0, 21.0);
        let b = rgb_to_hsv(96.0, 41.0, 21.0);
        assert_eq!(a.h.to_bits(), b.h.to_bits());
        assert_eq!(a.s.to_bits(), b.s.to_bits());
        assert_eq!(rgb_to_ycbcr(96.0, 41.0, 21.0), rgb_to_ycbcr(96.0, 41.0, 21.0));
    }
}
