//! Perceptual color difference in YIQ space.
//!
//! Distance metric from "Measuring perceived color difference using YIQ
//! NTSC transmission color space in mobile applications" (Kotsarenko &
//! Ramos). Translucent pixels are composited against a synthetic
//! checkerboard background before differencing, so they are compared as
//! they would visually render.

/// Maximum possible value of the YIQ difference metric (fully opposite
/// colors at full opacity).
pub const MAX_YIQ_DELTA: f64 = 35215.0;

const CHECKER_LIGHT: f64 = 255.0;
const CHECKER_DARK: f64 = 204.0;

/// Checkerboard shade for the pixel at byte offset `k`.
///
/// Fibonacci hash of the pixel index; deterministic across runs and
/// platforms, and identical for both images at the same offset.
fn checker_shade(k: usize) -> f64 {
    let cell = (k / 4) as u64;
    if cell.wrapping_mul(0x9E37_79B9_7F4A_7C15) >> 63 == 0 {
        CHECKER_LIGHT
    } else {
        CHECKER_DARK
    }
}

/// Composite a channel of a translucent color against a background shade.
fn blend(c: f64, a: f64, bg: f64) -> f64 {
    bg + (c - bg) * a
}

pub(crate) fn rgb2y(r: f64, g: f64, b: f64) -> f64 {
    r * 0.29889531 + g * 0.58662247 + b * 0.11448223
}

fn rgb2i(r: f64, g: f64, b: f64) -> f64 {
    r * 0.59597799 - g * 0.27417610 - b * 0.32180189
}

fn rgb2q(r: f64, g: f64, b: f64) -> f64 {
    r * 0.21147017 - g * 0.52261711 + b * 0.31114694
}

/// Signed perceptual distance between the pixel at byte offset `k1` in
/// `img1` and the pixel at byte offset `k2` in `img2`.
///
/// Negative when the second pixel is darker; the sign is what selects the
/// alternate diff color downstream. With `y_only`, returns the plain
/// brightness difference instead (anti-alias detection only cares about
/// luminance).
pub fn color_delta(img1: &[u8], img2: &[u8], k1: usize, k2: usize, y_only: bool) -> f64 {
    let mut r1 = img1[k1] as f64;
    let mut g1 = img1[k1 + 1] as f64;
    let mut b1 = img1[k1 + 2] as f64;
    let a1 = img1[k1 + 3] as f64;

    let mut r2 = img2[k2] as f64;
    let mut g2 = img2[k2 + 1] as f64;
    let mut b2 = img2[k2 + 2] as f64;
    let a2 = img2[k2 + 3] as f64;

    if r1 == r2 && g1 == g2 && b1 == b2 && a1 == a2 {
        return 0.0;
    }

    if a1 < 255.0 {
        let bg = checker_shade(k1);
        let a = a1 / 255.0;
        r1 = blend(r1, a, bg);
        g1 = blend(g1, a, bg);
        b1 = blend(b1, a, bg);
    }

    if a2 < 255.0 {
        let bg = checker_shade(k2);
        let a = a2 / 255.0;
        r2 = blend(r2, a, bg);
        g2 = blend(g2, a, bg);
        b2 = blend(b2, a, bg);
    }

    let y1 = rgb2y(r1, g1, b1);
    let y2 = rgb2y(r2, g2, b2);
    let y = y1 - y2;

    if y_only {
        return y;
    }

    let i = rgb2i(r1, g1, b1) - rgb2i(r2, g2, b2);
    let q = rgb2q(r1, g1, b1) - rgb2q(r2, g2, b2);

    let delta = 0.5053 * y * y + 0.299 * i * i + 0.1957 * q * q;

    // Encode lighten vs darken in the sign: negative = second pixel darker.
    if y1 > y2 { -delta } else { delta }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [u8; 4] = [255, 255, 255, 255];
    const BLACK: [u8; 4] = [0, 0, 0, 255];

    #[test]
    fn identical_pixels_are_zero() {
        let px = [13, 200, 77, 255];
        assert_eq!(color_delta(&px, &px, 0, 0, false), 0.0);
        assert_eq!(color_delta(&px, &px, 0, 0, true), 0.0);
    }

    #[test]
    fn identical_translucent_pixels_are_zero() {
        // Early equality return fires before any compositing.
        let px = [13, 200, 77, 40];
        assert_eq!(color_delta(&px, &px, 0, 0, false), 0.0);
    }

    #[test]
    fn white_vs_black_is_near_maximum_and_negative() {
        let d = color_delta(&WHITE, &BLACK, 0, 0, false);
        // Second pixel is darker, so the sign is negative.
        assert!(d < 0.0);
        assert!(d.abs() > 32000.0);
        assert!(d.abs() <= MAX_YIQ_DELTA);
    }

    #[test]
    fn magnitude_is_stable_under_swap_for_opaque_pixels() {
        let p = [200, 30, 90, 255];
        let q = [10, 220, 160, 255];
        let d1 = color_delta(&p, &q, 0, 0, false);
        let d2 = color_delta(&q, &p, 0, 0, false);
        assert_eq!(d1.abs(), d2.abs());
        assert!(d1 * d2 < 0.0, "sign must flip when images swap");
    }

    #[test]
    fn y_only_returns_brightness_difference() {
        let d = color_delta(&WHITE, &BLACK, 0, 0, true);
        assert!((d - rgb2y(255.0, 255.0, 255.0)).abs() < 1e-9);
    }

    #[test]
    fn translucency_changes_the_delta() {
        let opaque = [100, 100, 100, 255];
        let translucent = [100, 100, 100, 40];
        let d = color_delta(&opaque, &translucent, 0, 0, false);
        assert!(d.abs() > 0.0);
    }

    #[test]
    fn checkerboard_selection_is_deterministic() {
        let translucent = [100, 100, 100, 40];
        let opaque = [100, 100, 100, 255];
        let a = color_delta(&translucent, &opaque, 0, 0, false);
        let b = color_delta(&translucent, &opaque, 0, 0, false);
        assert_eq!(a, b);
    }

    #[test]
    fn background_depends_on_pixel_offset() {
        // Two copies of the same translucent pixel at offsets that hash to
        // different checkerboard shades must compare differently against
        // the same opaque pixel.
        let img: Vec<u8> = (0..16 * 4).map(|i| [100, 100, 100, 40][i % 4]).collect();
        let opaque = [100, 100, 100, 255];
        let deltas: Vec<f64> = (0..16)
            .map(|px| color_delta(&img, &opaque, px * 4, 0, false))
            .collect();
        assert!(
            deltas.iter().any(|d| *d != deltas[0]),
            "expected both checkerboard shades across 16 offsets"
        );
    }
}
