//! Shift-tolerant pixel re-matching.
//!
//! When a pixel exceeds the difference threshold and a shift window is
//! configured, the engine re-matches it against nearby offsets in the
//! other image before counting it. This absorbs small rigid pixel shifts
//! (layout jitter between renders) without any image registration.

use super::color::color_delta;

/// Best remaining delta for the pixel at (x, y) under a bounded shift.
///
/// Every offset in `[-h_win, h_win] x [-v_win, v_win]` is tried in both
/// directions: forward keeps the first image's pixel fixed and shifts the
/// second, backward shifts the first and keeps the second fixed. The
/// minimum-magnitude delta is tracked per direction, and the LARGER of the
/// two minima is returned: a good match found in only one direction must
/// not erase a difference the other direction still sees.
pub(crate) fn best_shifted_delta(
    img1: &[u8],
    img2: &[u8],
    width: u32,
    height: u32,
    x: u32,
    y: u32,
    h_win: u32,
    v_win: u32,
) -> f64 {
    let pos = (y as usize * width as usize + x as usize) * 4;

    // The (0, 0) offset is always in bounds, so both minima get seeded
    // with the direct delta.
    let mut forward = f64::INFINITY;
    let mut backward = f64::INFINITY;

    for dy in -(v_win as i64)..=v_win as i64 {
        let sy = y as i64 + dy;
        if sy < 0 || sy >= height as i64 {
            continue;
        }
        for dx in -(h_win as i64)..=h_win as i64 {
            let sx = x as i64 + dx;
            if sx < 0 || sx >= width as i64 {
                continue;
            }

            let shifted = (sy as usize * width as usize + sx as usize) * 4;

            let fwd = color_delta(img1, img2, pos, shifted, false);
            if fwd.abs() < forward.abs() {
                forward = fwd;
            }

            let bwd = color_delta(img1, img2, shifted, pos, false);
            if bwd.abs() < backward.abs() {
                backward = bwd;
            }
        }
    }

    if forward.abs() >= backward.abs() {
        forward
    } else {
        backward
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
        let mut buf = Vec::with_capacity((w * h * 4) as usize);
        for _ in 0..w * h {
            buf.extend_from_slice(&px);
        }
        buf
    }

    fn set_px(buf: &mut [u8], w: u32, x: u32, y: u32, px: [u8; 4]) {
        let k = (y as usize * w as usize + x as usize) * 4;
        buf[k..k + 4].copy_from_slice(&px);
    }

    const GRAY: [u8; 4] = [128, 128, 128, 255];
    const WHITE: [u8; 4] = [255, 255, 255, 255];

    #[test]
    fn shifted_content_matches_within_window() {
        // A white dot at (1, 1) vs the same dot at (2, 1): both directions
        // find an exact match one pixel away.
        let mut img1 = solid(4, 3, GRAY);
        let mut img2 = solid(4, 3, GRAY);
        set_px(&mut img1, 4, 1, 1, WHITE);
        set_px(&mut img2, 4, 2, 1, WHITE);

        let d = best_shifted_delta(&img1, &img2, 4, 3, 1, 1, 1, 0);
        assert_eq!(d, 0.0);
    }

    #[test]
    fn shift_beyond_window_does_not_match() {
        let mut img1 = solid(6, 3, GRAY);
        let mut img2 = solid(6, 3, GRAY);
        set_px(&mut img1, 6, 1, 1, WHITE);
        set_px(&mut img2, 6, 4, 1, WHITE);

        let direct = color_delta(&img1, &img2, (1 * 6 + 1) * 4, (1 * 6 + 1) * 4, false);
        let d = best_shifted_delta(&img1, &img2, 6, 3, 1, 1, 1, 0);
        assert_eq!(d.abs(), direct.abs());
    }

    #[test]
    fn one_sided_match_keeps_the_larger_difference() {
        // img1 has a white dot that img2 lacks entirely: backward matching
        // (img1 shifted vs img2 fixed) finds gray-on-gray and goes to
        // zero, but forward matching still sees white-vs-gray everywhere.
        // The larger forward minimum must win.
        let mut img1 = solid(3, 3, GRAY);
        let img2 = solid(3, 3, GRAY);
        set_px(&mut img1, 3, 1, 1, WHITE);

        let d = best_shifted_delta(&img1, &img2, 3, 3, 1, 1, 1, 1);
        assert!(d.abs() > 0.0, "a vanished dot must not be shift-forgiven");
    }

    #[test]
    fn vertical_window_matches_vertical_shift() {
        let mut img1 = solid(3, 4, GRAY);
        let mut img2 = solid(3, 4, GRAY);
        set_px(&mut img1, 3, 1, 1, WHITE);
        set_px(&mut img2, 3, 1, 2, WHITE);

        assert_eq!(best_shifted_delta(&img1, &img2, 3, 4, 1, 1, 0, 1), 0.0);
        // A horizontal-only window cannot absorb a vertical shift.
        assert!(best_shifted_delta(&img1, &img2, 3, 4, 1, 1, 1, 0).abs() > 0.0);
    }

    #[test]
    fn window_is_clamped_at_image_bounds() {
        let mut img1 = solid(2, 2, GRAY);
        let mut img2 = solid(2, 2, GRAY);
        set_px(&mut img1, 2, 0, 0, WHITE);
        set_px(&mut img2, 2, 1, 0, WHITE);

        // Offsets reaching outside the 2x2 image are skipped, the valid
        // ones still find the match.
        assert_eq!(best_shifted_delta(&img1, &img2, 2, 2, 0, 0, 3, 3), 0.0);
    }
}
