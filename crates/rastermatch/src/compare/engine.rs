//! Per-pixel decision pipeline over a band of rows.

use super::Options;
use super::antialias::{antialiased, packed};
use super::color::{MAX_YIQ_DELTA, color_delta, rgb2y};
use super::shift::best_shifted_delta;

/// Compare rows `[row_start, row_end)` of the two images.
///
/// `out`, when given, is the disjoint output sub-slice covering exactly
/// this band's rows; painting indexes relative to `row_start`. Returns the
/// number of differing pixels in the band.
pub(crate) fn diff_rows(
    img1: &[u8],
    img2: &[u8],
    mut out: Option<&mut [u8]>,
    width: u32,
    height: u32,
    row_start: u32,
    row_end: u32,
    options: &Options,
) -> u64 {
    let max_delta = MAX_YIQ_DELTA * options.threshold * options.threshold;
    let has_shift = options.h_shift > 0 || options.v_shift > 0;
    let mut diff_count = 0u64;

    for y in row_start..row_end {
        for x in 0..width {
            let i = y as usize * width as usize + x as usize;
            let k = i * 4;
            let band_k = ((y - row_start) as usize * width as usize + x as usize) * 4;

            let mut delta = if packed(img1, i) == packed(img2, i) {
                0.0
            } else {
                color_delta(img1, img2, k, k, false)
            };

            // Escalate to the shift search before deciding the pixel is
            // really different.
            if delta.abs() > max_delta && has_shift {
                delta = best_shifted_delta(
                    img1,
                    img2,
                    width,
                    height,
                    x,
                    y,
                    options.h_shift,
                    options.v_shift,
                );
            }

            if delta.abs() > max_delta {
                let aa = !options.include_aa
                    && (antialiased(img1, x, y, width, height, img2)
                        || antialiased(img2, x, y, width, height, img1));

                if aa {
                    // Anti-aliasing artifact: annotate but do not count.
                    if let Some(out) = out.as_deref_mut()
                        && !options.diff_mask
                    {
                        paint(out, band_k, options.aa_color);
                    }
                } else {
                    if let Some(out) = out.as_deref_mut() {
                        let color = if delta < 0.0 {
                            options.diff_color_alt.unwrap_or(options.diff_color)
                        } else {
                            options.diff_color
                        };
                        paint(out, band_k, color);
                    }
                    diff_count += 1;
                }
            } else if let Some(out) = out.as_deref_mut()
                && !options.diff_mask
            {
                paint_gray(out, band_k, img1, k, options.alpha);
            }
        }
    }

    diff_count
}

/// Render every pixel as the unchanged-pixel background. Used by the
/// identical-image fast path, which never invokes the color metric.
pub(crate) fn render_unchanged(out: &mut [u8], img: &[u8], alpha: f64) {
    for k in (0..img.len()).step_by(4) {
        paint_gray(out, k, img, k, alpha);
    }
}

fn paint(out: &mut [u8], k: usize, rgb: [u8; 3]) {
    out[k] = rgb[0];
    out[k + 1] = rgb[1];
    out[k + 2] = rgb[2];
    out[k + 3] = 255;
}

/// Paint the source pixel's luminance blended toward white, visualizing
/// unchanged regions without distracting from the marked ones.
fn paint_gray(out: &mut [u8], k_out: usize, img: &[u8], k_src: usize, alpha: f64) {
    let y = rgb2y(
        img[k_src] as f64,
        img[k_src + 1] as f64,
        img[k_src + 2] as f64,
    );
    let a = alpha * img[k_src + 3] as f64 / 255.0;
    let val = (255.0 + (y - 255.0) * a) as u8;
    out[k_out] = val;
    out[k_out + 1] = val;
    out[k_out + 2] = val;
    out[k_out + 3] = 255;
}
