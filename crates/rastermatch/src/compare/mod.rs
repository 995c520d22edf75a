//! Pixel-level perceptual image comparison.
//!
//! Compares two equal-sized row-major RGBA buffers and reports how many
//! pixels differ beyond a perceptual tolerance, optionally painting an
//! annotated diff into a caller-owned output buffer. Rendering noise is
//! ignored two ways: anti-aliased edge pixels can be classified out of
//! the count, and a configurable shift window re-matches pixels against
//! nearby positions before counting them.

mod antialias;
mod color;
mod dispatch;
mod engine;
mod shift;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompareError {
    /// A buffer's length is not a whole number of RGBA pixels.
    #[error("buffer length {len} is not a whole number of RGBA pixels")]
    Format { len: usize },

    /// Input buffers (or the output buffer) have different lengths.
    #[error("buffer sizes do not match: {left} vs {right} bytes")]
    SizeMismatch { left: usize, right: usize },

    /// Buffer length disagrees with the stated dimensions.
    #[error("buffer length {len} does not match {width}x{height} RGBA (expected {expected})")]
    DimensionMismatch {
        len: usize,
        width: u32,
        height: u32,
        expected: usize,
    },
}

/// Execution strategy for one comparison run.
///
/// `Auto` is the production setting; the forced modes exist so sequential
/// and parallel runs can be checked for observable equivalence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Execution {
    /// Parallel for large images or whenever a shift window is configured,
    /// sequential otherwise.
    #[default]
    Auto,
    Sequential,
    Parallel,
}

/// Comparison options.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Matching threshold, 0.0 to 1.0; smaller is more sensitive.
    pub threshold: f64,
    /// Count anti-aliased pixels as differences instead of annotating
    /// them separately.
    pub include_aa: bool,
    /// Opacity of unchanged pixels in the diff output.
    pub alpha: f64,
    /// Color for anti-aliased pixels in the diff output.
    pub aa_color: [u8; 3],
    /// Color for differing pixels in the diff output.
    pub diff_color: [u8; 3],
    /// Color for pixels that got darker in the second image; falls back
    /// to `diff_color`.
    pub diff_color_alt: Option<[u8; 3]>,
    /// Paint only changed pixels onto a transparent canvas instead of
    /// overlaying them on a grayscale rendering of the first image.
    pub diff_mask: bool,
    /// Half-width of the horizontal shift search window, in pixels.
    pub h_shift: u32,
    /// Half-width of the vertical shift search window, in pixels.
    pub v_shift: u32,
    pub execution: Execution,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            include_aa: false,
            alpha: 0.1,
            aa_color: [255, 255, 0],
            diff_color: [255, 0, 0],
            diff_color_alt: None,
            diff_mask: false,
            h_shift: 0,
            v_shift: 0,
            execution: Execution::Auto,
        }
    }
}

/// Compare two RGBA images pixel by pixel.
///
/// `img1` and `img2` are row-major RGBA buffers of exactly
/// `width * height * 4` bytes; they are never mutated. `output`, when
/// given, must have the same length and receives the annotated diff in
/// place: differing pixels in `diff_color`/`diff_color_alt`, anti-aliased
/// pixels in `aa_color`, and (unless `diff_mask`) unchanged pixels as a
/// faded grayscale rendering of `img1`.
///
/// Returns the number of pixels classified as real differences.
pub fn compare(
    img1: &[u8],
    img2: &[u8],
    output: Option<&mut [u8]>,
    width: u32,
    height: u32,
    options: &Options,
) -> Result<u64, CompareError> {
    validate(img1, img2, output.as_deref(), width, height)?;

    // Identical inputs: nothing to classify, render the background and go.
    if img1 == img2 {
        if let Some(out) = output
            && !options.diff_mask
        {
            engine::render_unchanged(out, img1, options.alpha);
        }
        return Ok(0);
    }

    let parallel = match options.execution {
        Execution::Sequential => false,
        Execution::Parallel => true,
        Execution::Auto => {
            u64::from(width) * u64::from(height) > dispatch::PARALLEL_MIN_PIXELS
                || options.h_shift > 0
                || options.v_shift > 0
        }
    };

    let count = if parallel {
        dispatch::compare_parallel(img1, img2, output, width, height, options)
    } else {
        engine::diff_rows(img1, img2, output, width, height, 0, height, options)
    };

    Ok(count)
}

/// All precondition checks run before any per-pixel work, so the output
/// buffer is never partially mutated on error.
fn validate(
    img1: &[u8],
    img2: &[u8],
    output: Option<&[u8]>,
    width: u32,
    height: u32,
) -> Result<(), CompareError> {
    for buf in [Some(img1), Some(img2), output].into_iter().flatten() {
        if buf.len() % 4 != 0 {
            return Err(CompareError::Format { len: buf.len() });
        }
    }

    if img1.len() != img2.len() {
        return Err(CompareError::SizeMismatch {
            left: img1.len(),
            right: img2.len(),
        });
    }
    if let Some(out) = output
        && out.len() != img1.len()
    {
        return Err(CompareError::SizeMismatch {
            left: img1.len(),
            right: out.len(),
        });
    }

    let expected = width as usize * height as usize * 4;
    if img1.len() != expected {
        return Err(CompareError::DimensionMismatch {
            len: img1.len(),
            width,
            height,
            expected,
        });
    }

    Ok(())
}
