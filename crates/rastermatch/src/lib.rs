//! rastermatch — perceptual pixel comparison for visual regression testing.
//!
//! Compares two equal-sized RGBA images and reports how many pixels differ
//! beyond a perceptual tolerance, optionally producing an annotated visual
//! diff. Anti-aliasing artifacts can be classified out of the count, and a
//! configurable shift window absorbs small rigid pixel shifts between
//! renders. Large images are compared in parallel row bands.
//!
//! ```no_run
//! use rastermatch::{Options, compare};
//!
//! let img1 = vec![0u8; 64 * 64 * 4];
//! let img2 = vec![0u8; 64 * 64 * 4];
//! let mut diff = vec![0u8; 64 * 64 * 4];
//!
//! let count = compare(&img1, &img2, Some(&mut diff), 64, 64, &Options::default())?;
//! assert_eq!(count, 0);
//! # Ok::<(), rastermatch::CompareError>(())
//! ```

pub mod codec;
pub mod compare;
pub mod config;
pub mod report;

pub use compare::{CompareError, Execution, Options, compare};
