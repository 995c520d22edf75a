//! Band-parallel execution.
//!
//! Rows are partitioned into contiguous, disjoint, near-equal bands; each
//! band runs the pixel pipeline on its own scoped thread and writes only
//! into its own sub-slice of the output buffer. The merge is a plain sum,
//! so the result is independent of completion order and needs no locks.

use tracing::{debug, warn};

use super::Options;
use super::engine::diff_rows;

/// Pixel count above which `Execution::Auto` goes parallel. Below this the
/// fan-out costs more than it saves.
pub(crate) const PARALLEL_MIN_PIXELS: u64 = 1 << 18;

/// Contiguous row range owned by one worker.
#[derive(Debug, Clone, Copy)]
struct Band {
    row_start: u32,
    row_end: u32,
}

/// Split `height` rows into `workers` near-equal contiguous bands.
/// Every row lands in exactly one band.
fn partition_rows(height: u32, workers: u32) -> Vec<Band> {
    let base = height / workers;
    let extra = height % workers;
    let mut bands = Vec::with_capacity(workers as usize);
    let mut row = 0;
    for i in 0..workers {
        let rows = base + u32::from(i < extra);
        bands.push(Band {
            row_start: row,
            row_end: row + rows,
        });
        row += rows;
    }
    bands
}

/// Worker count: available parallelism minus one (leave a core for the
/// caller), at least 1, never more than one band per row.
fn worker_count(height: u32) -> u32 {
    let available = std::thread::available_parallelism().map_or(1, |n| n.get() as u32);
    available.saturating_sub(1).clamp(1, height)
}

/// Run the pixel pipeline over all rows as one scoped-thread task per
/// band and sum the band counts.
pub(crate) fn compare_parallel(
    img1: &[u8],
    img2: &[u8],
    output: Option<&mut [u8]>,
    width: u32,
    height: u32,
    options: &Options,
) -> u64 {
    let workers = worker_count(height);
    if workers <= 1 {
        return diff_rows(img1, img2, output, width, height, 0, height, options);
    }

    let bands = partition_rows(height, workers);
    debug!(workers, width, height, "running banded comparison");

    // Slice the output into per-band disjoint sub-views up front; the
    // disjointness is what lets every band write without synchronization.
    let mut out_slices: Vec<Option<&mut [u8]>> = Vec::with_capacity(bands.len());
    match output {
        Some(out) => {
            let mut rest = out;
            for band in &bands {
                let band_bytes =
                    (band.row_end - band.row_start) as usize * width as usize * 4;
                let (head, tail) = std::mem::take(&mut rest).split_at_mut(band_bytes);
                out_slices.push(Some(head));
                rest = tail;
            }
        }
        None => out_slices.extend((0..bands.len()).map(|_| None)),
    }

    std::thread::scope(|s| {
        let handles: Vec<_> = bands
            .iter()
            .zip(out_slices)
            .map(|(band, out)| {
                s.spawn(move || {
                    diff_rows(
                        img1,
                        img2,
                        out,
                        width,
                        height,
                        band.row_start,
                        band.row_end,
                        options,
                    )
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(count) => count,
                Err(_) => {
                    // A failed band contributes no diffs rather than
                    // aborting the whole comparison.
                    warn!("band worker panicked, its rows count as unchanged");
                    0
                }
            })
            .sum()
    })
}
