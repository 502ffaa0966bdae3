//! Run configuration consumed by the classifier and the dispatcher.
use crate::error::{Error, Result};

/// Length, mismatch and parallelism settings for one run.
///
/// Whether 3' barcodes are used follows from whether a reverse barcode table is
/// supplied to [`crate::pipeline::Demultiplexer`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DemuxConfig {
    /// Edit-distance budget for each primer.
    pub primer_mismatch: u32,
    /// Substitution budget for each barcode.
    pub barcode_mismatch: usize,
    /// Reads shorter than this after trimming are discarded.
    pub min_len: usize,
    /// Target length for truncation and padding.
    pub trim_len: usize,
    /// Keep only reads where both primers were found; no trimming or padding.
    pub full_length_only: bool,
    /// Pad reads shorter than `trim_len` with `N`.
    pub pad: bool,
    /// Number of worker threads.
    pub workers: usize,
}

impl Default for DemuxConfig {
    fn default() -> Self {
        DemuxConfig {
            primer_mismatch: 2,
            barcode_mismatch: 0,
            min_len: 100,
            trim_len: 300,
            full_length_only: false,
            pad: false,
            workers: num_cpus::get().max(1),
        }
    }
}

impl DemuxConfig {
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::Config("worker count must be at least 1".into()));
        }
        if self.trim_len == 0 {
            return Err(Error::Config("trim length must be at least 1".into()));
        }
        if !self.full_length_only && self.trim_len < self.min_len {
            return Err(Error::Config(format!(
                "trim length {} is below minimum length {}; no read could be kept",
                self.trim_len, self.min_len
            )));
        }
        if self.primer_mismatch > i32::MAX as u32 {
            return Err(Error::Config("primer mismatch budget is out of range".into()));
        }
        Ok(())
    }
}
