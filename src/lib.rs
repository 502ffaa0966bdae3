#![forbid(unsafe_code)]
//! # ampdemux
//!
//! Demultiplexing of barcoded amplicon reads into per-sample, primer-trimmed,
//! length-normalized FASTQ.
//!
//! Each read is assigned to a sample by approximate matching of its leading
//! barcode, the forward and reverse primers are located with a bounded
//! edit-distance search (IUPAC codes honoured), and the insert between them is
//! trimmed or padded to a fixed length. Work is split into chunks processed in
//! parallel; the chunk outputs are merged, renumbered and tallied per sample.
//!
//! ## Highlights
//! - Primer registry for common ITS, LSU, 16S and COI primers ([`kits::PRIMERS`]).
//! - Optional 3' barcodes for dual-indexed libraries.
//! - Counts reconcile additively: every read lands in exactly one category.
//!
//! ## Examples
//! ```rust
//! let fwd = ampdemux::kits::resolve_primer("fITS7", 2).unwrap();
//! assert_eq!(fwd.as_str(), "GTGARTCATCGAATCTTTG");
//! let hit = ampdemux::detect::locate_primer(&fwd, b"TTTTGTGAATCATCGAATCTTTGACGT").unwrap();
//! assert_eq!((hit.start, hit.end), (4, 23));
//! ```

pub mod kit;
pub mod detect;
pub mod kits;
pub mod data { pub mod fungal; pub mod ion_barcodes; pub mod markers; }
pub mod barcodes;
pub mod seqio;
pub mod clean;
pub mod config;
pub mod error;
pub mod stats;
pub mod dispatch;
pub mod merge;
pub mod pipeline;
pub mod report;

pub use config::DemuxConfig;
pub use error::{Error, Result};
pub use pipeline::{Demultiplexer, RunSummary, Setup};

/// Crate version string (from `CARGO_PKG_VERSION`).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convenience: one row per registry primer for CLI listing.
/// Each row is `(name, locus, strand, sequence, source)`.
pub fn list_primers_rows() -> Vec<(String, String, String, String, String)> {
    kits::PRIMERS
        .iter()
        .map(|p| {
            (
                p.id.to_string(),
                p.locus.to_string(),
                p.strand.to_string(),
                p.sequence.to_string(),
                p.provenance.source.to_string(),
            )
        })
        .collect()
}
