//! Fatal error type for a demultiplexing run.
//!
//! Reads that fail barcode, primer or length checks are **not** errors; they are
//! recorded as [`crate::clean::Outcome`] values and counted in
//! [`crate::stats::DemuxStats`]. Everything in this module aborts the run.
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error reading or writing \"{}\": {source}", path.display())]
    FileIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Error reading or writing stream: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error parsing FASTQ/FASTA \"{}\": {source}", path.display())]
    Parse {
        path: PathBuf,
        source: needletail::errors::ParseError,
    },

    #[error("Malformed FASTQ record {record}: {reason}")]
    MalformedRecord { record: u64, reason: String },

    #[error("Record \"{id}\" in \"{}\" has no quality string", path.display())]
    MissingQuality { path: PathBuf, id: String },

    #[error("Could not parse stats file \"{}\": {reason}", path.display())]
    Stats { path: PathBuf, reason: String },

    #[error("Stats CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Primer \"{0}\" is neither a known primer name nor a valid IUPAC nucleotide sequence")]
    InvalidPrimer(String),

    #[error("Barcode \"{label}\" has an invalid sequence \"{sequence}\"")]
    InvalidBarcode { label: String, sequence: String },

    #[error("No barcodes loaded from \"{}\"", path.display())]
    EmptyBarcodes { path: PathBuf },

    #[error("Barcode \"{0}\" requested but not present in the barcode table")]
    UnknownBarcode(String),

    #[error("Duplicate reverse barcode label \"{0}\"")]
    DuplicateReverseBarcode(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Input \"{}\" changed while being split: counted {expected} reads, found {found}", path.display())]
    InputChanged { path: PathBuf, expected: u64, found: u64 },

    #[error("Could not start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("Input \"{}\" contains no reads", path.display())]
    EmptyInput { path: PathBuf },

    #[error("Worker for chunk {chunk} failed: {reason}")]
    WorkerPanic { chunk: usize, reason: String },

    #[error("Chunk {0} cancelled after another worker failed")]
    Cancelled(usize),

    #[error("Reindexed {written} records but chunk stats report {expected} valid reads")]
    CountMismatch { written: u64, expected: u64 },
}

impl Error {
    /// Wrap an I/O error with the path it happened on.
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::FileIo { path: path.into(), source }
    }

    pub(crate) fn is_cancellation(&self) -> bool {
        matches!(self, Error::Cancelled(_))
    }
}
