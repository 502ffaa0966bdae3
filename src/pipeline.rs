//! Orchestration of one demultiplexing run.
//!
//! `count → split → classify (parallel) → concatenate → reindex → tally → output`.
//! Everything intermediate lives in a [`tempfile::TempDir`] next to the output,
//! which is removed when the run returns, successfully or not.
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

use flate2::write::GzEncoder;
use flate2::Compression;
use log::{debug, info, warn};

use crate::barcodes::BarcodeTable;
use crate::clean::Classifier;
use crate::config::DemuxConfig;
use crate::detect::{PrimerMatcher, MAX_PRIMER_LEN};
use crate::dispatch::{plan_chunks, process_chunk, run_passes, split_input, ChunkJob, ChunkOutput};
use crate::error::{Error, Result};
use crate::kit::PrimerSpec;
use crate::kits::resolve_primer;
use crate::merge::{concatenate, reindex, sum_stats, SampleTally};
use crate::seqio::count_reads;
use crate::stats::DemuxStats;

/// Linker base that precedes the forward primer on Ion Torrent libraries.
pub const ION_LINKER: &str = "A";

/// User-facing inputs that must be resolved before any read is touched.
#[derive(Clone, Debug, Default)]
pub struct Setup {
    /// Registry name or literal IUPAC sequence.
    pub forward_primer: String,
    pub reverse_primer: String,
    /// 5' barcode FASTA; `None` uses the built-in Ion Xpress table.
    pub barcode_fasta: Option<PathBuf>,
    pub reverse_barcode_fasta: Option<PathBuf>,
    /// Labels (or bare numbers) to keep; empty keeps the whole table.
    pub barcode_subset: Vec<String>,
    pub sample_prefix: Option<String>,
    pub ion: bool,
}

impl Setup {
    /// Resolve primers and load barcode tables. All setup errors surface here.
    pub fn build(&self, config: DemuxConfig) -> Result<Demultiplexer> {
        config.validate()?;
        let mut forward = resolve_primer(&self.forward_primer, config.primer_mismatch)?;
        if self.ion {
            forward = PrimerSpec::new(format!("{ION_LINKER}{}", forward.as_str()), forward.max_edits);
        }
        let reverse = resolve_primer(&self.reverse_primer, config.primer_mismatch)?;

        let mut barcodes = match &self.barcode_fasta {
            Some(path) => BarcodeTable::from_fasta(path)?,
            None => BarcodeTable::builtin()?,
        };
        if !self.barcode_subset.is_empty() {
            let names: Vec<&str> = self.barcode_subset.iter().map(String::as_str).collect();
            barcodes = barcodes.select(&names)?;
        }
        if let Some(prefix) = &self.sample_prefix {
            barcodes = barcodes.with_sample_prefix(prefix);
        }
        let reverse_barcodes = self
            .reverse_barcode_fasta
            .as_ref()
            .map(BarcodeTable::reverse_from_fasta)
            .transpose()?;

        Demultiplexer::new(config, forward, reverse, barcodes, reverse_barcodes)
    }
}

/// Validated, immutable run state shared by every worker.
#[derive(Debug)]
pub struct Demultiplexer {
    config: DemuxConfig,
    matcher: PrimerMatcher,
    barcodes: BarcodeTable,
    reverse_barcodes: Option<BarcodeTable>,
    forward: PrimerSpec,
    reverse_rc: PrimerSpec,
}

impl Demultiplexer {
    /// `reverse` is given in its published orientation and complemented here.
    /// Both primers get their edit budget from `config.primer_mismatch`.
    pub fn new(
        config: DemuxConfig,
        mut forward: PrimerSpec,
        mut reverse: PrimerSpec,
        barcodes: BarcodeTable,
        reverse_barcodes: Option<BarcodeTable>,
    ) -> Result<Self> {
        config.validate()?;
        if forward.is_empty() || reverse.is_empty() {
            return Err(Error::Config("primer sequences must not be empty".into()));
        }
        if forward.len().max(reverse.len()) > MAX_PRIMER_LEN {
            return Err(Error::Config(format!("primers longer than {MAX_PRIMER_LEN} bases are not supported")));
        }
        forward.max_edits = config.primer_mismatch;
        reverse.max_edits = config.primer_mismatch;
        if barcodes.is_empty() {
            return Err(Error::Config("no barcodes selected".into()));
        }
        if matches!(&reverse_barcodes, Some(t) if t.is_empty()) {
            return Err(Error::Config("reverse barcode table is empty".into()));
        }
        let reverse_rc = reverse.reverse_complement();
        Ok(Demultiplexer { config, matcher: PrimerMatcher::new(), barcodes, reverse_barcodes, forward, reverse_rc })
    }

    pub fn config(&self) -> &DemuxConfig {
        &self.config
    }

    pub fn forward_primer(&self) -> &PrimerSpec {
        &self.forward
    }

    /// Reverse primer as searched, i.e. reverse complemented.
    pub fn reverse_primer(&self) -> &PrimerSpec {
        &self.reverse_rc
    }

    pub fn barcodes(&self) -> &BarcodeTable {
        &self.barcodes
    }

    pub fn reverse_barcodes(&self) -> Option<&BarcodeTable> {
        self.reverse_barcodes.as_ref()
    }

    pub fn uses_reverse_barcodes(&self) -> bool {
        self.reverse_barcodes.is_some()
    }

    pub fn classifier(&self) -> Classifier<'_> {
        Classifier {
            config: &self.config,
            matcher: &self.matcher,
            barcodes: &self.barcodes,
            reverse_barcodes: self.reverse_barcodes.as_ref(),
            forward_primer: &self.forward,
            reverse_primer: &self.reverse_rc,
        }
    }

    /// Demultiplex `input` into `output` (gzip compressed when it ends in `.gz`).
    pub fn run(&self, input: &Path, output: &Path) -> Result<RunSummary> {
        let classifier = self.classifier();
        self.run_with(input, output, |job, abort| process_chunk(job, &classifier, abort))
    }

    /// [`Self::run`] with the per-chunk pass supplied by the caller.
    pub(crate) fn run_with<F>(&self, input: &Path, output: &Path, pass: F) -> Result<RunSummary>
    where
        F: Fn(&ChunkJob, &AtomicBool) -> Result<ChunkOutput> + Sync,
    {
        let total = count_reads(input)?;
        info!("{}: {} reads", input.display(), total);
        info!(
            "forward primer {} / reverse primer (rc) {}, {} barcodes{}",
            self.forward.as_str(),
            self.reverse_rc.as_str(),
            self.barcodes.len(),
            if self.uses_reverse_barcodes() { " + reverse barcodes" } else { "" }
        );

        let tmp = work_dir(output)?;
        debug!("working directory {}", tmp.path().display());

        let plan = plan_chunks(total, self.config.workers);
        let jobs = split_input(input, &plan, tmp.path())?;
        info!("processing {} chunks on {} workers", jobs.len(), self.config.workers);
        let outputs = run_passes(&jobs, self.config.workers, pass)?;

        let merged = tmp.path().join("merged.fq");
        {
            let f = File::create(&merged).map_err(|e| Error::file(&merged, e))?;
            let mut w = BufWriter::new(f);
            concatenate(&outputs, &mut w)?;
            w.flush().map_err(|e| Error::file(&merged, e))?;
        }
        let stats = sum_stats(&outputs)?;

        let reindexed = tmp.path().join("reindexed.fq");
        let written = {
            let src = File::open(&merged).map_err(|e| Error::file(&merged, e))?;
            let dst = File::create(&reindexed).map_err(|e| Error::file(&reindexed, e))?;
            reindex(BufReader::new(src), &mut BufWriter::new(dst))?
        };
        if written != stats.valid {
            return Err(Error::CountMismatch { written, expected: stats.valid });
        }

        let tally = SampleTally::from_path(&reindexed)?;
        write_output(&reindexed, output)?;
        if let Err(e) = tmp.close() {
            warn!("could not remove working directory: {e}");
        }

        Ok(RunSummary {
            stats,
            tally,
            output: output.to_path_buf(),
            reverse_barcodes: self.uses_reverse_barcodes(),
        })
    }
}

fn work_dir(output: &Path) -> Result<tempfile::TempDir> {
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let stem = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "ampdemux".to_string());
    tempfile::Builder::new()
        .prefix(&format!(".{stem}_"))
        .tempdir_in(parent)
        .map_err(|e| Error::file(parent, e))
}

fn write_output(src: &Path, output: &Path) -> Result<()> {
    let mut from = File::open(src).map_err(|e| Error::file(src, e))?;
    let to = File::create(output).map_err(|e| Error::file(output, e))?;
    let gzip = output.extension().is_some_and(|e| e == "gz");
    if gzip {
        let mut enc = GzEncoder::new(BufWriter::new(to), Compression::default());
        io::copy(&mut from, &mut enc).map_err(|e| Error::file(output, e))?;
        enc.finish()
            .and_then(|mut w| w.flush())
            .map_err(|e| Error::file(output, e))?;
    } else {
        let mut w = BufWriter::new(to);
        io::copy(&mut from, &mut w).map_err(|e| Error::file(output, e))?;
        w.flush().map_err(|e| Error::file(output, e))?;
    }
    Ok(())
}

/// Final counters of a run plus the per-sample table.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub stats: DemuxStats,
    pub tally: SampleTally,
    pub output: PathBuf,
    pub reverse_barcodes: bool,
}

impl RunSummary {
    pub fn total_reads(&self) -> u64 {
        self.stats.total
    }

    pub fn valid_barcodes(&self) -> u64 {
        self.stats.valid_barcode()
    }

    pub fn forward_primer_found(&self) -> u64 {
        self.stats.forward_primer_found()
    }

    pub fn reverse_primer_found(&self) -> u64 {
        self.stats.rev_primer_found
    }

    /// Only reported when reverse barcodes were used.
    pub fn valid_barcode_pairs(&self) -> Option<u64> {
        self.reverse_barcodes.then(|| self.stats.valid_barcode_pairs())
    }

    pub fn too_short(&self) -> u64 {
        self.stats.too_short
    }

    pub fn accepted(&self) -> u64 {
        self.stats.valid
    }
}
