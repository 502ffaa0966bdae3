//! Run report: host info at start-up, counters and the per-sample table at the end.
use std::fs::File;
use std::path::Path;

use log::info;
use polars::prelude::*;
use sysinfo::System;

use crate::error::{Error, Result};
use crate::merge::{natural_cmp, SampleTally};
use crate::pipeline::{Demultiplexer, RunSummary};

/// One-line description of the machine, logged before a run.
pub fn host_summary() -> String {
    let mut sys = System::new();
    sys.refresh_memory();
    let os = System::long_os_version().unwrap_or_else(|| "unknown OS".to_string());
    let gib = sys.total_memory() as f64 / (1024.0 * 1024.0 * 1024.0);
    format!("{os}, {} cores, {gib:.1} GiB memory", num_cpus::get())
}

/// Report lines in display order. The barcode-pair line only appears when
/// reverse barcodes were used.
pub fn summary_lines(s: &RunSummary) -> Vec<(&'static str, u64)> {
    let mut v = vec![
        ("Total reads", s.total_reads()),
        ("Valid barcodes", s.valid_barcodes()),
        ("Forward primer found", s.forward_primer_found()),
        ("Reverse primer found", s.reverse_primer_found()),
    ];
    if let Some(pairs) = s.valid_barcode_pairs() {
        v.push(("Valid forward and reverse barcodes", pairs));
    }
    v.push(("Discarded as too short", s.too_short()));
    v.push(("Reads written", s.accepted()));
    v
}

/// Per-sample counts as a DataFrame, highest count first.
pub fn sample_table(tally: &SampleTally) -> PolarsResult<DataFrame> {
    let rows = tally.sorted();
    let labels: Vec<&str> = rows.iter().map(|r| r.0).collect();
    let counts: Vec<u64> = rows.iter().map(|r| r.1).collect();
    df!(
        "sample" => labels,
        "reads"  => counts,
    )
}

pub fn write_counts_csv(tally: &SampleTally, path: &Path) -> PolarsResult<()> {
    let mut df = sample_table(tally)?;
    let f = File::create(path)?;
    CsvWriter::new(f).include_header(true).finish(&mut df)
}

const MAPPING_HEADER: [&str; 7] = [
    "#SampleID",
    "BarcodeSequence",
    "LinkerPrimerSequence",
    "RevBarcodeSequence",
    "ReversePrimer",
    "phinchID",
    "Treatment",
];

/// Write a tab-separated, QIIME-style mapping file with one row per sample that
/// received reads, in natural label order.
///
/// `RevBarcodeSequence` and `ReversePrimer` are given in their published
/// orientation, i.e. as they were before being complemented for matching.
pub fn write_mapping_file(demux: &Demultiplexer, tally: &SampleTally, path: &Path) -> Result<()> {
    let linker_primer = demux.forward_primer().as_str().to_string();
    let reverse_primer = demux.reverse_primer().reverse_complement().as_str().to_string();

    let mut rows: Vec<[String; 7]> = Vec::new();
    for bc in demux.barcodes().iter() {
        let fwd = String::from_utf8_lossy(&bc.sequence).into_owned();
        match demux.reverse_barcodes() {
            None => {
                if tally.get(&bc.label) > 0 {
                    rows.push(mapping_row(&bc.label, &fwd, &linker_primer, "", &reverse_primer));
                }
            }
            Some(rev) => {
                for rb in rev.iter() {
                    let label = format!("{}_{}", bc.label, rb.label);
                    if tally.get(&label) > 0 {
                        let published = bio::alphabets::dna::revcomp(&rb.sequence);
                        let rev_seq = String::from_utf8_lossy(&published).into_owned();
                        rows.push(mapping_row(&label, &fwd, &linker_primer, &rev_seq, &reverse_primer));
                    }
                }
            }
        }
    }
    rows.sort_by(|a, b| natural_cmp(&a[0], &b[0]));

    let mut w = csv::WriterBuilder::new().delimiter(b'\t').from_path(path)?;
    w.write_record(MAPPING_HEADER)?;
    for row in &rows {
        w.write_record(row)?;
    }
    w.flush().map_err(|e| Error::file(path, e))
}

fn mapping_row(sample: &str, barcode: &str, linker_primer: &str, rev_barcode: &str, reverse_primer: &str) -> [String; 7] {
    [
        sample.to_string(),
        barcode.to_string(),
        linker_primer.to_string(),
        rev_barcode.to_string(),
        reverse_primer.to_string(),
        sample.to_string(),
        "no_data".to_string(),
    ]
}

/// Log every report value followed by the sample table.
pub fn log_summary(s: &RunSummary) {
    for (name, n) in summary_lines(s) {
        info!("{name:<36}{n:>12}");
    }
    if let Some(q) = s.tally.mean_quality() {
        info!("{:<36}{q:>12.2}", "Mean base quality of written reads");
    }
    info!("output written to {}", s.output.display());
    match sample_table(&s.tally) {
        Ok(df) if df.height() > 0 => info!("reads per sample:\n{df}"),
        Ok(_) => info!("no reads assigned to any sample"),
        Err(e) => log::warn!("could not build sample table: {e}"),
    }
}
