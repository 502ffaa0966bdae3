use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use polars::prelude::*;

use ampdemux::{report, DemuxConfig, Setup};

/// ampdemux CLI
#[derive(Parser)]
#[command(name = "ampdemux")]
#[command(version)]
#[command(about = "Amplicon demultiplexing, primer trimming and length normalization", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Switch {
    On,
    Off,
}

#[derive(Subcommand)]
enum Commands {
    /// Demultiplex a barcoded FASTQ into per-sample, trimmed reads
    Demux {
        /// Input FASTQ (plain or gzip)
        #[arg(short = 'i', long = "fastq")]
        fastq: PathBuf,
        /// Output base name; reads go to <out>.demux.fq.gz, samples to <out>.mapping_file.txt
        #[arg(short = 'o', long = "out")]
        out: String,
        /// Forward primer name or sequence
        #[arg(short = 'f', long = "fwd_primer", default_value = "fITS7")]
        fwd_primer: String,
        /// Reverse primer name or sequence
        #[arg(short = 'r', long = "rev_primer", default_value = "ITS4")]
        rev_primer: String,
        /// FASTA of 5' sample barcodes (default: built-in Ion Xpress 1-32)
        #[arg(long = "barcode_fasta")]
        barcode_fasta: Option<PathBuf>,
        /// FASTA of 3' barcodes (enables dual barcodes)
        #[arg(long = "reverse_barcode")]
        reverse_barcode: Option<PathBuf>,
        /// Comma-separated barcode labels to keep, or "all"
        #[arg(short = 'b', long = "list_barcodes", default_value = "all")]
        list_barcodes: String,
        /// Prefix added to every sample label
        #[arg(long = "mult_samples")]
        mult_samples: Option<String>,
        /// Pad reads shorter than the trim length with N
        #[arg(short = 'p', long = "pad", value_enum, default_value = "off")]
        pad: Switch,
        /// Edits allowed in each primer
        #[arg(long = "primer_mismatch", default_value_t = 2)]
        primer_mismatch: u32,
        /// Mismatches allowed in each barcode
        #[arg(long = "barcode_mismatch", default_value_t = 0)]
        barcode_mismatch: usize,
        /// Minimum length to keep a read
        #[arg(long = "min_len", default_value_t = 100)]
        min_len: usize,
        /// Trim (or pad) reads to this length
        #[arg(short = 'l', long = "trim_len", default_value_t = 300)]
        trim_len: usize,
        /// Keep only reads with both primers; no trimming or padding
        #[arg(long = "full_length")]
        full_length: bool,
        /// Ion Torrent library: forward primer is preceded by an A linker
        #[arg(long = "ion")]
        ion: bool,
        /// Worker threads (default: all cores)
        #[arg(long = "cpus")]
        cpus: Option<usize>,
        /// Also write per-sample counts to this CSV
        #[arg(long = "counts_csv")]
        counts_csv: Option<PathBuf>,
    },

    /// List the built-in primer registry
    ListPrimers,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::ListPrimers => cmd_list_primers()?,

        Commands::Demux {
            fastq, out, fwd_primer, rev_primer, barcode_fasta, reverse_barcode, list_barcodes,
            mult_samples, pad, primer_mismatch, barcode_mismatch, min_len, trim_len,
            full_length, ion, cpus, counts_csv,
        } => {
            if !fastq.is_file() {
                bail!("input FASTQ {} does not exist", fastq.display());
            }
            let config = DemuxConfig {
                primer_mismatch,
                barcode_mismatch,
                min_len,
                trim_len,
                full_length_only: full_length,
                pad: matches!(pad, Switch::On),
                workers: cpus.unwrap_or_else(num_cpus::get),
            };
            let barcode_subset = if list_barcodes.eq_ignore_ascii_case("all") {
                Vec::new()
            } else {
                list_barcodes.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
            };
            let setup = Setup {
                forward_primer: fwd_primer,
                reverse_primer: rev_primer,
                barcode_fasta,
                reverse_barcode_fasta: reverse_barcode,
                barcode_subset,
                sample_prefix: mult_samples,
                ion,
            };

            info!("ampdemux {} on {}", ampdemux::VERSION, report::host_summary());
            let demux = setup.build(config).context("invalid run setup")?;
            let output = PathBuf::from(format!("{out}.demux.fq.gz"));
            let summary = demux
                .run(&fastq, &output)
                .with_context(|| format!("demultiplexing {} failed", fastq.display()))?;
            report::log_summary(&summary);

            let mapping = PathBuf::from(format!("{out}.mapping_file.txt"));
            report::write_mapping_file(&demux, &summary.tally, &mapping)
                .with_context(|| format!("writing {}", mapping.display()))?;
            info!("mapping file written to {}", mapping.display());

            if let Some(path) = counts_csv {
                report::write_counts_csv(&summary.tally, &path)
                    .with_context(|| format!("writing {}", path.display()))?;
                info!("per-sample counts written to {}", path.display());
            }
        }
    }

    Ok(())
}

fn cmd_list_primers() -> PolarsResult<()> {
    let rows = ampdemux::list_primers_rows();
    let df = df!(
        "primer"   => rows.iter().map(|r| r.0.clone()).collect::<Vec<_>>(),
        "locus"    => rows.iter().map(|r| r.1.clone()).collect::<Vec<_>>(),
        "strand"   => rows.iter().map(|r| r.2.clone()).collect::<Vec<_>>(),
        "sequence" => rows.iter().map(|r| r.3.clone()).collect::<Vec<_>>(),
        "source"   => rows.iter().map(|r| r.4.clone()).collect::<Vec<_>>(),
    )?;

    // Read by the polars pretty-printer; show every row and full strings.
    std::env::set_var("POLARS_FMT_TABLE_FORMATTING", "UTF8_FULL");
    std::env::set_var("POLARS_FMT_MAX_ROWS", "1000");
    std::env::set_var("POLARS_FMT_STR_LEN", "1000");
    println!("{df}");
    Ok(())
}
