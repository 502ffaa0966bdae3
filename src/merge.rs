//! Fan-in: concatenation, stats aggregation, global reindexing, per-sample tally.
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

use crate::dispatch::ChunkOutput;
use crate::error::{Error, Result};
use crate::seqio::{phred_score, write_fastq_record, FastqRecords};
use crate::stats::DemuxStats;

/// Append every chunk's demux file to `out`, in chunk-index order.
pub fn concatenate<W: Write>(outputs: &[ChunkOutput], out: &mut W) -> Result<()> {
    let mut ordered: Vec<&ChunkOutput> = outputs.iter().collect();
    ordered.sort_by_key(|o| o.index);
    for o in ordered {
        let mut f = File::open(&o.demux).map_err(|e| Error::file(&o.demux, e))?;
        io::copy(&mut f, out).map_err(|e| Error::file(&o.demux, e))?;
    }
    Ok(())
}

/// Sum the stats files left behind by each pass.
pub fn sum_stats(outputs: &[ChunkOutput]) -> Result<DemuxStats> {
    outputs
        .iter()
        .map(|o| DemuxStats::read_csv(&o.stats_path))
        .sum()
}

/// Replace the first `;`-delimited field of `header` with `R_<n>`.
pub fn reindex_header(header: &str, n: u64) -> String {
    match header.find(';') {
        Some(i) => format!("R_{n}{}", &header[i..]),
        None => format!("R_{n};"),
    }
}

/// Renumber every record of `input` from 1 in stream order.
///
/// Returns the number of records written. Running it twice gives the same
/// output as running it once.
pub fn reindex<R: BufRead, W: Write>(input: R, out: &mut W) -> Result<u64> {
    let mut n = 0u64;
    for rec in FastqRecords::new(input) {
        let rec = rec?;
        n += 1;
        write_fastq_record(out, &reindex_header(&rec.header, n), &rec.seq, &rec.qual)?;
    }
    out.flush()?;
    Ok(n)
}

/// Reads per sample label plus quality totals over the accepted bases.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleTally {
    counts: HashMap<String, u64>,
    bases: u64,
    quality_sum: u64,
}

impl SampleTally {
    pub fn from_reader<R: BufRead>(input: R) -> Result<Self> {
        let mut tally = SampleTally::default();
        for rec in FastqRecords::new(input) {
            let rec = rec?;
            tally.add(label_of(&rec.header).unwrap_or(""), &rec.qual);
        }
        Ok(tally)
    }

    pub fn from_path(path: &std::path::Path) -> Result<Self> {
        let f = File::open(path).map_err(|e| Error::file(path, e))?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn add(&mut self, label: &str, qual: &[u8]) {
        *self.counts.entry(label.to_string()).or_default() += 1;
        for &q in qual {
            if let Some(score) = phred_score(q) {
                self.bases += 1;
                self.quality_sum += u64::from(score);
            }
        }
    }

    pub fn get(&self, label: &str) -> u64 {
        self.counts.get(label).copied().unwrap_or(0)
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Labels by count, highest first; equal counts in natural label order.
    pub fn sorted(&self) -> Vec<(&str, u64)> {
        let mut v: Vec<(&str, u64)> = self.counts.iter().map(|(k, &c)| (k.as_str(), c)).collect();
        v.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| natural_cmp(a.0, b.0)));
        v
    }

    /// Mean Phred score of all accepted bases, `None` when nothing was accepted.
    pub fn mean_quality(&self) -> Option<f64> {
        (self.bases > 0).then(|| self.quality_sum as f64 / self.bases as f64)
    }
}

/// Value of the `barcodelabel=` field of a demux header.
pub fn label_of(header: &str) -> Option<&str> {
    header
        .split(';')
        .find_map(|field| field.strip_prefix("barcodelabel="))
}

/// Compare labels so that embedded numbers order numerically (`BC.2` < `BC.10`).
pub(crate) fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a = a.as_bytes();
    let mut b = b.as_bytes();
    loop {
        match (a.first(), b.first()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let da = a.iter().take_while(|c| c.is_ascii_digit()).count();
                let db = b.iter().take_while(|c| c.is_ascii_digit()).count();
                let (na, ra) = a.split_at(da);
                let (nb, rb) = b.split_at(db);
                let trim = |n: &[u8]| -> usize { n.iter().take_while(|&&c| c == b'0').count() };
                let (na, nb) = (&na[trim(na)..], &nb[trim(nb)..]);
                let ord = na.len().cmp(&nb.len()).then_with(|| na.cmp(nb));
                if ord != Ordering::Equal {
                    return ord;
                }
                a = ra;
                b = rb;
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(y);
                }
                a = &a[1..];
                b = &b[1..];
            }
        }
    }
}
