//! Chunked fan-out of the classifier over a rayon pool.
//!
//! The input is split by record count into chunk files inside the run's
//! temporary directory. One worker pass per chunk writes `chunk_NNNN.demux.fq`
//! and `chunk_NNNN.stats`; passes share nothing but read-only tables and an
//! abort flag. The first failing pass raises the flag and every other pass stops
//! at its next record.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::clean::{demux_header, Classifier};
use crate::error::{Error, Result};
use crate::seqio::{for_each_read, write_fastq_record};
use crate::stats::DemuxStats;

/// One unit of work: a chunk file and how many reads it holds.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChunkJob {
    pub index: usize,
    pub path: PathBuf,
    pub reads: u64,
}

/// What a finished pass leaves behind.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChunkOutput {
    pub index: usize,
    pub demux: PathBuf,
    pub stats_path: PathBuf,
    pub stats: DemuxStats,
}

/// Split `total` records into balanced, contiguous ranges.
///
/// Uses `2 × workers` chunks (one when `workers == 1`), never more chunks than
/// records. Earlier chunks take the remainder, so sizes differ by at most one.
pub fn plan_chunks(total: u64, workers: usize) -> Vec<Range<u64>> {
    let wanted = if workers > 1 { 2 * workers as u64 } else { 1 };
    let n = wanted.min(total);
    if n == 0 {
        return Vec::new();
    }
    let base = total / n;
    let extra = total % n;
    let mut out = Vec::with_capacity(n as usize);
    let mut start = 0u64;
    for i in 0..n {
        let len = base + u64::from(i < extra);
        out.push(start..start + len);
        start += len;
    }
    out
}

/// Write the input's records into one FASTQ file per planned range.
pub fn split_input(input: &Path, plan: &[Range<u64>], dir: &Path) -> Result<Vec<ChunkJob>> {
    let jobs: Vec<ChunkJob> = plan
        .iter()
        .enumerate()
        .map(|(i, r)| ChunkJob { index: i, path: dir.join(format!("chunk_{i:04}.fq")), reads: r.end - r.start })
        .collect();
    let expected = plan.last().map_or(0, |r| r.end);

    let mut slot = 0usize;
    let mut writer: Option<BufWriter<File>> = None;
    let mut seen = 0u64;
    for_each_read(input, |read| {
        while slot < plan.len() && seen >= plan[slot].end {
            if let Some(mut w) = writer.take() {
                w.flush().map_err(|e| Error::file(&jobs[slot].path, e))?;
            }
            slot += 1;
        }
        let job = jobs.get(slot).ok_or_else(|| Error::InputChanged {
            path: input.to_path_buf(),
            expected,
            found: seen + 1,
        })?;
        if writer.is_none() {
            let f = File::create(&job.path).map_err(|e| Error::file(&job.path, e))?;
            writer = Some(BufWriter::new(f));
        }
        if let Some(w) = writer.as_mut() {
            write_fastq_record(w, &read.id, &read.seq, &read.qual).map_err(|e| Error::file(&job.path, e))?;
        }
        seen += 1;
        Ok(())
    })?;
    if let Some(mut w) = writer.take() {
        w.flush().map_err(|e| Error::file(&jobs[slot].path, e))?;
    }
    if seen != expected {
        return Err(Error::InputChanged { path: input.to_path_buf(), expected, found: seen });
    }
    Ok(jobs)
}

/// Classify every read of one chunk.
///
/// Accepted reads are numbered from 1 within the chunk; the numbers collide
/// across chunks until [`crate::merge::reindex`] runs.
pub fn process_chunk(job: &ChunkJob, classifier: &Classifier<'_>, abort: &AtomicBool) -> Result<ChunkOutput> {
    let demux = job.path.with_extension("demux.fq");
    let stats_path = job.path.with_extension("stats");
    let file = File::create(&demux).map_err(|e| Error::file(&demux, e))?;
    let mut out = BufWriter::new(file);
    let mut stats = DemuxStats::default();
    let mut accepted = 0u64;

    for_each_read(&job.path, |read| {
        if abort.load(Ordering::Relaxed) {
            return Err(Error::Cancelled(job.index));
        }
        let c = classifier.classify(&read.seq, &read.qual);
        stats.record(&c);
        if let Some(r) = c.read {
            accepted += 1;
            write_fastq_record(&mut out, &demux_header(accepted, &r.label), &r.seq, &r.qual)
                .map_err(|e| Error::file(&demux, e))?;
        }
        Ok(())
    })?;
    out.flush().map_err(|e| Error::file(&demux, e))?;
    stats.write_csv(&stats_path)?;

    debug!("chunk {}: {} reads, {} valid", job.index, stats.total, stats.valid);
    Ok(ChunkOutput { index: job.index, demux, stats_path, stats })
}

fn panic_message(p: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = p.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = p.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// Run one classifier pass per job over a dedicated pool of `workers` threads.
///
/// Returns the outputs sorted by chunk index, or the first failure. Cancelled
/// passes are only reported when no pass failed for a real reason.
pub fn run_chunks(jobs: &[ChunkJob], workers: usize, classifier: &Classifier<'_>) -> Result<Vec<ChunkOutput>> {
    run_passes(jobs, workers, |job, abort| process_chunk(job, classifier, abort))
}

/// [`run_chunks`] with an arbitrary pass; a panicking pass becomes
/// [`Error::WorkerPanic`] and raises the abort flag like any other failure.
pub(crate) fn run_passes<F>(jobs: &[ChunkJob], workers: usize, pass: F) -> Result<Vec<ChunkOutput>>
where
    F: Fn(&ChunkJob, &AtomicBool) -> Result<ChunkOutput> + Sync,
{
    let pool = ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|i| format!("demux-worker-{i}"))
        .build()?;
    let abort = AtomicBool::new(false);

    let results: Vec<Result<ChunkOutput>> = pool.install(|| {
        jobs.par_iter()
            .map(|job| {
                let r = panic::catch_unwind(AssertUnwindSafe(|| pass(job, &abort)))
                    .unwrap_or_else(|p| Err(Error::WorkerPanic { chunk: job.index, reason: panic_message(p.as_ref()) }));
                if r.is_err() {
                    abort.store(true, Ordering::Relaxed);
                }
                r
            })
            .collect()
    });

    let mut outputs = Vec::with_capacity(results.len());
    let mut cancelled = None;
    for r in results {
        match r {
            Ok(o) => outputs.push(o),
            Err(e) if e.is_cancellation() => {
                cancelled.get_or_insert(e);
            }
            Err(e) => return Err(e),
        }
    }
    if let Some(e) = cancelled {
        return Err(e);
    }
    outputs.sort_by_key(|o| o.index);
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barcodes::{Barcode, BarcodeTable};
    use crate::config::DemuxConfig;
    use crate::detect::PrimerMatcher;
    use crate::kit::PrimerSpec;
    use std::io;
    use std::time::{Duration, Instant};

    struct Tables {
        config: DemuxConfig,
        matcher: PrimerMatcher,
        barcodes: BarcodeTable,
        fwd: PrimerSpec,
        rev_rc: PrimerSpec,
    }

    impl Tables {
        fn new() -> Self {
            Tables {
                config: DemuxConfig { min_len: 2, trim_len: 8, workers: 2, ..DemuxConfig::default() },
                matcher: PrimerMatcher::new(),
                barcodes: BarcodeTable::new(vec![Barcode::new("BC.1", "AAAA")]).unwrap(),
                fwd: PrimerSpec::new("GTGAATCATCGAATCTTTG", 2),
                rev_rc: PrimerSpec::new("TCCTCCGCTTATTGATATGC", 2).reverse_complement(),
            }
        }

        fn classifier(&self) -> Classifier<'_> {
            Classifier {
                config: &self.config,
                matcher: &self.matcher,
                barcodes: &self.barcodes,
                reverse_barcodes: None,
                forward_primer: &self.fwd,
                reverse_primer: &self.rev_rc,
            }
        }
    }

    fn job(dir: &Path, index: usize) -> ChunkJob {
        ChunkJob { index, path: dir.join(format!("chunk_{index:04}.fq")), reads: 1 }
    }

    #[test]
    fn plan_uses_twice_the_workers() {
        let p = plan_chunks(100, 4);
        assert_eq!(p.len(), 8);
        assert_eq!(p.first().unwrap().start, 0);
        assert_eq!(p.last().unwrap().end, 100);
        let sizes: Vec<u64> = p.iter().map(|r| r.end - r.start).collect();
        assert_eq!(sizes, [13, 13, 13, 13, 12, 12, 12, 12]);
        assert!(p.windows(2).all(|w| w[0].end == w[1].start));
    }

    #[test]
    fn single_worker_gets_one_chunk() {
        assert_eq!(plan_chunks(7, 1), vec![0..7]);
    }

    #[test]
    fn never_more_chunks_than_reads() {
        let p = plan_chunks(3, 8);
        assert_eq!(p, vec![0..1, 1..2, 2..3]);
        assert!(plan_chunks(0, 8).is_empty());
    }

    #[test]
    fn split_writes_each_range_to_its_own_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.fq");
        let mut body = String::new();
        for i in 0..5 {
            body.push_str(&format!("@r{i}\nACGT\n+\nIIII\n"));
        }
        std::fs::write(&input, body).unwrap();
        let plan = plan_chunks(5, 2);
        let jobs = split_input(&input, &plan, dir.path()).unwrap();
        assert_eq!(jobs.len(), 4);
        assert_eq!(jobs.iter().map(|j| j.reads).sum::<u64>(), 5);
        let first = std::fs::read_to_string(&jobs[0].path).unwrap();
        assert_eq!(first, "@r0\nACGT\n+\nIIII\n@r1\nACGT\n+\nIIII\n");
        let last = std::fs::read_to_string(&jobs[3].path).unwrap();
        assert_eq!(last, "@r4\nACGT\n+\nIIII\n");
    }

    #[test]
    fn split_detects_a_wrong_count() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.fq");
        std::fs::write(&input, "@a\nAC\n+\nII\n@b\nAC\n+\nII\n").unwrap();
        let err = split_input(&input, &plan_chunks(3, 1), dir.path()).unwrap_err();
        assert!(matches!(err, Error::InputChanged { expected: 3, found: 2, .. }));
    }

    #[test]
    fn missing_chunk_file_is_reported_instead_of_cancellation() {
        let dir = tempfile::tempdir().unwrap();
        let good = job(dir.path(), 0);
        std::fs::write(&good.path, "@r\nAAAAGTGAATCATCGAATCTTTGACGTACGT\n+\nIIIIIIIIIIIIIIIIIIIIIIIIIIIIIII\n").unwrap();
        let missing = job(dir.path(), 1);
        let tables = Tables::new();
        let err = run_chunks(&[good, missing.clone()], 2, &tables.classifier()).unwrap_err();
        match err {
            Error::FileIo { path, .. } => assert_eq!(path, missing.path),
            other => panic!("expected FileIo, got {other:?}"),
        }
    }

    #[test]
    fn chunk_pass_stops_once_abort_is_raised() {
        let dir = tempfile::tempdir().unwrap();
        let j = job(dir.path(), 3);
        std::fs::write(&j.path, "@r\nAAAAACGT\n+\nIIIIIIII\n").unwrap();
        let tables = Tables::new();
        let abort = AtomicBool::new(true);
        let err = process_chunk(&j, &tables.classifier(), &abort).unwrap_err();
        assert!(matches!(err, Error::Cancelled(3)));
    }

    #[test]
    fn panicking_pass_becomes_worker_panic() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = [job(dir.path(), 0)];
        let err = run_passes(&jobs, 1, |j, _| panic!("chunk {} exploded", j.index)).unwrap_err();
        match err {
            Error::WorkerPanic { chunk, reason } => {
                assert_eq!(chunk, 0);
                assert!(reason.contains("exploded"));
            }
            other => panic!("expected WorkerPanic, got {other:?}"),
        }
    }

    #[test]
    fn real_failure_wins_over_cancelled_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = [job(dir.path(), 0), job(dir.path(), 1)];
        let err = run_passes(&jobs, 2, |j, abort| {
            if j.index == 0 {
                return Err(Error::file(&j.path, io::Error::new(io::ErrorKind::Other, "disk gone")));
            }
            let deadline = Instant::now() + Duration::from_secs(5);
            while Instant::now() < deadline {
                if abort.load(Ordering::Relaxed) {
                    return Err(Error::Cancelled(j.index));
                }
                std::thread::sleep(Duration::from_millis(1));
            }
            Err(Error::Cancelled(j.index))
        })
        .unwrap_err();
        assert!(matches!(err, Error::FileIo { .. }));
    }

    #[test]
    fn only_cancellations_surface_as_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = [job(dir.path(), 0), job(dir.path(), 1)];
        let err = run_passes(&jobs, 2, |j, _| Err(Error::Cancelled(j.index))).unwrap_err();
        assert!(err.is_cancellation());
    }

    #[test]
    fn successful_passes_come_back_in_index_order() {
        let dir = tempfile::tempdir().unwrap();
        let jobs: Vec<ChunkJob> = (0..6).map(|i| job(dir.path(), i)).collect();
        let outputs = run_passes(&jobs, 3, |j, _| {
            Ok(ChunkOutput {
                index: j.index,
                demux: j.path.with_extension("demux.fq"),
                stats_path: j.path.with_extension("stats"),
                stats: DemuxStats::default(),
            })
        })
        .unwrap();
        let order: Vec<usize> = outputs.iter().map(|o| o.index).collect();
        assert_eq!(order, [0, 1, 2, 3, 4, 5]);
    }
}
