//! IO for **FASTQ / FASTQ.GZ** reads and **FASTA** barcode tables.
//!
//! ### Design
//! - External inputs are parsed with `needletail` (compression sniffed from the
//!   stream, so `.gz` works without a flag).
//! - Streams this crate writes itself (chunk outputs, merged and reindexed files)
//!   are strict four-line FASTQ and are read back with [`FastqRecords`], which
//!   keeps headers verbatim.
//! - Sequences are upper-cased on ingest; quality strings are kept as-is.
//!
//! ### Errors
//! Parse and IO errors carry the offending path in [`crate::Error`].
use std::fs::File;
use std::io::{BufRead, Write};
use std::path::Path;

use needletail::errors::ParseErrorKind;
use needletail::parse_fastx_reader;

use crate::error::{Error, Result};

/// A normalized read handed to callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRead {
    pub id: String,
    pub seq: Vec<u8>,
    pub qual: Vec<u8>,
}

fn open(path: &Path) -> Result<Box<dyn needletail::FastxReader>> {
    let file = File::open(path).map_err(|e| Error::file(path, e))?;
    parse_fastx_reader(file).map_err(|e| {
        if matches!(e.kind, ParseErrorKind::EmptyFile) {
            Error::EmptyInput { path: path.to_path_buf() }
        } else {
            Error::Parse { path: path.to_path_buf(), source: e }
        }
    })
}

/// Iterate FASTQ records in file order, invoking `on_record` for each.
///
/// Returns the number of records seen. A callback error stops the iteration.
pub fn for_each_read<P, F>(path: P, mut on_record: F) -> Result<u64>
where
    P: AsRef<Path>,
    F: FnMut(RawRead) -> Result<()>,
{
    let p = path.as_ref();
    let mut reader = open(p)?;
    let mut n = 0u64;
    while let Some(record) = reader.next() {
        let rec = record.map_err(|e| Error::Parse { path: p.to_path_buf(), source: e })?;
        let id = String::from_utf8_lossy(rec.id()).into_owned();
        let qual = match rec.qual() {
            Some(q) => q.to_vec(),
            None => return Err(Error::MissingQuality { path: p.to_path_buf(), id }),
        };
        let seq = rec.seq().to_ascii_uppercase();
        on_record(RawRead { id, seq, qual })?;
        n += 1;
    }
    Ok(n)
}

/// Count the FASTQ records in `path`.
pub fn count_reads<P: AsRef<Path>>(path: P) -> Result<u64> {
    let p = path.as_ref();
    let mut reader = open(p)?;
    let mut n = 0u64;
    while let Some(record) = reader.next() {
        record.map_err(|e| Error::Parse { path: p.to_path_buf(), source: e })?;
        n += 1;
    }
    Ok(n)
}

/// Read every FASTA record as `(name, sequence)`; the name is the first word of the header.
pub fn read_fasta<P: AsRef<Path>>(path: P) -> Result<Vec<(String, Vec<u8>)>> {
    let p = path.as_ref();
    let mut reader = match open(p) {
        Ok(r) => r,
        Err(Error::EmptyInput { .. }) => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    let mut out = Vec::new();
    while let Some(record) = reader.next() {
        let rec = record.map_err(|e| Error::Parse { path: p.to_path_buf(), source: e })?;
        let header = String::from_utf8_lossy(rec.id()).into_owned();
        let name = header.split_whitespace().next().unwrap_or("").to_string();
        out.push((name, rec.seq().to_ascii_uppercase()));
    }
    Ok(out)
}

pub fn write_fastq_record<W: Write>(w: &mut W, id: &str, seq: &[u8], qual: &[u8]) -> std::io::Result<()> {
    w.write_all(b"@")?;
    w.write_all(id.as_bytes())?;
    w.write_all(b"\n")?;
    w.write_all(seq)?;
    w.write_all(b"\n+\n")?;
    w.write_all(qual)?;
    w.write_all(b"\n")?;
    Ok(())
}

/// A four-line FASTQ record with its header kept verbatim (without `@`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastqRecord {
    pub header: String,
    pub seq: Vec<u8>,
    pub qual: Vec<u8>,
}

/// Strict four-line FASTQ reader over any `BufRead`.
pub struct FastqRecords<R> {
    reader: R,
    line: String,
    n: u64,
}

impl<R: BufRead> FastqRecords<R> {
    pub fn new(reader: R) -> Self {
        FastqRecords { reader, line: String::new(), n: 0 }
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        self.line.clear();
        if self.reader.read_line(&mut self.line)? == 0 {
            return Ok(None);
        }
        Ok(Some(self.line.trim_end_matches(['\n', '\r']).to_string()))
    }

    fn malformed(&self, reason: &str) -> Error {
        Error::MalformedRecord { record: self.n, reason: reason.to_string() }
    }

    fn read_record(&mut self) -> Result<Option<FastqRecord>> {
        let header = match self.next_line()? {
            Some(h) if h.is_empty() => return Ok(None),
            Some(h) => h,
            None => return Ok(None),
        };
        self.n += 1;
        let header = header
            .strip_prefix('@')
            .ok_or_else(|| self.malformed("header does not start with '@'"))?
            .to_string();
        let seq = self.next_line()?.ok_or_else(|| self.malformed("missing sequence line"))?;
        let sep = self.next_line()?.ok_or_else(|| self.malformed("missing separator line"))?;
        if !sep.starts_with('+') {
            return Err(self.malformed("separator does not start with '+'"));
        }
        let qual = self.next_line()?.ok_or_else(|| self.malformed("missing quality line"))?;
        if seq.len() != qual.len() {
            return Err(self.malformed("sequence and quality lengths differ"));
        }
        Ok(Some(FastqRecord { header, seq: seq.into_bytes(), qual: qual.into_bytes() }))
    }
}

impl<R: BufRead> Iterator for FastqRecords<R> {
    type Item = Result<FastqRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}

/// Per-base quality symbols `!`..`S`, indexed by Phred score.
pub const QUALITY_SYMBOLS: &[u8; 51] = b"!\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRS";

/// Map a quality symbol to its Phred score, or `None` outside `!`..`S`.
pub fn phred_score(symbol: u8) -> Option<u8> {
    QUALITY_SYMBOLS.iter().position(|&s| s == symbol).map(|p| p as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn phred_table_matches_offset_33() {
        assert_eq!(phred_score(b'!'), Some(0));
        assert_eq!(phred_score(b'+'), Some(10));
        assert_eq!(phred_score(b'J'), Some(41));
        assert_eq!(phred_score(b'S'), Some(50));
        assert_eq!(phred_score(b'T'), None);
    }

    #[test]
    fn strict_reader_keeps_headers_verbatim() {
        let text = "@R_1;barcodelabel=BC.1;\nACGT\n+\nIIII\n@R_2;barcodelabel=BC.2;\nGG\n+\n##\n";
        let recs: Vec<_> = FastqRecords::new(Cursor::new(text)).collect::<Result<_>>().unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].header, "R_1;barcodelabel=BC.1;");
        assert_eq!(recs[1].seq, b"GG");
        assert_eq!(recs[1].qual, b"##");
    }

    #[test]
    fn strict_reader_rejects_length_mismatch() {
        let text = "@r\nACGT\n+\nII\n";
        let err = FastqRecords::new(Cursor::new(text)).next().unwrap().unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { record: 1, .. }));
    }

    #[test]
    fn strict_reader_rejects_truncated_record() {
        let text = "@r\nACGT\n";
        assert!(FastqRecords::new(Cursor::new(text)).next().unwrap().is_err());
    }

    #[test]
    fn needletail_reader_uppercases_and_counts() {
        let mut f = tempfile::Builder::new().suffix(".fq").tempfile().unwrap();
        f.write_all(b"@a desc\nacgt\n+\nIIII\n@b\nTTGA\n+\n####\n").unwrap();
        f.flush().unwrap();
        assert_eq!(count_reads(f.path()).unwrap(), 2);
        let mut reads = Vec::new();
        let n = for_each_read(f.path(), |r| { reads.push(r); Ok(()) }).unwrap();
        assert_eq!(n, 2);
        assert_eq!(reads[0].seq, b"ACGT");
        assert_eq!(reads[0].id, "a desc");
        assert_eq!(reads[1].qual, b"####");
    }

    #[test]
    fn empty_input_is_reported() {
        let f = tempfile::Builder::new().suffix(".fq").tempfile().unwrap();
        assert!(matches!(count_reads(f.path()), Err(Error::EmptyInput { .. })));
    }

    #[test]
    fn fastq_writer_layout() {
        let mut out = Vec::new();
        write_fastq_record(&mut out, "R_1;barcodelabel=X;", b"ACG", b"IIJ").unwrap();
        assert_eq!(out, b"@R_1;barcodelabel=X;\nACG\n+\nIIJ\n");
    }
}
