//! Per-chunk and global read counters.
//!
//! A stats file holds one CSV line of seven integers in the fixed order
//! `Total,NoBarcode,NoPrimer,RevPrimerFound,NoRevBarcode,TooShort,Valid`.
use std::iter::Sum;
use std::ops::AddAssign;
use std::path::Path;

use crate::clean::{Classified, Outcome};
use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DemuxStats {
    pub total: u64,
    pub no_barcode: u64,
    pub no_primer: u64,
    pub rev_primer_found: u64,
    pub no_rev_barcode: u64,
    pub too_short: u64,
    pub valid: u64,
}

impl DemuxStats {
    /// Account for one classified read.
    pub fn record(&mut self, c: &Classified) {
        self.total += 1;
        if c.reverse_primer_found {
            self.rev_primer_found += 1;
        }
        match c.outcome {
            Outcome::NoBarcode => self.no_barcode += 1,
            Outcome::NoForwardPrimer => self.no_primer += 1,
            Outcome::NoReverseBarcode => self.no_rev_barcode += 1,
            Outcome::TooShort => self.too_short += 1,
            Outcome::NoReversePrimer => {}
            Outcome::Valid => self.valid += 1,
        }
    }

    pub fn to_array(&self) -> [u64; 7] {
        [self.total, self.no_barcode, self.no_primer, self.rev_primer_found,
         self.no_rev_barcode, self.too_short, self.valid]
    }

    pub fn from_array(v: [u64; 7]) -> Self {
        DemuxStats {
            total: v[0],
            no_barcode: v[1],
            no_primer: v[2],
            rev_primer_found: v[3],
            no_rev_barcode: v[4],
            too_short: v[5],
            valid: v[6],
        }
    }

    /// Reads whose barcode was identified.
    pub fn valid_barcode(&self) -> u64 { self.total.saturating_sub(self.no_barcode) }

    /// Reads with a barcode and a forward primer.
    pub fn forward_primer_found(&self) -> u64 { self.valid_barcode().saturating_sub(self.no_primer) }

    /// Reads with forward and reverse barcodes (reverse barcode mode).
    pub fn valid_barcode_pairs(&self) -> u64 { self.forward_primer_found().saturating_sub(self.no_rev_barcode) }

    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut w = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
        w.write_record(self.to_array().iter().map(|n| n.to_string()))?;
        w.flush().map_err(|e| Error::file(path, e))?;
        Ok(())
    }

    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bad = |reason: String| Error::Stats { path: path.to_path_buf(), reason };
        let mut r = csv::ReaderBuilder::new().has_headers(false).from_path(path)?;
        let rec = r
            .records()
            .next()
            .ok_or_else(|| bad("empty stats file".into()))??;
        if rec.len() != 7 {
            return Err(bad(format!("expected 7 fields, found {}", rec.len())));
        }
        let mut v = [0u64; 7];
        for (slot, field) in v.iter_mut().zip(rec.iter()) {
            *slot = field.trim().parse().map_err(|_| bad(format!("not an integer: {field:?}")))?;
        }
        Ok(Self::from_array(v))
    }
}

impl AddAssign for DemuxStats {
    fn add_assign(&mut self, o: Self) {
        self.total += o.total;
        self.no_barcode += o.no_barcode;
        self.no_primer += o.no_primer;
        self.rev_primer_found += o.rev_primer_found;
        self.no_rev_barcode += o.no_rev_barcode;
        self.too_short += o.too_short;
        self.valid += o.valid;
    }
}

impl Sum for DemuxStats {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(DemuxStats::default(), |mut acc, s| { acc += s; acc })
    }
}
