//! Sample barcode tables.
//!
//! Tables are loaded once from FASTA (`>label` / sequence), validated, and then
//! shared read-only by every worker. Entry order is the FASTA order and is the
//! tie-break order used by [`crate::detect::match_barcode`].
use std::collections::HashSet;
use std::path::Path;

use crate::data::ion_barcodes::ION_XPRESS;
use crate::error::{Error, Result};
use crate::kit::is_iupac;
use crate::seqio;

/// One sample barcode.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Barcode {
    /// Sample label written into `barcodelabel=`.
    pub label: String,
    /// Uppercase IUPAC bytes.
    pub sequence: Vec<u8>,
}

impl Barcode {
    pub fn new(label: impl Into<String>, sequence: impl AsRef<[u8]>) -> Self {
        Barcode { label: label.into(), sequence: sequence.as_ref().to_ascii_uppercase() }
    }

    pub fn len(&self) -> usize { self.sequence.len() }

    pub fn is_empty(&self) -> bool { self.sequence.is_empty() }
}

#[derive(Clone, Debug, Default)]
pub struct BarcodeTable {
    entries: Vec<Barcode>,
}

impl BarcodeTable {
    /// Build a table, validating every sequence. Repeated labels keep the first entry.
    pub fn new(entries: Vec<Barcode>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(entries.len());
        for bc in entries {
            if !is_iupac(&bc.sequence) {
                return Err(Error::InvalidBarcode {
                    label: bc.label,
                    sequence: String::from_utf8_lossy(&bc.sequence).into_owned(),
                });
            }
            if !seen.insert(bc.label.clone()) {
                log::warn!("duplicate barcode label {}; keeping the first entry", bc.label);
                continue;
            }
            kept.push(bc);
        }
        Ok(BarcodeTable { entries: kept })
    }

    /// The built-in Ion Xpress table ([`crate::data::ion_barcodes::ION_XPRESS`]).
    pub fn builtin() -> Result<Self> {
        Self::new(ION_XPRESS.iter().map(|r| Barcode::new(r.label, r.sequence)).collect())
    }

    /// Load forward barcodes from a FASTA file.
    pub fn from_fasta<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let entries: Vec<Barcode> = seqio::read_fasta(path)?
            .into_iter()
            .map(|(label, seq)| Barcode::new(label, seq))
            .collect();
        if entries.is_empty() {
            return Err(Error::EmptyBarcodes { path: path.to_path_buf() });
        }
        Self::new(entries)
    }

    /// Load 3' barcodes from a FASTA file, reverse complemented so they read in
    /// the same orientation as the reads.
    pub fn reverse_from_fasta<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let entries: Vec<Barcode> = seqio::read_fasta(path)?
            .into_iter()
            .map(|(label, seq)| Barcode::new(label, seq))
            .collect();
        if entries.is_empty() {
            return Err(Error::EmptyBarcodes { path: path.to_path_buf() });
        }
        Self::reverse_complemented(entries)
    }

    /// Reverse complement every entry. Duplicate labels are fatal here.
    pub fn reverse_complemented(entries: Vec<Barcode>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(entries.len());
        for bc in entries {
            if !seen.insert(bc.label.clone()) {
                return Err(Error::DuplicateReverseBarcode(bc.label));
            }
            let sequence = bio::alphabets::dna::revcomp(&bc.sequence);
            out.push(Barcode { label: bc.label, sequence });
        }
        Self::new(out)
    }

    /// Keep only the named barcodes, in the order requested.
    ///
    /// A name matches a label exactly or, failing that, with a `BC.` prefix
    /// (`"5"` selects `"BC.5"`).
    pub fn select(&self, names: &[&str]) -> Result<Self> {
        let mut out = Vec::with_capacity(names.len());
        for name in names {
            let prefixed = format!("BC.{name}");
            let bc = self
                .entries
                .iter()
                .find(|b| b.label == *name)
                .or_else(|| self.entries.iter().find(|b| b.label == prefixed))
                .ok_or_else(|| Error::UnknownBarcode(name.to_string()))?;
            out.push(bc.clone());
        }
        Self::new(out)
    }

    /// Relabel every entry as `<prefix>.<label>`.
    pub fn with_sample_prefix(mut self, prefix: &str) -> Self {
        for bc in self.entries.iter_mut() {
            bc.label = format!("{prefix}.{}", bc.label);
        }
        self
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Barcode> { self.entries.iter() }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn get(&self, label: &str) -> Option<&Barcode> {
        self.entries.iter().find(|b| b.label == label)
    }
}
