//! Core types for **primers** and their **provenance**.
//!
//! Primer sequences live in the binary as `&'static str` constants (see
//! [`crate::data`]) and are turned into an owned [`PrimerSpec`] once the run
//! configuration is known.
//!
//! Sequences are uppercase IUPAC strings. Degenerate codes (e.g. `R` = A/G) are
//! matched through [`crate::detect::DEGENERATE_EQUALITIES`], never literally.
use core::fmt;

/// Canonical primer name as used on the command line (e.g. `"fITS7"`, `"ITS4"`).
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct PrimerId(pub &'static str);

impl fmt::Display for PrimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Marker gene region a primer targets.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Locus {
    /// Fungal internal transcribed spacer (ITS1/ITS2).
    Its,
    /// Large ribosomal subunit (28S).
    Lsu,
    /// Bacterial 16S rRNA.
    Ssu16S,
    /// Cytochrome c oxidase subunit I.
    Coi,
}

impl fmt::Display for Locus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Locus::Its => "ITS",
            Locus::Lsu => "LSU",
            Locus::Ssu16S => "16S",
            Locus::Coi => "COI",
        };
        f.write_str(s)
    }
}

/// Strand the primer anneals to, as written 5'→3'.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Strand { Forward, Reverse }

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self { Strand::Forward => "forward", Strand::Reverse => "reverse" })
    }
}

/// Where a primer string came from.
#[derive(Clone, Debug)]
pub struct Provenance {
    /// Publication or primer database the sequence was taken from.
    pub source: &'static str,
    /// Any helpful notes (degenerate positions, common pairings).
    pub notes: &'static str,
}

/// A named primer record from the static registry.
#[derive(Clone, Debug)]
pub struct PrimerRecord {
    /// Stable name accepted by `--fwd_primer` / `--rev_primer`.
    pub id: PrimerId,
    /// Targeted region.
    pub locus: Locus,
    /// Orientation of the published sequence.
    pub strand: Strand,
    /// Uppercase IUPAC string, 5'→3'.
    pub sequence: &'static str,
    /// Source information for auditability.
    pub provenance: Provenance,
}

/// A built-in sample barcode.
#[derive(Clone, Copy, Debug)]
pub struct BarcodeRecord {
    /// Label written into `barcodelabel=`, e.g. `"BC.7"`.
    pub label: &'static str,
    /// Uppercase sequence as it appears at the 5' end of the read.
    pub sequence: &'static str,
}

/// A primer ready for matching: sequence plus its edit-distance budget.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PrimerSpec {
    /// Uppercase IUPAC bytes.
    pub sequence: Vec<u8>,
    /// Maximum edit distance (insertions, deletions, substitutions) accepted.
    pub max_edits: u32,
}

impl PrimerSpec {
    pub fn new(sequence: impl AsRef<[u8]>, max_edits: u32) -> Self {
        PrimerSpec { sequence: sequence.as_ref().to_ascii_uppercase(), max_edits }
    }

    /// The same primer reverse complemented (IUPAC aware).
    pub fn reverse_complement(&self) -> Self {
        PrimerSpec { sequence: bio::alphabets::dna::revcomp(&self.sequence), max_edits: self.max_edits }
    }

    pub fn len(&self) -> usize { self.sequence.len() }

    pub fn is_empty(&self) -> bool { self.sequence.is_empty() }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.sequence).unwrap_or("")
    }
}

/// Return `true` if every byte is an uppercase or lowercase IUPAC DNA code.
///
/// `U` is rejected: reads are DNA and no matcher pairs `U` with `T`.
pub fn is_iupac(seq: &[u8]) -> bool {
    !seq.is_empty()
        && seq.iter().all(|b| matches!(b.to_ascii_uppercase(),
            b'A' | b'C' | b'G' | b'T' | b'R' | b'Y' | b'S' | b'W' | b'K' | b'M'
            | b'B' | b'D' | b'H' | b'V' | b'N'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_complement_keeps_budget_and_complements_degenerate_codes() {
        let p = PrimerSpec::new("gtgar", 2);
        assert_eq!(p.sequence, b"GTGAR");
        let rc = p.reverse_complement();
        assert_eq!(rc.sequence, b"YTCAC");
        assert_eq!(rc.max_edits, 2);
    }

    #[test]
    fn iupac_validation() {
        assert!(is_iupac(b"GTGARTCATCGAATCTTTG"));
        assert!(is_iupac(b"acgtn"));
        assert!(!is_iupac(b"ITS4"));
        assert!(!is_iupac(b""));
    }

    #[test]
    fn rna_uracil_is_not_accepted() {
        assert!(!is_iupac(b"GUGARUCAUCG"));
        assert!(!is_iupac(b"acgu"));
    }
}
