//! Barcode and primer detection.
//!
//! Two primitives:
//! - [`match_barcode`]: substitution-only comparison of each barcode against the
//!   leading bases of a read.
//! - [`locate_primer`]: bounded edit-distance infix search with the Myers
//!   bit-parallel algorithm; the primer may sit anywhere inside the read.
//!
//! Both treat IUPAC degenerate codes as sets of bases through
//! [`DEGENERATE_EQUALITIES`].
//!
//! # Examples
//! ```
//! use ampdemux::detect::{bases_equivalent, count_prefix_mismatches};
//! assert!(bases_equivalent(b'R', b'G'));
//! assert_eq!(count_prefix_mismatches(b"ACGTTT", b"ACCT", 2), Some(1));
//! ```
use bio::pattern_matching::myers::{Myers, MyersBuilder};

use crate::barcodes::{Barcode, BarcodeTable};
use crate::kit::PrimerSpec;

/// Degenerate code → base pairs treated as equal by both matchers.
pub const DEGENERATE_EQUALITIES: &[(u8, u8)] = &[
    (b'R', b'A'), (b'R', b'G'),
    (b'Y', b'C'), (b'Y', b'T'),
    (b'S', b'G'), (b'S', b'C'),
    (b'W', b'A'), (b'W', b'T'),
    (b'K', b'G'), (b'K', b'T'),
    (b'M', b'A'), (b'M', b'C'),
    (b'B', b'C'), (b'B', b'G'), (b'B', b'T'),
    (b'D', b'A'), (b'D', b'G'), (b'D', b'T'),
    (b'H', b'A'), (b'H', b'C'), (b'H', b'T'),
    (b'V', b'A'), (b'V', b'C'), (b'V', b'G'),
    (b'N', b'A'), (b'N', b'C'), (b'N', b'G'), (b'N', b'T'),
];

/// `true` if two (uppercase) bases are identical or related by a degenerate code.
#[inline]
pub fn bases_equivalent(a: u8, b: u8) -> bool {
    a == b || DEGENERATE_EQUALITIES.iter().any(|&(d, x)| (a == d && b == x) || (a == x && b == d))
}

/// Count substitutions between `barcode` and the first `barcode.len()` bases of `read`.
///
/// Returns `None` when the read is shorter than the barcode or the count exceeds
/// `max_mismatch`.
pub fn count_prefix_mismatches(read: &[u8], barcode: &[u8], max_mismatch: usize) -> Option<usize> {
    if barcode.is_empty() || read.len() < barcode.len() { return None; }
    let mut mm = 0usize;
    for (&r, &b) in read.iter().zip(barcode) {
        if !bases_equivalent(r, b) {
            mm += 1;
            if mm > max_mismatch { return None; }
        }
    }
    Some(mm)
}

/// The barcode that matched and how many substitutions it needed.
#[derive(Clone, Copy, Debug)]
pub struct BarcodeHit<'a> {
    pub barcode: &'a Barcode,
    pub mismatches: usize,
}

/// Best barcode at the start of `read` within `max_mismatch` substitutions.
///
/// Lowest mismatch count wins; equal counts resolve to the earliest table entry.
/// An exact hit ends the scan.
pub fn match_barcode<'a>(read: &[u8], table: &'a BarcodeTable, max_mismatch: usize) -> Option<BarcodeHit<'a>> {
    let mut best: Option<BarcodeHit<'a>> = None;
    for bc in table.iter() {
        if let Some(mm) = count_prefix_mismatches(read, &bc.sequence, max_mismatch) {
            if best.map_or(true, |b| mm < b.mismatches) {
                best = Some(BarcodeHit { barcode: bc, mismatches: mm });
                if mm == 0 { break; }
            }
        }
    }
    best
}

/// Same contract as [`match_barcode`], applied to the bases downstream of the
/// reverse primer. `table` must already be reverse complemented.
pub fn match_reverse_barcode<'a>(downstream: &[u8], table: &'a BarcodeTable, max_mismatch: usize) -> Option<BarcodeHit<'a>> {
    match_barcode(downstream, table, max_mismatch)
}

/// Location of a primer inside a read; `start..end` is half-open.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PrimerHit { pub start: usize, pub end: usize, pub edits: u32 }

/// Longest primer the bit-parallel matcher accepts.
pub const MAX_PRIMER_LEN: usize = 64;

/// Every symbol the matchers know, degenerate or not.
const SYMBOLS: &[u8] = b"ACGTRYSWKMBDHVN";

/// Myers bit-parallel primer locator holding the degenerate-code equivalences.
///
/// Immutable, so one instance is shared by every worker thread; each search
/// builds its own automaton from the shared builder.
#[derive(Clone, Debug)]
pub struct PrimerMatcher {
    builder: MyersBuilder,
}

impl Default for PrimerMatcher {
    fn default() -> Self { Self::new() }
}

impl PrimerMatcher {
    pub fn new() -> Self {
        let mut builder = MyersBuilder::new();
        for &sym in SYMBOLS {
            let equivalents: Vec<u8> = DEGENERATE_EQUALITIES
                .iter()
                .filter_map(|&(d, x)| match sym {
                    s if s == d => Some(x),
                    s if s == x => Some(d),
                    _ => None,
                })
                .collect();
            builder.ambig(sym, equivalents);
        }
        PrimerMatcher { builder }
    }

    /// Leftmost span in `text` with the minimum edit distance to `primer`, if that
    /// distance is within `primer.max_edits`.
    ///
    /// The whole primer must align (semi-global); the budget is capped one below
    /// the primer length so a hit always contains at least one matching base.
    pub fn locate(&self, primer: &PrimerSpec, text: &[u8]) -> Option<PrimerHit> {
        let m = primer.len();
        if m == 0 || m > MAX_PRIMER_LEN || text.is_empty() { return None; }
        let k = primer.max_edits.min(m as u32 - 1).min(u32::from(u8::MAX)) as u8;

        let mut myers: Myers<u64> = self.builder.build_64(primer.sequence.iter());
        let mut matches = myers.find_all_lazy(text.iter(), k);
        let mut best: Option<(usize, u8)> = None;
        for (end, dist) in matches.by_ref() {
            if best.map_or(true, |(_, d)| dist < d) {
                best = Some((end, dist));
                if dist == 0 { break; }
            }
        }
        let (end, _) = best?;
        let (start, dist) = matches.hit_at(end)?;
        Some(PrimerHit { start, end: end + 1, edits: u32::from(dist) })
    }
}

/// Convenience wrapper building a throwaway [`PrimerMatcher`].
pub fn locate_primer(primer: &PrimerSpec, text: &[u8]) -> Option<PrimerHit> {
    PrimerMatcher::new().locate(primer, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, &str)]) -> BarcodeTable {
        BarcodeTable::new(entries.iter().map(|(l, s)| Barcode::new(*l, *s)).collect()).unwrap()
    }

    #[test]
    fn degenerate_codes_are_symmetric_sets() {
        assert!(bases_equivalent(b'A', b'R'));
        assert!(bases_equivalent(b'N', b'T'));
        assert!(!bases_equivalent(b'R', b'C'));
        assert!(!bases_equivalent(b'A', b'C'));
    }

    #[test]
    fn exact_barcode_wins_over_earlier_inexact() {
        let t = table(&[("near", "AAAT"), ("exact", "AAAA")]);
        let hit = match_barcode(b"AAAACCGG", &t, 1).unwrap();
        assert_eq!(hit.barcode.label, "exact");
        assert_eq!(hit.mismatches, 0);
    }

    #[test]
    fn ties_resolve_to_table_order() {
        let t = table(&[("first", "AATA"), ("second", "AAAT")]);
        let hit = match_barcode(b"AAAACCGG", &t, 1).unwrap();
        assert_eq!(hit.barcode.label, "first");
        assert_eq!(hit.mismatches, 1);
    }

    #[test]
    fn budget_zero_rejects_any_substitution() {
        let t = table(&[("bc", "AAAA")]);
        assert!(match_barcode(b"TTTTACGT", &t, 0).is_none());
        assert!(match_barcode(b"AAAT", &t, 0).is_none());
    }

    #[test]
    fn short_reads_never_match() {
        let t = table(&[("bc", "AAAA")]);
        assert!(match_barcode(b"AAA", &t, 3).is_none());
    }

    #[test]
    fn primer_found_with_degenerate_base() {
        let primer = PrimerSpec::new("GTGARTCATCGAATCTTTG", 0);
        let text = b"CCCCGTGAATCATCGAATCTTTGACGT";
        let hit = locate_primer(&primer, text).unwrap();
        assert_eq!(hit, PrimerHit { start: 4, end: 23, edits: 0 });
    }

    #[test]
    fn primer_within_budget_reports_edits() {
        let primer = PrimerSpec::new("TCCTCCGCTTATTGATATGC", 2);
        let text = b"ACGTACGTTCCTCCGCTTATTGTTATGCACGT";
        let hit = locate_primer(&primer, text).unwrap();
        assert_eq!(hit.edits, 1);
        assert_eq!(hit.start, 8);
        assert_eq!(hit.end, 28);
    }

    #[test]
    fn ambiguous_read_base_matches_concrete_primer_base() {
        let primer = PrimerSpec::new("TCCTCCGCTTATTGATATGC", 0);
        let hit = locate_primer(&primer, b"GGTCCTCNGCTTATTGATATGCGG").unwrap();
        assert_eq!((hit.start, hit.end, hit.edits), (2, 22, 0));
    }

    #[test]
    fn leftmost_of_equal_hits_wins() {
        let primer = PrimerSpec::new("ACGTACGTAC", 1);
        let text = b"TTACGTACGTACTTTTACGTACGTACTT";
        let hit = locate_primer(&primer, text).unwrap();
        assert_eq!((hit.start, hit.end, hit.edits), (2, 12, 0));
    }

    #[test]
    fn oversized_primer_is_never_found() {
        let long = "ACGT".repeat(17);
        let primer = PrimerSpec::new(&long, 2);
        assert!(locate_primer(&primer, long.as_bytes()).is_none());
    }

    #[test]
    fn primer_outside_budget_is_none() {
        let primer = PrimerSpec::new("TCCTCCGCTTATTGATATGC", 1);
        assert!(locate_primer(&primer, b"ACGTACGTACGTACGTACGTACGT").is_none());
    }
}
