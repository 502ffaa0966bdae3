//! Per-read barcode assignment, primer trimming and length normalization.
//!
//! [`Classifier::classify`] runs one read through the fixed sequence of checks:
//! barcode → forward primer → reverse primer (→ reverse barcode) → length policy.
//! Every stopping point is an [`Outcome`]; nothing here returns an error.

use crate::barcodes::BarcodeTable;
use crate::config::DemuxConfig;
use crate::detect::{match_barcode, match_reverse_barcode, PrimerMatcher};
use crate::kit::PrimerSpec;

/// Filler base appended when padding.
pub const PAD_BASE: u8 = b'N';
/// Filler quality symbol appended when padding (Phred 41).
pub const PAD_QUAL: u8 = b'J';

/// Where a read stopped.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Outcome {
    NoBarcode,
    NoForwardPrimer,
    NoReverseBarcode,
    TooShort,
    /// Full-length mode only: reverse primer missing. Dropped without touching
    /// any rejection counter, unlike the short-read rejections.
    NoReversePrimer,
    Valid,
}

/// An accepted, trimmed read.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DemuxedRead {
    pub label: String,
    pub seq: Vec<u8>,
    pub qual: Vec<u8>,
}

/// Result of classifying one read.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Classified {
    pub outcome: Outcome,
    /// Set whenever the reverse primer was located, even if the read was rejected later.
    pub reverse_primer_found: bool,
    /// `Some` exactly when `outcome == Outcome::Valid`.
    pub read: Option<DemuxedRead>,
}

impl Classified {
    fn reject(outcome: Outcome, reverse_primer_found: bool) -> Self {
        Classified { outcome, reverse_primer_found, read: None }
    }
}

/// Everything needed to classify reads; borrowed, so one instance per chunk is free.
pub struct Classifier<'a> {
    pub config: &'a DemuxConfig,
    pub matcher: &'a PrimerMatcher,
    pub barcodes: &'a BarcodeTable,
    pub reverse_barcodes: Option<&'a BarcodeTable>,
    pub forward_primer: &'a PrimerSpec,
    /// Reverse primer, already reverse complemented.
    pub reverse_primer: &'a PrimerSpec,
}

impl<'a> Classifier<'a> {
    pub fn classify(&self, seq: &[u8], qual: &[u8]) -> Classified {
        let cfg = self.config;

        let Some(bc) = match_barcode(seq, self.barcodes, cfg.barcode_mismatch) else {
            return Classified::reject(Outcome::NoBarcode, false);
        };
        let cut = bc.barcode.len();
        let (seq, qual) = (&seq[cut..], &qual[cut..]);
        let mut label = bc.barcode.label.clone();

        let Some(fwd) = self.matcher.locate(self.forward_primer, seq) else {
            return Classified::reject(Outcome::NoForwardPrimer, false);
        };
        let for_trim = fwd.end;

        let mut found = false;
        let (mut out_seq, mut out_qual) = match self.matcher.locate(self.reverse_primer, seq) {
            Some(rev) => {
                found = true;
                if let Some(table) = self.reverse_barcodes {
                    let downstream = &seq[rev.end.min(seq.len())..];
                    match match_reverse_barcode(downstream, table, cfg.barcode_mismatch) {
                        Some(rb) => label = format!("{label}_{}", rb.barcode.label),
                        None => return Classified::reject(Outcome::NoReverseBarcode, found),
                    }
                }
                let span = if rev.start > for_trim { for_trim..rev.start } else { for_trim..for_trim };
                let mut s = seq[span.clone()].to_vec();
                let mut q = qual[span].to_vec();
                if !cfg.full_length_only {
                    // primer dimers must not survive into the padding step
                    if s.len() < cfg.min_len {
                        return Classified::reject(Outcome::TooShort, found);
                    }
                    if s.len() < cfg.trim_len && cfg.pad {
                        s.resize(cfg.trim_len, PAD_BASE);
                        q.resize(cfg.trim_len, PAD_QUAL);
                    } else {
                        s.truncate(cfg.trim_len);
                        q.truncate(cfg.trim_len);
                    }
                }
                (s, q)
            }
            None => {
                if cfg.full_length_only {
                    return Classified::reject(Outcome::NoReversePrimer, false);
                }
                let s = &seq[for_trim.min(seq.len())..];
                if s.len() < cfg.trim_len {
                    return Classified::reject(Outcome::TooShort, false);
                }
                let q = &qual[for_trim.min(qual.len())..];
                (s[..cfg.trim_len].to_vec(), q[..cfg.trim_len].to_vec())
            }
        };

        if out_seq.len() < cfg.min_len {
            return Classified::reject(Outcome::TooShort, found);
        }
        out_seq.shrink_to_fit();
        out_qual.shrink_to_fit();
        Classified {
            outcome: Outcome::Valid,
            reverse_primer_found: found,
            read: Some(DemuxedRead { label, seq: out_seq, qual: out_qual }),
        }
    }
}

/// Header written for an accepted read before global reindexing.
pub fn demux_header(n: u64, label: &str) -> String {
    format!("R_{n};barcodelabel={label};")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barcodes::Barcode;

    const FWD: &str = "GTGARTCATCGAATCTTTG";
    const FWD_EXACT: &str = "GTGAATCATCGAATCTTTG";
    const REV: &str = "TCCTCCGCTTATTGATATGC";
    const INSERT: &str = "ACGTACGTAC";

    struct Fixture {
        config: DemuxConfig,
        matcher: PrimerMatcher,
        barcodes: BarcodeTable,
        reverse_barcodes: Option<BarcodeTable>,
        fwd: PrimerSpec,
        rev_rc: PrimerSpec,
    }

    impl Fixture {
        fn new(config: DemuxConfig) -> Self {
            Fixture {
                config,
                matcher: PrimerMatcher::new(),
                barcodes: BarcodeTable::new(vec![Barcode::new("BC.1", "AAAA"), Barcode::new("BC.2", "CCCC")]).unwrap(),
                reverse_barcodes: None,
                fwd: PrimerSpec::new(FWD, 2),
                rev_rc: PrimerSpec::new(REV, 2).reverse_complement(),
            }
        }

        fn classifier(&self) -> Classifier<'_> {
            Classifier {
                config: &self.config,
                matcher: &self.matcher,
                barcodes: &self.barcodes,
                reverse_barcodes: self.reverse_barcodes.as_ref(),
                forward_primer: &self.fwd,
                reverse_primer: &self.rev_rc,
            }
        }

        fn run(&self, seq: &str) -> Classified {
            let qual = vec![b'I'; seq.len()];
            self.classifier().classify(seq.as_bytes(), &qual)
        }
    }

    fn config(min_len: usize, trim_len: usize) -> DemuxConfig {
        DemuxConfig { min_len, trim_len, barcode_mismatch: 0, primer_mismatch: 2, ..DemuxConfig::default() }
    }

    fn rev_rc() -> String {
        String::from_utf8(PrimerSpec::new(REV, 0).reverse_complement().sequence).unwrap()
    }

    #[test]
    fn full_amplicon_is_trimmed_to_insert() {
        let fx = Fixture::new(config(5, 20));
        let read = format!("AAAA{FWD_EXACT}{INSERT}{}", rev_rc());
        let c = fx.run(&read);
        assert_eq!(c.outcome, Outcome::Valid);
        assert!(c.reverse_primer_found);
        let r = c.read.unwrap();
        assert_eq!(r.seq, INSERT.as_bytes());
        assert_eq!(r.qual.len(), r.seq.len());
        assert_eq!(r.label, "BC.1");
    }

    #[test]
    fn unknown_barcode_is_rejected_first() {
        let fx = Fixture::new(config(5, 20));
        let read = format!("TTTT{FWD_EXACT}{INSERT}{}", rev_rc());
        let c = fx.run(&read);
        assert_eq!(c.outcome, Outcome::NoBarcode);
        assert!(!c.reverse_primer_found);
        assert!(c.read.is_none());
    }

    #[test]
    fn missing_forward_primer() {
        let fx = Fixture::new(config(5, 20));
        let c = fx.run(&format!("AAAA{}{}", "T".repeat(30), rev_rc()));
        assert_eq!(c.outcome, Outcome::NoForwardPrimer);
        assert!(!c.reverse_primer_found);
    }

    #[test]
    fn padding_fills_to_trim_length() {
        let mut cfg = config(5, 20);
        cfg.pad = true;
        let fx = Fixture::new(cfg);
        let c = fx.run(&format!("AAAA{FWD_EXACT}{INSERT}{}", rev_rc()));
        let r = c.read.unwrap();
        assert_eq!(r.seq.len(), 20);
        assert_eq!(&r.seq[..10], INSERT.as_bytes());
        assert!(r.seq[10..].iter().all(|&b| b == PAD_BASE));
        assert!(r.qual[10..].iter().all(|&q| q == PAD_QUAL));
        assert_eq!(r.qual.len(), 20);
    }

    #[test]
    fn long_insert_is_truncated_to_trim_length() {
        let fx = Fixture::new(config(5, 8));
        let c = fx.run(&format!("AAAA{FWD_EXACT}{INSERT}{}", rev_rc()));
        assert_eq!(c.read.unwrap().seq, &INSERT.as_bytes()[..8]);
    }

    #[test]
    fn primer_dimer_is_too_short_before_padding() {
        let mut cfg = config(5, 20);
        cfg.pad = true;
        let fx = Fixture::new(cfg);
        let c = fx.run(&format!("AAAA{FWD_EXACT}ACG{}", rev_rc()));
        assert_eq!(c.outcome, Outcome::TooShort);
        assert!(c.reverse_primer_found);
    }

    #[test]
    fn without_reverse_primer_read_is_cut_to_trim_length() {
        let fx = Fixture::new(config(5, 12));
        let tail = "ACGTTGCAACGTTGCA";
        let c = fx.run(&format!("CCCC{FWD_EXACT}{tail}"));
        assert_eq!(c.outcome, Outcome::Valid);
        assert!(!c.reverse_primer_found);
        let r = c.read.unwrap();
        assert_eq!(r.label, "BC.2");
        assert_eq!(r.seq, &tail.as_bytes()[..12]);
    }

    #[test]
    fn without_reverse_primer_short_tail_is_too_short() {
        let fx = Fixture::new(config(5, 40));
        let c = fx.run(&format!("AAAA{FWD_EXACT}ACGTTGCAACGT"));
        assert_eq!(c.outcome, Outcome::TooShort);
        assert!(!c.reverse_primer_found);
    }

    #[test]
    fn full_length_mode_discards_reads_without_reverse_primer() {
        let mut cfg = config(5, 12);
        cfg.full_length_only = true;
        let fx = Fixture::new(cfg);
        let c = fx.run(&format!("AAAA{FWD_EXACT}ACGTTGCAACGTTGCAACGT"));
        assert_eq!(c.outcome, Outcome::NoReversePrimer);
        assert!(!c.reverse_primer_found);
        assert!(c.read.is_none());
    }

    #[test]
    fn full_length_mode_keeps_length_unbounded() {
        let mut cfg = config(5, 4);
        cfg.full_length_only = true;
        let fx = Fixture::new(cfg);
        let c = fx.run(&format!("AAAA{FWD_EXACT}{INSERT}{}", rev_rc()));
        assert_eq!(c.read.unwrap().seq, INSERT.as_bytes());
    }

    #[test]
    fn full_length_mode_still_applies_final_min_len_gate() {
        let mut cfg = config(11, 4);
        cfg.full_length_only = true;
        let fx = Fixture::new(cfg);
        let c = fx.run(&format!("AAAA{FWD_EXACT}{INSERT}{}", rev_rc()));
        assert_eq!(c.outcome, Outcome::TooShort);
        assert!(c.reverse_primer_found);
    }

    #[test]
    fn reverse_barcode_composes_label() {
        let mut fx = Fixture::new(config(5, 20));
        fx.reverse_barcodes = Some(BarcodeTable::reverse_complemented(vec![Barcode::new("R7", "GGTTAC")]).unwrap());
        let read = format!("AAAA{FWD_EXACT}{INSERT}{}GTAACC", rev_rc());
        let c = fx.run(&read);
        assert_eq!(c.outcome, Outcome::Valid);
        assert_eq!(c.read.unwrap().label, "BC.1_R7");
    }

    #[test]
    fn missing_reverse_barcode_counts_found_primer() {
        let mut fx = Fixture::new(config(5, 20));
        fx.reverse_barcodes = Some(BarcodeTable::reverse_complemented(vec![Barcode::new("R7", "GGTTAC")]).unwrap());
        let read = format!("AAAA{FWD_EXACT}{INSERT}{}TTTTTT", rev_rc());
        let c = fx.run(&read);
        assert_eq!(c.outcome, Outcome::NoReverseBarcode);
        assert!(c.reverse_primer_found);
    }

    #[test]
    fn header_layout() {
        assert_eq!(demux_header(3, "BC.1"), "R_3;barcodelabel=BC.1;");
    }
}
