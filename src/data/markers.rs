//! Bacterial 16S and metazoan COI primers.

use crate::kit::{Locus, PrimerId, PrimerRecord, Provenance, Strand};

const KLINDWORTH_2013: Provenance = Provenance {
    source: "Klindworth et al. 2013, Nucleic Acids Research 41:e1",
    notes: "V3-V4 pair; N, W, H and V degenerate positions.",
};

const COI_MINIBARCODE: Provenance = Provenance {
    source: "Community COI mini-barcode primer set",
    notes: "W (A/T) near the 3' end of COI-R.",
};

pub const V3_16S: PrimerRecord = PrimerRecord {
    id: PrimerId("16S_V3"),
    locus: Locus::Ssu16S,
    strand: Strand::Forward,
    sequence: "CCTACGGGNGGCWGCAG",
    provenance: KLINDWORTH_2013,
};

pub const V4_16S: PrimerRecord = PrimerRecord {
    id: PrimerId("16S_V4"),
    locus: Locus::Ssu16S,
    strand: Strand::Reverse,
    sequence: "GACTACHVGGGTATCTAATCC",
    provenance: KLINDWORTH_2013,
};

pub const COI_F: PrimerRecord = PrimerRecord {
    id: PrimerId("COI-F"),
    locus: Locus::Coi,
    strand: Strand::Forward,
    sequence: "GGTCAACAAATCATAAAGATATTGG",
    provenance: COI_MINIBARCODE,
};

pub const COI_R: PrimerRecord = PrimerRecord {
    id: PrimerId("COI-R"),
    locus: Locus::Coi,
    strand: Strand::Reverse,
    sequence: "GGATTTGGAAATTGATTAGTWCC",
    provenance: COI_MINIBARCODE,
};
