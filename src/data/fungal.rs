//! Fungal ITS and LSU primers.
//!
//! Names follow the usual community spelling (`fITS7`, `ITS1-F`, `LR0R`, ...).
//!
//! Notes:
//! - Sequences are uppercase 5'→3' as published; degenerate codes retained.
//! - fITS7/ITS4 is the default ITS2 pair.

use crate::kit::{Locus, PrimerId, PrimerRecord, Provenance, Strand};

const WHITE_1990: Provenance = Provenance {
    source: "White et al. 1990, PCR Protocols: a guide to methods and applications",
    notes: "Original ITS primer series.",
};

const GARDES_1993: Provenance = Provenance {
    source: "Gardes & Bruns 1993, Molecular Ecology 2:113-118",
    notes: "Basidiomycete/fungal specific ITS primers.",
};

const IHRMARK_2012: Provenance = Provenance {
    source: "Ihrmark et al. 2012, FEMS Microbiology Ecology 82:666-677",
    notes: "R at position 5 (A/G).",
};

const TOJU_2012: Provenance = Provenance {
    source: "Toju et al. 2012, PLoS ONE 7:e40863",
    notes: "Three degenerate positions (Y, Y, R).",
};

const VILGALYS: Provenance = Provenance {
    source: "Vilgalys lab LSU primer list",
    notes: "LSU region primers.",
};

/// fITS7, forward ITS2 primer.
pub const FITS7: PrimerRecord = PrimerRecord {
    id: PrimerId("fITS7"),
    locus: Locus::Its,
    strand: Strand::Forward,
    sequence: "GTGARTCATCGAATCTTTG",
    provenance: IHRMARK_2012,
};

/// ITS4, reverse primer at the 5' end of the LSU.
pub const ITS4: PrimerRecord = PrimerRecord {
    id: PrimerId("ITS4"),
    locus: Locus::Its,
    strand: Strand::Reverse,
    sequence: "TCCTCCGCTTATTGATATGC",
    provenance: WHITE_1990,
};

pub const ITS1_F: PrimerRecord = PrimerRecord {
    id: PrimerId("ITS1-F"),
    locus: Locus::Its,
    strand: Strand::Forward,
    sequence: "CTTGGTCATTTAGAGGAAGTAA",
    provenance: GARDES_1993,
};

pub const ITS2: PrimerRecord = PrimerRecord {
    id: PrimerId("ITS2"),
    locus: Locus::Its,
    strand: Strand::Reverse,
    sequence: "GCTGCGTTCTTCATCGATGC",
    provenance: WHITE_1990,
};

pub const ITS3: PrimerRecord = PrimerRecord {
    id: PrimerId("ITS3"),
    locus: Locus::Its,
    strand: Strand::Forward,
    sequence: "GCATCGATGAAGAACGCAGC",
    provenance: WHITE_1990,
};

pub const ITS4_B: PrimerRecord = PrimerRecord {
    id: PrimerId("ITS4-B"),
    locus: Locus::Its,
    strand: Strand::Reverse,
    sequence: "CAGGAGACTTGTACACGGTCCAG",
    provenance: GARDES_1993,
};

pub const ITS1: PrimerRecord = PrimerRecord {
    id: PrimerId("ITS1"),
    locus: Locus::Its,
    strand: Strand::Forward,
    sequence: "TCCGTAGGTGAACCTGCGG",
    provenance: WHITE_1990,
};

pub const ITS3_KYO2: PrimerRecord = PrimerRecord {
    id: PrimerId("ITS3_KYO2"),
    locus: Locus::Its,
    strand: Strand::Forward,
    sequence: "GATGAAGAACGYAGYRAA",
    provenance: TOJU_2012,
};

pub const LR0R: PrimerRecord = PrimerRecord {
    id: PrimerId("LR0R"),
    locus: Locus::Lsu,
    strand: Strand::Forward,
    sequence: "ACCCGCTGAACTTAAGC",
    provenance: VILGALYS,
};

pub const LR2R: PrimerRecord = PrimerRecord {
    id: PrimerId("LR2R"),
    locus: Locus::Lsu,
    strand: Strand::Forward,
    sequence: "AAGAACTTTGAAAAGAG",
    provenance: VILGALYS,
};

/// Reverse complement of JH-LS-369, used as a reverse LSU primer.
pub const JH_LS_369RC: PrimerRecord = PrimerRecord {
    id: PrimerId("JH-LS-369rc"),
    locus: Locus::Lsu,
    strand: Strand::Reverse,
    sequence: "CTTCCCTTTCAACAATTTCAC",
    provenance: VILGALYS,
};
