//! Ion Torrent PGM sample barcodes, used when no barcode FASTA is given.
//!
//! Ion Xpress barcodes 1-32, each followed by the `GAT` barcode adapter that
//! sits between the barcode and the library insert.

use crate::kit::BarcodeRecord;

pub const ION_XPRESS: &[BarcodeRecord] = &[
    BarcodeRecord { label: "BC.1", sequence: "CTAAGGTAACGAT" },
    BarcodeRecord { label: "BC.2", sequence: "TAAGGAGAACGAT" },
    BarcodeRecord { label: "BC.3", sequence: "AAGAGGATTCGAT" },
    BarcodeRecord { label: "BC.4", sequence: "TACCAAGATCGAT" },
    BarcodeRecord { label: "BC.5", sequence: "CAGAAGGAACGAT" },
    BarcodeRecord { label: "BC.6", sequence: "CTGCAAGTTCGAT" },
    BarcodeRecord { label: "BC.7", sequence: "TTCGTGATTCGAT" },
    BarcodeRecord { label: "BC.8", sequence: "TTCCGATAACGAT" },
    BarcodeRecord { label: "BC.9", sequence: "TGAGCGGAACGAT" },
    BarcodeRecord { label: "BC.10", sequence: "CTGACCGAACGAT" },
    BarcodeRecord { label: "BC.11", sequence: "TCCTCGAATCGAT" },
    BarcodeRecord { label: "BC.12", sequence: "TAGGTGGTTCGAT" },
    BarcodeRecord { label: "BC.13", sequence: "TCTAACGGACGAT" },
    BarcodeRecord { label: "BC.14", sequence: "TTGGAGTGTCGAT" },
    BarcodeRecord { label: "BC.15", sequence: "TCTAGAGGTCGAT" },
    BarcodeRecord { label: "BC.16", sequence: "TCTGGATGACGAT" },
    BarcodeRecord { label: "BC.17", sequence: "TCTATTCGTCGAT" },
    BarcodeRecord { label: "BC.18", sequence: "AGGCAATTGCGAT" },
    BarcodeRecord { label: "BC.19", sequence: "TTAGTCGGACGAT" },
    BarcodeRecord { label: "BC.20", sequence: "CAGATCCATCGAT" },
    BarcodeRecord { label: "BC.21", sequence: "TCGCAATTACGAT" },
    BarcodeRecord { label: "BC.22", sequence: "TTCGAGACGCGAT" },
    BarcodeRecord { label: "BC.23", sequence: "TGCCACGAACGAT" },
    BarcodeRecord { label: "BC.24", sequence: "AACCTCATTCGAT" },
    BarcodeRecord { label: "BC.25", sequence: "CCTGAGATACGAT" },
    BarcodeRecord { label: "BC.26", sequence: "TTACAACCTCGAT" },
    BarcodeRecord { label: "BC.27", sequence: "AACCATCCGCGAT" },
    BarcodeRecord { label: "BC.28", sequence: "ATCCGGAATCGAT" },
    BarcodeRecord { label: "BC.29", sequence: "TCGACCACTCGAT" },
    BarcodeRecord { label: "BC.30", sequence: "CGAGGTTATCGAT" },
    BarcodeRecord { label: "BC.31", sequence: "TCCAAGCTGCGAT" },
    BarcodeRecord { label: "BC.32", sequence: "TCTTACACACGAT" },
];
