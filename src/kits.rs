//! Registry mapping primer names to their sequences.
//!
//! Lookups are case-insensitive. A name that is not in the registry is taken as a
//! literal primer sequence, provided it is a valid IUPAC string.
use crate::data::fungal::*;
use crate::data::markers::*;
use crate::error::{Error, Result};
use crate::kit::{is_iupac, PrimerRecord, PrimerSpec};

pub const PRIMERS: &[PrimerRecord] = &[
    FITS7, ITS4, ITS1_F, ITS2, ITS3, ITS4_B, ITS1, LR0R, LR2R, JH_LS_369RC,
    V3_16S, V4_16S, ITS3_KYO2, COI_F, COI_R,
];

/// Find a registry entry by name.
pub fn find_primer(name: &str) -> Option<&'static PrimerRecord> {
    PRIMERS.iter().find(|p| p.id.0.eq_ignore_ascii_case(name))
}

/// Resolve a primer argument (registry name or literal sequence) into a [`PrimerSpec`].
pub fn resolve_primer(arg: &str, max_edits: u32) -> Result<PrimerSpec> {
    let seq = match find_primer(arg) {
        Some(p) => p.sequence,
        None => arg,
    };
    if !is_iupac(seq.as_bytes()) {
        return Err(Error::InvalidPrimer(arg.to_string()));
    }
    Ok(PrimerSpec::new(seq, max_edits))
}
