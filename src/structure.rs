//! Residue-name scan over fixed-column PDB text.
//!
//! Only two things are read from each record: the record-type prefix and the
//! residue-name columns (18-20). Everything else in the line belongs to the
//! renderer.

use std::collections::BTreeSet;
use std::ops::Range;

/// Byte span of the residue-name field in ATOM/HETATM records.
pub const RESIDUE_NAME_COLUMNS: Range<usize> = 17..20;

/// Record-type prefixes that carry atoms.
const ATOM_RECORDS: [&str; 2] = ["ATOM", "HETATM"];

/// Extract the trimmed residue name from one record line.
///
/// Returns `None` for non-atom records, lines that end before the residue
/// columns, and all-blank residue fields. A line that ends inside the span
/// yields whatever part of the field it carries.
#[must_use]
pub fn residue_name(line: &str) -> Option<&str> {
    if !ATOM_RECORDS.iter().any(|record| line.starts_with(record)) {
        return None;
    }
    let line = line.trim_end_matches(['\r', '\n']);
    let end = line.len().min(RESIDUE_NAME_COLUMNS.end);
    let name = line.get(RESIDUE_NAME_COLUMNS.start..end)?.trim();
    (!name.is_empty()).then_some(name)
}

/// Distinct residue names found in atom-bearing records, sorted ascending.
///
/// Ordering is independent of line order so that color assignment is
/// reproducible for the same set of residues.
#[must_use]
pub fn residue_names(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(residue_name)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}
