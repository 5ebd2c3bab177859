//! Schema normalization across real and synthetic speech sources.
//!
//! The real vector-index schema names its fields `central_bank`, `speaker`
//! and `is_governor`; the synthetic and enriched datasets use `country`,
//! `author` and `is_gov`. Normalization moves each legacy field onto its
//! canonical name, but only when the canonical field is absent, so an
//! existing canonical value always wins.

use crate::model::{Record, Table};

/// Legacy field name to canonical field name.
pub const LEGACY_RENAMES: &[(&str, &str)] = &[
    ("central_bank", "country"),
    ("speaker", "author"),
    ("is_governor", "is_gov"),
];

/// Something that can be normalized: a single row or a whole table.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Row(Record),
    Table(Table),
}

/// Normalize a row or table to canonical field names.
///
/// Total and idempotent.
#[must_use]
pub fn normalize(shape: Shape) -> Shape {
    match shape {
        Shape::Row(mut row) => {
            normalize_row(&mut row);
            Shape::Row(row)
        }
        Shape::Table(mut table) => {
            normalize_table(&mut table);
            Shape::Table(table)
        }
    }
}

pub fn normalize_row(row: &mut Record) {
    for &(legacy, canonical) in LEGACY_RENAMES {
        if row.contains_key(canonical) {
            continue;
        }
        if let Some(value) = row.remove(legacy) {
            row.insert(canonical.to_string(), value);
        }
    }
}

pub fn normalize_table(table: &mut Table) {
    for &(legacy, canonical) in LEGACY_RENAMES {
        if table.has_column(legacy) && !table.has_column(canonical) {
            table.rename_column(legacy, canonical);
        }
    }
}
