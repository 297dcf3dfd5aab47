//! Reading prediction and ground-truth tables into DOID-keyed drug lookups.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{DrugrecallError, Result};
use crate::eval::doid::normalize_doid;
use crate::eval::literal::{parse_drug_set, DrugSet};

/// Fixed column layout of an input table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub id_column: &'static str,
    pub drugs_column: &'static str,
}

/// Predictions export: one row per disease with its predicted drugs.
pub const PREDICTIONS_SCHEMA: TableSchema = TableSchema {
    id_column: "Disease",
    drugs_column: "Drugs",
};

/// Ground-truth test split.
pub const GROUND_TRUTH_SCHEMA: TableSchema = TableSchema {
    id_column: "DOID",
    drugs_column: "drugs",
};

/// One parsed input row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrugRecord {
    /// Normalized identifier
    pub doid: String,
    pub drugs: DrugSet,
}

/// Normalized DOID to drug set, last write wins.
///
/// Iteration follows the order in which each DOID was first seen, so a
/// duplicate row replaces the earlier drugs without moving the disease.
#[derive(Debug, Clone, Default)]
pub struct DrugLookup {
    order: Vec<String>,
    sets: HashMap<String, DrugSet>,
    duplicates: usize,
}

impl DrugLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any earlier drugs for the same DOID.
    pub fn insert(&mut self, record: DrugRecord) {
        match self.sets.insert(record.doid.clone(), record.drugs) {
            Some(_) => {
                log::warn!("Duplicate DOID {}: keeping the last row", record.doid);
                self.duplicates += 1;
            }
            None => self.order.push(record.doid),
        }
    }

    pub fn get(&self, doid: &str) -> Option<&DrugSet> {
        self.sets.get(doid)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of rows that overwrote an earlier row
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DrugSet)> + '_ {
        self.order
            .iter()
            .filter_map(move |doid| self.sets.get(doid).map(|drugs| (doid.as_str(), drugs)))
    }
}

impl FromIterator<DrugRecord> for DrugLookup {
    fn from_iter<T: IntoIterator<Item = DrugRecord>>(iter: T) -> Self {
        let mut lookup = Self::new();
        for record in iter {
            lookup.insert(record);
        }
        lookup
    }
}

/// Read every row of a table, parsing drug sets and normalizing identifiers.
///
/// Fails on the first malformed drug cell; nothing is returned for a table
/// that cannot be parsed completely.
pub fn read_records(path: &Path, schema: TableSchema) -> Result<Vec<DrugRecord>> {
    log::debug!("Reading {} ({} / {})", path.display(), schema.id_column, schema.drugs_column);
    let mut reader = csv::Reader::from_path(path)?;
    read_records_from(&mut reader, path, schema)
}

fn read_records_from<R: std::io::Read>(
    reader: &mut csv::Reader<R>,
    path: &Path,
    schema: TableSchema,
) -> Result<Vec<DrugRecord>> {
    let headers = reader.headers()?.clone();
    let id_idx = column_index(&headers, path, schema.id_column)?;
    let drugs_idx = column_index(&headers, path, schema.drugs_column)?;

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let raw_id = record.get(id_idx).unwrap_or("");
        let raw_drugs = record.get(drugs_idx).unwrap_or("");

        let drugs = parse_drug_set(raw_drugs).map_err(|e| match e {
            DrugrecallError::Parse(reason) => DrugrecallError::Parse(format!(
                "{} row {} column '{}': {}",
                path.display(),
                row + 1,
                schema.drugs_column,
                reason
            )),
            other => other,
        })?;

        records.push(DrugRecord {
            doid: normalize_doid(raw_id),
            drugs,
        });
    }

    log::info!("Read {} rows from {}", records.len(), path.display());
    Ok(records)
}

/// Read a table straight into a lookup.
pub fn read_lookup(path: &Path, schema: TableSchema) -> Result<DrugLookup> {
    let lookup: DrugLookup = read_records(path, schema)?.into_iter().collect();
    if lookup.duplicates() > 0 {
        log::warn!(
            "{} duplicate DOID rows in {} (last row wins)",
            lookup.duplicates(),
            path.display()
        );
    }
    Ok(lookup)
}

fn column_index(headers: &csv::StringRecord, path: &Path, column: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| DrugrecallError::MissingColumn {
            path: PathBuf::from(path),
            column: column.to_string(),
        })
}
