//! Compound table loading and upstream structure filtering.

use prism_core::{DiversityObserver, MoleculeToolkit, PrismError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Column names of a compound table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub id: String,
    pub smiles: String,
    pub response: Option<String>,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            id: "compound_id".to_string(),
            smiles: "rdkit_smiles".to_string(),
            response: None,
        }
    }
}

/// One row of a compound table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompoundRecord {
    pub compound_id: String,
    pub smiles: String,
    pub response: Option<String>,
}

impl CompoundRecord {
    pub fn new(compound_id: impl Into<String>, smiles: impl Into<String>) -> Self {
        Self {
            compound_id: compound_id.into(),
            smiles: smiles.into(),
            response: None,
        }
    }
}

/// Records that survived filtering, aligned with their parsed molecules.
pub struct PreparedCompounds<M> {
    pub records: Vec<CompoundRecord>,
    pub molecules: Vec<M>,
}

impl<M> PreparedCompounds<M> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.compound_id.as_str()).collect()
    }

    /// Response labels, present only when every record carries one.
    pub fn responses(&self) -> Option<Vec<String>> {
        self.records.iter().map(|r| r.response.clone()).collect()
    }
}

/// Reads a compound CSV with a header row.
pub fn load_compounds(path: &Path, columns: &ColumnNames) -> Result<Vec<CompoundRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let find = |name: &str| {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            PrismError::config(format!(
                "column '{}' not found in {} (columns: {})",
                name,
                path.display(),
                headers.iter().collect::<Vec<_>>().join(", ")
            ))
        })
    };
    let id_idx = find(columns.id.as_str())?;
    let smiles_idx = find(columns.smiles.as_str())?;
    let response_idx = columns.response.as_deref().map(find).transpose()?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let field = |idx: usize| row.get(idx).unwrap_or_default().to_string();
        records.push(CompoundRecord {
            compound_id: field(id_idx),
            smiles: field(smiles_idx),
            response: response_idx.map(field),
        });
    }
    log::debug!("Loaded {} compounds from {}", records.len(), path.display());
    Ok(records)
}

/// Drops duplicate SMILES (first occurrence wins) and unparsable structures.
///
/// Unless `is_base_smiles` is set, each structure is reduced to its base
/// molecule (largest fragment) so salts and solvents do not count towards
/// distances. Parse failures are reported to the observer with the record's
/// position after deduplication and its compound id; the survivors keep
/// their order.
pub fn prepare_compounds<T: MoleculeToolkit>(
    toolkit: &T,
    observer: &dyn DiversityObserver,
    records: Vec<CompoundRecord>,
    is_base_smiles: bool,
) -> PreparedCompounds<T::Molecule> {
    let total = records.len();
    let mut seen = HashSet::new();
    let unique: Vec<CompoundRecord> = records
        .into_iter()
        .filter(|r| seen.insert(r.smiles.clone()))
        .collect();
    if unique.len() < total {
        observer.note(&format!(
            "Dropped {} duplicate structures",
            total - unique.len()
        ));
    }

    if !is_base_smiles {
        observer.stage_started("Stripping salts", unique.len());
    }
    let mut kept = Vec::with_capacity(unique.len());
    let mut molecules = Vec::with_capacity(unique.len());
    for (i, record) in unique.into_iter().enumerate() {
        match toolkit.parse_smiles(&record.smiles) {
            Some(mol) => {
                let mol = if is_base_smiles {
                    mol
                } else {
                    toolkit.base_molecule(&mol)
                };
                kept.push(record);
                molecules.push(mol);
            }
            None => observer.parse_failed(i, &record.compound_id),
        }
    }

    if !is_base_smiles {
        observer.stage_finished("Stripping salts");
    }

    PreparedCompounds {
        records: kept,
        molecules,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_chem::NativeToolkit;
    use prism_core::SilentObserver;
    use tempfile::TempDir;

    fn salted() -> Vec<CompoundRecord> {
        vec![
            CompoundRecord::new("acetate_na", "CC(=O)[O-].[Na+]"),
            CompoundRecord::new("acetate_na_dup", "CC(=O)[O-].[Na+]"),
            CompoundRecord::new("broken", "CC(C"),
            CompoundRecord::new("ethanol", "CCO"),
        ]
    }

    #[test]
    fn salts_are_stripped_by_default() {
        let toolkit = NativeToolkit::new();
        let prepared = prepare_compounds(&toolkit, &SilentObserver, salted(), false);

        assert_eq!(prepared.ids(), vec!["acetate_na", "ethanol"]);
        assert_eq!(toolkit.atom_count(&prepared.molecules[0]), 4);
        assert_eq!(prepared.molecules[0].fragments().len(), 1);
    }

    #[test]
    fn base_smiles_are_used_as_given() {
        let toolkit = NativeToolkit::new();
        let prepared = prepare_compounds(&toolkit, &SilentObserver, salted(), true);

        assert_eq!(prepared.len(), 2);
        assert_eq!(toolkit.atom_count(&prepared.molecules[0]), 5);
    }

    #[test]
    fn loads_configured_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cmpds.csv");
        std::fs::write(&path, "name,SMILES,active\nA1,CCO,yes\nA2, c1ccccc1 ,no\n").unwrap();

        let columns = ColumnNames {
            id: "name".into(),
            smiles: "SMILES".into(),
            response: Some("active".into()),
        };
        let records = load_compounds(&path, &columns).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].smiles, "c1ccccc1");
        assert_eq!(records[0].response.as_deref(), Some("yes"));
    }

    #[test]
    fn missing_column_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cmpds.csv");
        std::fs::write(&path, "id,structure\nA1,CCO\n").unwrap();

        let err = load_compounds(&path, &ColumnNames::default()).unwrap_err();
        assert!(matches!(err, PrismError::ConfigError(_)));
    }
}
