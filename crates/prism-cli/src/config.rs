//! PRISM Diversity Configuration Module
//!
//! Serde-based TOML configuration for the `dist` and `report` commands.
//! Every section is optional; command-line flags override file values.

use anyhow::{Context, Result};
use prism_core::{CalcMode, DEFAULT_FINGERPRINT_BITS};
use prism_diversity::report::DEFAULT_MAX_FOR_MCS;
use prism_diversity::ColumnNames;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiversityConfig {
    #[serde(default)]
    pub fingerprint: FingerprintConfig,

    #[serde(default)]
    pub mcs: McsConfig,

    #[serde(default)]
    pub columns: ColumnNames,

    #[serde(default)]
    pub structures: StructureConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub summary: SummaryConfig,
}

impl DiversityConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Parse configuration from TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Validate configuration consistency
    pub fn validate(&self) -> Result<()> {
        if self.fingerprint.nbits == 0 {
            anyhow::bail!("fingerprint.nbits must be positive");
        }
        if self.mcs.node_budget == 0 {
            anyhow::bail!("mcs.node_budget must be positive");
        }
        if self.summary.k == 0 && self.summary.mode != CalcMode::All {
            anyhow::bail!("summary.k must be positive for mode '{}'", self.summary.mode);
        }
        if self.columns.id.is_empty() || self.columns.smiles.is_empty() {
            anyhow::bail!("columns.id and columns.smiles must not be empty");
        }
        Ok(())
    }
}

// =============================================================================
// Fingerprint Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerprintConfig {
    /// Morgan radius; unset means 2 for `dist` and 4 for `report`
    #[serde(default)]
    pub radius: Option<u32>,

    #[serde(default = "default_nbits")]
    pub nbits: usize,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            radius: None,
            nbits: DEFAULT_FINGERPRINT_BITS,
        }
    }
}

// =============================================================================
// MCS Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McsConfig {
    /// Reports skip the MCS matrix above this many compounds
    #[serde(default = "default_max_for_mcs")]
    pub max_for_mcs: usize,

    /// Search nodes per molecule pair before settling for the best found
    #[serde(default = "default_node_budget")]
    pub node_budget: usize,
}

impl Default for McsConfig {
    fn default() -> Self {
        Self {
            max_for_mcs: DEFAULT_MAX_FOR_MCS,
            node_budget: prism_chem::mcs::DEFAULT_NODE_BUDGET,
        }
    }
}

// =============================================================================
// Structure Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureConfig {
    /// SMILES are already parent structures; otherwise salts are stripped
    #[serde(default)]
    pub is_base_smiles: bool,
}

// =============================================================================
// Output Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub out_dir: Option<PathBuf>,

    #[serde(default)]
    pub projection_file: Option<PathBuf>,
}

// =============================================================================
// Summary Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryConfig {
    #[serde(default)]
    pub mode: CalcMode,

    #[serde(default = "default_k")]
    pub k: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            mode: CalcMode::default(),
            k: default_k(),
        }
    }
}

fn default_nbits() -> usize {
    DEFAULT_FINGERPRINT_BITS
}

fn default_max_for_mcs() -> usize {
    DEFAULT_MAX_FOR_MCS
}

fn default_node_budget() -> usize {
    prism_chem::mcs::DEFAULT_NODE_BUDGET
}

fn default_k() -> usize {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = DiversityConfig::from_str("").unwrap();
        assert_eq!(config, DiversityConfig::default());
        assert_eq!(config.fingerprint.nbits, 1024);
        assert_eq!(config.mcs.max_for_mcs, 300);
        assert_eq!(config.summary.mode, CalcMode::Nearest);
        assert_eq!(config.summary.k, 1);
        assert_eq!(config.columns.smiles, "rdkit_smiles");
        assert!(!config.structures.is_base_smiles);
        config.validate().unwrap();
    }

    #[test]
    fn parses_partial_sections() {
        let config = DiversityConfig::from_str(
            r#"
            [fingerprint]
            radius = 3

            [columns]
            id = "name"
            smiles = "SMILES"
            response = "pIC50"

            [structures]
            is_base_smiles = true

            [summary]
            mode = "average"
            k = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.fingerprint.radius, Some(3));
        assert_eq!(config.fingerprint.nbits, 1024);
        assert_eq!(config.columns.response.as_deref(), Some("pIC50"));
        assert!(config.structures.is_base_smiles);
        assert_eq!(config.summary.mode, CalcMode::Average);
        assert_eq!(config.summary.k, 5);
    }

    #[test]
    fn rejects_inconsistent_values() {
        let config = DiversityConfig::from_str("[summary]\nk = 0\n").unwrap();
        assert!(config.validate().is_err());

        let config = DiversityConfig::from_str("[summary]\nmode = \"all\"\nk = 0\n").unwrap();
        assert!(config.validate().is_ok());

        assert!(DiversityConfig::from_str("[summary]\nmode = \"closest\"\n").is_err());
    }
}
