//! [`MoleculeToolkit`] implementation backed by this crate.

use crate::descriptors::compute_descriptors;
use crate::fingerprint::morgan_fingerprint;
use crate::mcs::{find_mcs, DEFAULT_NODE_BUDGET};
use crate::molecule::Molecule;
use crate::smiles::parse_smiles;
use prism_core::{BitVector, MoleculeToolkit};

/// Native chemistry toolkit: SMILES parser, Morgan fingerprints,
/// descriptor vectors and MCS search.
#[derive(Debug, Clone, Copy)]
pub struct NativeToolkit {
    mcs_node_budget: usize,
}

impl Default for NativeToolkit {
    fn default() -> Self {
        Self {
            mcs_node_budget: DEFAULT_NODE_BUDGET,
        }
    }
}

impl NativeToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the MCS search node budget per molecule pair.
    pub fn with_mcs_node_budget(mut self, budget: usize) -> Self {
        self.mcs_node_budget = budget.max(1);
        self
    }

    pub fn mcs_node_budget(&self) -> usize {
        self.mcs_node_budget
    }
}

impl MoleculeToolkit for NativeToolkit {
    type Molecule = Molecule;

    fn parse_smiles(&self, smiles: &str) -> Option<Molecule> {
        match parse_smiles(smiles) {
            Ok(mol) => Some(mol),
            Err(e) => {
                log::debug!("SMILES '{}' rejected: {}", smiles, e);
                None
            }
        }
    }

    fn atom_count(&self, mol: &Molecule) -> usize {
        mol.atom_count()
    }

    fn fingerprint(&self, mol: &Molecule, radius: u32, nbits: usize) -> BitVector {
        morgan_fingerprint(mol, radius, nbits)
    }

    fn descriptors(&self, smiles: &str) -> Option<Vec<f64>> {
        let mol = self.parse_smiles(smiles)?;
        compute_descriptors(&mol)
    }

    fn mcs_atom_count(&self, a: &Molecule, b: &Molecule) -> usize {
        let result = find_mcs(a, b, self.mcs_node_budget);
        if !result.complete {
            log::debug!(
                "MCS search hit the node budget ({}); using best size {}",
                self.mcs_node_budget,
                result.atoms
            );
        }
        result.atoms
    }

    fn base_molecule(&self, mol: &Molecule) -> Molecule {
        mol.largest_fragment()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toolkit_rejects_bad_smiles() {
        let toolkit = NativeToolkit::new();
        assert!(toolkit.parse_smiles("C1CC").is_none());
        assert!(toolkit.descriptors("C1CC").is_none());
        assert!(toolkit.parse_smiles("CCN").is_some());
        // Out-of-range charge is a rejected structure, not a crash
        assert!(toolkit.parse_smiles("[C-128]").is_none());
    }

    #[test]
    fn base_molecule_keeps_parent_fragment() {
        let toolkit = NativeToolkit::new();
        let salt = toolkit.parse_smiles("CC(=O)[O-].[Na+]").unwrap();
        let base = toolkit.base_molecule(&salt);
        assert_eq!(toolkit.atom_count(&base), 4);

        let parent = toolkit.parse_smiles("CC(=O)[O-]").unwrap();
        assert_eq!(
            toolkit.fingerprint(&base, 2, 1024),
            toolkit.fingerprint(&parent, 2, 1024)
        );
    }

    #[test]
    fn toolkit_mcs_of_self_is_atom_count() {
        let toolkit = NativeToolkit::new();
        let mol = toolkit.parse_smiles("c1ccc2ccccc2c1").unwrap();
        assert_eq!(toolkit.mcs_atom_count(&mol, &mol), toolkit.atom_count(&mol));
    }

    #[test]
    fn budget_is_at_least_one() {
        assert_eq!(NativeToolkit::new().with_mcs_node_budget(0).mcs_node_budget(), 1);
    }
}
