//! Core traits for PRISM diversity analysis.
//!
//! The distance engine never parses chemistry itself. Structure parsing,
//! fingerprinting, descriptors and substructure search come from a
//! [`MoleculeToolkit`]; progress and per-structure failures are reported to
//! an injected [`DiversityObserver`]; 2-D embeddings come from a
//! [`Projector`].

use crate::errors::Result;
use crate::types::BitVector;
use ndarray::{Array2, ArrayView2};

/// Chemistry capability consumed by the distance engine.
pub trait MoleculeToolkit {
    /// Parsed structure. Immutable once constructed.
    type Molecule;

    /// Parses a SMILES string. `None` when the structure is invalid.
    fn parse_smiles(&self, smiles: &str) -> Option<Self::Molecule>;

    /// Number of graph atoms, used to normalise MCS sizes.
    fn atom_count(&self, mol: &Self::Molecule) -> usize;

    /// Morgan fingerprint of the given radius, folded into `nbits` bits.
    ///
    /// Must be deterministic for fixed `radius` and `nbits`.
    fn fingerprint(&self, mol: &Self::Molecule, radius: u32, nbits: usize) -> BitVector;

    /// Fixed-order descriptor vector, `None` when computation fails.
    fn descriptors(&self, smiles: &str) -> Option<Vec<f64>>;

    /// Atom count of the maximum common substructure of two molecules.
    fn mcs_atom_count(&self, a: &Self::Molecule, b: &Self::Molecule) -> usize;

    /// Parent structure with salts and solvent fragments stripped.
    fn base_molecule(&self, mol: &Self::Molecule) -> Self::Molecule;
}

/// Receives progress and failure notifications from the engine and report.
///
/// Passed explicitly to every component that reports anything; all methods
/// default to no-ops.
pub trait DiversityObserver {
    /// A computation stage started over `count` items.
    fn stage_started(&self, _stage: &str, _count: usize) {}

    /// A computation stage finished.
    fn stage_finished(&self, _stage: &str) {}

    /// A structure failed to parse.
    fn parse_failed(&self, _index: usize, _label: &str) {}

    /// Descriptor computation failed for a structure.
    fn descriptor_failed(&self, _index: usize, _smiles: &str) {}

    /// Free-form informational message.
    fn note(&self, _message: &str) {}
}

/// Observer that forwards everything to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl DiversityObserver for LogObserver {
    fn stage_started(&self, stage: &str, count: usize) {
        log::info!("{}: {} items...", stage, count);
    }

    fn stage_finished(&self, stage: &str) {
        log::debug!("{}: done", stage);
    }

    fn parse_failed(&self, index: usize, label: &str) {
        log::warn!("Unable to parse structure {} = {}", index, label);
    }

    fn descriptor_failed(&self, index: usize, smiles: &str) {
        log::warn!("Descriptor computation failed for structure {} ({})", index, smiles);
    }

    fn note(&self, message: &str) {
        log::info!("{}", message);
    }
}

/// Observer that discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentObserver;

impl DiversityObserver for SilentObserver {}

/// Low-dimensional embedding of a precomputed distance matrix.
pub trait Projector {
    /// Embeds an `n x n` distance matrix into `n x dims` coordinates.
    fn project(&self, distances: ArrayView2<'_, f64>, dims: usize) -> Result<Array2<f64>>;
}
