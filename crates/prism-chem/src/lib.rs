//! # prism-chem
//!
//! Chemistry toolkit for PRISM diversity analysis.
//!
//! Implements the [`prism_core::MoleculeToolkit`] capability:
//! - **SMILES**: organic-subset and bracket-atom parsing with implicit hydrogens
//! - **Fingerprints**: Morgan/ECFP bit vectors
//! - **Descriptors**: fixed-order topological and composition descriptors
//! - **MCS**: maximum common connected substructure search

pub mod descriptors;
pub mod elements;
pub mod fingerprint;
pub mod mcs;
pub mod molecule;
pub mod smiles;
pub mod toolkit;

pub use descriptors::{compute_descriptors, DESCRIPTOR_NAMES};
pub use fingerprint::morgan_fingerprint;
pub use mcs::{find_mcs, McsResult};
pub use molecule::{Atom, Bond, BondOrder, Chirality, Molecule};
pub use smiles::{parse_smiles, SmilesError};
pub use toolkit::NativeToolkit;
