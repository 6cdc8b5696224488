//! Molecular descriptor vectors.
//!
//! The descriptor order is fixed; see [`DESCRIPTOR_NAMES`].

use crate::elements;
use crate::molecule::{BondOrder, Molecule};

/// Names of the entries returned by [`compute_descriptors`], in order.
pub const DESCRIPTOR_NAMES: [&str; 11] = [
    "heavy_atom_count",
    "molecular_weight",
    "heteroatom_count",
    "aromatic_atom_count",
    "ring_atom_count",
    "rotatable_bond_count",
    "hydrogen_count",
    "wiener_index",
    "zagreb_m1",
    "zagreb_m2",
    "fraction_sp3",
];

/// Computes the descriptor vector of a molecule.
///
/// Returns `None` for molecules without heavy atoms or with an element
/// that has no mass entry.
pub fn compute_descriptors(mol: &Molecule) -> Option<Vec<f64>> {
    if mol.heavy_atom_count() == 0 {
        return None;
    }

    let ring_atoms = mol.ring_atoms();
    let (m1, m2) = zagreb_indices(mol);

    Some(vec![
        mol.heavy_atom_count() as f64,
        molecular_weight(mol)?,
        mol.atoms
            .iter()
            .filter(|a| a.is_heavy() && a.atomic_number != 6)
            .count() as f64,
        mol.atoms.iter().filter(|a| a.is_aromatic).count() as f64,
        ring_atoms.iter().filter(|&&r| r).count() as f64,
        rotatable_bonds(mol) as f64,
        mol.total_hydrogen_count() as f64,
        wiener_index(mol),
        m1,
        m2,
        fraction_sp3(mol),
    ])
}

/// Average molecular weight including implicit hydrogens.
pub fn molecular_weight(mol: &Molecule) -> Option<f64> {
    let hydrogen = elements::by_number(1)?.mass;
    mol.atoms.iter().try_fold(0.0, |acc, atom| {
        let element = elements::by_number(atom.atomic_number)?;
        Some(acc + element.mass + atom.implicit_hydrogens as f64 * hydrogen)
    })
}

/// Wiener index: sum of all shortest-path distances between atom pairs.
pub fn wiener_index(mol: &Molecule) -> f64 {
    let n = mol.atom_count();
    if n < 2 {
        return 0.0;
    }
    let dist = mol.shortest_paths();
    let mut sum = 0u64;
    for i in 0..n {
        for j in (i + 1)..n {
            if dist[i][j] != usize::MAX {
                sum += dist[i][j] as u64;
            }
        }
    }
    sum as f64
}

/// Zagreb indices M1 and M2.
///
/// M1 = sum of d(i)^2 for all atoms, M2 = sum of d(i)*d(j) for all edges.
pub fn zagreb_indices(mol: &Molecule) -> (f64, f64) {
    let m1: f64 = (0..mol.atom_count())
        .map(|i| {
            let d = mol.degree(i) as f64;
            d * d
        })
        .sum();

    let m2: f64 = mol
        .bonds
        .iter()
        .map(|b| mol.degree(b.atom1) as f64 * mol.degree(b.atom2) as f64)
        .sum();

    (m1, m2)
}

/// Single, acyclic bonds between two non-terminal heavy atoms.
pub fn rotatable_bonds(mol: &Molecule) -> usize {
    let ring_bonds = mol.ring_bonds();
    mol.bonds
        .iter()
        .zip(ring_bonds)
        .filter(|(bond, in_ring)| {
            !in_ring
                && bond.order == BondOrder::Single
                && mol.atoms[bond.atom1].is_heavy()
                && mol.atoms[bond.atom2].is_heavy()
                && mol.heavy_degree(bond.atom1) > 1
                && mol.heavy_degree(bond.atom2) > 1
        })
        .count()
}

/// Fraction of sp3 carbons.
pub fn fraction_sp3(mol: &Molecule) -> f64 {
    let total_carbons = mol.atoms.iter().filter(|a| a.atomic_number == 6).count();
    if total_carbons == 0 {
        return 0.0;
    }

    let sp3_carbons = mol
        .atoms
        .iter()
        .enumerate()
        .filter(|(i, a)| {
            if a.atomic_number != 6 || a.is_aromatic {
                return false;
            }
            // sp3 carbon: no double/triple bonds, not aromatic
            !mol.adjacency[*i].iter().any(|&(_, bi)| {
                matches!(mol.bonds[bi].order, BondOrder::Double | BondOrder::Triple)
            })
        })
        .count();

    sp3_carbons as f64 / total_carbons as f64
}
