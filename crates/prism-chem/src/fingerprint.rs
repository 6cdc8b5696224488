//! Morgan (ECFP-like) fingerprints.

use crate::molecule::Molecule;
use prism_core::BitVector;

/// Compute a Morgan fingerprint.
///
/// `radius` controls the neighborhood size (2 = ECFP4, 3 = ECFP6).
/// `nbits` is the fingerprint length (1024 for diversity analysis).
pub fn morgan_fingerprint(mol: &Molecule, radius: u32, nbits: usize) -> BitVector {
    let n = mol.atom_count();
    let mut fp = BitVector::new(nbits);
    if n == 0 || nbits == 0 {
        return fp;
    }

    let ring_atoms = mol.ring_atoms();

    // Initial invariants: hash of atom properties
    let mut identifiers: Vec<u64> = mol
        .atoms
        .iter()
        .enumerate()
        .map(|(i, atom)| {
            let mut h = fnv1a_init();
            h = fnv1a_update(h, atom.atomic_number as u64);
            h = fnv1a_update(h, mol.degree(i) as u64);
            h = fnv1a_update(h, mol.hydrogen_count(i) as u64);
            h = fnv1a_update(h, atom.formal_charge as i64 as u64);
            h = fnv1a_update(h, ring_atoms[i] as u64);
            fnv1a_update(h, atom.is_aromatic as u64)
        })
        .collect();

    for &id in &identifiers {
        fp.set(fold_hash(id, nbits));
    }

    for _ in 0..radius {
        let next: Vec<u64> = (0..n)
            .map(|i| {
                let mut h = fnv1a_update(fnv1a_init(), identifiers[i]);

                // Sort neighbor identifiers for determinism
                let mut neighbor_ids: Vec<(u64, u8)> = mol.adjacency[i]
                    .iter()
                    .map(|&(neighbor, bond_idx)| {
                        (identifiers[neighbor], mol.bonds[bond_idx].order as u8)
                    })
                    .collect();
                neighbor_ids.sort_unstable();

                for (nid, order) in neighbor_ids {
                    h = fnv1a_update(h, nid);
                    h = fnv1a_update(h, order as u64);
                }
                h
            })
            .collect();

        for &id in &next {
            fp.set(fold_hash(id, nbits));
        }
        identifiers = next;
    }

    fp
}

// FNV-1a hash functions for deterministic hashing
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

fn fnv1a_init() -> u64 {
    FNV_OFFSET
}

fn fnv1a_update(hash: u64, value: u64) -> u64 {
    value.to_le_bytes().iter().fold(hash, |h, &b| {
        (h ^ b as u64).wrapping_mul(FNV_PRIME)
    })
}

fn fold_hash(hash: u64, nbits: usize) -> usize {
    (hash % nbits as u64) as usize
}
