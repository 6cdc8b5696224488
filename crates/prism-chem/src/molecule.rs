//! Molecular graph representation.

use std::collections::VecDeque;

/// Tetrahedral chirality at a stereocenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Chirality {
    #[default]
    None,
    /// `@` in SMILES
    CounterClockwise,
    /// `@@` in SMILES
    Clockwise,
}

/// Bond order classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// Valence contribution. Aromatic bonds count as 1; the extra
    /// aromatic electron is accounted per atom.
    pub fn valence(self) -> u8 {
        match self {
            BondOrder::Single | BondOrder::Aromatic => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        }
    }
}

/// An atom in a molecular graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    pub atomic_number: u8,
    pub formal_charge: i8,
    pub isotope: Option<u16>,
    pub is_aromatic: bool,
    pub implicit_hydrogens: u8,
    pub chirality: Chirality,
}

impl Atom {
    pub fn new(atomic_number: u8) -> Self {
        Self {
            atomic_number,
            formal_charge: 0,
            isotope: None,
            is_aromatic: false,
            implicit_hydrogens: 0,
            chirality: Chirality::None,
        }
    }

    pub fn is_heavy(&self) -> bool {
        self.atomic_number != 1
    }
}

/// A bond between two atoms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bond {
    pub atom1: usize,
    pub atom2: usize,
    pub order: BondOrder,
}

/// A molecular graph with atoms, bonds, and adjacency information.
#[derive(Debug, Clone)]
pub struct Molecule {
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
    /// adjacency[atom_idx] = Vec<(neighbor_atom_idx, bond_idx)>
    pub adjacency: Vec<Vec<(usize, usize)>>,
}

impl Molecule {
    /// Create a new molecule, building the adjacency list from atoms and bonds.
    pub fn new(atoms: Vec<Atom>, bonds: Vec<Bond>) -> Self {
        let mut adjacency = vec![Vec::new(); atoms.len()];
        for (bi, bond) in bonds.iter().enumerate() {
            adjacency[bond.atom1].push((bond.atom2, bi));
            adjacency[bond.atom2].push((bond.atom1, bi));
        }
        Molecule {
            atoms,
            bonds,
            adjacency,
        }
    }

    /// Number of graph atoms.
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    /// Connected components as sorted atom index lists, in order of their
    /// lowest atom index.
    pub fn fragments(&self) -> Vec<Vec<usize>> {
        let mut seen = vec![false; self.atoms.len()];
        let mut fragments = Vec::new();
        for root in 0..self.atoms.len() {
            if seen[root] {
                continue;
            }
            seen[root] = true;
            let mut members = vec![root];
            let mut stack = vec![root];
            while let Some(atom) = stack.pop() {
                for &(n, _) in &self.adjacency[atom] {
                    if !seen[n] {
                        seen[n] = true;
                        members.push(n);
                        stack.push(n);
                    }
                }
            }
            members.sort_unstable();
            fragments.push(members);
        }
        fragments
    }

    /// The fragment with the most heavy atoms (first one on ties), with
    /// counter-ions and solvents dropped.
    pub fn largest_fragment(&self) -> Molecule {
        let fragments = self.fragments();
        if fragments.len() <= 1 {
            return self.clone();
        }
        let heavy = |f: &Vec<usize>| f.iter().filter(|&&i| self.atoms[i].is_heavy()).count();
        let mut best = &fragments[0];
        for fragment in &fragments[1..] {
            if heavy(fragment) > heavy(best) {
                best = fragment;
            }
        }

        let mut remap = vec![usize::MAX; self.atoms.len()];
        for (new, &old) in best.iter().enumerate() {
            remap[old] = new;
        }
        let atoms = best.iter().map(|&i| self.atoms[i].clone()).collect();
        let bonds = self
            .bonds
            .iter()
            .filter(|b| remap[b.atom1] != usize::MAX)
            .map(|b| Bond {
                atom1: remap[b.atom1],
                atom2: remap[b.atom2],
                order: b.order,
            })
            .collect();
        Molecule::new(atoms, bonds)
    }

    /// Number of non-hydrogen atoms.
    pub fn heavy_atom_count(&self) -> usize {
        self.atoms.iter().filter(|a| a.is_heavy()).count()
    }

    /// Graph degree of an atom (number of explicit bonds).
    pub fn degree(&self, atom_idx: usize) -> usize {
        self.adjacency[atom_idx].len()
    }

    /// Number of heavy-atom neighbors.
    pub fn heavy_degree(&self, atom_idx: usize) -> usize {
        self.adjacency[atom_idx]
            .iter()
            .filter(|&&(n, _)| self.atoms[n].is_heavy())
            .count()
    }

    /// Order of the bond between two atoms, if any.
    pub fn bond_order(&self, a1: usize, a2: usize) -> Option<BondOrder> {
        self.adjacency[a1]
            .iter()
            .find(|&&(n, _)| n == a2)
            .map(|&(_, bi)| self.bonds[bi].order)
    }

    /// Hydrogens attached to an atom, implicit plus explicit H neighbors.
    pub fn hydrogen_count(&self, atom_idx: usize) -> usize {
        let explicit = self.adjacency[atom_idx]
            .iter()
            .filter(|&&(n, _)| self.atoms[n].atomic_number == 1)
            .count();
        explicit + self.atoms[atom_idx].implicit_hydrogens as usize
    }

    /// Total hydrogen count (implicit + explicit H atoms).
    pub fn total_hydrogen_count(&self) -> usize {
        let explicit = self.atoms.iter().filter(|a| a.atomic_number == 1).count();
        let implicit: usize = self.atoms.iter().map(|a| a.implicit_hydrogens as usize).sum();
        explicit + implicit
    }

    /// Ring membership per bond.
    ///
    /// A bond is in a ring when its endpoints stay connected after removing it.
    pub fn ring_bonds(&self) -> Vec<bool> {
        (0..self.bonds.len())
            .map(|bi| {
                let bond = &self.bonds[bi];
                self.connected_without(bond.atom1, bond.atom2, bi)
            })
            .collect()
    }

    /// Ring membership per atom.
    pub fn ring_atoms(&self) -> Vec<bool> {
        let mut in_ring = vec![false; self.atoms.len()];
        for (bond, ring) in self.bonds.iter().zip(self.ring_bonds()) {
            if ring {
                in_ring[bond.atom1] = true;
                in_ring[bond.atom2] = true;
            }
        }
        in_ring
    }

    /// All-pairs topological distances (BFS from each atom).
    /// Unreachable pairs are `usize::MAX`.
    pub fn shortest_paths(&self) -> Vec<Vec<usize>> {
        let n = self.atom_count();
        let mut dist = vec![vec![usize::MAX; n]; n];

        for (start, row) in dist.iter_mut().enumerate() {
            row[start] = 0;
            let mut queue = VecDeque::new();
            queue.push_back(start);
            while let Some(curr) = queue.pop_front() {
                for &(neighbor, _) in &self.adjacency[curr] {
                    if row[neighbor] == usize::MAX {
                        row[neighbor] = row[curr] + 1;
                        queue.push_back(neighbor);
                    }
                }
            }
        }
        dist
    }

    fn connected_without(&self, from: usize, to: usize, skip_bond: usize) -> bool {
        let mut seen = vec![false; self.atoms.len()];
        let mut queue = VecDeque::new();
        seen[from] = true;
        queue.push_back(from);
        while let Some(curr) = queue.pop_front() {
            for &(neighbor, bi) in &self.adjacency[curr] {
                if bi == skip_bond || seen[neighbor] {
                    continue;
                }
                if neighbor == to {
                    return true;
                }
                seen[neighbor] = true;
                queue.push_back(neighbor);
            }
        }
        false
    }
}
