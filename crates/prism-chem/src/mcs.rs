//! Maximum common substructure search.
//!
//! Finds the largest connected induced common subgraph of two molecules.
//! Atoms match on element and aromaticity, bonds on order. The search is
//! exhaustive branch-and-bound, capped by a node budget; when the budget
//! runs out the best mapping found so far is returned.

use crate::molecule::{Atom, Molecule};

/// Default number of search nodes explored per molecule pair.
pub const DEFAULT_NODE_BUDGET: usize = 200_000;

/// Result of an MCS search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McsResult {
    /// Atoms in the common substructure
    pub atoms: usize,
    /// Pairs `(atom in a, atom in b)` of the best mapping
    pub mapping: Vec<(usize, usize)>,
    /// False when the node budget ran out before the search completed
    pub complete: bool,
}

/// Finds the maximum common substructure of two molecules.
pub fn find_mcs(a: &Molecule, b: &Molecule, node_budget: usize) -> McsResult {
    let mut search = Search::new(a, b, node_budget);
    search.run();
    McsResult {
        atoms: search.best.len(),
        mapping: search.best,
        complete: !search.exhausted,
    }
}

fn atoms_match(x: &Atom, y: &Atom) -> bool {
    x.atomic_number == y.atomic_number && x.is_aromatic == y.is_aromatic
}

struct Search<'a> {
    a: &'a Molecule,
    b: &'a Molecule,
    budget: usize,
    nodes: usize,
    exhausted: bool,
    map_a: Vec<Option<usize>>,
    used_b: Vec<bool>,
    excluded_a: Vec<bool>,
    /// Mapped pairs in insertion order
    mapped: Vec<(usize, usize)>,
    best: Vec<(usize, usize)>,
    target: usize,
}

impl<'a> Search<'a> {
    fn new(a: &'a Molecule, b: &'a Molecule, budget: usize) -> Self {
        Self {
            a,
            b,
            budget,
            nodes: 0,
            exhausted: false,
            map_a: vec![None; a.atom_count()],
            used_b: vec![false; b.atom_count()],
            excluded_a: vec![false; a.atom_count()],
            mapped: Vec::new(),
            best: Vec::new(),
            target: a.atom_count().min(b.atom_count()),
        }
    }

    fn done(&self) -> bool {
        self.exhausted || self.best.len() == self.target
    }

    fn run(&mut self) {
        for i in 0..self.a.atom_count() {
            for j in 0..self.b.atom_count() {
                if self.done() {
                    return;
                }
                if !atoms_match(&self.a.atoms[i], &self.b.atoms[j]) {
                    continue;
                }
                self.push(i, j);
                self.extend();
                self.pop();
            }
            // Every connected subgraph containing `i` has been explored.
            self.excluded_a[i] = true;
        }
    }

    fn push(&mut self, i: usize, j: usize) {
        self.map_a[i] = Some(j);
        self.used_b[j] = true;
        self.mapped.push((i, j));
    }

    fn pop(&mut self) {
        if let Some((i, j)) = self.mapped.pop() {
            self.map_a[i] = None;
            self.used_b[j] = false;
        }
    }

    fn extend(&mut self) {
        self.nodes += 1;
        if self.nodes > self.budget {
            self.exhausted = true;
            return;
        }
        if self.mapped.len() > self.best.len() {
            self.best = self.mapped.clone();
        }
        if self.done() {
            return;
        }

        let available_a = (0..self.a.atom_count())
            .filter(|&i| self.map_a[i].is_none() && !self.excluded_a[i])
            .count();
        let available_b = self.b.atom_count() - self.mapped.len();
        if self.mapped.len() + available_a.min(available_b) <= self.best.len() {
            return;
        }

        let Some(next) = self.frontier() else {
            return;
        };

        for j in 0..self.b.atom_count() {
            if self.used_b[j] || !self.consistent(next, j) {
                continue;
            }
            self.push(next, j);
            self.extend();
            self.pop();
            if self.done() {
                return;
            }
        }

        self.excluded_a[next] = true;
        self.extend();
        self.excluded_a[next] = false;
    }

    /// Lowest-index free atom of `a` bonded to the current mapping.
    fn frontier(&self) -> Option<usize> {
        (0..self.a.atom_count()).find(|&i| {
            self.map_a[i].is_none()
                && !self.excluded_a[i]
                && self.a.adjacency[i]
                    .iter()
                    .any(|&(n, _)| self.map_a[n].is_some())
        })
    }

    /// Mapping `i -> j` keeps the common subgraph induced: every bond
    /// between `i` and mapped atoms must exist with the same order in `b`,
    /// and vice versa.
    fn consistent(&self, i: usize, j: usize) -> bool {
        if !atoms_match(&self.a.atoms[i], &self.b.atoms[j]) {
            return false;
        }
        self.mapped
            .iter()
            .all(|&(mi, mj)| self.a.bond_order(i, mi) == self.b.bond_order(j, mj))
    }
}
