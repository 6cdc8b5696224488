//! SMILES parsing.
//!
//! Supports the organic subset (`B C N O P S F Cl Br I`, aromatic
//! `b c n o p s`), bracket atoms with isotope, chirality, hydrogen count,
//! charge and atom class, explicit bond symbols, branches, ring closures
//! (`0-9` and `%nn`) and dot-separated fragments. Implicit hydrogens are
//! assigned to organic-subset atoms from their default valences.

use crate::elements;
use crate::molecule::{Atom, Bond, BondOrder, Chirality, Molecule};
use std::collections::HashMap;
use thiserror::Error;

/// SMILES syntax errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SmilesError {
    #[error("empty SMILES string")]
    Empty,

    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { pos: usize, ch: char },

    #[error("unknown element '{symbol}' at position {pos}")]
    UnknownElement { pos: usize, symbol: String },

    #[error("unclosed ring bond {0}")]
    UnclosedRing(u32),

    #[error("unbalanced branch at position {0}")]
    UnbalancedBranch(usize),

    #[error("bond symbol without a following atom at position {0}")]
    DanglingBond(usize),

    #[error("invalid bond between atoms {0} and {1}")]
    InvalidBond(usize, usize),

    #[error("conflicting bond orders for ring closure {0}")]
    RingBondConflict(u32),

    #[error("unterminated bracket atom starting at position {0}")]
    UnterminatedBracket(usize),
}

/// Parses a SMILES string into a molecular graph.
pub fn parse_smiles(smiles: &str) -> Result<Molecule, SmilesError> {
    Parser::new(smiles.trim()).parse()
}

const CHIRAL_CLASSES: [&str; 5] = ["TH", "AL", "SP", "TB", "OH"];

struct Parser {
    chars: Vec<char>,
    pos: usize,
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    /// Bracket atoms carry their hydrogen count explicitly
    bracketed: Vec<bool>,
    prev: Option<usize>,
    branches: Vec<usize>,
    /// Pending bond symbol and its position
    pending: Option<(BondOrder, usize)>,
    rings: HashMap<u32, (usize, Option<BondOrder>)>,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            atoms: Vec::new(),
            bonds: Vec::new(),
            bracketed: Vec::new(),
            prev: None,
            branches: Vec::new(),
            pending: None,
            rings: HashMap::new(),
        }
    }

    fn parse(mut self) -> Result<Molecule, SmilesError> {
        if self.chars.is_empty() {
            return Err(SmilesError::Empty);
        }

        while let Some(&c) = self.chars.get(self.pos) {
            match c {
                '(' => {
                    let parent = self.prev.ok_or(SmilesError::UnbalancedBranch(self.pos))?;
                    self.branches.push(parent);
                    self.pos += 1;
                }
                ')' => {
                    if let Some((_, at)) = self.pending {
                        return Err(SmilesError::DanglingBond(at));
                    }
                    let parent = self
                        .branches
                        .pop()
                        .ok_or(SmilesError::UnbalancedBranch(self.pos))?;
                    self.prev = Some(parent);
                    self.pos += 1;
                }
                '-' | '=' | '#' | ':' | '/' | '\\' => {
                    if self.pending.is_some() || self.prev.is_none() {
                        return Err(self.unexpected());
                    }
                    let order = match c {
                        '=' => BondOrder::Double,
                        '#' => BondOrder::Triple,
                        ':' => BondOrder::Aromatic,
                        _ => BondOrder::Single,
                    };
                    self.pending = Some((order, self.pos));
                    self.pos += 1;
                }
                '.' => {
                    if let Some((_, at)) = self.pending {
                        return Err(SmilesError::DanglingBond(at));
                    }
                    self.prev = None;
                    self.pos += 1;
                }
                '0'..='9' => {
                    let number = c.to_digit(10).unwrap_or(0);
                    self.ring_closure(number)?;
                    self.pos += 1;
                }
                '%' => {
                    let tens = self.chars.get(self.pos + 1).and_then(|d| d.to_digit(10));
                    let ones = self.chars.get(self.pos + 2).and_then(|d| d.to_digit(10));
                    match (tens, ones) {
                        (Some(t), Some(o)) => {
                            self.ring_closure(t * 10 + o)?;
                            self.pos += 3;
                        }
                        _ => return Err(self.unexpected()),
                    }
                }
                '[' => {
                    let atom = self.bracket_atom()?;
                    self.add_atom(atom, true)?;
                }
                _ if c.is_ascii_alphabetic() => {
                    let atom = self.organic_atom()?;
                    self.add_atom(atom, false)?;
                }
                _ => return Err(self.unexpected()),
            }
        }

        if let Some((_, at)) = self.pending {
            return Err(SmilesError::DanglingBond(at));
        }
        if !self.branches.is_empty() {
            return Err(SmilesError::UnbalancedBranch(self.chars.len()));
        }
        if let Some(&ring) = self.rings.keys().min() {
            return Err(SmilesError::UnclosedRing(ring));
        }
        if self.atoms.is_empty() {
            return Err(SmilesError::Empty);
        }

        self.assign_implicit_hydrogens();
        Ok(Molecule::new(self.atoms, self.bonds))
    }

    fn unexpected(&self) -> SmilesError {
        SmilesError::UnexpectedChar {
            pos: self.pos,
            ch: self.chars.get(self.pos).copied().unwrap_or('\0'),
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn default_order(&self, a: usize, b: usize) -> BondOrder {
        if self.atoms[a].is_aromatic && self.atoms[b].is_aromatic {
            BondOrder::Aromatic
        } else {
            BondOrder::Single
        }
    }

    fn add_bond(&mut self, a: usize, b: usize, order: BondOrder) -> Result<(), SmilesError> {
        let duplicate = self.bonds.iter().any(|bond| {
            (bond.atom1 == a && bond.atom2 == b) || (bond.atom1 == b && bond.atom2 == a)
        });
        if a == b || duplicate {
            return Err(SmilesError::InvalidBond(a, b));
        }
        self.bonds.push(Bond {
            atom1: a,
            atom2: b,
            order,
        });
        Ok(())
    }

    fn add_atom(&mut self, atom: Atom, bracketed: bool) -> Result<(), SmilesError> {
        let idx = self.atoms.len();
        self.atoms.push(atom);
        self.bracketed.push(bracketed);

        if let Some(prev) = self.prev {
            let order = match self.pending.take() {
                Some((order, _)) => order,
                None => self.default_order(prev, idx),
            };
            self.add_bond(prev, idx, order)?;
        }
        self.prev = Some(idx);
        Ok(())
    }

    fn ring_closure(&mut self, number: u32) -> Result<(), SmilesError> {
        let current = self.prev.ok_or_else(|| self.unexpected())?;
        let pending = self.pending.take().map(|(order, _)| order);

        match self.rings.remove(&number) {
            Some((other, opened)) => {
                let order = match (opened, pending) {
                    (Some(a), Some(b)) if a != b => {
                        return Err(SmilesError::RingBondConflict(number))
                    }
                    (Some(order), _) | (None, Some(order)) => order,
                    (None, None) => self.default_order(other, current),
                };
                self.add_bond(other, current, order)
            }
            None => {
                self.rings.insert(number, (current, pending));
                Ok(())
            }
        }
    }

    fn organic_atom(&mut self) -> Result<Atom, SmilesError> {
        let start = self.pos;
        let c = self.chars[self.pos];
        let (symbol, aromatic, width) = match (c, self.peek(1)) {
            ('C', Some('l')) => ("Cl", false, 2),
            ('B', Some('r')) => ("Br", false, 2),
            ('B', _) => ("B", false, 1),
            ('C', _) => ("C", false, 1),
            ('N', _) => ("N", false, 1),
            ('O', _) => ("O", false, 1),
            ('P', _) => ("P", false, 1),
            ('S', _) => ("S", false, 1),
            ('F', _) => ("F", false, 1),
            ('I', _) => ("I", false, 1),
            ('b', _) => ("B", true, 1),
            ('c', _) => ("C", true, 1),
            ('n', _) => ("N", true, 1),
            ('o', _) => ("O", true, 1),
            ('p', _) => ("P", true, 1),
            ('s', _) => ("S", true, 1),
            _ => {
                return Err(SmilesError::UnknownElement {
                    pos: start,
                    symbol: c.to_string(),
                })
            }
        };

        let element = elements::by_symbol(symbol).ok_or_else(|| SmilesError::UnknownElement {
            pos: start,
            symbol: symbol.to_string(),
        })?;
        self.pos += width;

        let mut atom = Atom::new(element.atomic_number);
        atom.is_aromatic = aromatic;
        Ok(atom)
    }

    fn bracket_atom(&mut self) -> Result<Atom, SmilesError> {
        let start = self.pos;
        self.pos += 1;

        let isotope = self.read_bounded::<u16>()?;

        let c = self
            .peek(0)
            .ok_or(SmilesError::UnterminatedBracket(start))?;
        let (element, aromatic) = if c.is_ascii_lowercase() {
            let two: String = [c, self.peek(1).unwrap_or(' ')].iter().collect();
            if two == "se" || two == "as" {
                self.pos += 2;
                (self.lookup(&capitalize(&two), start)?, true)
            } else if "bcnops".contains(c) {
                self.pos += 1;
                (self.lookup(&c.to_ascii_uppercase().to_string(), start)?, true)
            } else {
                return Err(self.unexpected());
            }
        } else if c.is_ascii_uppercase() {
            let two = self
                .peek(1)
                .filter(|n| n.is_ascii_lowercase())
                .map(|n| format!("{}{}", c, n));
            match two.as_deref().and_then(elements::by_symbol) {
                Some(element) => {
                    self.pos += 2;
                    (element, false)
                }
                None => {
                    self.pos += 1;
                    (self.lookup(&c.to_string(), start)?, false)
                }
            }
        } else {
            return Err(self.unexpected());
        };

        let mut atom = Atom::new(element.atomic_number);
        atom.is_aromatic = aromatic;
        atom.isotope = isotope;

        if self.peek(0) == Some('@') {
            self.pos += 1;
            atom.chirality = if self.peek(0) == Some('@') {
                self.pos += 1;
                Chirality::Clockwise
            } else {
                Chirality::CounterClockwise
            };
            let class: String = [self.peek(0).unwrap_or(' '), self.peek(1).unwrap_or(' ')]
                .iter()
                .collect();
            if CHIRAL_CLASSES.contains(&class.as_str()) {
                self.pos += 2;
                self.read_number();
            }
        }

        if self.peek(0) == Some('H') {
            self.pos += 1;
            atom.implicit_hydrogens = self.read_bounded::<u8>()?.unwrap_or(1);
        }

        if let Some(sign @ ('+' | '-')) = self.peek(0) {
            self.pos += 1;
            let digits_at = self.pos;
            let magnitude = match self.read_number() {
                Some(n) => n,
                None => {
                    let mut count = 1u32;
                    while self.peek(0) == Some(sign) {
                        count = count.saturating_add(1);
                        self.pos += 1;
                    }
                    count
                }
            };
            // |charge| <= 127 so negation cannot overflow
            let magnitude = i8::try_from(magnitude).map_err(|_| SmilesError::UnexpectedChar {
                pos: digits_at,
                ch: self.chars.get(digits_at).copied().unwrap_or(sign),
            })?;
            atom.formal_charge = if sign == '+' { magnitude } else { -magnitude };
        }

        if self.peek(0) == Some(':') {
            self.pos += 1;
            self.read_number();
        }

        match self.peek(0) {
            Some(']') => {
                self.pos += 1;
                Ok(atom)
            }
            Some(_) => Err(self.unexpected()),
            None => Err(SmilesError::UnterminatedBracket(start)),
        }
    }

    fn lookup(&self, symbol: &str, pos: usize) -> Result<&'static elements::Element, SmilesError> {
        elements::by_symbol(symbol).ok_or_else(|| SmilesError::UnknownElement {
            pos,
            symbol: symbol.to_string(),
        })
    }

    fn read_number(&mut self) -> Option<u32> {
        let mut value: Option<u32> = None;
        while let Some(d) = self.peek(0).and_then(|c| c.to_digit(10)) {
            value = Some(value.unwrap_or(0).saturating_mul(10).saturating_add(d));
            self.pos += 1;
        }
        value
    }

    /// Reads a number that must fit in `T`; out-of-range values are rejected.
    fn read_bounded<T: TryFrom<u32>>(&mut self) -> Result<Option<T>, SmilesError> {
        let start = self.pos;
        match self.read_number() {
            None => Ok(None),
            Some(n) => T::try_from(n).map(Some).map_err(|_| SmilesError::UnexpectedChar {
                pos: start,
                ch: self.chars.get(start).copied().unwrap_or('\0'),
            }),
        }
    }

    fn assign_implicit_hydrogens(&mut self) {
        let mut used = vec![0u32; self.atoms.len()];
        for bond in &self.bonds {
            used[bond.atom1] += bond.order.valence() as u32;
            used[bond.atom2] += bond.order.valence() as u32;
        }

        for (idx, atom) in self.atoms.iter_mut().enumerate() {
            if self.bracketed[idx] {
                continue;
            }
            let Some(element) = elements::by_number(atom.atomic_number) else {
                continue;
            };
            let valences = if atom.is_aromatic {
                &element.valences[..element.valences.len().min(1)]
            } else {
                element.valences
            };
            let demand = used[idx] + atom.is_aromatic as u32;
            atom.implicit_hydrogens = valences
                .iter()
                .map(|&v| v as u32)
                .find(|&v| v >= demand)
                .map_or(0, |v| (v - demand) as u8);
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ethanol() {
        let mol = parse_smiles("CCO").unwrap();
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(mol.bond_count(), 2);
        assert_eq!(mol.atoms[0].implicit_hydrogens, 3);
        assert_eq!(mol.atoms[1].implicit_hydrogens, 2);
        assert_eq!(mol.atoms[2].implicit_hydrogens, 1);
        assert_eq!(mol.total_hydrogen_count(), 6);
    }

    #[test]
    fn parses_aromatic_ring() {
        let mol = parse_smiles("c1ccccc1").unwrap();
        assert_eq!(mol.atom_count(), 6);
        assert_eq!(mol.bond_count(), 6);
        assert!(mol.bonds.iter().all(|b| b.order == BondOrder::Aromatic));
        assert!(mol.atoms.iter().all(|a| a.implicit_hydrogens == 1));
        assert!(mol.ring_atoms().iter().all(|&r| r));
    }

    #[test]
    fn parses_heteroaromatics() {
        let pyridine = parse_smiles("c1ccncc1").unwrap();
        assert_eq!(pyridine.atoms[3].implicit_hydrogens, 0);

        let thiophene = parse_smiles("c1ccsc1").unwrap();
        assert_eq!(thiophene.atoms[3].implicit_hydrogens, 0);

        let pyrrole = parse_smiles("c1cc[nH]c1").unwrap();
        assert_eq!(pyrrole.atoms[3].implicit_hydrogens, 1);
    }

    #[test]
    fn parses_branches_and_bond_orders() {
        let mol = parse_smiles("CC(=O)O").unwrap();
        assert_eq!(mol.atom_count(), 4);
        assert_eq!(mol.bond_order(1, 2), Some(BondOrder::Double));
        assert_eq!(mol.bond_order(1, 3), Some(BondOrder::Single));
        assert_eq!(mol.atoms[2].implicit_hydrogens, 0);
        assert_eq!(mol.atoms[3].implicit_hydrogens, 1);

        let nitrile = parse_smiles("CC#N").unwrap();
        assert_eq!(nitrile.bond_order(1, 2), Some(BondOrder::Triple));
    }

    #[test]
    fn parses_bracket_atoms() {
        let mol = parse_smiles("[13CH3][C@@H](N)C(=O)[O-]").unwrap();
        assert_eq!(mol.atoms[0].isotope, Some(13));
        assert_eq!(mol.atoms[0].implicit_hydrogens, 3);
        assert_eq!(mol.atoms[1].chirality, Chirality::Clockwise);
        assert_eq!(mol.atoms[1].implicit_hydrogens, 1);
        assert_eq!(mol.atoms[5].formal_charge, -1);

        let salt = parse_smiles("[Na+].[Cl-]").unwrap();
        assert_eq!(salt.atom_count(), 2);
        assert_eq!(salt.bond_count(), 0);
        assert_eq!(salt.atoms[0].formal_charge, 1);
    }

    #[test]
    fn parses_two_letter_halogens_and_percent_rings() {
        let mol = parse_smiles("ClC%10CCC%10Br").unwrap();
        assert_eq!(mol.atoms[0].atomic_number, 17);
        assert_eq!(mol.atoms[5].atomic_number, 35);
        assert_eq!(mol.bond_order(1, 4), Some(BondOrder::Single));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(parse_smiles(""), Err(SmilesError::Empty)));
        assert!(matches!(parse_smiles("C1CC"), Err(SmilesError::UnclosedRing(1))));
        assert!(matches!(parse_smiles("CC(C"), Err(SmilesError::UnbalancedBranch(_))));
        assert!(matches!(parse_smiles("CC)C"), Err(SmilesError::UnbalancedBranch(_))));
        assert!(matches!(parse_smiles("CC="), Err(SmilesError::DanglingBond(_))));
        assert!(matches!(parse_smiles("CXC"), Err(SmilesError::UnknownElement { .. })));
        assert!(matches!(parse_smiles("C[Xx]"), Err(SmilesError::UnknownElement { .. })));
        assert!(matches!(parse_smiles("C[CH3"), Err(SmilesError::UnterminatedBracket(_))));
        assert!(matches!(parse_smiles("C11"), Err(SmilesError::InvalidBond(_, _))));
        assert!(parse_smiles("not a smiles").is_err());
    }

    #[test]
    fn out_of_range_numbers_are_errors() {
        assert!(matches!(parse_smiles("[C-128]"), Err(SmilesError::UnexpectedChar { .. })));
        assert!(matches!(parse_smiles("[N+300]"), Err(SmilesError::UnexpectedChar { .. })));
        assert!(matches!(parse_smiles("[CH300]"), Err(SmilesError::UnexpectedChar { .. })));
        assert!(matches!(parse_smiles("[70000C]"), Err(SmilesError::UnexpectedChar { .. })));

        let long_run = format!("[C{}]", "+".repeat(200));
        assert!(matches!(parse_smiles(&long_run), Err(SmilesError::UnexpectedChar { .. })));

        assert_eq!(parse_smiles("[C-127]").unwrap().atoms[0].formal_charge, -127);
        assert_eq!(parse_smiles("[Fe+++]").unwrap().atoms[0].formal_charge, 3);
    }
}
