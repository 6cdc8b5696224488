//! Element table for the atoms SMILES input can carry.

/// Static element data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element {
    pub symbol: &'static str,
    pub atomic_number: u8,
    /// Average atomic mass (Da)
    pub mass: f64,
    /// Default valences, ascending. Empty for elements that never get
    /// implicit hydrogens.
    pub valences: &'static [u8],
}

const ELEMENTS: &[Element] = &[
    Element { symbol: "H", atomic_number: 1, mass: 1.008, valences: &[1] },
    Element { symbol: "Li", atomic_number: 3, mass: 6.94, valences: &[] },
    Element { symbol: "B", atomic_number: 5, mass: 10.81, valences: &[3] },
    Element { symbol: "C", atomic_number: 6, mass: 12.011, valences: &[4] },
    Element { symbol: "N", atomic_number: 7, mass: 14.007, valences: &[3, 5] },
    Element { symbol: "O", atomic_number: 8, mass: 15.999, valences: &[2] },
    Element { symbol: "F", atomic_number: 9, mass: 18.998, valences: &[1] },
    Element { symbol: "Na", atomic_number: 11, mass: 22.990, valences: &[] },
    Element { symbol: "Mg", atomic_number: 12, mass: 24.305, valences: &[] },
    Element { symbol: "Si", atomic_number: 14, mass: 28.085, valences: &[4] },
    Element { symbol: "P", atomic_number: 15, mass: 30.974, valences: &[3, 5] },
    Element { symbol: "S", atomic_number: 16, mass: 32.06, valences: &[2, 4, 6] },
    Element { symbol: "Cl", atomic_number: 17, mass: 35.45, valences: &[1] },
    Element { symbol: "K", atomic_number: 19, mass: 39.098, valences: &[] },
    Element { symbol: "Ca", atomic_number: 20, mass: 40.078, valences: &[] },
    Element { symbol: "Fe", atomic_number: 26, mass: 55.845, valences: &[] },
    Element { symbol: "Cu", atomic_number: 29, mass: 63.546, valences: &[] },
    Element { symbol: "Zn", atomic_number: 30, mass: 65.38, valences: &[] },
    Element { symbol: "As", atomic_number: 33, mass: 74.922, valences: &[3, 5] },
    Element { symbol: "Se", atomic_number: 34, mass: 78.971, valences: &[2, 4, 6] },
    Element { symbol: "Br", atomic_number: 35, mass: 79.904, valences: &[1] },
    Element { symbol: "I", atomic_number: 53, mass: 126.904, valences: &[1] },
];

/// Looks up an element by its symbol (case-sensitive).
pub fn by_symbol(symbol: &str) -> Option<&'static Element> {
    ELEMENTS.iter().find(|e| e.symbol == symbol)
}

/// Looks up an element by atomic number.
pub fn by_number(atomic_number: u8) -> Option<&'static Element> {
    ELEMENTS.iter().find(|e| e.atomic_number == atomic_number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_round_trips() {
        let cl = by_symbol("Cl").unwrap();
        assert_eq!(cl.atomic_number, 17);
        assert_eq!(by_number(17).unwrap().symbol, "Cl");
        assert!(by_symbol("cl").is_none());
        assert!(by_symbol("Xx").is_none());
    }
}
