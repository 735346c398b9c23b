//! Fuzzy lattice algebra for combining ranks.
//!
//! A [`Lattice`] supplies the four binary operators the engine combines
//! ranks with: `product` (t-norm, conjunction of independent contributions),
//! `residuum` (fuzzy implication), `infimum` and `supremum` (lattice meet
//! and join). Three standard families are provided; the rest of the engine
//! is parametric over whichever is supplied.
//!
//! A lattice is an explicit configuration value handed to every operator
//! and executor constructor; there is no process-wide selection.

use serde::{Deserialize, Serialize};

/// Named family of fuzzy-logic operators on `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LatticeFamily {
    /// Gödel: minimum t-norm, step residuum.
    Godel,
    /// Goguen: arithmetic product t-norm, ratio residuum.
    #[default]
    Goguen,
    /// Łukasiewicz: bounded-sum t-norm, bounded-difference residuum.
    Lukasiewicz,
}

impl LatticeFamily {
    /// All provided families.
    pub const ALL: [Self; 3] = [Self::Godel, Self::Goguen, Self::Lukasiewicz];

    /// Parse a family from its lowercase name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "godel" => Some(Self::Godel),
            "goguen" => Some(Self::Goguen),
            "lukasiewicz" => Some(Self::Lukasiewicz),
            _ => None,
        }
    }
}

impl std::fmt::Display for LatticeFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Godel => "godel",
            Self::Goguen => "goguen",
            Self::Lukasiewicz => "lukasiewicz",
        };
        f.write_str(name)
    }
}

/// Rank-combination operators of one family.
///
/// Inputs are expected in `[0, 1]`; the operators preserve that range but
/// do not clamp out-of-range inputs (the bound is the caller's invariant,
/// as it is for record ranks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Lattice {
    family: LatticeFamily,
}

impl Lattice {
    /// Lattice over the given family.
    pub const fn new(family: LatticeFamily) -> Self {
        Self { family }
    }

    /// The family this lattice was built from.
    pub const fn family(&self) -> LatticeFamily {
        self.family
    }

    /// T-norm: conjunction of independent rank contributions.
    pub fn product(&self, a: f64, b: f64) -> f64 {
        match self.family {
            LatticeFamily::Godel => a.min(b),
            LatticeFamily::Goguen => a * b,
            LatticeFamily::Lukasiewicz => (a + b - 1.0).max(0.0),
        }
    }

    /// Residuum: the fuzzy implication adjoint to `product`.
    pub fn residuum(&self, a: f64, b: f64) -> f64 {
        match self.family {
            LatticeFamily::Godel => {
                if a <= b {
                    1.0
                } else {
                    b
                }
            }
            LatticeFamily::Goguen => {
                if a <= b {
                    1.0
                } else {
                    b / a
                }
            }
            LatticeFamily::Lukasiewicz => (1.0 - a + b).min(1.0),
        }
    }

    /// Lattice meet: combines simultaneously-required conditions.
    pub fn infimum(&self, a: f64, b: f64) -> f64 {
        a.min(b)
    }

    /// Lattice join: combines alternative derivations of one fact.
    pub fn supremum(&self, a: f64, b: f64) -> f64 {
        a.max(b)
    }
}

impl From<LatticeFamily> for Lattice {
    fn from(family: LatticeFamily) -> Self {
        Self::new(family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_products() {
        let godel = Lattice::new(LatticeFamily::Godel);
        let goguen = Lattice::new(LatticeFamily::Goguen);
        let luka = Lattice::new(LatticeFamily::Lukasiewicz);

        assert_eq!(godel.product(0.9, 0.8), 0.8);
        assert!((goguen.product(0.9, 0.8) - 0.72).abs() < 1e-12);
        assert!((luka.product(0.9, 0.8) - 0.7).abs() < 1e-12);
        assert_eq!(luka.product(0.4, 0.5), 0.0);
    }

    #[test]
    fn test_product_unit_and_zero() {
        for family in LatticeFamily::ALL {
            let lattice = Lattice::new(family);
            for a in [0.0, 0.25, 0.5, 1.0] {
                assert_eq!(lattice.product(a, 1.0), a, "{family}: 1 is the unit");
                assert_eq!(lattice.product(a, 0.0), 0.0, "{family}: 0 annihilates");
            }
        }
    }

    #[test]
    fn test_residuum() {
        let godel = Lattice::new(LatticeFamily::Godel);
        let goguen = Lattice::new(LatticeFamily::Goguen);
        let luka = Lattice::new(LatticeFamily::Lukasiewicz);

        assert_eq!(godel.residuum(0.3, 0.8), 1.0);
        assert_eq!(godel.residuum(0.8, 0.3), 0.3);
        assert_eq!(goguen.residuum(0.8, 0.4), 0.5);
        assert!((luka.residuum(0.8, 0.3) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_meet_join_are_family_independent() {
        for family in LatticeFamily::ALL {
            let lattice = Lattice::new(family);
            assert_eq!(lattice.infimum(0.3, 0.8), 0.3);
            assert_eq!(lattice.supremum(0.3, 0.8), 0.8);
        }
    }

    #[test]
    fn test_family_parse_roundtrip() {
        for family in LatticeFamily::ALL {
            assert_eq!(LatticeFamily::parse(&family.to_string()), Some(family));
        }
        assert_eq!(LatticeFamily::parse("zadeh"), None);
    }
}
