//! Property-based tests for the lattice algebra and value ordering.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::lattice::{Lattice, LatticeFamily};
    use crate::types::Value;

    /// Strategy for ranks in the unit interval.
    fn arb_rank() -> impl Strategy<Value = f64> {
        (0u32..=1000).prop_map(|i| f64::from(i) / 1000.0)
    }

    fn arb_family() -> impl Strategy<Value = LatticeFamily> {
        prop_oneof![
            Just(LatticeFamily::Godel),
            Just(LatticeFamily::Goguen),
            Just(LatticeFamily::Lukasiewicz),
        ]
    }

    proptest! {
        #[test]
        fn product_commutative(family in arb_family(), a in arb_rank(), b in arb_rank()) {
            let lattice = Lattice::new(family);
            prop_assert!((lattice.product(a, b) - lattice.product(b, a)).abs() < 1e-12);
        }

        #[test]
        fn product_monotone(family in arb_family(), a in arb_rank(), b in arb_rank(), c in arb_rank()) {
            let lattice = Lattice::new(family);
            let (lo, hi) = if b <= c { (b, c) } else { (c, b) };
            prop_assert!(lattice.product(a, lo) <= lattice.product(a, hi) + 1e-12);
        }

        #[test]
        fn product_stays_in_unit_interval(family in arb_family(), a in arb_rank(), b in arb_rank()) {
            let lattice = Lattice::new(family);
            let p = lattice.product(a, b);
            prop_assert!((0.0..=1.0).contains(&p));
        }

        #[test]
        fn residuum_adjunction(family in arb_family(), a in arb_rank(), b in arb_rank(), c in arb_rank()) {
            // product(a, b) <= c  iff  b <= residuum(a, c)
            let lattice = Lattice::new(family);
            let forward = lattice.product(a, b) <= c + 1e-9;
            let backward = b <= lattice.residuum(a, c) + 1e-9;
            prop_assert_eq!(forward, backward);
        }

        #[test]
        fn meet_join_lattice_laws(family in arb_family(), a in arb_rank(), b in arb_rank()) {
            let lattice = Lattice::new(family);
            prop_assert_eq!(lattice.infimum(a, b), lattice.infimum(b, a));
            prop_assert_eq!(lattice.supremum(a, b), lattice.supremum(b, a));
            prop_assert_eq!(lattice.infimum(a, a), a);
            prop_assert_eq!(lattice.supremum(a, a), a);
            // absorption
            prop_assert_eq!(lattice.supremum(a, lattice.infimum(a, b)), a);
            prop_assert_eq!(lattice.infimum(a, lattice.supremum(a, b)), a);
        }

        #[test]
        fn value_ordering_total_within_domain(a in any::<i64>(), b in any::<i64>()) {
            let ord = Value::Int(a).try_cmp(&Value::Int(b)).unwrap();
            prop_assert_eq!(ord, a.cmp(&b));
        }

        #[test]
        fn value_eq_hash_agree(a in any::<i64>(), b in any::<i64>()) {
            use std::collections::hash_map::DefaultHasher;
            use std::hash::{Hash, Hasher};
            let (va, vb) = (Value::Int(a), Value::Int(b));
            if va == vb {
                let mut ha = DefaultHasher::new();
                let mut hb = DefaultHasher::new();
                va.hash(&mut ha);
                vb.hash(&mut hb);
                prop_assert_eq!(ha.finish(), hb.finish());
            }
        }
    }
}
