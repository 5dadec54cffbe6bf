//! On-demand structural properties.
//!
//! The primitive wrappers gate some operations on machine shape (Difference
//! wants an unweighted deterministic acceptor on the right, Optimize picks
//! its pipeline by acceptor-ness). Properties here are computed by a full
//! scan rather than cached bitfields; grammar-sized machines make that
//! cheap.

use crate::fst::{VectorFst, EPSILON};
use crate::semiring::Semiring;

/// True if every arc has matching input and output labels.
pub fn is_acceptor<W: Semiring>(fst: &VectorFst<W>) -> bool {
    fst.states()
        .all(|s| fst.arcs(s).iter().all(|a| a.ilabel == a.olabel))
}

/// True if every arc weight is `One` and every final weight is `One` or
/// `Zero`.
pub fn is_unweighted<W: Semiring>(fst: &VectorFst<W>) -> bool {
    fst.states().all(|s| {
        let final_ok = {
            let w = fst.final_weight(s);
            w == W::zero() || w == W::one()
        };
        final_ok && fst.arcs(s).iter().all(|a| a.weight == W::one())
    })
}

/// True if no arc is epsilon on both tapes.
pub fn is_epsilon_free<W: Semiring>(fst: &VectorFst<W>) -> bool {
    fst.states()
        .all(|s| fst.arcs(s).iter().all(|a| !a.is_epsilon()))
}

/// True if no state has input-epsilon arcs or two arcs sharing an input
/// label.
pub fn is_input_deterministic<W: Semiring>(fst: &VectorFst<W>) -> bool {
    fst.states().all(|s| {
        let mut seen = std::collections::HashSet::new();
        fst.arcs(s)
            .iter()
            .all(|a| a.ilabel != EPSILON && seen.insert(a.ilabel))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fst::Arc;
    use crate::semiring::TropicalWeight;
    use crate::testing::acceptor;

    #[test]
    fn linear_acceptor_properties() {
        let fst = acceptor("ab");
        assert!(is_acceptor(&fst));
        assert!(is_unweighted(&fst));
        assert!(is_epsilon_free(&fst));
        assert!(is_input_deterministic(&fst));
    }

    #[test]
    fn transducer_is_not_acceptor() {
        let mut fst = acceptor("a");
        fst.arcs_mut(0)[0].olabel = b'b' as i64;
        assert!(!is_acceptor(&fst));
    }

    #[test]
    fn weighted_arc_clears_unweighted() {
        let mut fst = acceptor("a");
        fst.arcs_mut(0)[0].weight = TropicalWeight(2.0);
        assert!(!is_unweighted(&fst));
    }

    #[test]
    fn epsilon_arc_detected() {
        let mut fst = acceptor("a");
        let s = fst.add_state();
        fst.add_arc(0, Arc::epsilon(TropicalWeight(0.0), s));
        assert!(!is_epsilon_free(&fst));
        assert!(!is_input_deterministic(&fst));
    }

    #[test]
    fn duplicate_input_labels_are_nondeterministic() {
        let mut fst = acceptor("a");
        let arc = fst.arcs(0)[0];
        fst.add_arc(0, arc);
        assert!(!is_input_deterministic(&fst));
    }
}
