//! Machine cleanup: epsilon removal, determinization, minimization.

use crate::algo::connect::connect;
use crate::algo::determinize::determinize;
use crate::algo::encode::{decode, encode, EncodeTable};
use crate::algo::map::{arc_sort, SortType};
use crate::algo::minimize::minimize;
use crate::algo::rmepsilon::rm_epsilon;
use crate::fst::VectorFst;
use crate::props;
use crate::semiring::Semiring;

/// Optimizes a machine in place: epsilon removal, then determinization and
/// minimization. Unweighted acceptors take the direct path; anything else
/// is label/weight-encoded first so the subset construction stays exact.
pub fn optimize<W: Semiring>(fst: &mut VectorFst<W>) {
    connect(fst);
    if fst.start().is_none() {
        return;
    }
    if !props::is_epsilon_free(fst) {
        rm_epsilon(fst);
    }
    if fst.start().is_none() {
        return;
    }
    if props::is_acceptor(fst) && props::is_unweighted(fst) {
        let mut det = determinize(fst);
        minimize(&mut det);
        *fst = det;
    } else {
        let mut table = EncodeTable::new();
        let encoded = encode(fst, &mut table);
        let mut det = determinize(&encoded);
        minimize(&mut det);
        *fst = decode(&det, &table);
    }
}

/// Shapes the right-hand side of a difference: epsilon-free, deterministic,
/// input-sorted. The caller has already checked it is an unweighted
/// acceptor.
pub fn optimize_difference_rhs<W: Semiring>(fst: &mut VectorFst<W>) {
    if !props::is_epsilon_free(fst) {
        rm_epsilon(fst);
    }
    if !props::is_input_deterministic(fst) {
        *fst = determinize(fst);
    }
    arc_sort(fst, SortType::ILabel);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::compose::compose;
    use crate::algo::union::union;
    use crate::props::{is_epsilon_free, is_input_deterministic};
    use crate::testing::{accepts, acceptor, byte_labels, linear, relates};

    #[test]
    fn optimize_shrinks_union_of_overlapping_words() {
        let mut lang = acceptor("cat");
        union(&mut lang, &acceptor("cat"));
        let states_before = lang.num_states();
        optimize(&mut lang);
        assert!(lang.num_states() < states_before);
        // Minimal machine for "cat": 4 states.
        assert_eq!(lang.num_states(), 4);
        assert!(accepts(&lang, "cat"));
    }

    #[test]
    fn optimize_preserves_transducer_relation() {
        let up = linear(&[(b'a' as i64, b'b' as i64)]);
        let dn = linear(&[(b'b' as i64, b'c' as i64)]);
        let mut chain = compose(&up, &dn);
        optimize(&mut chain);
        assert!(relates(&chain, &byte_labels("a"), &byte_labels("c")));
        assert_eq!(chain.num_states(), 2);
    }

    #[test]
    fn optimize_of_null_machine_is_null() {
        let mut fst: crate::fst::VectorFst<crate::semiring::TropicalWeight> =
            crate::fst::VectorFst::new();
        optimize(&mut fst);
        assert_eq!(fst.num_states(), 0);
    }

    #[test]
    fn difference_rhs_shape() {
        let mut lang = acceptor("cat");
        union(&mut lang, &acceptor("cab"));
        optimize_difference_rhs(&mut lang);
        assert!(is_epsilon_free(&lang));
        assert!(is_input_deterministic(&lang));
    }
}
