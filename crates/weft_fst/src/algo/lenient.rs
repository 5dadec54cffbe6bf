//! Lenient composition.

use crate::algo::compose::compose;
use crate::algo::difference::difference;
use crate::algo::map::{project, rm_weight, ProjectType};
use crate::algo::optimize::optimize_difference_rhs;
use crate::algo::union::union;
use crate::fst::VectorFst;
use crate::semiring::Semiring;

/// Priority union of `left ∘ right` with `left`.
///
/// Inputs on which the composition succeeds use it; all other inputs (the
/// difference of `sigma_star` and the composition's domain) fall back to
/// `left` unconstrained. `sigma_star` is the caller-supplied closure of the
/// whole alphabet.
pub fn leniently_compose<W: Semiring>(
    left: &VectorFst<W>,
    right: &VectorFst<W>,
    sigma_star: &VectorFst<W>,
) -> VectorFst<W> {
    let composed = compose(left, right);
    // Domain of the composition, shaped for use as a difference RHS.
    let mut domain = composed.clone();
    project(&mut domain, ProjectType::Input);
    rm_weight(&mut domain);
    optimize_difference_rhs(&mut domain);
    let outside = difference(sigma_star, &domain);
    let fallback = compose(&outside, left);
    let mut out = composed;
    union(&mut out, &fallback);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::closure::closure_star;
    use crate::fst::Arc;
    use crate::semiring::{Semiring, TropicalWeight};
    use crate::testing::{acceptor, byte_labels, linear, relates};

    fn sigma_star() -> VectorFst<TropicalWeight> {
        // (a|b)* over a two-letter alphabet.
        let mut sigma: VectorFst<TropicalWeight> = VectorFst::new();
        let s = sigma.add_state();
        sigma.set_start(s);
        sigma.set_final(s, TropicalWeight::one());
        for byte in [b'a', b'b'] {
            sigma.add_arc(s, Arc::new(byte as i64, byte as i64, TropicalWeight::one(), s));
        }
        sigma
    }

    #[test]
    fn composition_wins_where_defined() {
        // left: identity on a|b; right: constraint a->a only.
        let mut left = acceptor("a");
        let b = acceptor("b");
        crate::algo::union::union(&mut left, &b);
        let right = acceptor("a");
        let lenient = leniently_compose(&left, &right, &sigma_star());
        // "a" goes through the constraint; "b" survives via the fallback.
        assert!(relates(&lenient, &byte_labels("a"), &byte_labels("a")));
        assert!(relates(&lenient, &byte_labels("b"), &byte_labels("b")));
    }

    #[test]
    fn fallback_preserves_left_relation() {
        // left rewrites a->b everywhere; right only passes "b" outputs of
        // length 2, so single "a" falls back to the bare rewrite.
        let mut left = linear(&[(b'a' as i64, b'b' as i64)]);
        closure_star(&mut left);
        let right = acceptor("bb");
        let lenient = leniently_compose(&left, &right, &sigma_star());
        assert!(relates(&lenient, &byte_labels("aa"), &byte_labels("bb")));
        assert!(relates(&lenient, &byte_labels("a"), &byte_labels("b")));
    }
}
