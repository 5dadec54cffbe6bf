//! Epsilon removal.

use std::collections::HashMap;

use crate::algo::connect::connect;
use crate::fst::{Arc, StateId, VectorFst};
use crate::semiring::Semiring;

// Convergence cap for cyclic epsilon structures in non-idempotent
// semirings; tropical machines converge long before this.
const MAX_PASSES: usize = 64;

/// Removes epsilon:epsilon arcs in place, folding epsilon-closure weights
/// into the remaining arcs and final weights, then trims.
pub fn rm_epsilon<W: Semiring>(fst: &mut VectorFst<W>) {
    if fst.start().is_none() {
        return;
    }
    let n = fst.num_states();
    let mut new_arcs: Vec<Vec<Arc<W>>> = vec![Vec::new(); n];
    let mut new_finals: Vec<W> = vec![W::zero(); n];
    for q in fst.states() {
        let closure = epsilon_closure(fst, q);
        let mut final_weight = W::zero();
        for (&p, &d) in &closure {
            final_weight = final_weight.plus(d.times(fst.final_weight(p)));
            for arc in fst.arcs(p) {
                if !arc.is_epsilon() {
                    new_arcs[q].push(Arc::new(
                        arc.ilabel,
                        arc.olabel,
                        d.times(arc.weight),
                        arc.nextstate,
                    ));
                }
            }
        }
        new_finals[q] = final_weight;
    }
    for q in fst.states() {
        *fst.arcs_mut(q) = std::mem::take(&mut new_arcs[q]);
        fst.set_final(q, new_finals[q]);
    }
    connect(fst);
}

/// Weighted epsilon closure of `q`: distance over epsilon:epsilon arcs.
///
/// Generic single-source shortest distance with residual weights, so path
/// weights are accumulated exactly once even in non-idempotent semirings.
/// The pass cap bounds cyclic closures that only converge approximately.
fn epsilon_closure<W: Semiring>(fst: &VectorFst<W>, q: StateId) -> HashMap<StateId, W> {
    let mut dist: HashMap<StateId, W> = HashMap::new();
    let mut residual: HashMap<StateId, W> = HashMap::new();
    dist.insert(q, W::one());
    residual.insert(q, W::one());
    let mut queue: Vec<StateId> = vec![q];
    let mut pops = 0;
    while let Some(s) = queue.pop() {
        pops += 1;
        if pops > MAX_PASSES * (fst.num_states() + 1) {
            break;
        }
        let Some(rs) = residual.insert(s, W::zero()) else { continue };
        if rs == W::zero() {
            continue;
        }
        for arc in fst.arcs(s) {
            if !arc.is_epsilon() {
                continue;
            }
            let via = rs.times(arc.weight);
            let old = *dist.get(&arc.nextstate).unwrap_or(&W::zero());
            let new = old.plus(via);
            if !new.approx_eq(old) {
                dist.insert(arc.nextstate, new);
                let r = residual.entry(arc.nextstate).or_insert_with(W::zero);
                *r = r.plus(via);
                if !queue.contains(&arc.nextstate) {
                    queue.push(arc.nextstate);
                }
            }
        }
    }
    dist
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::union::union;
    use crate::props::is_epsilon_free;
    use crate::semiring::{Semiring, TropicalWeight};
    use crate::testing::{accepts, acceptor};

    #[test]
    fn rm_epsilon_preserves_language() {
        let mut lang = acceptor("cat");
        let dog = acceptor("dog");
        union(&mut lang, &dog);
        rm_epsilon(&mut lang);
        assert!(is_epsilon_free(&lang));
        assert!(accepts(&lang, "cat"));
        assert!(accepts(&lang, "dog"));
        assert!(!accepts(&lang, ""));
    }

    #[test]
    fn rm_epsilon_folds_weights() {
        // start -eps(1.5)-> mid -a(0.25)-> end(final 0)
        let mut fst = acceptor("a");
        let real_start = fst.start().unwrap();
        let pre = fst.add_state();
        fst.add_arc(pre, crate::fst::Arc::epsilon(TropicalWeight(1.5), real_start));
        fst.set_start(pre);
        rm_epsilon(&mut fst);
        assert!(is_epsilon_free(&fst));
        let start = fst.start().unwrap();
        let arc = fst.arcs(start)[0];
        assert!(arc.weight.approx_eq(TropicalWeight(1.5)));
    }

    #[test]
    fn rm_epsilon_keeps_epsilon_language_as_final_weight() {
        let mut fst: crate::fst::VectorFst<TropicalWeight> =
            crate::fst::VectorFst::epsilon_machine();
        rm_epsilon(&mut fst);
        assert!(accepts(&fst, ""));
    }
}
