//! Subset determinization for acceptors.

use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::fst::{Arc, Label, StateId, VectorFst};
use crate::semiring::Semiring;

/// Determinizes an epsilon-free acceptor by subset construction.
///
/// Arc weights must be `One` (weighted machines go through the encoder
/// first, which folds weights into labels); final weights of merged states
/// are summed with `plus`. The result has at most one arc per label out of
/// every state.
pub fn determinize<W: Semiring>(fst: &VectorFst<W>) -> VectorFst<W> {
    let mut out = VectorFst::new();
    out.copy_symbols_from(fst);
    let Some(start) = fst.start() else {
        return out;
    };

    let mut ids: HashMap<Vec<StateId>, StateId> = HashMap::new();
    let mut queue: VecDeque<Vec<StateId>> = VecDeque::new();

    let start_subset = vec![start];
    let s = out.add_state();
    out.set_start(s);
    out.set_final(s, fst.final_weight(start));
    ids.insert(start_subset.clone(), s);
    queue.push_back(start_subset);

    while let Some(subset) = queue.pop_front() {
        let from = ids[&subset];
        let mut targets: BTreeMap<Label, Vec<StateId>> = BTreeMap::new();
        for &member in &subset {
            for arc in fst.arcs(member) {
                targets.entry(arc.ilabel).or_default().push(arc.nextstate);
            }
        }
        for (label, mut members) in targets {
            members.sort_unstable();
            members.dedup();
            let to = match ids.get(&members) {
                Some(&existing) => existing,
                None => {
                    let s = out.add_state();
                    let mut final_weight = W::zero();
                    for &m in &members {
                        final_weight = final_weight.plus(fst.final_weight(m));
                    }
                    out.set_final(s, final_weight);
                    ids.insert(members.clone(), s);
                    queue.push_back(members);
                    s
                }
            };
            out.add_arc(from, Arc::new(label, label, W::one(), to));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::union::union;
    use crate::props::is_input_deterministic;
    use crate::algo::rmepsilon::rm_epsilon;
    use crate::testing::{accepts, acceptor};

    #[test]
    fn determinize_merges_shared_prefixes() {
        let mut lang = acceptor("cat");
        let cab = acceptor("cab");
        union(&mut lang, &cab);
        rm_epsilon(&mut lang);
        let det = determinize(&lang);
        assert!(is_input_deterministic(&det));
        assert!(accepts(&det, "cat"));
        assert!(accepts(&det, "cab"));
        assert!(!accepts(&det, "ca"));
    }

    #[test]
    fn determinize_preserves_language_of_linear_machine() {
        let det = determinize(&acceptor("abc"));
        assert!(accepts(&det, "abc"));
        assert!(!accepts(&det, "ab"));
    }
}
