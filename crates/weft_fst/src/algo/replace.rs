//! Recursive replacement of call labels by component machines.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::algo::connect::connect;
use crate::fst::{Arc, Label, VectorFst};
use crate::semiring::Semiring;

/// Replacement failure: the component machines call each other in a cycle,
/// so the expansion would not terminate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceError {
    pub label: Label,
}

impl fmt::Display for ReplaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cyclic dependency through replacement label {}", self.label)
    }
}

impl std::error::Error for ReplaceError {}

/// Expands `root` by splicing each component machine in place of arcs whose
/// output label names it, recursively. Call arcs lose their labels (the
/// splice is epsilon on both tapes) and contribute their weight on entry.
pub fn replace<W: Semiring>(
    root: Label,
    components: &BTreeMap<Label, VectorFst<W>>,
) -> Result<VectorFst<W>, ReplaceError> {
    let mut memo: HashMap<Label, VectorFst<W>> = HashMap::new();
    let mut stack: Vec<Label> = Vec::new();
    let mut out = expand(root, components, &mut memo, &mut stack)?;
    connect(&mut out);
    Ok(out)
}

fn expand<W: Semiring>(
    label: Label,
    components: &BTreeMap<Label, VectorFst<W>>,
    memo: &mut HashMap<Label, VectorFst<W>>,
    stack: &mut Vec<Label>,
) -> Result<VectorFst<W>, ReplaceError> {
    if let Some(done) = memo.get(&label) {
        return Ok(done.clone());
    }
    if stack.contains(&label) {
        return Err(ReplaceError { label });
    }
    let Some(base) = components.get(&label) else {
        return Err(ReplaceError { label });
    };
    stack.push(label);
    let mut out = base.clone();
    // Collect call sites first; splicing appends states.
    let mut calls: Vec<(usize, usize)> = Vec::new();
    for s in out.states() {
        for (i, arc) in out.arcs(s).iter().enumerate() {
            if components.contains_key(&arc.olabel) && arc.olabel != label {
                calls.push((s, i));
            } else if arc.olabel == label {
                stack.pop();
                return Err(ReplaceError { label });
            }
        }
    }
    for (state, arc_index) in calls {
        let arc = out.arcs(state)[arc_index];
        let sub = expand(arc.olabel, components, memo, stack)?;
        splice(&mut out, state, arc_index, &sub);
    }
    // Drop the consumed call arcs, highest index first per state.
    let mut by_state: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for s in out.states() {
        let dead: Vec<usize> = out
            .arcs(s)
            .iter()
            .enumerate()
            .filter(|(_, a)| components.contains_key(&a.olabel))
            .map(|(i, _)| i)
            .collect();
        if !dead.is_empty() {
            by_state.insert(s, dead);
        }
    }
    for (s, mut dead) in by_state {
        dead.sort_unstable_by(|a, b| b.cmp(a));
        for i in dead {
            out.arcs_mut(s).remove(i);
        }
    }
    stack.pop();
    memo.insert(label, out.clone());
    Ok(out)
}

/// Splices `sub` in place of the call arc `state/arc_index` of `dst`:
/// entry epsilon carries the call arc's weight, exit epsilons carry `sub`'s
/// final weights. The call arc itself is removed by the caller.
fn splice<W: Semiring>(dst: &mut VectorFst<W>, state: usize, arc_index: usize, sub: &VectorFst<W>) {
    let call = dst.arcs(state)[arc_index];
    let offset = dst.num_states();
    for s in sub.states() {
        let ns = dst.add_state();
        for arc in sub.arcs(s) {
            dst.add_arc(ns, Arc::new(arc.ilabel, arc.olabel, arc.weight, arc.nextstate + offset));
        }
    }
    if let Some(sub_start) = sub.start() {
        dst.add_arc(state, Arc::epsilon(call.weight, sub_start + offset));
    }
    for s in sub.states() {
        let w = sub.final_weight(s);
        if w != W::zero() {
            dst.add_arc(offset + s, Arc::epsilon(w, call.nextstate));
        }
    }
}
