//! Shortest distances, best-path pruning, and string extraction.
//!
//! These support the assertion primitives, which need "the best output" of
//! a machine. They are only meaningful in path semirings (tropical); the
//! registry does not expose assertions for log arcs.

use std::collections::HashMap;

use crate::algo::connect::connect;
use crate::fst::{Arc, Label, StateId, VectorFst, EPSILON};
use crate::semiring::Semiring;

const MAX_PASSES: usize = 64;

/// Generic single-source shortest distance from the start (or, reversed,
/// to the final states). `dist[s]` is the `plus`-sum over paths.
pub fn shortest_distance<W: Semiring>(fst: &VectorFst<W>, reverse: bool) -> Vec<W> {
    let n = fst.num_states();
    let mut dist = vec![W::zero(); n];
    let mut residual = vec![W::zero(); n];
    let mut queue: Vec<StateId> = Vec::new();

    // In reverse mode we walk predecessor lists from the final states.
    let mut preds: Vec<Vec<(StateId, W)>> = vec![Vec::new(); n];
    if reverse {
        for s in fst.states() {
            for arc in fst.arcs(s) {
                preds[arc.nextstate].push((s, arc.weight));
            }
        }
        for s in fst.states() {
            let w = fst.final_weight(s);
            if w != W::zero() {
                dist[s] = w;
                residual[s] = w;
                queue.push(s);
            }
        }
    } else if let Some(start) = fst.start() {
        dist[start] = W::one();
        residual[start] = W::one();
        queue.push(start);
    }

    let mut pops = 0;
    while let Some(s) = queue.pop() {
        pops += 1;
        if pops > MAX_PASSES * (n + 1) {
            break;
        }
        let rs = residual[s];
        residual[s] = W::zero();
        if rs == W::zero() {
            continue;
        }
        let step = |t: StateId,
                    w: W,
                    dist: &mut Vec<W>,
                    residual: &mut Vec<W>,
                    queue: &mut Vec<StateId>| {
            let via = rs.times(w);
            let new = dist[t].plus(via);
            if !new.approx_eq(dist[t]) {
                dist[t] = new;
                residual[t] = residual[t].plus(via);
                if !queue.contains(&t) {
                    queue.push(t);
                }
            }
        };
        if reverse {
            for &(p, w) in &preds[s] {
                step(p, w, &mut dist, &mut residual, &mut queue);
            }
        } else {
            for arc in fst.arcs(s) {
                step(arc.nextstate, arc.weight, &mut dist, &mut residual, &mut queue);
            }
        }
    }
    dist
}

/// Total weight of the machine: the `plus`-sum over all successful paths.
pub fn total_weight<W: Semiring>(fst: &VectorFst<W>) -> W {
    match fst.start() {
        Some(start) => shortest_distance(fst, true)[start],
        None => W::zero(),
    }
}

/// Prunes in place to the paths whose weight equals the best total weight
/// (within convergence error). Path semirings only.
pub fn prune_to_best<W: Semiring>(fst: &mut VectorFst<W>) {
    let n = fst.num_states();
    if n == 0 {
        return;
    }
    let alpha = shortest_distance(fst, false);
    let beta = shortest_distance(fst, true);
    let best = total_weight(fst);
    if best == W::zero() {
        fst.clear_states();
        return;
    }
    let keep = |w: W| w.approx_eq(best) || !best.natural_less(w);
    for s in 0..n {
        let final_total = alpha[s].times(fst.final_weight(s));
        if fst.final_weight(s) != W::zero() && !keep(final_total) {
            fst.set_final(s, W::zero());
        }
        let alpha_s = alpha[s];
        fst.arcs_mut(s)
            .retain(|arc| keep(alpha_s.times(arc.weight).times(beta[arc.nextstate])));
    }
    connect(fst);
}

/// Labels of one best path through an acceptor, epsilons dropped.
///
/// Walks greedily along arcs consistent with the reverse distances, so it
/// needs the path property to be meaningful. Returns `None` when the
/// machine accepts nothing or the walk fails to terminate.
pub fn shortest_path_labels<W: Semiring>(fst: &VectorFst<W>) -> Option<Vec<Label>> {
    let start = fst.start()?;
    let beta = shortest_distance(fst, true);
    if beta[start] == W::zero() {
        return None;
    }
    let mut labels = Vec::new();
    let mut state = start;
    let mut steps = 0;
    let step_limit = fst.num_states() * MAX_PASSES + 16;
    loop {
        // Stop as soon as finishing here is as good as continuing.
        let final_weight = fst.final_weight(state);
        if final_weight != W::zero() && final_weight.approx_eq(beta[state]) {
            return Some(labels);
        }
        let mut chosen: Option<&Arc<W>> = None;
        for arc in fst.arcs(state) {
            if arc.weight.times(beta[arc.nextstate]).approx_eq(beta[state]) {
                chosen = Some(arc);
                break;
            }
        }
        let arc = chosen?;
        if arc.ilabel != EPSILON {
            labels.push(arc.ilabel);
        }
        state = arc.nextstate;
        steps += 1;
        if steps > step_limit {
            return None;
        }
    }
}

/// Renders best-path labels as text for diagnostics: printable bytes become
/// characters, anything else (generated labels included) a bracketed
/// number or symbol via the lookup callback.
pub fn labels_to_text(labels: &[Label], lookup: impl Fn(Label) -> Option<String>) -> String {
    let mut text = String::new();
    for &label in labels {
        if (0x20..0x7F).contains(&label) {
            text.push(label as u8 as char);
        } else if let Some(symbol) = lookup(label) {
            text.push('[');
            text.push_str(&symbol);
            text.push(']');
        } else {
            text.push_str(&format!("[{}]", label));
        }
    }
    text
}

/// Arbitrary-path fallback used by tests and debug output: the `plus`-sum
/// weight of each distinct accepted label sequence, up to a path cap.
pub fn path_weights<W: Semiring>(fst: &VectorFst<W>, cap: usize) -> HashMap<Vec<Label>, W> {
    let mut out: HashMap<Vec<Label>, W> = HashMap::new();
    let Some(start) = fst.start() else {
        return out;
    };
    let mut stack: Vec<(StateId, Vec<Label>, W, usize)> = vec![(start, Vec::new(), W::one(), 0)];
    while let Some((s, labels, weight, depth)) = stack.pop() {
        if out.len() >= cap || depth > 4 * (fst.num_states() + 1) {
            break;
        }
        let final_weight = fst.final_weight(s);
        if final_weight != W::zero() {
            let total = weight.times(final_weight);
            let entry = out.entry(labels.clone()).or_insert_with(W::zero);
            *entry = entry.plus(total);
        }
        for arc in fst.arcs(s) {
            let mut next_labels = labels.clone();
            if arc.ilabel != EPSILON {
                next_labels.push(arc.ilabel);
            }
            stack.push((arc.nextstate, next_labels, weight.times(arc.weight), depth + 1));
        }
    }
    out
}
