//! Trimming and topological ordering.

use std::collections::VecDeque;

use crate::fst::{StateId, VectorFst};
use crate::semiring::Semiring;

/// Removes states that are not both accessible from the start and
/// coaccessible to a final state.
pub fn connect<W: Semiring>(fst: &mut VectorFst<W>) {
    let n = fst.num_states();
    let Some(start) = fst.start() else {
        fst.clear_states();
        return;
    };
    // Forward reachability.
    let mut accessible = vec![false; n];
    let mut queue = VecDeque::from([start]);
    accessible[start] = true;
    while let Some(s) = queue.pop_front() {
        for arc in fst.arcs(s) {
            if !accessible[arc.nextstate] {
                accessible[arc.nextstate] = true;
                queue.push_back(arc.nextstate);
            }
        }
    }
    // Backward reachability over reversed arcs.
    let mut preds: Vec<Vec<StateId>> = vec![Vec::new(); n];
    for s in fst.states() {
        for arc in fst.arcs(s) {
            preds[arc.nextstate].push(s);
        }
    }
    let mut coaccessible = vec![false; n];
    let mut queue: VecDeque<StateId> = fst.states().filter(|&s| fst.is_final(s)).collect();
    for &s in &queue {
        coaccessible[s] = true;
    }
    while let Some(s) = queue.pop_front() {
        for &p in &preds[s] {
            if !coaccessible[p] {
                coaccessible[p] = true;
                queue.push_back(p);
            }
        }
    }
    let mut order = vec![None; n];
    let mut next = 0;
    for s in 0..n {
        if accessible[s] && coaccessible[s] {
            order[s] = Some(next);
            next += 1;
        }
    }
    fst.remap_states(&order, next);
}

/// Reorders states topologically (start state first). Returns `false` and
/// leaves the machine untouched if it is cyclic.
pub fn top_sort<W: Semiring>(fst: &mut VectorFst<W>) -> bool {
    let n = fst.num_states();
    let Some(start) = fst.start() else {
        return true;
    };
    // Iterative DFS with cycle detection; roots are the start state first so
    // it lands at position 0, then any remaining states.
    const WHITE: u8 = 0;
    const GRAY: u8 = 1;
    const BLACK: u8 = 2;
    let mut color = vec![WHITE; n];
    let mut postorder: Vec<StateId> = Vec::with_capacity(n);
    let roots = std::iter::once(start).chain(fst.states());
    for root in roots {
        if color[root] != WHITE {
            continue;
        }
        let mut stack: Vec<(StateId, usize)> = vec![(root, 0)];
        color[root] = GRAY;
        while let Some(&(s, idx)) = stack.last() {
            if idx < fst.num_arcs(s) {
                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }
                let target = fst.arcs(s)[idx].nextstate;
                match color[target] {
                    WHITE => {
                        color[target] = GRAY;
                        stack.push((target, 0));
                    }
                    GRAY => return false,
                    _ => {}
                }
            } else {
                color[s] = BLACK;
                postorder.push(s);
                stack.pop();
            }
        }
    }
    let mut order = vec![None; n];
    for (pos, &s) in postorder.iter().rev().enumerate() {
        order[s] = Some(pos);
    }
    fst.remap_states(&order, n);
    true
}
