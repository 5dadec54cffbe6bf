//! Minimization of deterministic acceptors by partition refinement.

use std::collections::HashMap;

use crate::fst::{Arc, Label, VectorFst};
use crate::semiring::Semiring;

/// Minimizes a deterministic, epsilon-free acceptor in place by Moore-style
/// partition refinement. Final weights distinguish blocks, so the quotient
/// is exact for weighted finals produced by determinization.
pub fn minimize<W: Semiring>(fst: &mut VectorFst<W>) {
    let n = fst.num_states();
    if n == 0 {
        return;
    }
    // Initial partition: group by final weight.
    let mut block: Vec<usize> = vec![0; n];
    let mut next_block = 0;
    let mut groups: HashMap<u64, usize> = HashMap::new();
    for s in 0..n {
        let key = fst.final_weight(s).key_bits();
        let b = *groups.entry(key).or_insert_with(|| {
            let b = next_block;
            next_block += 1;
            b
        });
        block[s] = b;
    }
    // Refine until signatures stabilize.
    loop {
        let mut sig_ids: HashMap<(usize, Vec<(Label, usize)>), usize> = HashMap::new();
        let mut new_block = vec![0; n];
        let mut count = 0;
        for s in 0..n {
            let mut sig: Vec<(Label, usize)> = fst
                .arcs(s)
                .iter()
                .map(|a| (a.ilabel, block[a.nextstate]))
                .collect();
            sig.sort_unstable();
            sig.dedup();
            let key = (block[s], sig);
            let b = *sig_ids.entry(key).or_insert_with(|| {
                let b = count;
                count += 1;
                b
            });
            new_block[s] = b;
        }
        let stable = count == next_block;
        block = new_block;
        next_block = count;
        if stable {
            break;
        }
    }
    // Build the quotient.
    let mut quotient = VectorFst::new();
    quotient.copy_symbols_from(fst);
    for _ in 0..next_block {
        quotient.add_state();
    }
    let mut emitted = vec![false; next_block];
    for s in 0..n {
        let b = block[s];
        if emitted[b] {
            continue;
        }
        emitted[b] = true;
        quotient.set_final(b, fst.final_weight(s));
        let mut arcs: Vec<(Label, usize)> = fst
            .arcs(s)
            .iter()
            .map(|a| (a.ilabel, block[a.nextstate]))
            .collect();
        arcs.sort_unstable();
        arcs.dedup();
        for (label, target) in arcs {
            quotient.add_arc(b, Arc::new(label, label, W::one(), target));
        }
    }
    if let Some(start) = fst.start() {
        quotient.set_start(block[start]);
    }
    *fst = quotient;
}
