//! Label/weight encoding.
//!
//! Determinization and minimization here operate on unweighted acceptors.
//! Transducers and weighted machines are first encoded: each distinct
//! (ilabel, olabel, weight) triple becomes a fresh label of an acceptor
//! with `One` arc weights. After optimization the table decodes the result
//! back. Final weights stay in place through the round trip.

use std::collections::HashMap;

use crate::fst::{Arc, Label, VectorFst};
use crate::semiring::Semiring;

/// Bidirectional map between arc triples and encoded labels.
pub struct EncodeTable<W: Semiring> {
    triples: Vec<(Label, Label, W)>,
    ids: HashMap<(Label, Label, u64), Label>,
}

impl<W: Semiring> EncodeTable<W> {
    pub fn new() -> Self {
        Self { triples: Vec::new(), ids: HashMap::new() }
    }

    /// Encoded label for a triple, allocating one if unseen. Labels start
    /// at 1; 0 stays reserved for epsilon.
    pub fn key(&mut self, ilabel: Label, olabel: Label, weight: W) -> Label {
        let id = (ilabel, olabel, weight.key_bits());
        if let Some(&label) = self.ids.get(&id) {
            return label;
        }
        self.triples.push((ilabel, olabel, weight));
        let label = self.triples.len() as Label;
        self.ids.insert(id, label);
        label
    }

    /// The triple behind an encoded label.
    pub fn triple(&self, label: Label) -> (Label, Label, W) {
        self.triples[(label - 1) as usize]
    }
}

impl<W: Semiring> Default for EncodeTable<W> {
    fn default() -> Self {
        Self::new()
    }
}

/// Encodes a machine into an unweighted acceptor over triple labels.
pub fn encode<W: Semiring>(fst: &VectorFst<W>, table: &mut EncodeTable<W>) -> VectorFst<W> {
    let mut out = VectorFst::new();
    out.copy_symbols_from(fst);
    for _ in fst.states() {
        out.add_state();
    }
    if let Some(s) = fst.start() {
        out.set_start(s);
    }
    for s in fst.states() {
        out.set_final(s, fst.final_weight(s));
        for arc in fst.arcs(s) {
            let label = table.key(arc.ilabel, arc.olabel, arc.weight);
            out.add_arc(s, Arc::new(label, label, W::one(), arc.nextstate));
        }
    }
    out
}

/// Inverse of [`encode`].
pub fn decode<W: Semiring>(fst: &VectorFst<W>, table: &EncodeTable<W>) -> VectorFst<W> {
    let mut out = VectorFst::new();
    out.copy_symbols_from(fst);
    for _ in fst.states() {
        out.add_state();
    }
    if let Some(s) = fst.start() {
        out.set_start(s);
    }
    for s in fst.states() {
        out.set_final(s, fst.final_weight(s));
        for arc in fst.arcs(s) {
            let (ilabel, olabel, weight) = table.triple(arc.ilabel);
            out.add_arc(s, Arc::new(ilabel, olabel, weight.times(arc.weight), arc.nextstate));
        }
    }
    out
}
