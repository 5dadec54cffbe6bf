//! The mutable vector-backed FST.
//!
//! States are dense indices into a vector; each state owns its outgoing
//! arcs and a final weight (`zero` means non-final). Labels are `i64`:
//! 0 is epsilon, bytes and Unicode code points use their natural values,
//! and generated labels live in a private range starting at 0xF0000.
//!
//! Input/output symbol tables are optional attachments shared through
//! `Arc`, so re-attaching a canonical table is cheap and identity
//! comparisons can short-circuit.

use serde::{Deserialize, Serialize};

use crate::semiring::Semiring;
use crate::symtab::SymbolTable;

/// Arc label. 0 is epsilon.
pub type Label = i64;

/// Dense state index.
pub type StateId = usize;

/// The epsilon label.
pub const EPSILON: Label = 0;

/// Sentinel for "no label", used by remap lookups.
pub const NO_LABEL: Label = -1;

/// A transition: input label, output label, weight, target state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Arc<W: Semiring> {
    pub ilabel: Label,
    pub olabel: Label,
    pub weight: W,
    pub nextstate: StateId,
}

impl<W: Semiring> Arc<W> {
    pub fn new(ilabel: Label, olabel: Label, weight: W, nextstate: StateId) -> Self {
        Self { ilabel, olabel, weight, nextstate }
    }

    /// An epsilon:epsilon arc.
    pub fn epsilon(weight: W, nextstate: StateId) -> Self {
        Self::new(EPSILON, EPSILON, weight, nextstate)
    }

    /// True if both labels are epsilon.
    pub fn is_epsilon(&self) -> bool {
        self.ilabel == EPSILON && self.olabel == EPSILON
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
struct State<W: Semiring> {
    arcs: Vec<Arc<W>>,
    final_weight: W,
}

impl<W: Semiring> State<W> {
    fn new() -> Self {
        Self { arcs: Vec::new(), final_weight: W::zero() }
    }
}

/// A weighted finite-state transducer with mutable vector storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct VectorFst<W: Semiring> {
    states: Vec<State<W>>,
    start: Option<StateId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    isymbols: Option<std::sync::Arc<SymbolTable>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    osymbols: Option<std::sync::Arc<SymbolTable>>,
}

impl<W: Semiring> VectorFst<W> {
    /// An FST with no states (the null machine).
    pub fn new() -> Self {
        Self { states: Vec::new(), start: None, isymbols: None, osymbols: None }
    }

    /// The single-state acceptor of the empty string.
    pub fn epsilon_machine() -> Self {
        let mut fst = Self::new();
        let s = fst.add_state();
        fst.set_start(s);
        fst.set_final(s, W::one());
        fst
    }

    pub fn add_state(&mut self) -> StateId {
        self.states.push(State::new());
        self.states.len() - 1
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn set_start(&mut self, state: StateId) {
        self.start = Some(state);
    }

    pub fn start(&self) -> Option<StateId> {
        self.start
    }

    pub fn set_final(&mut self, state: StateId, weight: W) {
        self.states[state].final_weight = weight;
    }

    /// Final weight of `state`; `zero` for non-final states.
    pub fn final_weight(&self, state: StateId) -> W {
        self.states[state].final_weight
    }

    pub fn is_final(&self, state: StateId) -> bool {
        self.states[state].final_weight != W::zero()
    }

    pub fn add_arc(&mut self, state: StateId, arc: Arc<W>) {
        self.states[state].arcs.push(arc);
    }

    pub fn arcs(&self, state: StateId) -> &[Arc<W>] {
        &self.states[state].arcs
    }

    pub fn arcs_mut(&mut self, state: StateId) -> &mut Vec<Arc<W>> {
        &mut self.states[state].arcs
    }

    pub fn num_arcs(&self, state: StateId) -> usize {
        self.states[state].arcs.len()
    }

    pub fn total_arcs(&self) -> usize {
        self.states.iter().map(|s| s.arcs.len()).sum()
    }

    /// Iterator over all state ids.
    pub fn states(&self) -> std::ops::Range<StateId> {
        0..self.states.len()
    }

    /// Drops all states, start, and arcs; keeps symbol attachments.
    pub fn clear_states(&mut self) {
        self.states.clear();
        self.start = None;
    }

    pub fn set_input_symbols(&mut self, symbols: Option<std::sync::Arc<SymbolTable>>) {
        self.isymbols = symbols;
    }

    pub fn set_output_symbols(&mut self, symbols: Option<std::sync::Arc<SymbolTable>>) {
        self.osymbols = symbols;
    }

    pub fn input_symbols(&self) -> Option<&std::sync::Arc<SymbolTable>> {
        self.isymbols.as_ref()
    }

    pub fn output_symbols(&self) -> Option<&std::sync::Arc<SymbolTable>> {
        self.osymbols.as_ref()
    }

    /// Copies both symbol attachments from another FST.
    pub fn copy_symbols_from(&mut self, other: &VectorFst<W>) {
        self.isymbols = other.isymbols.clone();
        self.osymbols = other.osymbols.clone();
    }

    /// Renumbers states according to `order`, where `order[old] = Some(new)`.
    /// States mapped to `None` are dropped along with their arcs; arcs
    /// pointing at dropped states are dropped too.
    pub fn remap_states(&mut self, order: &[Option<StateId>], new_count: usize) {
        let mut states: Vec<State<W>> = (0..new_count).map(|_| State::new()).collect();
        for (old, state) in self.states.drain(..).enumerate() {
            let Some(new) = order[old] else { continue };
            let mut arcs = Vec::with_capacity(state.arcs.len());
            for arc in state.arcs {
                if let Some(target) = order[arc.nextstate] {
                    arcs.push(Arc { nextstate: target, ..arc });
                }
            }
            states[new] = State { arcs, final_weight: state.final_weight };
        }
        self.states = states;
        self.start = self.start.and_then(|s| order[s]);
    }
}

impl<W: Semiring> Default for VectorFst<W> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semiring::TropicalWeight;

    fn w(v: f32) -> TropicalWeight {
        TropicalWeight(v)
    }

    #[test]
    fn new_fst_has_no_states_or_start() {
        let fst: VectorFst<TropicalWeight> = VectorFst::new();
        assert_eq!(fst.num_states(), 0);
        assert_eq!(fst.start(), None);
    }

    #[test]
    fn epsilon_machine_accepts_empty_string() {
        let fst: VectorFst<TropicalWeight> = VectorFst::epsilon_machine();
        assert_eq!(fst.num_states(), 1);
        let s = fst.start().unwrap();
        assert!(fst.is_final(s));
        assert_eq!(fst.num_arcs(s), 0);
    }

    #[test]
    fn final_weight_defaults_to_zero() {
        let mut fst: VectorFst<TropicalWeight> = VectorFst::new();
        let s = fst.add_state();
        assert!(!fst.is_final(s));
        fst.set_final(s, w(0.5));
        assert_eq!(fst.final_weight(s), w(0.5));
    }

    #[test]
    fn remap_states_drops_unmapped_states_and_arcs() {
        let mut fst: VectorFst<TropicalWeight> = VectorFst::new();
        let a = fst.add_state();
        let b = fst.add_state();
        let c = fst.add_state();
        fst.set_start(a);
        fst.add_arc(a, Arc::new(1, 1, w(0.0), b));
        fst.add_arc(a, Arc::new(2, 2, w(0.0), c));
        fst.set_final(b, w(0.0));
        // Drop state c.
        fst.remap_states(&[Some(0), Some(1), None], 2);
        assert_eq!(fst.num_states(), 2);
        assert_eq!(fst.num_arcs(0), 1);
        assert_eq!(fst.arcs(0)[0].nextstate, 1);
    }

    #[test]
    fn serde_round_trip() {
        let mut fst: VectorFst<TropicalWeight> = VectorFst::new();
        let a = fst.add_state();
        let b = fst.add_state();
        fst.set_start(a);
        fst.add_arc(a, Arc::new(99, 100, w(0.25), b));
        fst.set_final(b, w(1.0));
        let json = serde_json::to_string(&fst).unwrap();
        let back: VectorFst<TropicalWeight> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fst);
    }

    #[test]
    fn symbol_attachments_round_trip() {
        let mut table = SymbolTable::new("letters");
        table.add_symbol("<epsilon>");
        let table = std::sync::Arc::new(table);
        let mut fst: VectorFst<TropicalWeight> = VectorFst::epsilon_machine();
        fst.set_input_symbols(Some(table.clone()));
        let json = serde_json::to_string(&fst).unwrap();
        let back: VectorFst<TropicalWeight> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.input_symbols().unwrap().name(), "letters");
        assert!(back.output_symbols().is_none());
    }
}
