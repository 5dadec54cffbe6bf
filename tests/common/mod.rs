//! End-to-end test harness.
//!
//! Compiles grammar text through the full pipeline and checks the
//! resulting machines by direct path search. The generated-label interner
//! is process-wide, so every test that compiles grammars serializes on
//! [`lock`] and resets the interner inside it.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use weft_base::CompileError;
use weft_compile::{CompilerConfig, GrammarCompiler};
use weft_fst::{Label, Semiring, StateId, TropicalWeight, VectorFst, EPSILON};

static COMPILE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Serializes tests around the process-wide interner and resets it.
pub fn lock() -> MutexGuard<'static, ()> {
    let guard = COMPILE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    weft_compile::labels::reset_for_tests();
    guard
}

pub type ExportMap = BTreeMap<String, VectorFst<TropicalWeight>>;

/// Compiles grammar text with a default configuration.
pub fn compile(source: &str) -> Result<ExportMap, Vec<CompileError>> {
    compile_with(source, CompilerConfig::default())
}

/// Compiles grammar text with an explicit configuration.
pub fn compile_with(
    source: &str,
    config: CompilerConfig,
) -> Result<ExportMap, Vec<CompileError>> {
    let mut compiler = GrammarCompiler::<TropicalWeight>::new(Arc::new(config));
    compiler.parse_source(source, "test.grm")?;
    compiler.evaluate()
}

/// All error messages joined, for substring assertions.
pub fn error_text(errors: &[CompileError]) -> String {
    errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("\n")
}

pub fn byte_labels(s: &str) -> Vec<Label> {
    s.bytes().map(|b| b as Label).collect()
}

/// True if the machine relates the two label sequences, epsilons free.
pub fn relates<W: Semiring>(fst: &VectorFst<W>, input: &[Label], output: &[Label]) -> bool {
    let Some(start) = fst.start() else {
        return false;
    };
    let mut visited: HashSet<(StateId, usize, usize)> = HashSet::new();
    let mut stack = vec![(start, 0usize, 0usize)];
    while let Some((s, i, o)) = stack.pop() {
        if !visited.insert((s, i, o)) {
            continue;
        }
        if i == input.len() && o == output.len() && fst.final_weight(s) != W::zero() {
            return true;
        }
        for arc in fst.arcs(s) {
            let ni = if arc.ilabel == EPSILON {
                Some(i)
            } else if i < input.len() && input[i] == arc.ilabel {
                Some(i + 1)
            } else {
                None
            };
            let no = if arc.olabel == EPSILON {
                Some(o)
            } else if o < output.len() && output[o] == arc.olabel {
                Some(o + 1)
            } else {
                None
            };
            if let (Some(ni), Some(no)) = (ni, no) {
                stack.push((arc.nextstate, ni, no));
            }
        }
    }
    false
}

/// Acceptor check over byte strings.
pub fn accepts<W: Semiring>(fst: &VectorFst<W>, s: &str) -> bool {
    let labels = byte_labels(s);
    relates(fst, &labels, &labels)
}

/// Transduction check over byte strings.
pub fn transduces<W: Semiring>(fst: &VectorFst<W>, input: &str, output: &str) -> bool {
    relates(fst, &byte_labels(input), &byte_labels(output))
}
