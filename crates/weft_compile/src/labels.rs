//! The process-wide generated-label interner.
//!
//! Bracketed tokens in string literals (`"[case=nom]"`) intern to integer
//! labels in a private range starting at 0xF0000 (the Unicode private-use
//! planes, roughly 130k code points). The interner also owns the remap
//! table built while merging an imported archive's label table: labels the
//! local numbering disagrees about are rewritten on every imported arc.
//!
//! One instance serves the whole process, guarded by a mutex. It is *not*
//! reset between compilations in one process (importing compilations rely
//! on that), but tests reset it explicitly.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;
use weft_fst::{Label, SymbolTable};

/// First generated label.
pub const GENERATED_START: Label = 0xF0000;

/// Reserved begin-of-string marker.
pub const BOS_LABEL: Label = 0xF8000;

/// Reserved end-of-string marker.
pub const EOS_LABEL: Label = 0xF8001;

pub const BOS_SYMBOL: &str = "BOS";
pub const EOS_SYMBOL: &str = "EOS";

/// Name of the interner's symbol table (and of the table shipped in the
/// `*StringFstSymbolTable` archive entry).
pub const GENERATED_SYMBOLS_NAME: &str = "**Generated symbols";

/// Symbol interned at label 0.
pub const EPSILON_SYMBOL: &str = "<epsilon>";

/// String-to-label interner with an import remap table.
#[derive(Debug)]
pub struct GeneratedLabels {
    table: SymbolTable,
    next: Label,
    remap: BTreeMap<Label, Label>,
}

impl GeneratedLabels {
    /// A fresh interner with only epsilon interned. Most callers want
    /// [`global`] instead; fresh instances exist for tests.
    pub fn new() -> Self {
        let mut table = SymbolTable::new(GENERATED_SYMBOLS_NAME);
        table.add_pair(EPSILON_SYMBOL, 0);
        Self { table, next: GENERATED_START, remap: BTreeMap::new() }
    }

    /// Label for `symbol`, assigning the next free label if absent.
    pub fn intern(&mut self, symbol: &str) -> Label {
        if let Some(label) = self.table.find_label(symbol) {
            return label;
        }
        let label = self.next;
        self.next += 1;
        self.table.add_pair(symbol, label);
        label
    }

    pub fn find_label(&self, symbol: &str) -> Option<Label> {
        self.table.find_label(symbol)
    }

    pub fn find_symbol(&self, label: Label) -> Option<&str> {
        self.table.find_symbol(label)
    }

    /// The backing table (shipped in archives).
    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    /// True once any symbol beyond epsilon has been interned or merged.
    pub fn has_generated(&self) -> bool {
        self.table.len() > 1
    }

    /// Merges a foreign label table, accumulating remaps for labels whose
    /// local assignment disagrees. Returns `false` on an unresolvable
    /// conflict (one half of a pair matches, the other does not).
    ///
    /// Decision table per (symbol, label) pair:
    ///
    /// | symbol known | label known | action |
    /// |---|---|---|
    /// | no  | no  | adopt the pair, bump the free label past it |
    /// | no  | yes | assign a fresh label, remap `label → fresh` |
    /// | yes | no  | remap `label → existing` |
    /// | yes | yes | identical: nothing; half-match: fail; else remap `label → existing` |
    pub fn merge(&mut self, foreign: &SymbolTable) -> bool {
        let mut success = true;
        for (label, symbol) in foreign.iter() {
            let existing_label = self.table.find_label(symbol);
            let existing_symbol = self.table.find_symbol(label).map(str::to_string);
            match (existing_label, existing_symbol) {
                (None, None) => {
                    self.table.add_pair(symbol, label);
                    if self.next <= label {
                        self.next = label + 1;
                    }
                }
                (None, Some(_)) => {
                    let fresh = self.next;
                    self.next += 1;
                    self.table.add_pair(symbol, fresh);
                    self.remap.insert(label, fresh);
                }
                (Some(old_label), None) => {
                    self.remap.insert(label, old_label);
                }
                (Some(old_label), Some(old_symbol)) => {
                    if old_label == label && old_symbol == symbol {
                        continue;
                    }
                    if old_label == label || old_symbol == symbol {
                        eprintln!(
                            "Warning: Detected label mismatch: {} -> {}, {} -> {}",
                            symbol, old_label, label, old_symbol
                        );
                        success = false;
                    } else {
                        self.remap.insert(label, old_label);
                    }
                }
            }
        }
        success
    }

    /// Remapped label for `label`, if the last merges moved it.
    pub fn remap_lookup(&self, label: Label) -> Option<Label> {
        self.remap.get(&label).copied()
    }

    /// Clears the remap table. Called before each archive merge, since a
    /// remap only applies to the archive that produced it.
    pub fn clear_remap(&mut self) {
        self.remap.clear();
    }

    pub fn remap_len(&self) -> usize {
        self.remap.len()
    }

    /// Full reinitialization.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for GeneratedLabels {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: Lazy<Mutex<GeneratedLabels>> = Lazy::new(|| Mutex::new(GeneratedLabels::new()));

/// The process-wide interner. The guard recovers from poisoning: the
/// interner's state is valid after any partial operation.
pub fn global() -> MutexGuard<'static, GeneratedLabels> {
    GLOBAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Test isolation hook: reinitializes the process-wide interner.
pub fn reset_for_tests() {
    global().reset();
}
