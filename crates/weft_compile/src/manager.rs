//! Holding and shipping compiled FSTs.
//!
//! The manager owns a name-keyed set of FSTs: either the exports of a
//! compilation on their way to disk, or the contents of an archive read
//! back for consumption. Consumers that read archives with generated
//! labels must merge the `*StringFstSymbolTable` entry into the interner
//! before interpreting the rest; [`GrammarManager::load_archive`] does so.

use std::collections::BTreeMap;
use std::path::Path;

use weft_fst::far::Archive;
use weft_fst::{Semiring, VectorFst};

use crate::functions::remap_arc_labels;
use crate::labels;
use crate::STRING_FST_SYMTAB_FST;

/// A name-keyed collection of compiled FSTs.
#[derive(Debug, Default)]
pub struct GrammarManager<W: Semiring> {
    fsts: BTreeMap<String, VectorFst<W>>,
}

impl<W: Semiring> GrammarManager<W> {
    pub fn new() -> Self {
        Self { fsts: BTreeMap::new() }
    }

    /// Wraps an export map produced by the evaluator.
    pub fn from_fsts(fsts: BTreeMap<String, VectorFst<W>>) -> Self {
        Self { fsts }
    }

    /// Loads an archive, merging its label table into the process-wide
    /// interner and remapping arc labels of every entry.
    pub fn load_archive(&mut self, path: &Path) -> Result<(), String> {
        let archive = Archive::<W>::read(path).map_err(|e| e.to_string())?;
        if let Some(entry) = archive.get(STRING_FST_SYMTAB_FST) {
            let Some(table) = entry.input_symbols() else {
                return Err(format!("{}: malformed label symbol table entry", path.display()));
            };
            let mut interner = labels::global();
            interner.clear_remap();
            if !interner.merge(table) {
                return Err(format!("{}: failed to merge symbol tables", path.display()));
            }
        }
        for (name, fst) in archive.iter() {
            if name == STRING_FST_SYMTAB_FST {
                continue;
            }
            let mut fst = fst.clone();
            {
                let interner = labels::global();
                remap_arc_labels(&mut fst, |label| interner.remap_lookup(label));
            }
            self.fsts.insert(name.to_string(), fst);
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&VectorFst<W>> {
        self.fsts.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, fst: VectorFst<W>) {
        self.fsts.insert(name.into(), fst);
    }

    pub fn len(&self) -> usize {
        self.fsts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fsts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VectorFst<W>)> {
        self.fsts.iter().map(|(name, fst)| (name.as_str(), fst))
    }

    /// Writes every held FST into an archive at `path`, creating parent
    /// directories as needed.
    pub fn export_far(&self, path: &Path) -> Result<(), String> {
        let mut archive: Archive<W> = Archive::new();
        for (name, fst) in &self.fsts {
            archive.insert(name.clone(), fst.clone());
        }
        archive.write(path).map_err(|e| e.to_string())
    }
}
