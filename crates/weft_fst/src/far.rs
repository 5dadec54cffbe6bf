//! FST archives and single-FST files.
//!
//! A `.far` archive is a name-keyed, ordered container of FSTs sharing one
//! arc type. Keys iterate lexicographically, which is what guarantees the
//! distinguished `*StringFstSymbolTable` entry (ASCII `*` precedes every
//! legal identifier head) is seen before the entries whose labels it
//! explains. Archives and `.fst` files serialize with serde as JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::fst::VectorFst;
use crate::semiring::Semiring;

/// I/O failure for archives or single-FST files.
#[derive(Debug, Clone)]
pub struct FstIoError {
    pub path: String,
    pub detail: String,
}

impl FstIoError {
    fn new(path: &Path, detail: impl fmt::Display) -> Self {
        Self { path: path.display().to_string(), detail: detail.to_string() }
    }
}

impl fmt::Display for FstIoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.detail)
    }
}

impl std::error::Error for FstIoError {}

/// A name-keyed archive of FSTs over one arc type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Archive<W: Semiring> {
    arc_type: String,
    fsts: BTreeMap<String, VectorFst<W>>,
}

impl<W: Semiring> Archive<W> {
    pub fn new() -> Self {
        Self { arc_type: W::ARC_TYPE.to_string(), fsts: BTreeMap::new() }
    }

    pub fn arc_type(&self) -> &str {
        &self.arc_type
    }

    /// Inserts an entry, replacing any existing one of the same name.
    pub fn insert(&mut self, name: impl Into<String>, fst: VectorFst<W>) {
        self.fsts.insert(name.into(), fst);
    }

    pub fn get(&self, name: &str) -> Option<&VectorFst<W>> {
        self.fsts.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fsts.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fsts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fsts.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VectorFst<W>)> {
        self.fsts.iter().map(|(name, fst)| (name.as_str(), fst))
    }

    /// Reads an archive, rejecting arc-type mismatches.
    pub fn read(path: &Path) -> Result<Self, FstIoError> {
        let bytes = fs::read(path).map_err(|e| FstIoError::new(path, e))?;
        let archive: Archive<W> =
            serde_json::from_slice(&bytes).map_err(|e| FstIoError::new(path, e))?;
        if archive.arc_type != W::ARC_TYPE {
            return Err(FstIoError::new(
                path,
                format!("archive arc type {} does not match {}", archive.arc_type, W::ARC_TYPE),
            ));
        }
        Ok(archive)
    }

    /// Writes the archive, creating parent directories as needed.
    pub fn write(&self, path: &Path) -> Result<(), FstIoError> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).map_err(|e| FstIoError::new(path, e))?;
            }
        }
        let bytes = serde_json::to_vec(self).map_err(|e| FstIoError::new(path, e))?;
        fs::write(path, bytes).map_err(|e| FstIoError::new(path, e))
    }
}

impl<W: Semiring> Default for Archive<W> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
struct SavedFst<W: Semiring> {
    arc_type: String,
    fst: VectorFst<W>,
}

/// Reads a single FST from a `.fst` file.
pub fn read_fst<W: Semiring>(path: &Path) -> Result<VectorFst<W>, FstIoError> {
    let bytes = fs::read(path).map_err(|e| FstIoError::new(path, e))?;
    let saved: SavedFst<W> =
        serde_json::from_slice(&bytes).map_err(|e| FstIoError::new(path, e))?;
    if saved.arc_type != W::ARC_TYPE {
        return Err(FstIoError::new(
            path,
            format!("fst arc type {} does not match {}", saved.arc_type, W::ARC_TYPE),
        ));
    }
    Ok(saved.fst)
}

/// Writes a single FST to a `.fst` file.
pub fn write_fst<W: Semiring>(path: &Path, fst: &VectorFst<W>) -> Result<(), FstIoError> {
    let saved = SavedFst { arc_type: W::ARC_TYPE.to_string(), fst: fst.clone() };
    let bytes = serde_json::to_vec(&saved).map_err(|e| FstIoError::new(path, e))?;
    fs::write(path, bytes).map_err(|e| FstIoError::new(path, e))
}
