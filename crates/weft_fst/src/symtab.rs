//! Symbol tables: bidirectional string ↔ label maps.
//!
//! Symbol tables name the labels of an FST tape. The compiler keeps three
//! distinguished tables (byte, utf8, and the process-wide generated-labels
//! table), and grammars may load their own from text files with one
//! `symbol<whitespace>label` pair per line.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use crate::fst::Label;

/// A named bidirectional mapping between symbols and integer labels.
///
/// `available_key` tracks the smallest label not yet assigned, so
/// [`SymbolTable::add_symbol`] hands out dense labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TableRepr", into = "TableRepr")]
pub struct SymbolTable {
    name: String,
    by_label: BTreeMap<Label, String>,
    by_symbol: HashMap<String, Label>,
    available_key: Label,
}

#[derive(Clone, Serialize, Deserialize)]
struct TableRepr {
    name: String,
    symbols: Vec<(Label, String)>,
}

impl From<TableRepr> for SymbolTable {
    fn from(repr: TableRepr) -> Self {
        let mut table = SymbolTable::new(repr.name);
        for (label, symbol) in repr.symbols {
            table.add_pair(&symbol, label);
        }
        table
    }
}

impl From<SymbolTable> for TableRepr {
    fn from(table: SymbolTable) -> Self {
        TableRepr {
            name: table.name,
            symbols: table.by_label.into_iter().collect(),
        }
    }
}

impl SymbolTable {
    /// Creates an empty table with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            by_label: BTreeMap::new(),
            by_symbol: HashMap::new(),
            available_key: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds `symbol` at the next free label, or returns its existing label.
    pub fn add_symbol(&mut self, symbol: &str) -> Label {
        if let Some(&label) = self.by_symbol.get(symbol) {
            return label;
        }
        let label = self.available_key;
        self.add_pair(symbol, label);
        label
    }

    /// Binds `symbol` to an explicit `label`, bumping the next free label
    /// past it. Re-adding an identical pair is a no-op.
    pub fn add_pair(&mut self, symbol: &str, label: Label) {
        self.by_label.insert(label, symbol.to_string());
        self.by_symbol.insert(symbol.to_string(), label);
        if self.available_key <= label {
            self.available_key = label + 1;
        }
    }

    pub fn find_label(&self, symbol: &str) -> Option<Label> {
        self.by_symbol.get(symbol).copied()
    }

    pub fn find_symbol(&self, label: Label) -> Option<&str> {
        self.by_label.get(&label).map(String::as_str)
    }

    /// Smallest label that has never been assigned.
    pub fn available_key(&self) -> Label {
        self.available_key
    }

    pub fn len(&self) -> usize {
        self.by_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }

    /// Pairs in ascending label order.
    pub fn iter(&self) -> impl Iterator<Item = (Label, &str)> {
        self.by_label.iter().map(|(l, s)| (*l, s.as_str()))
    }

    /// Reads the text format: one `symbol<whitespace>label` pair per line,
    /// blank lines and `#` comment lines skipped.
    pub fn read_text(path: &Path) -> Result<Self, SymbolTableError> {
        let contents = std::fs::read_to_string(path).map_err(|e| SymbolTableError {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("symbols")
            .to_string();
        let mut table = SymbolTable::new(name);
        for (lineno, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            let symbol = fields.next();
            let label = fields.next().and_then(|f| f.parse::<Label>().ok());
            match (symbol, label) {
                (Some(symbol), Some(label)) => table.add_pair(symbol, label),
                _ => {
                    return Err(SymbolTableError {
                        path: path.display().to_string(),
                        detail: format!("malformed symbol table entry on line {}", lineno + 1),
                    })
                }
            }
        }
        Ok(table)
    }
}

/// Failure reading a symbol table file.
#[derive(Debug, Clone)]
pub struct SymbolTableError {
    pub path: String,
    pub detail: String,
}

impl fmt::Display for SymbolTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.detail)
    }
}

impl std::error::Error for SymbolTableError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_symbol_assigns_dense_labels() {
        let mut table = SymbolTable::new("t");
        assert_eq!(table.add_symbol("a"), 0);
        assert_eq!(table.add_symbol("b"), 1);
        assert_eq!(table.add_symbol("a"), 0);
        assert_eq!(table.available_key(), 2);
    }

    #[test]
    fn add_pair_bumps_available_key() {
        let mut table = SymbolTable::new("t");
        table.add_pair("x", 100);
        assert_eq!(table.available_key(), 101);
        assert_eq!(table.add_symbol("y"), 101);
    }

    #[test]
    fn lookups_are_bidirectional() {
        let mut table = SymbolTable::new("t");
        table.add_pair("cat", 7);
        assert_eq!(table.find_label("cat"), Some(7));
        assert_eq!(table.find_symbol(7), Some("cat"));
        assert_eq!(table.find_label("dog"), None);
        assert_eq!(table.find_symbol(8), None);
    }

    #[test]
    fn iter_is_label_ordered() {
        let mut table = SymbolTable::new("t");
        table.add_pair("b", 2);
        table.add_pair("a", 1);
        let pairs: Vec<_> = table.iter().collect();
        assert_eq!(pairs, vec![(1, "a"), (2, "b")]);
    }

    #[test]
    fn serde_round_trip_preserves_pairs() {
        let mut table = SymbolTable::new("t");
        table.add_pair("cat", 0xF0000);
        table.add_symbol("dog");
        let json = serde_json::to_string(&table).unwrap();
        let back: SymbolTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
        assert_eq!(back.available_key(), table.available_key());
    }
}
