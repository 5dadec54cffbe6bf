//! Canonical byte and utf8 symbol tables.
//!
//! String FSTs compiled under `--save_symbols` carry a symbol table naming
//! their labels. All byte-mode FSTs share one canonical table instance (and
//! utf8-mode FSTs another), so compatibility checks reduce to pointer
//! comparison and imported machines can be re-pointed at the canonical
//! instance by table *name*.

use std::sync::Arc;

use once_cell::sync::Lazy;
use weft_fst::{Semiring, SymbolTable, VectorFst};

use crate::labels::GeneratedLabels;

/// Name of the canonical byte table.
pub const BYTE_SYMTAB_NAME: &str = "**Byte symbols";

/// Name of the canonical utf8 table.
pub const UTF8_SYMTAB_NAME: &str = "**UTF8 symbols";

static BYTE_TABLE: Lazy<Arc<SymbolTable>> = Lazy::new(|| Arc::new(build_byte_table()));
static UTF8_TABLE: Lazy<Arc<SymbolTable>> = Lazy::new(|| Arc::new(build_utf8_table()));

fn build_byte_table() -> SymbolTable {
    let mut table = SymbolTable::new(BYTE_SYMTAB_NAME);
    table.add_pair("<epsilon>", 0);
    for byte in 1u16..=255 {
        let symbol = if (0x21..=0x7E).contains(&byte) {
            ((byte as u8) as char).to_string()
        } else {
            format!("0x{:02x}", byte)
        };
        table.add_pair(&symbol, byte as i64);
    }
    table
}

fn build_utf8_table() -> SymbolTable {
    let mut table = SymbolTable::new(UTF8_SYMTAB_NAME);
    table.add_pair("<epsilon>", 0);
    table
}

/// The shared byte table.
pub fn byte_symbol_table() -> Arc<SymbolTable> {
    BYTE_TABLE.clone()
}

/// The shared utf8 table.
pub fn utf8_symbol_table() -> Arc<SymbolTable> {
    UTF8_TABLE.clone()
}

/// A canonical table with the generated labels folded in, built for
/// archive write-out of a top-level grammar under `--save_symbols`.
pub fn with_generated(base: &SymbolTable, labels: &GeneratedLabels) -> Arc<SymbolTable> {
    let mut table = base.clone();
    for (label, symbol) in labels.table().iter() {
        if label == 0 {
            continue;
        }
        table.add_pair(symbol, label);
    }
    Arc::new(table)
}

/// Re-points byte/utf8 tables (matched by name) at the canonical
/// instances, or at `augmented` instances when provided.
pub fn reassign_symbols<W: Semiring>(
    fst: &mut VectorFst<W>,
    byte: &Arc<SymbolTable>,
    utf8: &Arc<SymbolTable>,
) {
    if let Some(table) = fst.input_symbols() {
        if table.name() == BYTE_SYMTAB_NAME {
            fst.set_input_symbols(Some(byte.clone()));
        } else if table.name() == UTF8_SYMTAB_NAME {
            fst.set_input_symbols(Some(utf8.clone()));
        }
    }
    if let Some(table) = fst.output_symbols() {
        if table.name() == BYTE_SYMTAB_NAME {
            fst.set_output_symbols(Some(byte.clone()));
        } else if table.name() == UTF8_SYMTAB_NAME {
            fst.set_output_symbols(Some(utf8.clone()));
        }
    }
}

/// Symbol-table compatibility: both absent, or same contents. One side
/// absent and the other present is incompatible.
pub fn compat_symbols(a: Option<&Arc<SymbolTable>>, b: Option<&Arc<SymbolTable>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Arc::ptr_eq(a, b) || a == b,
        _ => false,
    }
}
