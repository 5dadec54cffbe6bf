//! Compiling string literals into linear FSTs.
//!
//! The text of a double-quoted literal is segmented into labels:
//!
//! - **byte mode**: one label per byte;
//! - **utf8 mode**: one label per Unicode code point;
//! - **symbol mode**: whitespace-separated tokens looked up in a
//!   caller-supplied table.
//!
//! In byte and utf8 modes, square brackets delimit symbolic tokens:
//! `"[case=nom]"` interns `case=nom` into the process-wide generated-label
//! space, `"[65]"`, `"[0x41]"`, and `"[0101]"` are explicit numeric labels,
//! a single-byte token like `"[a]"` is that byte, and `[BOS]`/`[EOS]` are
//! the reserved context markers. A bracket group may hold several
//! whitespace-separated tokens. Backslash escapes the next character
//! (`\[`, `\]`, `\\`).

use weft_fst::{Arc, Label, Semiring, SymbolTable, VectorFst};

use crate::labels::{GeneratedLabels, BOS_LABEL, BOS_SYMBOL, EOS_LABEL, EOS_SYMBOL};

/// Label segmentation for string literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringMode {
    Byte,
    Utf8,
    Symbols,
}

/// Compiles `text` into a linear acceptor, interning bracketed tokens into
/// `labels` as needed.
pub fn compile_string<W: Semiring>(
    text: &str,
    mode: StringMode,
    symtab: Option<&SymbolTable>,
    labels: &mut GeneratedLabels,
) -> Result<VectorFst<W>, String> {
    let label_seq = match mode {
        StringMode::Byte | StringMode::Utf8 => parse_bracketed(text, mode, labels)?,
        StringMode::Symbols => {
            let Some(symtab) = symtab else {
                return Err("symbol table parse mode requires a symbol table".to_string());
            };
            let mut out = Vec::new();
            for token in text.split_whitespace() {
                match symtab.find_label(token) {
                    Some(label) => out.push(label),
                    None => {
                        return Err(format!(
                            "symbol {} not found in symbol table {}",
                            token,
                            symtab.name()
                        ))
                    }
                }
            }
            out
        }
    };
    let mut fst = VectorFst::new();
    let mut state = fst.add_state();
    fst.set_start(state);
    for label in label_seq {
        let next = fst.add_state();
        fst.add_arc(state, Arc::new(label, label, W::one(), next));
        state = next;
    }
    fst.set_final(state, W::one());
    Ok(fst)
}

fn parse_bracketed(
    text: &str,
    mode: StringMode,
    labels: &mut GeneratedLabels,
) -> Result<Vec<Label>, String> {
    let mut out = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => push_literal(escaped, mode, &mut out),
                None => return Err("dangling escape at end of string".to_string()),
            },
            '[' => {
                let mut group = String::new();
                let mut closed = false;
                while let Some(inner) = chars.next() {
                    match inner {
                        ']' => {
                            closed = true;
                            break;
                        }
                        '\\' => match chars.next() {
                            Some(escaped) => group.push(escaped),
                            None => return Err("dangling escape at end of string".to_string()),
                        },
                        _ => group.push(inner),
                    }
                }
                if !closed {
                    return Err("unbalanced [ in string".to_string());
                }
                for token in group.split_whitespace() {
                    out.push(token_label(token, labels)?);
                }
            }
            ']' => return Err("unbalanced ] in string".to_string()),
            _ => push_literal(c, mode, &mut out),
        }
    }
    Ok(out)
}

fn push_literal(c: char, mode: StringMode, out: &mut Vec<Label>) {
    match mode {
        StringMode::Byte => {
            let mut buf = [0u8; 4];
            for &byte in c.encode_utf8(&mut buf).as_bytes() {
                out.push(byte as Label);
            }
        }
        StringMode::Utf8 => out.push(c as u32 as Label),
        StringMode::Symbols => unreachable!("symbol mode has no bracket parsing"),
    }
}

/// A single bracketed token: numeric label, single byte, reserved marker,
/// or an interned generated symbol.
fn token_label(token: &str, labels: &mut GeneratedLabels) -> Result<Label, String> {
    if let Some(label) = numeric_label(token) {
        return Ok(label);
    }
    if token.len() == 1 {
        return Ok(token.as_bytes()[0] as Label);
    }
    if token == BOS_SYMBOL {
        return Ok(BOS_LABEL);
    }
    if token == EOS_SYMBOL {
        return Ok(EOS_LABEL);
    }
    Ok(labels.intern(token))
}

/// Numeric labels with C-style base detection: `0x` hex, leading-zero
/// octal, decimal otherwise.
fn numeric_label(token: &str) -> Option<Label> {
    if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        return Label::from_str_radix(hex, 16).ok();
    }
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if token.len() > 1 && token.starts_with('0') {
        return Label::from_str_radix(&token[1..], 8).ok();
    }
    token.parse::<Label>().ok()
}
