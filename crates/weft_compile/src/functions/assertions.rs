//! Grammar-level assertions: AssertEqual, AssertEmpty, AssertNull.
//!
//! These evaluate their argument and fail the compilation with a
//! diagnostic when the expectation does not hold, letting grammar authors
//! keep regression checks next to the rules they protect. Pruning to the
//! best path needs the natural order, so this family only registers for
//! path semirings.

use weft_fst::algo::{
    compose, connect, labels_to_text, project, prune_to_best, rm_weight, shortest_path_labels,
    ProjectType,
};
use weft_fst::{Label, Semiring, SymbolTable, VectorFst};

use crate::functions::unary::safe_determinize;
use crate::labels;
use crate::registry::FunctionRegistry;
use crate::value::Value;

pub(super) fn register<W: Semiring>(registry: &mut FunctionRegistry<W>) {
    registry.register_binary_fst("AssertEqual", |left, right, rest, _ctx| {
        if rest.len() > 1 {
            return Err(format!("AssertEqual: Expected 2 or 3 arguments but got {}", rest.len() + 2));
        }
        // Optional third argument selects symbol rendering for the
        // diagnostic: a symbol table, or a parse-mode string.
        let symtab = match rest.first() {
            None => None,
            Some(Value::Symtab(table)) => Some(table.clone()),
            Some(Value::Str(_)) => None,
            Some(other) => {
                return Err(format!(
                    "AssertEqual: Invalid parse mode or symbol table for symbols: {}",
                    other.kind_name()
                ))
            }
        };
        let left = best_output(left);
        let right = best_output(right);
        let intersection = compose(&left, &right);
        let both_null = left.num_states() == 0 && right.num_states() == 0;
        if !both_null && intersection.start().is_none() {
            return Err(format!(
                "Arguments to AssertEqual are not equivalent: expect {} got {}",
                render(&right, symtab.as_ref()),
                render(&left, symtab.as_ref())
            ));
        }
        Ok(Value::Fst(left))
    });

    registry.register_unary_fst("AssertEmpty", |fst, rest, _ctx| {
        if !rest.is_empty() {
            return Err(format!("AssertEmpty: Expected 1 argument but got {}", rest.len() + 1));
        }
        let best = best_output(fst);
        match shortest_path_labels(&best) {
            Some(labels) if labels.is_empty() => Ok(Value::Fst(best)),
            _ => Err(format!(
                "Argument to AssertEmpty is not the empty string: got {}",
                render(&best, None)
            )),
        }
    });

    registry.register_unary_fst("AssertNull", |fst, rest, _ctx| {
        if !rest.is_empty() {
            return Err(format!("AssertNull: Expected 1 argument but got {}", rest.len() + 1));
        }
        let mut trimmed = fst.clone();
        connect(&mut trimmed);
        if trimmed.num_states() != 0 {
            return Err("Argument to AssertNull is not the null machine".to_string());
        }
        Ok(Value::Fst(fst))
    });
}

/// The unweighted best output language of a machine: output projection,
/// determinized, pruned to the best paths, weights dropped.
fn best_output<W: Semiring>(mut fst: VectorFst<W>) -> VectorFst<W> {
    project(&mut fst, ProjectType::Output);
    safe_determinize(&mut fst);
    prune_to_best(&mut fst);
    rm_weight(&mut fst);
    fst
}

/// Renders the best path for a diagnostic: `"text"`, or `nullptr` for a
/// machine with no successful path.
fn render<W: Semiring>(fst: &VectorFst<W>, symtab: Option<&SymbolTable>) -> String {
    match shortest_path_labels(fst) {
        Some(path) => {
            let text = labels_to_text(&path, |label: Label| {
                if let Some(table) = symtab {
                    if let Some(symbol) = table.find_symbol(label) {
                        return Some(symbol.to_string());
                    }
                }
                labels::global().find_symbol(label).map(str::to_string)
            });
            format!("\"{}\"", text)
        }
        None => "nullptr".to_string(),
    }
}
