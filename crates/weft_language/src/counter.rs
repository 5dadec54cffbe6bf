//! Reference counting for dead-value elimination.
//!
//! A single pre-pass over the top-level statement list counts, per
//! single-component identifier, how many times it is referenced after its
//! definition. Exported names get an infinite count (encoded as -1). The
//! evaluator decrements on every consumed reference and erases the binding
//! when the count runs out, which bounds memory on long grammars.
//!
//! Function bodies and imports are not counted: their references resolve in
//! other frames and never erase top-level bindings.

use std::collections::HashMap;

use crate::ast::{Expr, ExprKind, Grammar, Statement};

/// Infinite reference count for exported names.
const INFINITE: i64 = -1;

/// Per-identifier reference counts for the top-level grammar.
#[derive(Debug)]
pub struct IdentifierCounter {
    references: HashMap<String, i64>,
}

impl IdentifierCounter {
    /// Counts references over the grammar's top-level statements.
    pub fn build(grammar: &Grammar) -> Self {
        let mut counter = Self { references: HashMap::new() };
        for statement in &grammar.statements {
            match statement {
                Statement::Rule(rule) => {
                    // Uses on the right-hand side refer to earlier rules and
                    // count first; the definition then resets its own name.
                    counter.count_expr(&rule.rhs);
                    if !rule.name.has_namespaces() {
                        let count = if rule.export { INFINITE } else { 0 };
                        counter.references.insert(rule.name.leaf().to_string(), count);
                    }
                }
                Statement::Return(ret) => {
                    // Illegal at top level; the evaluator reports it before
                    // any decrement happens. Count anyway for completeness.
                    counter.count_expr(&ret.expr);
                }
            }
        }
        counter
    }

    fn count_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Concat(a, b)
            | ExprKind::Union(a, b)
            | ExprKind::Difference(a, b)
            | ExprKind::Composition(a, b)
            | ExprKind::Rewrite(a, b) => {
                self.count_expr(a);
                self.count_expr(b);
            }
            ExprKind::Repetition(inner, _) => self.count_expr(inner),
            ExprKind::Identifier(identifier) => {
                if !identifier.has_namespaces() {
                    let count = self.references.entry(identifier.leaf().to_string()).or_insert(0);
                    if *count != INFINITE {
                        *count += 1;
                    }
                }
            }
            ExprKind::StringFst { symtab, .. } => {
                if let Some(symtab) = symtab {
                    self.count_expr(symtab);
                }
            }
            ExprKind::StringLit(_) => {}
            ExprKind::Call { args, .. } => {
                for arg in args {
                    self.count_expr(arg);
                }
            }
        }
    }

    /// Remaining references for `identifier`; -1 means infinite.
    ///
    /// # Panics
    ///
    /// Panics on names that never appeared; callers only ask about
    /// identifiers the pass has seen, so a miss is a compiler bug.
    pub fn count(&self, identifier: &str) -> i64 {
        match self.references.get(identifier) {
            Some(&count) => count,
            None => panic!("identifier was never counted: {}", identifier),
        }
    }

    /// Consumes one reference. Returns `true` while references remain (or
    /// forever, for exported names); `false` exactly when the last
    /// reference of a non-exported name was consumed.
    ///
    /// # Panics
    ///
    /// Panics on names that never appeared, as with
    /// [`IdentifierCounter::count`].
    pub fn decrement(&mut self, identifier: &str) -> bool {
        match self.references.get_mut(identifier) {
            Some(count) if *count == INFINITE => true,
            Some(count) => {
                *count -= 1;
                *count > 0
            }
            None => panic!("identifier was never counted: {}", identifier),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_grammar, ParseOptions};

    fn counter(source: &str) -> IdentifierCounter {
        let grammar = parse_grammar(source, "test.grm", &ParseOptions::default()).unwrap();
        IdentifierCounter::build(&grammar)
    }

    #[test]
    fn unused_rule_counts_zero() {
        let counter = counter("a = \"x\";");
        assert_eq!(counter.count("a"), 0);
    }

    #[test]
    fn each_use_counts_once() {
        let counter = counter("a = \"x\"; b = a a; c = a;");
        assert_eq!(counter.count("a"), 3);
        assert_eq!(counter.count("b"), 0);
    }

    #[test]
    fn exported_names_are_infinite() {
        let mut counter = counter("export a = \"x\"; b = a;");
        assert_eq!(counter.count("a"), -1);
        assert!(counter.decrement("a"));
        assert_eq!(counter.count("a"), -1);
    }

    #[test]
    fn decrement_returns_false_on_last_use() {
        let mut counter = counter("a = \"x\"; b = a a;");
        assert!(counter.decrement("a"));
        assert!(!counter.decrement("a"));
    }

    #[test]
    fn namespaced_references_are_not_counted() {
        let counter = counter("a = lib.rule; export b = a;");
        assert_eq!(counter.count("a"), 1);
        assert!(counter.references.get("rule").is_none());
        assert!(counter.references.get("lib.rule").is_none());
    }

    #[test]
    fn references_inside_call_args_count() {
        let counter = counter("a = \"x\"; b = Optimize[a];");
        assert_eq!(counter.count("a"), 1);
    }

    #[test]
    #[should_panic(expected = "never counted")]
    fn unknown_identifier_panics() {
        counter("a = \"x\";").count("ghost");
    }
}
