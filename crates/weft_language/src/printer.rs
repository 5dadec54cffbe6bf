//! Indented AST dump for `--emit_ast_only`.
//!
//! One node per line, two-space indent per depth, optionally annotated with
//! source lines. The format is stable; tests read it.

use std::fmt::Write;

use crate::ast::{Expr, ExprKind, Grammar, ParseMode, RepetitionKind, Statement};

/// Renders the AST as text.
pub fn print_ast(grammar: &Grammar, line_numbers: bool) -> String {
    let mut printer = Printer { out: String::new(), depth: 0, line_numbers };
    printer.grammar(grammar);
    printer.out
}

struct Printer {
    out: String,
    depth: usize,
    line_numbers: bool,
}

impl Printer {
    fn emit(&mut self, line: u32, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
        if self.line_numbers {
            let _ = write!(self.out, "{} @{}\n", text, line);
        } else {
            let _ = writeln!(self.out, "{}", text);
        }
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self)) {
        self.depth += 1;
        f(self);
        self.depth -= 1;
    }

    fn grammar(&mut self, grammar: &Grammar) {
        self.emit(1, "Grammar");
        self.nested(|p| {
            for import in &grammar.imports {
                p.emit(import.line, &format!("Import '{}' as {}", import.path, import.alias.full()));
            }
            for function in &grammar.functions {
                let params: Vec<&str> =
                    function.params.iter().map(|param| param.full()).collect();
                p.emit(
                    function.line,
                    &format!("Function {}[{}]", function.name.full(), params.join(", ")),
                );
                p.nested(|p| {
                    for statement in &function.body {
                        p.statement(statement);
                    }
                });
            }
            for statement in &grammar.statements {
                p.statement(statement);
            }
        });
    }

    fn statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Rule(rule) => {
                let tag = if rule.export { "Rule (export)" } else { "Rule" };
                self.emit(rule.line, &format!("{} {}", tag, rule.name.full()));
                self.nested(|p| p.expr(&rule.rhs));
            }
            Statement::Return(ret) => {
                self.emit(ret.line, "Return");
                self.nested(|p| p.expr(&ret.expr));
            }
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Concat(a, b) => self.binary(expr, "Concat", a, b),
            ExprKind::Union(a, b) => self.binary(expr, "Union", a, b),
            ExprKind::Difference(a, b) => self.binary(expr, "Difference", a, b),
            ExprKind::Composition(a, b) => self.binary(expr, "Composition", a, b),
            ExprKind::Rewrite(a, b) => self.binary(expr, "Rewrite", a, b),
            ExprKind::Repetition(inner, kind) => {
                let label = match kind {
                    RepetitionKind::Star => "Repetition *".to_string(),
                    RepetitionKind::Plus => "Repetition +".to_string(),
                    RepetitionKind::Question => "Repetition ?".to_string(),
                    RepetitionKind::Range(min, max) => {
                        format!("Repetition {{{},{}}}", min, max)
                    }
                };
                self.emit(expr.line, &self.decorate(expr, &label));
                self.nested(|p| p.expr(inner));
            }
            ExprKind::Identifier(identifier) => {
                let label = format!("Identifier {}", identifier.full());
                self.emit(expr.line, &self.decorate(expr, &label));
            }
            ExprKind::StringFst { mode, text, symtab } => {
                let mode = match mode {
                    ParseMode::Byte => "byte",
                    ParseMode::Utf8 => "utf8",
                    ParseMode::Symbols => "symbols",
                };
                let label = format!("StringFst.{} \"{}\"", mode, text.text);
                self.emit(expr.line, &self.decorate(expr, &label));
                if let Some(symtab) = symtab {
                    self.nested(|p| p.expr(symtab));
                }
            }
            ExprKind::StringLit(text) => {
                let label = format!("String '{}'", text.text);
                self.emit(expr.line, &self.decorate(expr, &label));
            }
            ExprKind::Call { name, args } => {
                let label = format!("Call {}", name.full());
                self.emit(expr.line, &self.decorate(expr, &label));
                self.nested(|p| {
                    for arg in args {
                        p.expr(arg);
                    }
                });
            }
        }
    }

    fn binary(&mut self, expr: &Expr, tag: &str, a: &Expr, b: &Expr) {
        self.emit(expr.line, &self.decorate(expr, tag));
        self.nested(|p| {
            p.expr(a);
            p.expr(b);
        });
    }

    fn decorate(&self, expr: &Expr, label: &str) -> String {
        match &expr.weight {
            Some(weight) => format!("{} <{}>", label, weight.text),
            None => label.to_string(),
        }
    }
}
