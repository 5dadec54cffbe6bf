//! The AST evaluator.
//!
//! Walks a grammar tree, producing named values in a namespace tree:
//! imports first (recursively, archives merged and remapped), then
//! function registration (first definition wins), then, for the primary
//! grammar only, the statements. Any failure flips one success flag and
//! short-circuits the rest of the walk; no partial archive is ever
//! produced.
//!
//! The evaluator owns the namespace root and addresses the "current"
//! namespace by alias path. Entering an import or a user-function call
//! pushes onto that path (and, for calls, a fresh local frame); leaving
//! restores it.

use std::collections::{BTreeMap, HashSet};
use std::marker::PhantomData;
use std::sync::Arc;

use weft_base::CompileError;
use weft_fst::algo::top_sort;
use weft_fst::far::Archive;
use weft_fst::VectorFst;
use weft_language::{
    parse_grammar, Expr, ExprKind, Function, Grammar, Identifier, IdentifierCounter, Import,
    ParseOptions, RepetitionKind, Rule, Statement,
};

use crate::config::CompilerConfig;
use crate::functions::{attach_final_weight, remap_arc_labels};
use crate::labels;
use crate::namespace::Namespace;
use crate::registry::{ArcType, FuncContext};
use crate::symbols::{byte_symbol_table, reassign_symbols, utf8_symbol_table, with_generated};
use crate::value::Value;
use crate::STRING_FST_SYMTAB_FST;

/// Evaluates grammar ASTs over one arc type.
pub struct Evaluator<W: ArcType> {
    root: Namespace,
    /// Alias path from the root to the namespace being evaluated.
    current: Vec<String>,
    /// File shown in diagnostics; tracks the grammar being walked.
    file: String,
    /// Statements run only for the primary grammar; imports register
    /// imports and functions and stop.
    run_all: bool,
    success: bool,
    config: Arc<CompilerConfig>,
    id_counter: Option<IdentifierCounter>,
    /// Exported names with the line of their rule, in evaluation order.
    exported: Vec<(String, u32)>,
    /// Function names defined by the file currently being walked, for
    /// duplicate-definition warnings.
    observed_functions: HashSet<String>,
    /// ASTs of every imported grammar; function nodes borrowed by
    /// namespaces stay alive through these.
    loaded_grammars: Vec<Arc<Grammar>>,
    /// Depth of composition nesting under an `Optimize[...]` call;
    /// -1 when outside one.
    optimize_depth: i32,
    diagnostics: Vec<CompileError>,
    marker: PhantomData<W>,
}

impl<W: ArcType> Evaluator<W> {
    /// Evaluator for a primary grammar file.
    pub fn new(file: impl Into<String>, config: Arc<CompilerConfig>) -> Self {
        let file = file.into();
        Self {
            root: Namespace::top_level(file.clone()),
            current: Vec::new(),
            file,
            run_all: true,
            success: true,
            config,
            id_counter: None,
            exported: Vec::new(),
            observed_functions: HashSet::new(),
            loaded_grammars: Vec::new(),
            optimize_depth: -1,
            diagnostics: Vec::new(),
            marker: PhantomData,
        }
    }

    pub fn set_id_counter(&mut self, counter: IdentifierCounter) {
        self.id_counter = Some(counter);
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn diagnostics(&self) -> &[CompileError] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<CompileError> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Number of grammars pulled in through imports (recursively).
    pub fn imported_grammar_count(&self) -> usize {
        self.loaded_grammars.len()
    }

    /// Looks up a top-level binding; test and driver access.
    pub fn top_level_value(&self, name: &str) -> Option<Value<W>> {
        self.root.get_value::<W>(name)
    }

    /// Walks a grammar with the evaluator's current mode.
    pub fn run(&mut self, grammar: &Grammar) {
        for import in &grammar.imports {
            if !self.success {
                return;
            }
            self.visit_import(import);
        }
        for function in &grammar.functions {
            if !self.success {
                return;
            }
            self.visit_function(function);
        }
        if self.run_all {
            for statement in &grammar.statements {
                if !self.success {
                    return;
                }
                match statement {
                    Statement::Return(ret) => {
                        self.report(ret.line, "Cannot return from main body");
                        return;
                    }
                    Statement::Rule(rule) => self.visit_rule(rule),
                }
            }
        }
    }

    // ----- imports -----

    fn visit_import(&mut self, node: &Import) {
        if !node.path.ends_with(".grm") {
            self.report(
                node.line,
                format!("Extension for included files should be .grm: {}", node.path),
            );
            return;
        }
        if node.alias.has_namespaces() {
            self.report(
                node.line,
                format!("Invalid import alias identifier: {}", node.alias.full()),
            );
            return;
        }
        let alias = node.alias.leaf().to_string();
        if !self.current_ns_mut().add_sub_namespace(&node.path, &alias) {
            self.report(
                node.line,
                format!("Cannot reuse the same alias for two files: {} in {}", alias, node.path),
            );
            return;
        }
        let resolved = self.config.resolve(&node.path);
        let Ok(source) = std::fs::read_to_string(&resolved) else {
            self.report(
                node.line,
                format!("Unable to open grm source file: {}", resolved.display()),
            );
            return;
        };
        let parse_options = ParseOptions { always_export: self.config.always_export };
        let grammar = match parse_grammar(&source, &node.path, &parse_options) {
            Ok(grammar) => Arc::new(grammar),
            Err(errors) => {
                self.diagnostics.extend(errors);
                self.report(
                    node.line,
                    format!("Errors while importing grm source file: {}", resolved.display()),
                );
                return;
            }
        };

        // Run the imported grammar in imports+functions mode under the
        // child namespace.
        let saved_file = std::mem::replace(&mut self.file, node.path.clone());
        let saved_observed = std::mem::take(&mut self.observed_functions);
        let saved_run_all = self.run_all;
        self.run_all = false;
        self.current.push(alias.clone());
        self.run(&grammar);
        self.current.pop();
        self.run_all = saved_run_all;
        self.observed_functions = saved_observed;
        self.file = saved_file;
        if !self.success {
            self.report(
                node.line,
                format!("Errors while importing grm source file: {}", resolved.display()),
            );
            return;
        }
        self.loaded_grammars.push(grammar);

        // The companion archive holds the import's exported FSTs.
        let far_rel = format!("{}far", &node.path[..node.path.len() - 3]);
        let far_path = self.config.resolve(&far_rel);
        let archive = match Archive::<W>::read(&far_path) {
            Ok(archive) => archive,
            Err(_) => {
                self.report(node.line, format!("Unable to open far archive: {}", far_path.display()));
                return;
            }
        };

        // The label table entry must be processed first so imported arcs
        // can be renumbered consistently; the remap only applies to this
        // archive.
        if let Some(entry) = archive.get(STRING_FST_SYMTAB_FST) {
            let merged = match entry.input_symbols() {
                Some(table) => {
                    let mut interner = labels::global();
                    interner.clear_remap();
                    interner.merge(table)
                }
                None => false,
            };
            if !merged {
                self.report(node.line, "Failed to merge symbol tables");
                return;
            }
        }

        let mut child_path = self.current.clone();
        child_path.push(alias.clone());
        for (name, fst) in archive.iter() {
            if name == STRING_FST_SYMTAB_FST {
                continue;
            }
            let Some(child) = self.root.descend(&child_path) else { break };
            if child.contains_value(name) {
                continue;
            }
            let mut fst = fst.clone();
            {
                let interner = labels::global();
                remap_arc_labels(&mut fst, |label| interner.remap_lookup(label));
            }
            reassign_symbols(&mut fst, &byte_symbol_table(), &utf8_symbol_table());
            let Some(child) = self.root.descend(&child_path) else { break };
            if !child.insert_shared(name, Value::<W>::Fst(fst)) {
                self.report(
                    node.line,
                    format!(
                        "While loading {} (aliased {}), FST {} was clobbered",
                        node.path, alias, name
                    ),
                );
                return;
            }
        }
    }

    // ----- functions -----

    fn visit_function(&mut self, node: &Arc<Function>) {
        if node.name.has_namespaces() {
            self.report(
                node.line,
                format!("Cannot define a function within a namespace: {}", node.name.full()),
            );
            return;
        }
        let name = node.name.leaf().to_string();
        if self.current_ns().get_function(&name).is_some() {
            if self.observed_functions.contains(&name) {
                eprintln!(
                    "Warning: Duplicate function definition within file for {}. Ignoring.",
                    name
                );
            }
            return;
        }
        self.current_ns().insert_function(&name, node.clone());
        self.observed_functions.insert(name);
    }

    // ----- statements -----

    fn visit_rule(&mut self, rule: &Rule) {
        if self.config.print_rules {
            eprintln!("Evaluating rule: {}", rule.name.full());
        }
        if rule.name.has_namespaces() {
            self.report(
                rule.name.line,
                format!("Cannot assign to an identifier within a namespace: {}", rule.name.full()),
            );
            return;
        }
        let Some(value) = self.make_value(&rule.rhs) else {
            return;
        };
        let name = rule.name.leaf().to_string();
        if !self.current_ns_mut().insert_local(&name, value) {
            self.report(rule.name.line, format!("Cannot clobber existing variable: {}", name));
            return;
        }
        if rule.export {
            if self.current_ns().local_env_depth() == 1 {
                self.exported.push((name, rule.name.line));
            } else if !self.config.always_export {
                self.report(
                    rule.name.line,
                    format!("Variables may only be exported from the top-level grammar: {}", name),
                );
            }
        }
    }

    // ----- expressions -----

    fn make_value(&mut self, expr: &Expr) -> Option<Value<W>> {
        if !self.success {
            return None;
        }
        let mut force_optimize = false;
        let mut output = match &expr.kind {
            ExprKind::Concat(a, b) => self.binary_op("Concat", a, b, expr.line, None)?,
            ExprKind::Union(a, b) => self.binary_op("Union", a, b, expr.line, None)?,
            ExprKind::Difference(a, b) => self.binary_op("Difference", a, b, expr.line, None)?,
            ExprKind::Rewrite(a, b) => self.binary_op("Rewrite", a, b, expr.line, None)?,
            ExprKind::Composition(a, b) => {
                // Inside an Optimize call, the outermost composition is
                // covered by the Optimize itself; deeper ones must be
                // optimized as they materialize.
                if self.optimize_depth > -1 {
                    self.optimize_depth += 1;
                }
                force_optimize = self.optimize_depth > 1;
                self.binary_op("Compose", a, b, expr.line, Some(Value::Str("right".to_string())))?
            }
            ExprKind::Repetition(inner, kind) => {
                let value = self.make_value(inner)?;
                let mut args = vec![value, Value::Int(kind.tag())];
                if let RepetitionKind::Range(min, max) = kind {
                    args.push(Value::Int(*min));
                    args.push(Value::Int(*max));
                }
                self.call_builtin("Closure", args, expr.line)?
            }
            ExprKind::Identifier(identifier) => self.load_identifier(identifier)?,
            ExprKind::StringFst { mode, text, symtab } => {
                let mut args = vec![Value::Int(mode.tag()), Value::Str(text.text.clone())];
                if let Some(symtab) = symtab {
                    args.push(self.make_value(symtab)?);
                }
                self.call_builtin("StringFst", args, expr.line)?
            }
            ExprKind::StringLit(lit) => Value::Str(lit.text.clone()),
            ExprKind::Call { name, args } => self.call_function(name, args, expr.line)?,
        };
        if output.is_fst() {
            if let Some(weight) = &expr.weight {
                let Some(parsed) = W::parse_text(&weight.text) else {
                    self.report(weight.line, format!("Invalid weight: {}", weight.text));
                    return None;
                };
                if let Value::Fst(fst) = output {
                    output =
                        Value::Fst(attach_final_weight(fst, parsed, self.config.save_symbols));
                }
            }
            if self.config.optimize_all_fsts || force_optimize {
                if let Value::Fst(fst) = &mut output {
                    weft_fst::algo::optimize(fst);
                }
            }
        }
        Some(output)
    }

    fn binary_op(
        &mut self,
        name: &str,
        a: &Expr,
        b: &Expr,
        line: u32,
        extra: Option<Value<W>>,
    ) -> Option<Value<W>> {
        let va = self.make_value(a)?;
        let vb = self.make_value(b)?;
        let mut args = vec![va, vb];
        if let Some(extra) = extra {
            args.push(extra);
        }
        self.call_builtin(name, args, line)
    }

    fn call_builtin(&mut self, name: &str, args: Vec<Value<W>>, line: u32) -> Option<Value<W>> {
        let result = {
            let ctx = FuncContext { config: &self.config };
            W::registry().call(name, args, &ctx)
        };
        match result {
            Some(Ok(value)) => Some(value),
            Some(Err(message)) => {
                self.report(line, message);
                None
            }
            None => {
                self.report(line, format!("Undefined function identifier: {}", name));
                None
            }
        }
    }

    fn load_identifier(&mut self, identifier: &Identifier) -> Option<Value<W>> {
        let Some(value) = self.lookup_value(identifier) else {
            self.report(identifier.line, format!("Undefined symbol: {}", identifier.full()));
            return None;
        };
        // Dead-value elimination applies only to unqualified names in the
        // top-level grammar's persistent frame.
        if self.current.is_empty()
            && self.current_ns().local_env_depth() == 1
            && !identifier.has_namespaces()
        {
            let erase = match &mut self.id_counter {
                Some(counter) => !counter.decrement(identifier.leaf()),
                None => false,
            };
            if erase {
                self.current_ns_mut().erase_local(identifier.leaf());
            }
        }
        Some(value)
    }

    fn lookup_value(&self, identifier: &Identifier) -> Option<Value<W>> {
        let target = self.current_ns().descend(identifier.namespaces())?;
        target.get_value::<W>(identifier.leaf())
    }

    fn call_function(&mut self, name: &Identifier, args: &[Expr], line: u32) -> Option<Value<W>> {
        if name.full() == "Optimize" {
            self.optimize_depth = 0;
        }
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            match self.make_value(arg) {
                Some(value) => values.push(value),
                None => {
                    self.report(
                        name.line,
                        format!("Unable to bind all arguments for function call: {}", name.full()),
                    );
                    self.optimize_depth = -1;
                    return None;
                }
            }
        }
        let result = if let Some((node, path)) = self.lookup_function_node(name) {
            self.run_user_function(&node, path, values, name)
        } else if !name.has_namespaces() {
            self.call_builtin(name.leaf(), values, line)
        } else {
            self.report(line, format!("Undefined function identifier: {}", name.full()));
            None
        };
        self.optimize_depth = -1;
        result
    }

    fn lookup_function_node(&self, name: &Identifier) -> Option<(Arc<Function>, Vec<String>)> {
        let target = self.current_ns().descend(name.namespaces())?;
        let node = target.get_function(name.leaf())?;
        let mut path = self.current.clone();
        path.extend(name.namespaces().iter().cloned());
        Some((node, path))
    }

    fn run_user_function(
        &mut self,
        node: &Arc<Function>,
        path: Vec<String>,
        args: Vec<Value<W>>,
        call_site: &Identifier,
    ) -> Option<Value<W>> {
        let saved = std::mem::replace(&mut self.current, path);
        self.current_ns_mut().push_local_env();
        if node.params.len() != args.len() {
            self.report(
                call_site.line,
                format!("Expected {} arguments but got {}", node.params.len(), args.len()),
            );
        }
        if self.success {
            for (param, value) in node.params.iter().zip(args) {
                if param.has_namespaces() {
                    self.report(
                        param.line,
                        format!("Invalid function argument: {}", param.full()),
                    );
                    break;
                }
                self.current_ns_mut().insert_local(param.leaf(), value);
            }
        }
        let mut output = None;
        if self.success {
            for statement in &node.body {
                if !self.success {
                    break;
                }
                match statement {
                    Statement::Rule(rule) => self.visit_rule(rule),
                    Statement::Return(ret) => {
                        output = self.make_value(&ret.expr);
                        break;
                    }
                }
            }
        }
        self.current_ns_mut().pop_local_env();
        self.current = saved;
        if output.is_none() && self.success {
            self.report(
                call_site.line,
                format!("Function {} did not return a value", call_site.full()),
            );
        }
        output
    }

    // ----- export -----

    /// Collects the exported FSTs (plus the generated-label table entry
    /// when any labels were interned), canonicalized and top-sorted.
    /// `None` if the compilation has failed or a non-FST was exported.
    pub fn take_exports(&mut self) -> Option<BTreeMap<String, VectorFst<W>>> {
        if !self.success {
            return None;
        }
        let mut fsts: BTreeMap<String, VectorFst<W>> = BTreeMap::new();
        let (byte, utf8) = {
            let interner = labels::global();
            if interner.has_generated() {
                let mut label_fst: VectorFst<W> = VectorFst::new();
                label_fst.set_input_symbols(Some(Arc::new(interner.table().clone())));
                fsts.insert(STRING_FST_SYMTAB_FST.to_string(), label_fst);
            }
            if self.config.save_symbols {
                (
                    with_generated(&byte_symbol_table(), &interner),
                    with_generated(&utf8_symbol_table(), &interner),
                )
            } else {
                (byte_symbol_table(), utf8_symbol_table())
            }
        };
        for (name, line) in self.exported.clone() {
            if fsts.contains_key(&name) {
                continue;
            }
            let Some(value) = self.root.get_value::<W>(&name) else {
                eprintln!("Warning: Cannot find exportable fst with name {}: ignoring.", name);
                continue;
            };
            match value {
                Value::Fst(mut fst) => {
                    reassign_symbols(&mut fst, &byte, &utf8);
                    // Deliberate: exported machines are top-sorted before the
                    // write (a no-op on cyclic machines).
                    top_sort(&mut fst);
                    fsts.insert(name, fst);
                }
                other => {
                    self.report(
                        line,
                        format!(
                            "Cannot export non-FST variable: {} ({})",
                            name,
                            other.kind_name()
                        ),
                    );
                    return None;
                }
            }
        }
        Some(fsts)
    }

    // ----- plumbing -----

    fn current_ns(&self) -> &Namespace {
        match self.root.descend(&self.current) {
            Some(ns) => ns,
            None => panic!("evaluator namespace path is broken: {:?}", self.current),
        }
    }

    fn current_ns_mut(&mut self) -> &mut Namespace {
        match self.root.descend_mut(&self.current) {
            Some(ns) => ns,
            None => panic!("evaluator namespace path is broken: {:?}", self.current),
        }
    }

    fn report(&mut self, line: u32, message: impl Into<String>) {
        self.diagnostics.push(CompileError::new(self.file.clone(), line, message));
        self.success = false;
    }
}
