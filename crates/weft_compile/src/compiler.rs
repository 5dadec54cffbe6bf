//! The grammar compiler driver: parse, evaluate, export.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use weft_base::CompileError;
use weft_fst::VectorFst;
use weft_language::{parse_grammar, print_ast, Grammar, IdentifierCounter, ParseOptions};

use crate::config::CompilerConfig;
use crate::evaluator::Evaluator;
use crate::manager::GrammarManager;
use crate::registry::ArcType;

/// Compiles one grammar file (and, transitively, its imports) over one
/// arc type.
///
/// ```no_run
/// use std::sync::Arc;
/// use weft_compile::{CompilerConfig, GrammarCompiler, GrammarManager};
/// use weft_fst::TropicalWeight;
///
/// let config = Arc::new(CompilerConfig::default());
/// let mut compiler = GrammarCompiler::<TropicalWeight>::new(config);
/// compiler.parse_file(std::path::Path::new("numbers.grm")).unwrap();
/// let fsts = compiler.evaluate().unwrap();
/// GrammarManager::from_fsts(fsts).export_far(std::path::Path::new("numbers.far")).unwrap();
/// ```
pub struct GrammarCompiler<W: ArcType> {
    config: Arc<CompilerConfig>,
    file: String,
    ast: Option<Arc<Grammar>>,
    marker: std::marker::PhantomData<W>,
}

impl<W: ArcType> GrammarCompiler<W> {
    pub fn new(config: Arc<CompilerConfig>) -> Self {
        Self { config, file: String::new(), ast: None, marker: std::marker::PhantomData }
    }

    /// Parses a grammar file resolved against the configured `indir`.
    pub fn parse_file(&mut self, path: &Path) -> Result<(), Vec<CompileError>> {
        let display = path.display().to_string();
        let source = std::fs::read_to_string(path).map_err(|_| {
            vec![CompileError::file_level(
                display.clone(),
                "Unable to open grm source file",
            )]
        })?;
        self.parse_source(&source, &display)
    }

    /// Parses grammar text under the given file name (used for imports
    /// resolved elsewhere and by tests).
    pub fn parse_source(&mut self, source: &str, file: &str) -> Result<(), Vec<CompileError>> {
        let options = ParseOptions { always_export: self.config.always_export };
        let grammar = parse_grammar(source, file, &options)?;
        self.file = file.to_string();
        self.ast = Some(Arc::new(grammar));
        Ok(())
    }

    pub fn ast(&self) -> Option<&Arc<Grammar>> {
        self.ast.as_ref()
    }

    /// Renders the parsed AST, or `None` before a successful parse.
    pub fn print_ast(&self, line_numbers: bool) -> Option<String> {
        self.ast.as_ref().map(|grammar| print_ast(grammar, line_numbers))
    }

    /// Evaluates the parsed grammar and returns the export map.
    pub fn evaluate(&self) -> Result<BTreeMap<String, VectorFst<W>>, Vec<CompileError>> {
        let Some(grammar) = &self.ast else {
            return Err(vec![CompileError::file_level(self.file.clone(), "No parsed grammar")]);
        };
        let mut evaluator: Evaluator<W> = Evaluator::new(self.file.clone(), self.config.clone());
        evaluator.set_id_counter(IdentifierCounter::build(grammar));
        evaluator.run(grammar);
        match evaluator.take_exports() {
            Some(fsts) => Ok(fsts),
            None => Err(evaluator.take_diagnostics()),
        }
    }
}

/// One-call front door used by the CLI: parse, evaluate, and write the
/// archive under `outdir`. On failure every diagnostic is returned and no
/// archive is written.
pub fn compile_grammar_to_far<W: ArcType>(
    input_grammar: &str,
    output_far: &str,
    config: &Arc<CompilerConfig>,
) -> Result<(), Vec<CompileError>> {
    let mut compiler = GrammarCompiler::<W>::new(config.clone());
    compiler.parse_file(&config.resolve(input_grammar))?;
    let fsts = compiler.evaluate()?;
    let out_path = config.resolve_out(output_far);
    GrammarManager::from_fsts(fsts)
        .export_far(&out_path)
        .map_err(|e| vec![CompileError::file_level(out_path.display().to_string(), e)])
}
