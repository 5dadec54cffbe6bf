//! Command-line interface for the weft grammar compiler.
//!
//! `weftc` compiles a grammar source file into an archive of named FSTs:
//!
//! ```text
//! weftc --input_grammar numbers.grm --output_far numbers.far
//! ```
//!
//! Exit code 0 on success, 1 on any compilation error; a failed
//! compilation never writes a partial archive.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use weft_compile::{compile_grammar_to_far, CompilerConfig, GrammarCompiler};
use weft_fst::{Log64Weight, LogWeight, TropicalWeight};

#[derive(Parser)]
#[command(name = "weftc")]
#[command(about = "Compiles weft grammars into FST archives", long_about = None)]
#[command(version)]
pub struct Args {
    /// Path to the grammar file.
    #[arg(long = "input_grammar")]
    input_grammar: String,

    /// Path for the output FST archive.
    #[arg(long = "output_far", default_value = "")]
    output_far: String,

    /// Arc type for compiled FSTs: standard, log, or log64.
    #[arg(long = "arc_type", default_value = "standard")]
    arc_type: String,

    /// Parse the input, write its AST to stdout, and exit without
    /// writing an archive.
    #[arg(long = "emit_ast_only")]
    emit_ast_only: bool,

    /// Annotate the AST dump with source line numbers.
    #[arg(long = "line_numbers_in_ast")]
    line_numbers_in_ast: bool,

    /// Root prefix for resolving grammar and import paths.
    #[arg(long = "indir", default_value = "")]
    indir: String,

    /// Root prefix for output.
    #[arg(long = "outdir", default_value = "")]
    outdir: String,

    /// Propagate per-FST symbol tables through operations and check
    /// compatibility.
    #[arg(long = "save_symbols")]
    save_symbols: bool,

    /// Mark every rule as exported.
    #[arg(long = "always_export")]
    always_export: bool,

    /// Optimize every FST-producing expression.
    #[arg(long = "optimize_all_fsts")]
    optimize_all_fsts: bool,

    /// Log each rule name as it is evaluated.
    #[arg(long = "print_rules")]
    print_rules: bool,
}

/// Runs the compiler; returns the process exit code.
pub fn run() -> i32 {
    let args = Args::parse();
    let config = Arc::new(CompilerConfig {
        indir: PathBuf::from(&args.indir),
        outdir: PathBuf::from(&args.outdir),
        save_symbols: args.save_symbols,
        always_export: args.always_export,
        optimize_all_fsts: args.optimize_all_fsts,
        print_rules: args.print_rules,
    });
    let outcome = match args.arc_type.as_str() {
        "standard" => compile::<TropicalWeight>(&args, &config),
        "log" => compile::<LogWeight>(&args, &config),
        "log64" => compile::<Log64Weight>(&args, &config),
        other => Err(vec![format!("Unsupported arc type: {}", other)]),
    };
    match outcome {
        Ok(()) => 0,
        Err(errors) => {
            for error in errors {
                eprintln!("{}", error);
            }
            1
        }
    }
}

fn compile<W: weft_compile::ArcType>(
    args: &Args,
    config: &Arc<CompilerConfig>,
) -> Result<(), Vec<String>> {
    let stringify = |errors: Vec<weft_base::CompileError>| -> Vec<String> {
        errors.into_iter().map(|e| e.to_string()).collect()
    };
    if args.emit_ast_only {
        let mut compiler = GrammarCompiler::<W>::new(config.clone());
        compiler
            .parse_file(&config.resolve(&args.input_grammar))
            .map_err(stringify)?;
        if let Some(text) = compiler.print_ast(args.line_numbers_in_ast) {
            print!("{}", text);
        }
        return Ok(());
    }
    compile_grammar_to_far::<W>(&args.input_grammar, &args.output_far, config).map_err(stringify)
}
