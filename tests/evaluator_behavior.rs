//! Direct evaluator checks: dead-value elimination and failure behavior.

mod common;

use std::sync::Arc;

use weft_compile::evaluator::Evaluator;
use weft_compile::{CompilerConfig, Value};
use weft_fst::TropicalWeight;
use weft_language::{parse_grammar, IdentifierCounter, ParseOptions};

fn run_evaluator(source: &str) -> Evaluator<TropicalWeight> {
    let grammar = parse_grammar(source, "test.grm", &ParseOptions::default()).unwrap();
    let mut evaluator: Evaluator<TropicalWeight> =
        Evaluator::new("test.grm", Arc::new(CompilerConfig::default()));
    evaluator.set_id_counter(IdentifierCounter::build(&grammar));
    evaluator.run(&grammar);
    evaluator
}

#[test]
fn last_use_of_unexported_name_erases_the_binding() {
    let _guard = common::lock();
    let evaluator = run_evaluator("a = \"x\"; b = a;");
    assert!(evaluator.success());
    // a's single reference was consumed; b was never referenced.
    assert!(evaluator.top_level_value("a").is_none());
    assert!(evaluator.top_level_value("b").is_some());
}

#[test]
fn binding_survives_until_its_last_use() {
    let _guard = common::lock();
    let evaluator = run_evaluator("a = \"x\"; b = a; c = a a;");
    assert!(evaluator.success());
    assert!(evaluator.top_level_value("a").is_none());
    assert!(evaluator.top_level_value("b").is_some());
    assert!(evaluator.top_level_value("c").is_some());
}

#[test]
fn exported_names_are_never_erased() {
    let _guard = common::lock();
    let evaluator = run_evaluator("export a = \"x\"; b = a; c = a;");
    assert!(evaluator.success());
    assert!(evaluator.top_level_value("a").is_some());
}

#[test]
fn unreferenced_names_stay_bound() {
    let _guard = common::lock();
    let evaluator = run_evaluator("a = \"x\"; b = \"y\";");
    assert!(evaluator.success());
    assert!(evaluator.top_level_value("a").is_some());
    assert!(evaluator.top_level_value("b").is_some());
}

#[test]
fn string_values_flow_through_bindings() {
    let _guard = common::lock();
    let evaluator = run_evaluator("path = 'data.tsv'; export keep = \"a\"; also = path;");
    assert!(evaluator.success());
    match evaluator.top_level_value("also") {
        Some(Value::Str(text)) => assert_eq!(text, "data.tsv"),
        other => panic!("expected string binding, got {:?}", other),
    }
}

#[test]
fn failure_short_circuits_later_statements() {
    let _guard = common::lock();
    let evaluator = run_evaluator("a = ghost; b = \"y\";");
    assert!(!evaluator.success());
    // b never ran.
    assert!(evaluator.top_level_value("b").is_none());
    assert_eq!(evaluator.diagnostics().len(), 1);
    assert!(evaluator.diagnostics()[0].to_string().contains("Undefined symbol: ghost"));
}

#[test]
fn function_frames_do_not_leak_into_top_level() {
    let _guard = common::lock();
    let evaluator = run_evaluator(
        "func F[x] { inner = x x; return inner; }\n\
         export out = F[\"a\"];",
    );
    assert!(evaluator.success());
    assert!(evaluator.top_level_value("inner").is_none());
    assert!(evaluator.top_level_value("x").is_none());
    assert!(evaluator.top_level_value("out").is_some());
}
