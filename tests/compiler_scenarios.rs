//! End-to-end compiler scenarios: source text in, archives and
//! diagnostics out.

mod common;

use std::sync::Arc;

use common::{accepts, compile, compile_with, error_text, transduces};
use weft_compile::{compile_grammar_to_far, CompilerConfig};
use weft_fst::algo::total_weight;
use weft_fst::far::Archive;
use weft_fst::{props, Semiring, TropicalWeight};

#[test]
fn rewrite_rule_exports_transducer() {
    let _guard = common::lock();
    let fsts = compile("export foo = \"cat\" : \"dog\";").unwrap();
    assert_eq!(fsts.len(), 1);
    let foo = &fsts["foo"];
    assert!(transduces(foo, "cat", "dog"));
    assert!(!transduces(foo, "cat", "cat"));
    assert!(total_weight(foo).approx_eq(TropicalWeight::one()));
}

#[test]
fn union_with_plus_closure_accepts_nonempty_vowel_strings() {
    let _guard = common::lock();
    let fsts = compile(
        "vowel = \"a\" | \"e\" | \"i\" | \"o\" | \"u\";\n\
         export vowels = vowel+;",
    )
    .unwrap();
    let vowels = &fsts["vowels"];
    assert!(props::is_acceptor(vowels));
    assert!(accepts(vowels, "a"));
    assert!(accepts(vowels, "aeiou"));
    assert!(accepts(vowels, "uuu"));
    assert!(!accepts(vowels, ""));
    assert!(!accepts(vowels, "ab"));
}

#[test]
fn optimized_composition_is_minimal() {
    let _guard = common::lock();
    let fsts = compile(
        "up = \"a\" : \"b\";\n\
         dn = \"b\" : \"c\";\n\
         export chain = Optimize[up @ dn];",
    )
    .unwrap();
    let chain = &fsts["chain"];
    assert!(transduces(chain, "a", "c"));
    // The minimized deterministic form of the epsilon-aligned cross
    // product a:ε · ε:c: three states, two arcs, no dead epsilons.
    assert_eq!(chain.num_states(), 3);
    assert_eq!(chain.total_arcs(), 2);
    assert!(props::is_epsilon_free(chain));
}

#[test]
fn reversed_repetition_bounds_abort_compilation() {
    let _guard = common::lock();
    let errors = compile("x = \"a\"{3,2};").unwrap_err();
    assert!(error_text(&errors).contains("repetition bounds reversed: 3 > 2"));
}

#[test]
fn failed_compilation_writes_no_archive() {
    let _guard = common::lock();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("bad.grm"), "x = \"a\"{3,2};").unwrap();
    let config = Arc::new(CompilerConfig {
        indir: dir.path().to_path_buf(),
        outdir: dir.path().to_path_buf(),
        ..Default::default()
    });
    let result = compile_grammar_to_far::<TropicalWeight>("bad.grm", "bad.far", &config);
    assert!(result.is_err());
    assert!(!dir.path().join("bad.far").exists());
}

#[test]
fn successful_compilation_writes_readable_archive() {
    let _guard = common::lock();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("g.grm"), "export rule = \"hi\";").unwrap();
    let config = Arc::new(CompilerConfig {
        indir: dir.path().to_path_buf(),
        outdir: dir.path().to_path_buf(),
        ..Default::default()
    });
    compile_grammar_to_far::<TropicalWeight>("g.grm", "g.far", &config).unwrap();
    let archive = Archive::<TropicalWeight>::read(&dir.path().join("g.far")).unwrap();
    assert!(accepts(archive.get("rule").unwrap(), "hi"));
}

#[test]
fn assert_equal_failure_names_both_sides() {
    let _guard = common::lock();
    let errors = compile(
        "x = \"a\" : \"b\";\n\
         unused = AssertEqual[\"a\" @ x, \"c\"];",
    )
    .unwrap_err();
    let text = error_text(&errors);
    assert!(text.contains("test.grm:2:"));
    assert!(
        text.contains("Arguments to AssertEqual are not equivalent: expect \"c\" got \"b\""),
        "unexpected diagnostics: {}",
        text
    );
}

#[test]
fn assert_equal_success_is_silent() {
    let _guard = common::lock();
    let fsts = compile(
        "x = \"a\" : \"b\";\n\
         export ok = AssertEqual[\"a\" @ x, \"b\"];",
    )
    .unwrap();
    assert!(fsts.contains_key("ok"));
}

#[test]
fn weights_parse_in_the_arc_semiring() {
    let _guard = common::lock();
    let fsts = compile("export w = \"a\" <1.5>;").unwrap();
    assert!(total_weight(&fsts["w"]).approx_eq(TropicalWeight(1.5)));
}

#[test]
fn malformed_weight_is_a_compile_error() {
    let _guard = common::lock();
    let errors = compile("export w = \"a\" <heavy>;").unwrap_err();
    assert!(error_text(&errors).contains("Invalid weight: heavy"));
}

#[test]
fn always_export_flag_exports_unmarked_rules() {
    let _guard = common::lock();
    let config = CompilerConfig { always_export: true, ..Default::default() };
    let fsts = compile_with("a = \"x\"; b = \"y\";", config).unwrap();
    assert!(fsts.contains_key("a"));
    assert!(fsts.contains_key("b"));
}

#[test]
fn optimize_all_fsts_still_preserves_language() {
    let _guard = common::lock();
    let config = CompilerConfig { optimize_all_fsts: true, ..Default::default() };
    let fsts = compile_with("export r = (\"a\" | \"a\") (\"b\" | \"b\");", config).unwrap();
    assert!(accepts(&fsts["r"], "ab"));
    assert!(!accepts(&fsts["r"], "a"));
    // Redundant branches collapse.
    assert_eq!(fsts["r"].num_states(), 3);
}

#[test]
fn empty_string_literal_is_single_state_acceptor() {
    let _guard = common::lock();
    let fsts = compile("export e = \"\";").unwrap();
    let e = &fsts["e"];
    assert_eq!(e.num_states(), 1);
    assert!(accepts(e, ""));
}

#[test]
fn repetition_boundaries() {
    let _guard = common::lock();
    let fsts = compile(
        "export zero = \"a\"{0};\n\
         export zerozero = \"a\"{0,0};\n\
         export three = \"a\"{3,3};",
    )
    .unwrap();
    assert!(accepts(&fsts["zero"], ""));
    assert!(!accepts(&fsts["zero"], "a"));
    assert!(accepts(&fsts["zerozero"], ""));
    assert!(accepts(&fsts["three"], "aaa"));
    assert!(!accepts(&fsts["three"], "aa"));
    assert!(!accepts(&fsts["three"], "aaaa"));
}
