//! Imports, namespaces, and generated-label identity across archives.

mod common;

use std::path::Path;
use std::sync::Arc;

use common::{accepts, error_text, relates};
use weft_base::CompileError;
use weft_compile::{compile_grammar_to_far, labels, CompilerConfig, GrammarCompiler};
use weft_fst::far::Archive;
use weft_fst::{Label, TropicalWeight, VectorFst};

type ExportMap = std::collections::BTreeMap<String, VectorFst<TropicalWeight>>;

const GENERATED_START: Label = 0xF0000;

fn compile_in_dir(dir: &Path, source: &str) -> Result<ExportMap, Vec<CompileError>> {
    let config = Arc::new(CompilerConfig {
        indir: dir.to_path_buf(),
        outdir: dir.to_path_buf(),
        ..Default::default()
    });
    let mut compiler = GrammarCompiler::<TropicalWeight>::new(config);
    compiler.parse_source(source, "main.grm")?;
    compiler.evaluate()
}

/// Compiles `lib.grm` (defining `export M = "[cat]";`) into `lib.far` in a
/// fresh session, then resets the interner so the caller starts its own.
fn build_cat_library(dir: &Path) {
    std::fs::write(dir.join("lib.grm"), "export M = \"[cat]\";").unwrap();
    let config = Arc::new(CompilerConfig {
        indir: dir.to_path_buf(),
        outdir: dir.to_path_buf(),
        ..Default::default()
    });
    compile_grammar_to_far::<TropicalWeight>("lib.grm", "lib.far", &config).unwrap();
}

#[test]
fn library_archive_carries_its_label_table() {
    let _guard = common::lock();
    let dir = tempfile::tempdir().unwrap();
    build_cat_library(dir.path());
    let archive = Archive::<TropicalWeight>::read(&dir.path().join("lib.far")).unwrap();
    let keys: Vec<&str> = archive.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["*StringFstSymbolTable", "M"]);
    let table = archive
        .get("*StringFstSymbolTable")
        .unwrap()
        .input_symbols()
        .unwrap();
    assert_eq!(table.find_label("cat"), Some(GENERATED_START));
}

#[test]
fn import_remaps_colliding_generated_labels() {
    let _guard = common::lock();
    let dir = tempfile::tempdir().unwrap();
    build_cat_library(dir.path());

    // A fresh session claims the first generated label for "dog" before
    // importing; the library's "cat" must move.
    labels::reset_for_tests();
    labels::global().intern("dog");
    let fsts = compile_in_dir(
        dir.path(),
        "import 'lib.grm' as lib;\nexport out = lib.M;",
    )
    .unwrap();

    let interner = labels::global();
    assert_eq!(interner.find_label("dog"), Some(GENERATED_START));
    let cat = interner.find_label("cat").unwrap();
    assert!(cat > GENERATED_START);
    assert_eq!(interner.remap_lookup(GENERATED_START), Some(cat));
    drop(interner);

    // Every arc of the imported machine was rewritten: the old label is
    // gone, the new one accepted.
    let out = &fsts["out"];
    assert!(relates(out, &[cat], &[cat]));
    for s in out.states() {
        for arc in out.arcs(s) {
            assert_ne!(arc.ilabel, GENERATED_START);
            assert_ne!(arc.olabel, GENERATED_START);
        }
    }
}

#[test]
fn reimporting_the_same_library_is_stable() {
    let _guard = common::lock();
    let dir = tempfile::tempdir().unwrap();
    build_cat_library(dir.path());
    labels::reset_for_tests();
    let fsts = compile_in_dir(
        dir.path(),
        "import 'lib.grm' as lib;\nexport a = lib.M;\nexport b = lib.M;",
    )
    .unwrap();
    // Same session, same labels: both copies agree with the interner.
    let cat = labels::global().find_label("cat").unwrap();
    assert_eq!(cat, GENERATED_START);
    assert!(relates(&fsts["a"], &[cat], &[cat]));
    assert!(relates(&fsts["b"], &[cat], &[cat]));
}

#[test]
fn imported_names_need_their_alias() {
    let _guard = common::lock();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("lib.grm"), "export word = \"hi\";").unwrap();
    let config = Arc::new(CompilerConfig {
        indir: dir.path().to_path_buf(),
        outdir: dir.path().to_path_buf(),
        ..Default::default()
    });
    compile_grammar_to_far::<TropicalWeight>("lib.grm", "lib.far", &config).unwrap();

    // Qualified access works.
    let fsts = compile_in_dir(
        dir.path(),
        "import 'lib.grm' as A;\nexport out = A.word;",
    )
    .unwrap();
    assert!(accepts(&fsts["out"], "hi"));

    // Unqualified access to the imported name does not.
    let errors = compile_in_dir(
        dir.path(),
        "import 'lib.grm' as A;\nexport out = word;",
    )
    .unwrap_err();
    assert!(error_text(&errors).contains("Undefined symbol: word"));
}

#[test]
fn top_level_names_shadow_nothing_across_files() {
    let _guard = common::lock();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("lib.grm"), "export word = \"lib\";").unwrap();
    let config = Arc::new(CompilerConfig {
        indir: dir.path().to_path_buf(),
        outdir: dir.path().to_path_buf(),
        ..Default::default()
    });
    compile_grammar_to_far::<TropicalWeight>("lib.grm", "lib.far", &config).unwrap();
    let fsts = compile_in_dir(
        dir.path(),
        "import 'lib.grm' as A;\nword = \"main\";\nexport out = word A.word;",
    )
    .unwrap();
    assert!(accepts(&fsts["out"], "mainlib"));
}

#[test]
fn imported_functions_run_in_their_namespace() {
    let _guard = common::lock();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("lib.grm"),
        "func Bracket[x] { return \"<\" x \">\"; }\nexport unused = \"u\";",
    )
    .unwrap();
    let config = Arc::new(CompilerConfig {
        indir: dir.path().to_path_buf(),
        outdir: dir.path().to_path_buf(),
        ..Default::default()
    });
    compile_grammar_to_far::<TropicalWeight>("lib.grm", "lib.far", &config).unwrap();
    let fsts = compile_in_dir(
        dir.path(),
        "import 'lib.grm' as lib;\nexport out = lib.Bracket[\"a\"];",
    )
    .unwrap();
    assert!(accepts(&fsts["out"], "<a>"));
}

#[test]
fn import_requires_grm_extension() {
    let _guard = common::lock();
    let dir = tempfile::tempdir().unwrap();
    let errors = compile_in_dir(dir.path(), "import 'lib.txt' as lib;\nexport x = \"a\";")
        .unwrap_err();
    assert!(error_text(&errors).contains("Extension for included files should be .grm"));
}

#[test]
fn missing_import_file_is_reported() {
    let _guard = common::lock();
    let dir = tempfile::tempdir().unwrap();
    let errors = compile_in_dir(dir.path(), "import 'ghost.grm' as g;\nexport x = \"a\";")
        .unwrap_err();
    assert!(error_text(&errors).contains("Unable to open grm source file"));
}

#[test]
fn missing_companion_archive_is_reported() {
    let _guard = common::lock();
    let dir = tempfile::tempdir().unwrap();
    // Source exists, archive does not.
    std::fs::write(dir.path().join("lib.grm"), "export word = \"hi\";").unwrap();
    let errors = compile_in_dir(dir.path(), "import 'lib.grm' as lib;\nexport x = \"a\";")
        .unwrap_err();
    assert!(error_text(&errors).contains("Unable to open far archive"));
}

#[test]
fn duplicate_alias_is_reported() {
    let _guard = common::lock();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("lib.grm"), "export word = \"hi\";").unwrap();
    let config = Arc::new(CompilerConfig {
        indir: dir.path().to_path_buf(),
        outdir: dir.path().to_path_buf(),
        ..Default::default()
    });
    compile_grammar_to_far::<TropicalWeight>("lib.grm", "lib.far", &config).unwrap();
    let errors = compile_in_dir(
        dir.path(),
        "import 'lib.grm' as A;\nimport 'lib.grm' as A;\nexport x = \"a\";",
    )
    .unwrap_err();
    assert!(error_text(&errors).contains("Cannot reuse the same alias"));
}
