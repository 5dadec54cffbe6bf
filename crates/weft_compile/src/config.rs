//! Compiler configuration.
//!
//! The CLI surface, threaded explicitly instead of living in process-wide
//! flags. Everything that changes evaluation behavior is here; output
//! selection (`--emit_ast_only` and friends) stays in the CLI layer.

use std::path::PathBuf;

/// Knobs shared by the evaluator, the built-in registry, and the exporter.
#[derive(Debug, Clone, Default)]
pub struct CompilerConfig {
    /// Root prefix for resolving grammar, import, and data paths.
    pub indir: PathBuf,
    /// Root prefix for archive output.
    pub outdir: PathBuf,
    /// Propagate per-FST symbol tables through operations and check
    /// compatibility.
    pub save_symbols: bool,
    /// Mark every rule as exported.
    pub always_export: bool,
    /// Optimize every FST-producing expression.
    pub optimize_all_fsts: bool,
    /// Log each rule name as it is evaluated.
    pub print_rules: bool,
}

impl CompilerConfig {
    /// Resolves a grammar-relative path under `indir`.
    pub fn resolve(&self, path: &str) -> PathBuf {
        if self.indir.as_os_str().is_empty() {
            PathBuf::from(path)
        } else {
            self.indir.join(path)
        }
    }

    /// Resolves an output path under `outdir`.
    pub fn resolve_out(&self, path: &str) -> PathBuf {
        if self.outdir.as_os_str().is_empty() {
            PathBuf::from(path)
        } else {
            self.outdir.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_joins_indir() {
        let config = CompilerConfig { indir: PathBuf::from("/data"), ..Default::default() };
        assert_eq!(config.resolve("g.grm"), PathBuf::from("/data/g.grm"));
    }

    #[test]
    fn empty_indir_leaves_path_alone() {
        let config = CompilerConfig::default();
        assert_eq!(config.resolve("g.grm"), PathBuf::from("g.grm"));
    }
}
