//! Per-file scope chains.
//!
//! Each grammar file gets a namespace: a stack of local environments for
//! rule bindings and call frames, an alias-keyed map of child namespaces
//! for its imports, and a view into the shared resource map where imported
//! FSTs and function nodes live under `filename/…` keys. The whole tree
//! shares one resource map; prefixing keeps files apart.
//!
//! The evaluator owns the root and addresses namespaces by alias path, so
//! descending into children never aliases mutable references.

use std::sync::Arc;

use weft_fst::Semiring;
use weft_language::Function;

use crate::resource_map::ResourceMap;
use crate::value::Value;

/// One grammar file's scopes.
#[derive(Debug)]
pub struct Namespace {
    filename: String,
    toplevel: bool,
    resources: Arc<ResourceMap>,
    locals: Vec<ResourceMap>,
    children: std::collections::HashMap<String, Namespace>,
}

impl Namespace {
    /// Root namespace for the primary compilation target. Owns a fresh
    /// resource map and one persistent local frame.
    pub fn top_level(filename: impl Into<String>) -> Self {
        let mut ns = Self {
            filename: filename.into(),
            toplevel: true,
            resources: Arc::new(ResourceMap::new()),
            locals: Vec::new(),
            children: std::collections::HashMap::new(),
        };
        ns.push_local_env();
        ns
    }

    /// Adds a child namespace under `alias`. Returns `false` if the alias
    /// is already taken in this namespace.
    pub fn add_sub_namespace(&mut self, filename: &str, alias: &str) -> bool {
        if self.children.contains_key(alias) {
            return false;
        }
        let child = Namespace {
            filename: filename.to_string(),
            toplevel: false,
            resources: self.resources.clone(),
            locals: Vec::new(),
            children: std::collections::HashMap::new(),
        };
        self.children.insert(alias.to_string(), child);
        true
    }

    pub fn child(&self, alias: &str) -> Option<&Namespace> {
        self.children.get(alias)
    }

    pub fn child_mut(&mut self, alias: &str) -> Option<&mut Namespace> {
        self.children.get_mut(alias)
    }

    /// Walks an alias path starting here.
    pub fn descend(&self, path: &[String]) -> Option<&Namespace> {
        let mut ns = self;
        for alias in path {
            ns = ns.child(alias)?;
        }
        Some(ns)
    }

    pub fn descend_mut(&mut self, path: &[String]) -> Option<&mut Namespace> {
        let mut ns = self;
        for alias in path {
            ns = ns.child_mut(alias)?;
        }
        Some(ns)
    }

    pub fn filename(&self) -> &str {
        if self.filename.is_empty() {
            "<unknown file>"
        } else {
            &self.filename
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.toplevel
    }

    // ----- local environments -----

    pub fn push_local_env(&mut self) {
        self.locals.push(ResourceMap::new());
    }

    pub fn pop_local_env(&mut self) {
        self.locals.pop();
    }

    pub fn local_env_depth(&self) -> usize {
        self.locals.len()
    }

    /// Binds into the innermost frame. Returns `false` on clobber.
    pub fn insert_local<W: Semiring>(&mut self, name: &str, value: Value<W>) -> bool {
        match self.locals.last() {
            Some(frame) => frame.insert(name, value),
            None => false,
        }
    }

    /// Erases from the innermost frame.
    pub fn erase_local(&mut self, name: &str) -> bool {
        match self.locals.last() {
            Some(frame) => frame.erase(name),
            None => false,
        }
    }

    /// Looks up a value: innermost frame outward, then the shared per-file
    /// storage (imported FSTs).
    pub fn get_value<W: Semiring>(&self, name: &str) -> Option<Value<W>> {
        for frame in self.locals.iter().rev() {
            if let Some(value) = frame.get::<Value<W>>(name) {
                return Some((*value).clone());
            }
        }
        self.resources
            .get::<Value<W>>(&self.value_key(name))
            .map(|value| (*value).clone())
    }

    /// True if `name` resolves to anything visible here.
    pub fn contains_value(&self, name: &str) -> bool {
        self.locals.iter().rev().any(|frame| frame.contains(name))
            || self.resources.contains(&self.value_key(name))
    }

    /// Inserts an imported FST (or other shared value) under this file's
    /// prefix. Returns `false` on clobber.
    pub fn insert_shared<W: Semiring>(&self, name: &str, value: Value<W>) -> bool {
        self.resources.insert(&self.value_key(name), value)
    }

    // ----- function table -----

    /// Registers a function node. First definition wins; returns `false`
    /// if the name was already registered in this file.
    pub fn insert_function(&self, name: &str, node: Arc<Function>) -> bool {
        if self.resources.contains(&self.function_key(name)) {
            return false;
        }
        self.resources.insert(&self.function_key(name), node)
    }

    pub fn get_function(&self, name: &str) -> Option<Arc<Function>> {
        self.resources
            .get::<Arc<Function>>(&self.function_key(name))
            .map(|node| (*node).clone())
    }

    fn value_key(&self, name: &str) -> String {
        format!("{}/{}", self.filename, name)
    }

    fn function_key(&self, name: &str) -> String {
        format!("{}/func/{}", self.filename, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_fst::TropicalWeight;

    fn int(v: i64) -> Value<TropicalWeight> {
        Value::Int(v)
    }

    #[test]
    fn top_level_starts_with_one_frame() {
        let ns = Namespace::top_level("main.grm");
        assert!(ns.is_top_level());
        assert_eq!(ns.local_env_depth(), 1);
    }

    #[test]
    fn local_bindings_resolve_innermost_first() {
        let mut ns = Namespace::top_level("main.grm");
        assert!(ns.insert_local("x", int(1)));
        ns.push_local_env();
        assert!(ns.insert_local("x", int(2)));
        assert_eq!(ns.get_value::<TropicalWeight>("x"), Some(int(2)));
        ns.pop_local_env();
        assert_eq!(ns.get_value::<TropicalWeight>("x"), Some(int(1)));
    }

    #[test]
    fn insert_local_reports_clobber() {
        let mut ns = Namespace::top_level("main.grm");
        assert!(ns.insert_local("x", int(1)));
        assert!(!ns.insert_local("x", int(2)));
    }

    #[test]
    fn erase_local_only_touches_innermost_frame() {
        let mut ns = Namespace::top_level("main.grm");
        ns.insert_local("x", int(1));
        ns.push_local_env();
        assert!(!ns.erase_local("x"));
        ns.pop_local_env();
        assert!(ns.erase_local("x"));
        assert_eq!(ns.get_value::<TropicalWeight>("x"), None);
    }

    #[test]
    fn aliases_cannot_be_reused() {
        let mut ns = Namespace::top_level("main.grm");
        assert!(ns.add_sub_namespace("lib.grm", "lib"));
        assert!(!ns.add_sub_namespace("other.grm", "lib"));
    }

    #[test]
    fn shared_values_are_per_file() {
        let mut ns = Namespace::top_level("main.grm");
        ns.add_sub_namespace("lib.grm", "lib");
        ns.child("lib").unwrap().insert_shared("rule", int(7));
        // Visible in the child, not at the root.
        assert_eq!(ns.child("lib").unwrap().get_value::<TropicalWeight>("rule"), Some(int(7)));
        assert_eq!(ns.get_value::<TropicalWeight>("rule"), None);
    }

    #[test]
    fn descend_walks_alias_paths() {
        let mut ns = Namespace::top_level("main.grm");
        ns.add_sub_namespace("a.grm", "a");
        ns.child_mut("a").unwrap().add_sub_namespace("b.grm", "b");
        let path = vec!["a".to_string(), "b".to_string()];
        assert_eq!(ns.descend(&path).unwrap().filename(), "b.grm");
        assert!(ns.descend(&["ghost".to_string()]).is_none());
    }

    #[test]
    fn local_frames_hide_across_namespaces() {
        let mut ns = Namespace::top_level("main.grm");
        ns.insert_local("x", int(1));
        ns.add_sub_namespace("lib.grm", "lib");
        assert_eq!(ns.child("lib").unwrap().get_value::<TropicalWeight>("x"), None);
    }
}
