//! The built-in function registry.
//!
//! One registry per arc-weight type, lazily built on first use and
//! read-only afterwards. Entries are callables over owned argument
//! vectors; wrappers classify the three calling conventions (unary-FST,
//! binary-FST, generic) and produce the standard type errors.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use weft_fst::{Log64Weight, LogWeight, Semiring, TropicalWeight, VectorFst};

use crate::config::CompilerConfig;
use crate::functions;
use crate::value::Value;

/// Evaluation context handed to every built-in.
pub struct FuncContext<'a> {
    pub config: &'a CompilerConfig,
}

/// What a built-in returns: a value, or a message the evaluator stamps
/// with the call site's file and line.
pub type BuiltinResult<W> = Result<Value<W>, String>;

type BuiltinFn<W> = Box<dyn Fn(Vec<Value<W>>, &FuncContext) -> BuiltinResult<W> + Send + Sync>;

/// Name-keyed table of built-ins for one arc type.
pub struct FunctionRegistry<W: Semiring> {
    table: HashMap<&'static str, BuiltinFn<W>>,
}

impl<W: Semiring> FunctionRegistry<W> {
    pub fn new() -> Self {
        Self { table: HashMap::new() }
    }

    /// Registers a generic built-in.
    pub fn register(
        &mut self,
        name: &'static str,
        f: impl Fn(Vec<Value<W>>, &FuncContext) -> BuiltinResult<W> + Send + Sync + 'static,
    ) {
        self.table.insert(name, Box::new(f));
    }

    /// Registers a built-in whose first argument must be an FST.
    pub fn register_unary_fst(
        &mut self,
        name: &'static str,
        f: impl Fn(VectorFst<W>, Vec<Value<W>>, &FuncContext) -> BuiltinResult<W>
            + Send
            + Sync
            + 'static,
    ) {
        self.register(name, move |mut args, ctx| {
            if args.is_empty() {
                return Err(format!("{}: Expected at least 1 argument", name));
            }
            let rest = args.split_off(1);
            match args.into_iter().next() {
                Some(Value::Fst(fst)) => f(fst, rest, ctx),
                Some(other) => Err(format!(
                    "{}: Expected FST for argument 1 but got {}",
                    name,
                    other.kind_name()
                )),
                None => unreachable!(),
            }
        });
    }

    /// Registers a built-in whose first two arguments must be FSTs.
    pub fn register_binary_fst(
        &mut self,
        name: &'static str,
        f: impl Fn(VectorFst<W>, VectorFst<W>, Vec<Value<W>>, &FuncContext) -> BuiltinResult<W>
            + Send
            + Sync
            + 'static,
    ) {
        self.register(name, move |mut args, ctx| {
            if args.len() < 2 {
                return Err(format!("{}: Expected at least 2 arguments", name));
            }
            let rest = args.split_off(2);
            let mut taken = args.into_iter();
            let left = match taken.next() {
                Some(Value::Fst(fst)) => fst,
                Some(other) => {
                    return Err(format!(
                        "{}: Expected FST for argument 1 but got {}",
                        name,
                        other.kind_name()
                    ))
                }
                None => unreachable!(),
            };
            let right = match taken.next() {
                Some(Value::Fst(fst)) => fst,
                Some(other) => {
                    return Err(format!(
                        "{}: Expected FST for argument 2 but got {}",
                        name,
                        other.kind_name()
                    ))
                }
                None => unreachable!(),
            };
            f(left, right, rest, ctx)
        });
    }

    /// Looks up and runs a built-in. `None` when the name is unknown.
    pub fn call(
        &self,
        name: &str,
        args: Vec<Value<W>>,
        ctx: &FuncContext,
    ) -> Option<BuiltinResult<W>> {
        self.table.get(name).map(|f| f(args, ctx))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl<W: Semiring> Default for FunctionRegistry<W> {
    fn default() -> Self {
        Self::new()
    }
}

/// Selects the process-wide registry for an arc type. The evaluator is
/// generic over this trait; each weight carries its own lazily-built
/// registry instance.
pub trait ArcType: Semiring {
    fn registry() -> &'static FunctionRegistry<Self>;
}

impl ArcType for TropicalWeight {
    fn registry() -> &'static FunctionRegistry<Self> {
        static REGISTRY: Lazy<FunctionRegistry<TropicalWeight>> =
            Lazy::new(functions::build_registry);
        &REGISTRY
    }
}

impl ArcType for LogWeight {
    fn registry() -> &'static FunctionRegistry<Self> {
        static REGISTRY: Lazy<FunctionRegistry<LogWeight>> = Lazy::new(functions::build_registry);
        &REGISTRY
    }
}

impl ArcType for Log64Weight {
    fn registry() -> &'static FunctionRegistry<Self> {
        static REGISTRY: Lazy<FunctionRegistry<Log64Weight>> =
            Lazy::new(functions::build_registry);
        &REGISTRY
    }
}
