//! String-to-FST primitives: StringFst and StringFile.

use std::sync::Arc;

use weft_fst::algo::{arc_sort, cross, rm_epsilon, union, SortType};
use weft_fst::{Semiring, SymbolTable, VectorFst};

use crate::functions::attach_final_weight;
use crate::labels;
use crate::registry::{FuncContext, FunctionRegistry};
use crate::stringcompile::{compile_string, StringMode};
use crate::symbols::{byte_symbol_table, utf8_symbol_table};
use crate::value::Value;

pub(super) fn register<W: Semiring>(registry: &mut FunctionRegistry<W>) {
    registry.register("StringFst", |args, ctx| {
        if args.len() < 2 {
            return Err(format!("StringFst: Expected 2 or 3 arguments but got {}", args.len()));
        }
        let Some(tag) = args[0].as_int() else {
            return Err("StringFst: Expected parse mode for argument 1".to_string());
        };
        let Some(text) = args[1].as_str() else {
            return Err("StringFst: Expected string for argument 2".to_string());
        };
        let (mode, symtab) = match tag {
            0 => (StringMode::Byte, None),
            1 => (StringMode::Utf8, None),
            2 => match args.get(2).and_then(|v| v.as_symtab()) {
                Some(table) => (StringMode::Symbols, Some(table.clone())),
                None => {
                    return Err(
                        "StringFst: Invalid symbol table for symbol table parse mode".to_string()
                    )
                }
            },
            other => return Err(format!("StringFst: Unhandled parse mode: {}", other)),
        };
        let mut fst = {
            let mut interner = labels::global();
            compile_string::<W>(text, mode, symtab.as_ref(), &mut interner)
                .map_err(|e| format!("StringFst: Failed to compile string: {}: {}", text, e))?
        };
        if ctx.config.save_symbols {
            let table = match mode {
                StringMode::Byte => byte_symbol_table(),
                StringMode::Utf8 => utf8_symbol_table(),
                StringMode::Symbols => Arc::new(symtab.unwrap_or_else(|| SymbolTable::new(""))),
            };
            fst.set_input_symbols(Some(table.clone()));
            fst.set_output_symbols(Some(table));
        }
        Ok(Value::Fst(fst))
    });

    registry.register("StringFile", string_file);
}

// StringFile[path (, input mode (, output mode))]: one entry per line,
// tab-separated input, output, and weight columns.
fn string_file<W: Semiring>(args: Vec<Value<W>>, ctx: &FuncContext) -> Result<Value<W>, String> {
    if args.is_empty() || args.len() > 3 {
        return Err(format!("StringFile: Expected 1-3 arguments but got {}", args.len()));
    }
    let Some(path) = args[0].as_str() else {
        return Err("StringFile: Expected string (file) for argument 1".to_string());
    };
    let imode = match args.get(1) {
        Some(arg) => mode_arg("StringFile", arg, "input")?,
        None => (StringMode::Byte, None),
    };
    let omode = match args.get(2) {
        Some(arg) => mode_arg("StringFile", arg, "output")?,
        None => imode.clone(),
    };
    let full_path = ctx.config.resolve(path);
    let contents = std::fs::read_to_string(&full_path)
        .map_err(|_| "StringFile: File inaccessible or malformed".to_string())?;

    let mut result: VectorFst<W> = VectorFst::new();
    let mut interner = labels::global();
    for line in contents.lines() {
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut columns = line.split('\t');
        let input = columns.next().unwrap_or("");
        let output = columns.next();
        let weight = columns.next();
        if columns.next().is_some() {
            return Err("StringFile: File inaccessible or malformed".to_string());
        }
        let upper = compile_string::<W>(input, imode.0, imode.1.as_ref(), &mut interner)
            .map_err(|e| format!("StringFile: Failed to compile string: {}: {}", input, e))?;
        let mut entry = match output {
            Some(output) => {
                let lower = compile_string::<W>(output, omode.0, omode.1.as_ref(), &mut interner)
                    .map_err(|e| format!("StringFile: Failed to compile string: {}: {}", output, e))?;
                cross(&upper, &lower)
            }
            None => upper,
        };
        if let Some(weight) = weight {
            let weight = W::parse_text(weight)
                .ok_or_else(|| format!("StringFile: Invalid weight: {}", weight))?;
            entry = attach_final_weight(entry, weight, false);
        }
        union(&mut result, &entry);
    }
    drop(interner);
    rm_epsilon(&mut result);
    arc_sort(&mut result, SortType::ILabel);
    if ctx.config.save_symbols {
        result.set_input_symbols(Some(mode_table(&imode)));
        result.set_output_symbols(Some(mode_table(&omode)));
    }
    Ok(Value::Fst(result))
}

type ModeSpec = (StringMode, Option<SymbolTable>);

fn mode_arg<W: Semiring>(name: &str, arg: &Value<W>, side: &str) -> Result<ModeSpec, String> {
    match arg {
        Value::Str(text) if text == "utf8" => Ok((StringMode::Utf8, None)),
        Value::Str(_) => Ok((StringMode::Byte, None)),
        Value::Symtab(table) => Ok((StringMode::Symbols, Some(table.clone()))),
        other => Err(format!(
            "{}: Invalid parse mode or symbol table for {} symbols: {}",
            name,
            side,
            other.kind_name()
        )),
    }
}

fn mode_table(mode: &ModeSpec) -> Arc<SymbolTable> {
    match mode {
        (StringMode::Byte, _) => byte_symbol_table(),
        (StringMode::Utf8, _) => utf8_symbol_table(),
        (StringMode::Symbols, Some(table)) => Arc::new(table.clone()),
        (StringMode::Symbols, None) => Arc::new(SymbolTable::new("")),
    }
}
