//! Deserialization primitives: LoadFst, LoadFstFromFar, SymbolTable.

use std::path::Path;

use weft_fst::far::{read_fst, Archive};
use weft_fst::{Semiring, SymbolTable};

use crate::registry::FunctionRegistry;
use crate::value::Value;

pub(super) fn register<W: Semiring>(registry: &mut FunctionRegistry<W>) {
    registry.register("LoadFst", |args, ctx| {
        if args.len() != 1 {
            return Err(format!("LoadFst: Expected 1 argument but got {}", args.len()));
        }
        let Some(path) = args[0].as_str() else {
            return Err("LoadFst: Expected string (path) for argument 1".to_string());
        };
        let fst = read_fst::<W>(&ctx.config.resolve(path))
            .map_err(|e| format!("LoadFst: Failed to load FST: {}", e))?;
        Ok(Value::Fst(fst))
    });

    registry.register("LoadFstFromFar", |args, ctx| {
        if args.len() != 2 {
            return Err(format!("LoadFstFromFar: Expected 2 arguments but got {}", args.len()));
        }
        let (Some(far_path), Some(name)) = (args[0].as_str(), args[1].as_str()) else {
            return Err("LoadFstFromFar: Expected strings (path, name) for arguments".to_string());
        };
        let archive = Archive::<W>::read(&ctx.config.resolve(far_path))
            .map_err(|e| format!("LoadFstFromFar: Unable to open far archive: {}", e))?;
        match archive.get(name) {
            Some(fst) => Ok(Value::Fst(fst.clone())),
            None => Err(format!("LoadFstFromFar: Unable to find FST: {}", name)),
        }
    });

    registry.register("SymbolTable", |args, ctx| {
        if args.len() != 1 {
            return Err(format!("SymbolTable: Expected 1 argument but got {}", args.len()));
        }
        let Some(path) = args[0].as_str() else {
            return Err("SymbolTable: Expected string (path) for argument 1".to_string());
        };
        let resolved = ctx.config.resolve(path);
        let table = SymbolTable::read_text(Path::new(&resolved))
            .map_err(|e| format!("SymbolTable: Failed to load symbol table: {}", e))?;
        Ok(Value::Symtab(table))
    });
}
