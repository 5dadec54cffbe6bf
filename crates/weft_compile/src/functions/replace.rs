//! Recursive replacement.

use std::collections::BTreeMap;

use weft_fst::algo::{replace as replace_expand, rm_epsilon};
use weft_fst::{Label, Semiring, VectorFst};

use crate::registry::FunctionRegistry;
use crate::value::Value;

pub(super) fn register<W: Semiring>(registry: &mut FunctionRegistry<W>) {
    registry.register("Replace", |args, _ctx| {
        if args.len() < 3 {
            return Err(format!("Replace: Expected at least 3 arguments but got {}", args.len()));
        }
        let mut fsts = Vec::with_capacity(args.len());
        for (index, arg) in args.into_iter().enumerate() {
            match arg {
                Value::Fst(fst) => fsts.push(fst),
                other => {
                    return Err(format!(
                        "Replace: all arguments must be FSTs: argument {} is {}",
                        index + 1,
                        other.kind_name()
                    ))
                }
            }
        }
        let label_fst = fsts.remove(0);
        let labels = extract_replacement_labels(&label_fst)?;
        if labels.is_empty() {
            return Err("Replace: No labels provided".to_string());
        }
        if fsts.len() != labels.len() {
            return Err(format!(
                "Replace: Number of replacement FSTs {} does not match the number of replacement labels {}",
                fsts.len(),
                labels.len()
            ));
        }
        let root = labels[0];
        let mut components: BTreeMap<Label, VectorFst<W>> = BTreeMap::new();
        for (label, fst) in labels.into_iter().zip(fsts) {
            components.insert(label, fst);
        }
        match replace_expand(root, &components) {
            Ok(result) => Ok(Value::Fst(result)),
            Err(_) => Err("Replace: Cyclic dependencies detected; cannot expand".to_string()),
        }
    });
}

/// Reads the label transducer: after epsilon removal it must be a single
/// chain whose consecutive input labels name the replacement symbols.
fn extract_replacement_labels<W: Semiring>(fst: &VectorFst<W>) -> Result<Vec<Label>, String> {
    let mut chain = fst.clone();
    rm_epsilon(&mut chain);
    let mut labels = Vec::new();
    let Some(mut state) = chain.start() else {
        return Ok(labels);
    };
    while chain.final_weight(state) == W::zero() {
        if chain.num_arcs(state) != 1 {
            return Err(
                "Replace: Label transducer must have exactly one label arc from every state"
                    .to_string(),
            );
        }
        let arc = chain.arcs(state)[0];
        labels.push(arc.ilabel);
        state = arc.nextstate;
    }
    Ok(labels)
}
