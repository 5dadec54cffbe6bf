//! Unary FST primitives: Closure and the algebraic transforms.

use weft_fst::algo::{
    arc_sort, closure_plus, closure_question, closure_star, concat_range, decode, determinize,
    encode, invert, minimize, optimize, project, rm_epsilon, rm_weight, EncodeTable, ProjectType,
    SortType,
};
use weft_fst::{props, Semiring, VectorFst};

use crate::registry::FunctionRegistry;
use crate::value::Value;

/// Determinization that accepts any machine: epsilon-removes, then runs
/// the subset construction directly on unweighted acceptors or through the
/// label/weight encoder otherwise.
pub(crate) fn safe_determinize<W: Semiring>(fst: &mut VectorFst<W>) {
    if !props::is_epsilon_free(fst) {
        rm_epsilon(fst);
    }
    if fst.start().is_none() {
        return;
    }
    if props::is_acceptor(fst) && props::is_unweighted(fst) {
        *fst = determinize(fst);
    } else {
        let mut table = EncodeTable::new();
        let encoded = encode(fst, &mut table);
        let det = determinize(&encoded);
        *fst = decode(&det, &table);
    }
}

pub(super) fn register<W: Semiring>(registry: &mut FunctionRegistry<W>) {
    registry.register_unary_fst("Closure", |mut fst, rest, _ctx| {
        let Some(tag) = rest.first().and_then(|v| v.as_int()) else {
            return Err("Closure: Expected int/enum for argument 2".to_string());
        };
        match tag {
            0 | 1 | 2 if rest.len() != 1 => {
                Err("Closure: Expected 2 arguments for simple closure".to_string())
            }
            0 => {
                closure_star(&mut fst);
                Ok(Value::Fst(fst))
            }
            1 => {
                closure_plus(&mut fst);
                Ok(Value::Fst(fst))
            }
            2 => {
                closure_question(&mut fst);
                Ok(Value::Fst(fst))
            }
            3 => {
                if rest.len() != 3 {
                    return Err("Closure: Expected 4 arguments for range closure".to_string());
                }
                let (min, max) = match (rest[1].as_int(), rest[2].as_int()) {
                    (Some(min), Some(max)) => (min, max),
                    _ => {
                        return Err(
                            "Closure: Expected int for arguments 3 and 4 for range closure"
                                .to_string(),
                        )
                    }
                };
                if min < 0 || max < min {
                    return Err(format!("Closure: Invalid range bounds: {},{}", min, max));
                }
                concat_range(&mut fst, min as usize, max as usize);
                Ok(Value::Fst(fst))
            }
            other => Err(format!("Closure: No implementation for repetition type {}", other)),
        }
    });

    registry.register_unary_fst("Determinize", |mut fst, rest, _ctx| {
        expect_no_extras("Determinize", &rest)?;
        safe_determinize(&mut fst);
        Ok(Value::Fst(fst))
    });

    registry.register_unary_fst("Minimize", |mut fst, rest, _ctx| {
        expect_no_extras("Minimize", &rest)?;
        // Minimization wants deterministic input; shape it first.
        optimize(&mut fst);
        Ok(Value::Fst(fst))
    });

    registry.register_unary_fst("RmEpsilon", |mut fst, rest, _ctx| {
        expect_no_extras("RmEpsilon", &rest)?;
        rm_epsilon(&mut fst);
        Ok(Value::Fst(fst))
    });

    registry.register_unary_fst("RmWeight", |mut fst, rest, _ctx| {
        expect_no_extras("RmWeight", &rest)?;
        rm_weight(&mut fst);
        Ok(Value::Fst(fst))
    });

    registry.register_unary_fst("Invert", |mut fst, rest, _ctx| {
        expect_no_extras("Invert", &rest)?;
        invert(&mut fst);
        Ok(Value::Fst(fst))
    });

    registry.register_unary_fst("Project", |mut fst, rest, _ctx| {
        let side = rest.first().and_then(|v| v.as_str());
        let ptype = match side {
            Some("input") => ProjectType::Input,
            Some("output") => ProjectType::Output,
            _ => return Err("Project: Expected 'input' or 'output' for argument 2".to_string()),
        };
        project(&mut fst, ptype);
        Ok(Value::Fst(fst))
    });

    registry.register_unary_fst("ArcSort", |mut fst, rest, _ctx| {
        let side = rest.first().and_then(|v| v.as_str());
        let stype = match side {
            Some("input") => SortType::ILabel,
            Some("output") => SortType::OLabel,
            _ => return Err("ArcSort: Expected 'input' or 'output' for argument 2".to_string()),
        };
        arc_sort(&mut fst, stype);
        Ok(Value::Fst(fst))
    });

    registry.register_unary_fst("Optimize", |mut fst, rest, _ctx| {
        expect_no_extras("Optimize", &rest)?;
        optimize(&mut fst);
        Ok(Value::Fst(fst))
    });

    // Everything is materialized in this engine; Expand is identity.
    registry.register_unary_fst("Expand", |fst, rest, _ctx| {
        expect_no_extras("Expand", &rest)?;
        Ok(Value::Fst(fst))
    });
}

fn expect_no_extras<W: Semiring>(name: &str, rest: &[Value<W>]) -> Result<(), String> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(format!("{}: Expected 1 argument but got {}", name, rest.len() + 1))
    }
}
