//! Binary FST primitives: Concat, Union, Difference, Compose, Rewrite,
//! LenientlyCompose.

use weft_fst::algo::{
    arc_sort, compose, concat, cross, difference, leniently_compose, optimize_difference_rhs,
    union, SortType,
};
use weft_fst::{props, Semiring};

use crate::functions::{check_inner_tapes, check_same_tapes};
use crate::registry::FunctionRegistry;
use crate::value::Value;

pub(super) fn register<W: Semiring>(registry: &mut FunctionRegistry<W>) {
    registry.register_binary_fst("Concat", |mut left, right, rest, ctx| {
        if !rest.is_empty() {
            return Err(format!("Concat: Expected 2 arguments but got {}", rest.len() + 2));
        }
        check_same_tapes("Concat", &left, &right, ctx.config.save_symbols)?;
        concat(&mut left, &right);
        Ok(Value::Fst(left))
    });

    registry.register_binary_fst("Union", |mut left, right, rest, ctx| {
        if !rest.is_empty() {
            return Err(format!("Union: Expected 2 arguments but got {}", rest.len() + 2));
        }
        check_same_tapes("Union", &left, &right, ctx.config.save_symbols)?;
        union(&mut left, &right);
        Ok(Value::Fst(left))
    });

    // The materialized engine has no delayed variant; same language.
    registry.register_binary_fst("UnionDelayed", |mut left, right, rest, ctx| {
        if !rest.is_empty() {
            return Err(format!("UnionDelayed: Expected 2 arguments but got {}", rest.len() + 2));
        }
        check_same_tapes("UnionDelayed", &left, &right, ctx.config.save_symbols)?;
        union(&mut left, &right);
        Ok(Value::Fst(left))
    });

    registry.register_binary_fst("Difference", |left, mut right, rest, ctx| {
        if !rest.is_empty() {
            return Err(format!("Difference: Expected 2 arguments but got {}", rest.len() + 2));
        }
        check_same_tapes("Difference", &left, &right, ctx.config.save_symbols)?;
        if !props::is_acceptor(&right) || !props::is_unweighted(&right) {
            return Err("Difference: 2nd argument must be an unweighted acceptor".to_string());
        }
        if !props::is_epsilon_free(&right) || !props::is_input_deterministic(&right) {
            optimize_difference_rhs(&mut right);
        }
        Ok(Value::Fst(difference(&left, &right)))
    });

    registry.register_binary_fst("Compose", |mut left, mut right, rest, ctx| {
        if rest.len() > 1 {
            return Err(format!("Compose: Expected 2 or 3 arguments but got {}", rest.len() + 2));
        }
        check_inner_tapes("Compose", &left, &right, ctx.config.save_symbols)?;
        if let Some(arg) = rest.first() {
            match arg.as_str() {
                Some("left") => arc_sort(&mut left, SortType::OLabel),
                Some("right") => arc_sort(&mut right, SortType::ILabel),
                Some("both") => {
                    arc_sort(&mut left, SortType::OLabel);
                    arc_sort(&mut right, SortType::ILabel);
                }
                _ => {
                    return Err(
                        "Compose: Expected 'left', 'right', or 'both' for argument 3".to_string()
                    )
                }
            }
        }
        Ok(Value::Fst(compose(&left, &right)))
    });

    registry.register_binary_fst("Rewrite", |left, right, rest, _ctx| {
        if !rest.is_empty() {
            return Err(format!("Rewrite: Expected 2 arguments but got {}", rest.len() + 2));
        }
        Ok(Value::Fst(cross(&left, &right)))
    });

    registry.register("LenientlyCompose", |args, ctx| {
        if args.len() != 3 {
            return Err(format!("LenientlyCompose: Expected 3 arguments but got {}", args.len()));
        }
        let mut fsts = Vec::with_capacity(3);
        for (index, arg) in args.into_iter().enumerate() {
            match arg {
                Value::Fst(fst) => fsts.push(fst),
                other => {
                    return Err(format!(
                        "LenientlyCompose: Expected FST for argument {} but got {}",
                        index + 1,
                        other.kind_name()
                    ))
                }
            }
        }
        let sigma = fsts.pop().unwrap_or_default();
        let right = fsts.pop().unwrap_or_default();
        let left = fsts.pop().unwrap_or_default();
        check_inner_tapes("LenientlyCompose", &left, &right, ctx.config.save_symbols)?;
        Ok(Value::Fst(leniently_compose(&left, &right, &sigma)))
    });
}
