//! Bottom-up type inference over expression trees.
//!
//! Every tree is inferred before it is evaluated, so the evaluator can
//! assume operand shapes instead of re-checking them.

use crate::bail_kind;
use crate::env::Env;
use crate::error::{ErrorKind, EvalError};
use crate::value::Type;
use anyhow::Result;
use padlang_syntax::{BinaryOp, Expr, UnaryOp};
use rustc_hash::FxHashMap;

/// Types of the `$name` variables bound while inferring a tree.
pub type TypeScope = FxHashMap<String, Type>;

/// Infers the type of `expr`.
pub fn infer(env: &Env, vars: &TypeScope, expr: &Expr) -> Result<Type> {
    match expr {
        Expr::Bool(..) => Ok(Type::Bool),
        Expr::Int(..) => Ok(Type::Int),
        Expr::String(..) => Ok(Type::String),
        Expr::Array(items, _) => {
            let mut elem = Type::Unknown;
            for item in items {
                let ty = infer(env, vars, item)?;
                elem = match elem.unify(&ty) {
                    Some(unified) => unified,
                    None => bail_kind!(ErrorKind::TypeInference, "type inference failed"),
                };
            }
            Ok(Type::array_of(elem))
        }
        Expr::Variable(name, _) => match vars.get(name) {
            Some(ty) => Ok(ty.clone()),
            None => bail_kind!(
                ErrorKind::TypeInference,
                "type inference failed: unbound variable {}",
                name
            ),
        },
        Expr::Call { name, args, .. } => {
            if let Some(function) = env.builtins().function(name) {
                check_args(env, vars, name, &function.params, args)?;
                return Ok(function.ret.clone());
            }
            if env.builtins().action(name).is_some() {
                bail_kind!(
                    ErrorKind::TypeInference,
                    "type inference failed: action {} used as expression",
                    name
                );
            }
            Err(anyhow::anyhow!(EvalError::lookup(name)))
        }
        Expr::Unary { op: UnaryOp::Not, expr, .. } => {
            expect(infer(env, vars, expr)?, &Type::Bool)?;
            Ok(Type::Bool)
        }
        Expr::Binary { left, op, right, .. } => {
            let lhs = infer(env, vars, left)?;
            let rhs = infer(env, vars, right)?;
            match op {
                BinaryOp::Eq | BinaryOp::Ne => {
                    if lhs.unify(&rhs).is_none() {
                        bail_kind!(ErrorKind::TypeInference, "type inference failed");
                    }
                }
                BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                    expect(lhs, &Type::Int)?;
                    expect(rhs, &Type::Int)?;
                }
                BinaryOp::And | BinaryOp::Or => {
                    expect(lhs, &Type::Bool)?;
                    expect(rhs, &Type::Bool)?;
                }
            }
            Ok(Type::Bool)
        }
    }
}

/// Checks call arguments against a declared parameter list.
pub fn check_args(env: &Env, vars: &TypeScope, name: &str, params: &[Type], args: &[Expr]) -> Result<()> {
    let mut arg_types = Vec::with_capacity(args.len());
    for arg in args {
        arg_types.push(infer(env, vars, arg)?);
    }

    let matches = arg_types.len() == params.len()
        && arg_types
            .iter()
            .zip(params)
            .all(|(arg, param)| arg.unify(param).is_some());

    if !matches {
        bail_kind!(
            ErrorKind::TypeInference,
            "type inference failed: mismatch in arg types on {}",
            name
        );
    }
    Ok(())
}

fn expect(found: Type, expected: &Type) -> Result<()> {
    if &found != expected {
        bail_kind!(ErrorKind::TypeInference, "type inference failed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_kind;
    use crate::testing::mock_env;
    use padlang_syntax::parse_str;

    fn infer_src(src: &str) -> Result<Type> {
        let env = mock_env();
        infer(&env, &TypeScope::default(), &parse_str(src)?)
    }

    #[test]
    fn literals_and_operators() {
        assert_eq!(infer_src("1").unwrap(), Type::Int);
        assert_eq!(infer_src(r#""a""#).unwrap(), Type::String);
        assert_eq!(infer_src("1 < 2 && !false").unwrap(), Type::Bool);
        assert_eq!(infer_src(r#"["a"] == []"#).unwrap(), Type::Bool);
    }

    #[test]
    fn empty_array_has_unknown_element() {
        assert_eq!(infer_src("[]").unwrap(), Type::array_of(Type::Unknown));
        assert_eq!(infer_src("[[], [1]]").unwrap(), Type::array_of(Type::array_of(Type::Int)));
    }

    #[test]
    fn mismatches_fail_with_bare_message() {
        for src in [r#"1 == "a""#, r#"[1, "a"]"#, "true < 1", "1 && true", "!1"] {
            let err = infer_src(src).unwrap_err();
            assert_eq!(error_kind(&err), ErrorKind::TypeInference, "{src}");
            assert_eq!(err.to_string(), "type inference failed", "{src}");
        }
    }

    #[test]
    fn unbound_variable() {
        let err = infer_src("$dev == \"jane\"").unwrap_err();
        assert_eq!(err.to_string(), "type inference failed: unbound variable dev");
    }

    #[test]
    fn bound_variable_uses_scope_type() {
        let env = mock_env();
        let mut vars = TypeScope::default();
        vars.insert("dev".to_string(), Type::String);
        let expr = parse_str(r#"$dev == "jane""#).unwrap();
        assert_eq!(infer(&env, &vars, &expr).unwrap(), Type::Bool);
    }

    #[test]
    fn calls_check_arguments() {
        assert_eq!(infer_src(r#"$echo("x")"#).unwrap(), Type::String);

        let err = infer_src("$echo(1)").unwrap_err();
        assert_eq!(err.to_string(), "type inference failed: mismatch in arg types on echo");

        let err = infer_src("$echo()").unwrap_err();
        assert_eq!(err.to_string(), "type inference failed: mismatch in arg types on echo");
    }

    #[test]
    fn unknown_callee_is_a_lookup_error() {
        let err = infer_src("$nope()").unwrap_err();
        assert_eq!(error_kind(&err), ErrorKind::Lookup);
        assert_eq!(err.to_string(), "nope not found. are you sure this is a built-in function?");
    }

    #[test]
    fn action_in_expression_is_rejected() {
        let err = infer_src(r#"$shout("x")"#).unwrap_err();
        assert_eq!(err.to_string(), "type inference failed: action shout used as expression");
    }
}
