//! Tree evaluation and the parse/infer/evaluate pipeline for conditions.

use crate::bail_kind;
use crate::env::Env;
use crate::error::{ErrorKind, EvalError};
use crate::types::{TypeScope, infer};
use crate::value::{Type, Value};
use anyhow::Result;
use padlang_syntax::{BinaryOp, Expr, ParseError, UnaryOp, parse_str};
use rustc_hash::FxHashMap;
use tracing::debug;

/// Values of the `$name` variables bound while evaluating a tree.
pub type Scope = FxHashMap<String, Value>;

/// Parses `code` into a tree.
///
/// The caret diagnostic goes to the debug log; the returned error only
/// names the input.
pub fn parse(code: &str) -> Result<Expr> {
    parse_str(code).map_err(|err| {
        match err.downcast_ref::<ParseError>() {
            Some(parse_err) => debug!("{}", parse_err.render(code)),
            None => debug!(error = %err, "parse failed"),
        }
        anyhow::anyhow!(EvalError::parse(code))
    })
}

/// Evaluates a condition: parse, infer, require `Bool`, evaluate.
pub fn eval_expr(env: &Env, code: &str) -> Result<bool> {
    let expr = parse(code)?;
    let ty = infer(env, &TypeScope::default(), &expr)?;
    if ty != Type::Bool {
        bail_kind!(ErrorKind::ConditionType, "expression {} is not a condition", code);
    }
    eval(env, &Scope::default(), &expr)?.as_bool()
}

/// Evaluates an already inferred tree.
pub fn eval(env: &Env, vars: &Scope, expr: &Expr) -> Result<Value> {
    match expr {
        Expr::Bool(b, _) => Ok(Value::Bool(*b)),
        Expr::Int(n, _) => Ok(Value::Int(*n)),
        Expr::String(s, _) => Ok(Value::String(s.clone())),
        Expr::Array(items, _) => items
            .iter()
            .map(|item| eval(env, vars, item))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Expr::Variable(name, _) => match vars.get(name) {
            Some(value) => Ok(value.clone()),
            None => bail_kind!(ErrorKind::Runtime, "unbound variable {}", name),
        },
        Expr::Call { name, args, .. } => {
            let Some(function) = env.builtins().function(name) else {
                return Err(anyhow::anyhow!(EvalError::lookup(name)));
            };
            let values = eval_args(env, vars, args)?;
            (function.code)(env, values)
        }
        Expr::Unary { op: UnaryOp::Not, expr, .. } => Ok(Value::Bool(!eval(env, vars, expr)?.as_bool()?)),
        Expr::Binary { left, op, right, .. } => eval_binary(env, vars, left, *op, right),
    }
}

pub(crate) fn eval_args(env: &Env, vars: &Scope, args: &[Expr]) -> Result<Vec<Value>> {
    args.iter().map(|arg| eval(env, vars, arg)).collect()
}

fn eval_binary(env: &Env, vars: &Scope, left: &Expr, op: BinaryOp, right: &Expr) -> Result<Value> {
    // && and || must not evaluate the right side when the left decides.
    match op {
        BinaryOp::And => {
            if !eval(env, vars, left)?.as_bool()? {
                return Ok(Value::Bool(false));
            }
            return Ok(Value::Bool(eval(env, vars, right)?.as_bool()?));
        }
        BinaryOp::Or => {
            if eval(env, vars, left)?.as_bool()? {
                return Ok(Value::Bool(true));
            }
            return Ok(Value::Bool(eval(env, vars, right)?.as_bool()?));
        }
        _ => {}
    }

    let lhs = eval(env, vars, left)?;
    let rhs = eval(env, vars, right)?;
    let result = match op {
        BinaryOp::Eq => lhs == rhs,
        BinaryOp::Ne => lhs != rhs,
        BinaryOp::Lt => lhs.as_int()? < rhs.as_int()?,
        BinaryOp::Le => lhs.as_int()? <= rhs.as_int()?,
        BinaryOp::Gt => lhs.as_int()? > rhs.as_int()?,
        BinaryOp::Ge => lhs.as_int()? >= rhs.as_int()?,
        BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
    };
    Ok(Value::Bool(result))
}
