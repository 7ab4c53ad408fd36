use crate::error::Span;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Bool(bool, Span),
    Int(i64, Span),
    String(String, Span),
    Array(Vec<Expr>, Span),
    /// `$name` without an argument list.
    Variable(String, Span),
    /// `$name(args...)`.
    Call {
        name: String,
        args: Vec<Expr>,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
        span: Span,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
        span: Span,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

impl Expr {
    pub fn span(&self) -> &Span {
        match self {
            Expr::Bool(_, span) => span,
            Expr::Int(_, span) => span,
            Expr::String(_, span) => span,
            Expr::Array(_, span) => span,
            Expr::Variable(_, span) => span,
            Expr::Call { span, .. } => span,
            Expr::Unary { span, .. } => span,
            Expr::Binary { span, .. } => span,
        }
    }

    /// Name of the callee when the whole expression is a single call.
    pub fn as_call(&self) -> Option<(&str, &[Expr])> {
        match self {
            Expr::Call { name, args, .. } => Some((name.as_str(), args.as_slice())),
            _ => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Bool(b, _) => write!(f, "{}", b),
            Expr::Int(n, _) => write!(f, "{}", n),
            Expr::String(s, _) => write!(f, "{:?}", s),
            Expr::Array(items, _) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Expr::Variable(name, _) => write!(f, "${}", name),
            Expr::Call { name, args, .. } => {
                write!(f, "${}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            Expr::Unary { op: UnaryOp::Not, expr, .. } => write!(f, "!{}", expr),
            Expr::Binary { left, op, right, .. } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
        }
    }
}
