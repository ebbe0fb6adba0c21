//! AST types for the attribute DSL.

use std::fmt;

/// Root attribute expression.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrExpr {
    /// Attribute presence check: `name` or `!name`
    Exists { name: String, negated: bool },

    /// Attribute value match: `type=hidden` or `type=hidden|submit`
    Match { name: String, values: Vec<AttrValue> },

    /// Numeric comparison: `size>=2`, `maxlength<50`
    NumericCompare {
        name: String,
        op: CompareOp,
        value: f64,
    },

    /// Boolean AND: `expr1 & expr2`
    And(Vec<AttrExpr>),

    /// Boolean OR: `expr1 | expr2`
    Or(Vec<AttrExpr>),

    /// Boolean NOT: `!expr`
    Not(Box<AttrExpr>),

    /// Always true (empty expression)
    True,
}

/// A value to match against an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Exact(String),
    /// `*`
    Any,
    /// Glob pattern (e.g., `*btn*`)
    Glob(String),
}

/// Numeric comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq, // =
    Ne, // !=
    Lt, // <
    Le, // <=
    Gt, // >
    Ge, // >=
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "="),
            CompareOp::Ne => write!(f, "!="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Le => write!(f, "<="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Ge => write!(f, ">="),
        }
    }
}

impl AttrExpr {
    /// Flatten nested And/Or and drop `True` operands of an And.
    #[must_use]
    pub fn simplify(self) -> Self {
        match self {
            AttrExpr::And(exprs) => {
                let mut flat = Vec::new();
                for expr in exprs {
                    match expr.simplify() {
                        AttrExpr::And(inner) => flat.extend(inner),
                        AttrExpr::True => {}
                        other => flat.push(other),
                    }
                }
                Self::collapse(flat, AttrExpr::And)
            }
            AttrExpr::Or(exprs) => {
                let mut flat = Vec::new();
                for expr in exprs {
                    match expr.simplify() {
                        AttrExpr::Or(inner) => flat.extend(inner),
                        other => flat.push(other),
                    }
                }
                Self::collapse(flat, AttrExpr::Or)
            }
            AttrExpr::Not(inner) => AttrExpr::Not(Box::new(inner.simplify())),
            other => other,
        }
    }

    fn collapse(mut flat: Vec<AttrExpr>, wrap: fn(Vec<AttrExpr>) -> AttrExpr) -> AttrExpr {
        match flat.len() {
            0 => AttrExpr::True,
            1 => flat.pop().unwrap_or(AttrExpr::True),
            _ => wrap(flat),
        }
    }
}
