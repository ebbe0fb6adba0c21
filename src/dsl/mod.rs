//! Small matcher DSL for HTML start-tag attributes.
//!
//! Syntax:
//!   attr                    - attribute present
//!   !attr                   - attribute absent
//!   attr=value              - exact match
//!   attr="some value"       - exact match, quoted
//!   attr=val1|val2|val3     - match any value
//!   attr=*                  - any value (same as presence)
//!   attr=*btn*              - glob match
//!   attr>=n, attr>n, etc.   - numeric comparison
//!   expr1 & expr2           - AND
//!   expr1 | expr2           - OR (note: lower precedence than &)
//!   !expr                   - NOT
//!   (expr)                  - grouping

mod ast;
mod eval;
mod lexer;
mod parser;

pub use ast::*;
pub use eval::evaluate_attrs;
pub use parser::parse_attr_expr;
