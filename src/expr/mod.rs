//! Text predicates written in CEL (Common Expression Language).

mod cel;

pub use cel::{CelContext, CelProgram, compile_cel, evaluate_cel};
