//! CEL expression compilation and evaluation.

use crate::error::{Error, Result};
use cel::{Context, Program, Value};
use std::sync::Arc;

/// A compiled CEL program ready for evaluation.
#[derive(Clone)]
pub struct CelProgram {
    program: Arc<Program>,
    source: String,
}

impl std::fmt::Debug for CelProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CelProgram")
            .field("source", &self.source)
            .finish()
    }
}

impl CelProgram {
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Variables visible to a text predicate.
pub struct CelContext<'a> {
    pub text: &'a str,
}

/// Compile a CEL expression string into a program.
pub fn compile_cel(source: &str) -> std::result::Result<CelProgram, String> {
    let program = Program::compile(source).map_err(|e| format!("CEL compile error: {e}"))?;

    Ok(CelProgram {
        program: Arc::new(program),
        source: source.to_string(),
    })
}

/// Evaluate a compiled predicate. Anything but a boolean result is an error.
pub fn evaluate_cel(program: &CelProgram, ctx: &CelContext) -> Result<bool> {
    let mut cel_ctx = Context::default();

    cel_ctx
        .add_variable("text", ctx.text.to_string())
        .map_err(|e| Error::Matcher(format!("CEL context error: {e}")))?;

    let value = program
        .program
        .execute(&cel_ctx)
        .map_err(|e| Error::Matcher(format!("CEL execution error in `{}`: {e}", program.source)))?;

    match value {
        Value::Bool(b) => Ok(b),
        other => Err(Error::Matcher(format!(
            "CEL predicate `{}` returned {other:?}, expected a bool",
            program.source
        ))),
    }
}
