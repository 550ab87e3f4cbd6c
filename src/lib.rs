//! # quill
//!
//! quill is a small dynamically-typed scripting language written in Rust.
//! Source text is scanned, parsed into an abstract syntax tree and evaluated
//! by a tree-walking interpreter with lexical scoping, closures, arrays,
//! objects and a handful of builtins.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

/// Defines the structure of parsed code.
///
/// This module declares the `Expr` and `Statement` enums and related types
/// that represent the syntactic structure of source code as a tree. The AST is
/// built by the parser and traversed by the evaluator.
///
/// # Responsibilities
/// - Defines expression and statement types for all language constructs.
/// - Attaches source lines to AST nodes for error reporting.
pub mod ast;
/// Provides unified error types for scanning, parsing and evaluation.
///
/// # Responsibilities
/// - Defines error enums for all failure modes (lexer, parser, evaluator).
/// - Attaches line numbers and detailed messages for context.
/// - Collects them in one [`error::Error`] for the top-level drivers.
pub mod error;
/// Orchestrates the entire process of code execution.
///
/// This module ties together lexing, parsing, evaluation, value
/// representations and the host collaborators to provide a complete runtime
/// for source code evaluation.
pub mod interpreter;
/// General utilities: stack growth for deep recursion and safe numeric
/// conversion.
pub mod util;

pub use crate::{
    error::Error,
    interpreter::{
        environment::Environment,
        evaluator::core::{Interpreter, Outcome},
        value::core::Value,
    },
};

/// Runs `source` in a fresh global scope, printing to stdout and importing
/// from the filesystem.
///
/// # Errors
/// Returns the first lexical, syntax or runtime error.
///
/// # Examples
/// ```
/// use quill::{Outcome, Value, run_source};
///
/// let outcome = run_source("function square(x) { return x * x }\nsquare(7)").unwrap();
/// assert_eq!(outcome, Outcome::Completed(Value::Integer(49)));
///
/// assert_eq!(run_source("exit 4").unwrap(), Outcome::Exited(4));
///
/// // 'y' is not defined
/// assert!(run_source("x = y + 1").is_err());
/// ```
pub fn run_source(source: &str) -> Result<Outcome, Error> {
    Interpreter::new().run(source, &Environment::new())
}
