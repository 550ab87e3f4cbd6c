/// Lexical errors.
///
/// Raised by the scanner when it meets a character no token pattern accepts.
/// Scanning stops at the first such character.
pub mod lex_error;
/// Parsing errors.
///
/// Defines all error types that can occur while building the syntax tree from
/// a token sequence: unexpected or missing tokens, misplaced `extern`
/// modifiers and invalid assignment targets.
pub mod parse_error;
/// Runtime errors.
///
/// Contains all error types that can be raised during evaluation.
/// Runtime errors include unknown identifiers, type mismatches, division by
/// zero, bad indices, failed assertions and failed imports.
pub mod runtime_error;

pub use lex_error::LexError;
pub use parse_error::ParseError;
pub use runtime_error::{ImportError, LoadError, RuntimeError};

/// Any failure produced while running source text end to end.
///
/// This is what the top-level drivers (`run_source`, `Interpreter::run`, the
/// command-line runner) report. An `exit` statement is not an error and never
/// shows up here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The scanner rejected the input.
    #[error(transparent)]
    Lex(#[from] LexError),
    /// The parser rejected the token sequence.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Evaluation failed.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
