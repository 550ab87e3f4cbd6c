/// Represents all errors that can occur during parsing.
///
/// Parsing stops at the first error; there is no recovery.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Found a token other than the one the grammar requires here.
    #[error("Error on line {line}, column {column}: Expected {expected}, found {found}.")]
    UnexpectedToken {
        /// Description of what was expected.
        expected: String,
        /// The token encountered.
        found:    String,
        /// The source line where the error occurred.
        line:     usize,
        /// The source column where the error occurred.
        column:   usize,
    },
    /// Reached the end of input while more tokens were required.
    #[error("Error on line {line}, column {column}: Expected {expected}, found end of input.")]
    UnexpectedEndOfInput {
        /// Description of what was expected.
        expected: String,
        /// The source line where the error occurred.
        line:     usize,
        /// The source column where the error occurred.
        column:   usize,
    },
    /// `extern` was written in front of an expression that is not assigned to.
    #[error("Error on line {line}: 'extern' can only be used in an assignment.")]
    ExternWithoutAssignment {
        /// The source line where the error occurred.
        line: usize,
    },
    /// `extern` was applied to something other than a bare identifier.
    #[error("Error on line {line}: 'extern' can only be used with simple identifiers.")]
    InvalidExternTarget {
        /// The source line where the error occurred.
        line: usize,
    },
    /// Tokens remained after the last complete top-level statement.
    #[error("Error on line {line}, column {column}: Unexpected {found} after the end of the program.")]
    TrailingTokens {
        /// The first token that could not be consumed.
        found:  String,
        /// The source line where the error occurred.
        line:   usize,
        /// The source column where the error occurred.
        column: usize,
    },
    /// The left-hand side of `=` is neither an identifier nor an index.
    #[error("Error on line {line}: Cannot assign to {target}.")]
    InvalidAssignmentTarget {
        /// A short description of the rejected target.
        target: String,
        /// The source line where the error occurred.
        line:   usize,
    },
}

impl ParseError {
    /// Gets the line number the error points at.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::UnexpectedToken { line, .. }
            | Self::UnexpectedEndOfInput { line, .. }
            | Self::ExternWithoutAssignment { line }
            | Self::InvalidExternTarget { line }
            | Self::TrailingTokens { line, .. }
            | Self::InvalidAssignmentTarget { line, .. } => *line,
        }
    }
}
