use crate::error::{LexError, ParseError};

/// Represents all errors that can occur during evaluation.
///
/// None of these can be caught from inside the language; they unwind the whole
/// evaluation and are reported by whoever started it.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Tried to read a name that is bound nowhere in the scope chain and is not
    /// a builtin.
    #[error("Error on line {line}: Unknown identifier '{name}'.")]
    UnknownIdentifier {
        /// The name that was looked up.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// An operator or builtin received operands of the wrong type.
    #[error("Error on line {line}: Type error: {details}.")]
    TypeError {
        /// Details about the type mismatch.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// Attempted division by zero.
    #[error("Error on line {line}: Division by zero.")]
    DivisionByZero {
        /// The source line where the error occurred.
        line: usize,
    },
    /// Attempted modulo by zero.
    #[error("Error on line {line}: Modulo by zero.")]
    ModuloByZero {
        /// The source line where the error occurred.
        line: usize,
    },
    /// Tried to read or write an array element outside `[0, len)`.
    #[error("Error on line {line}: Index {index} out of range for array of length {len}.")]
    IndexOutOfBounds {
        /// The index that was requested.
        index: i64,
        /// The length of the array.
        len:   usize,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// Tried to read an object key that is not present.
    #[error("Error on line {line}: Key '{key}' not found.")]
    MissingKey {
        /// The missing key.
        key:  String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// Called a value that is neither a function nor a builtin.
    #[error("Error on line {line}: A value of type {type_name} is not callable.")]
    NotCallable {
        /// The type of the value that was called.
        type_name: &'static str,
        /// The source line where the error occurred.
        line:      usize,
    },
    /// `exit` was given something other than an integer.
    #[error("Error on line {line}: Exit code must be an integer, found {type_name}.")]
    InvalidExitCode {
        /// The type of the rejected exit value.
        type_name: &'static str,
        /// The source line where the error occurred.
        line:      usize,
    },
    /// An `assert` statement's condition was falsy.
    #[error("Error on line {line}: Assertion failed{}.", explanation_suffix(.message))]
    AssertionFailed {
        /// The evaluated explanation, if the statement had one.
        message: Option<String>,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// An `extern` assignment found no enclosing scope that binds the name.
    #[error("Error on line {line}: Extern: '{name}' not found in any outer scope.")]
    ExternNotFound {
        /// The name being assigned.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// An `import` could not read, scan or parse its file.
    #[error("Error on line {line}: Import of '{path}' failed: {source}")]
    ImportFailed {
        /// The path given to `import`.
        path:   String,
        /// What went wrong.
        source: ImportError,
        /// The source line where the error occurred.
        line:   usize,
    },
    /// An argument was of the right type but an unusable value.
    #[error("Error on line {line}: Invalid argument: {details}.")]
    InvalidArgument {
        /// Details about why the argument is invalid.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// Integer arithmetic overflowed.
    #[error("Error on line {line}: Integer overflow while trying to compute result.")]
    Overflow {
        /// The source line where the error occurred.
        line: usize,
    },
    /// The nesting of user-function calls exceeded the configured limit.
    #[error("Error on line {line}: Maximum call depth of {limit} exceeded.")]
    StackOverflow {
        /// The configured call depth limit.
        limit: usize,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// A `return` reached the top level of a program.
    #[error("Error on line {line}: 'return' statement outside of function.")]
    ReturnOutsideFunction {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A `break` reached the top level of a program.
    #[error("Error on line {line}: 'break' statement outside of loop.")]
    BreakOutsideLoop {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A `continue` reached the top level of a program.
    #[error("Error on line {line}: 'continue' statement outside of loop.")]
    ContinueOutsideLoop {
        /// The source line where the error occurred.
        line: usize,
    },
}

fn explanation_suffix(message: &Option<String>) -> String {
    message.as_ref().map(|m| format!(": {m}")).unwrap_or_default()
}

/// Why an imported file could not be turned into a program.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The filesystem collaborator failed.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// The file's text did not scan.
    #[error(transparent)]
    Lex(#[from] LexError),
    /// The file's tokens did not parse.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Failure reported by a [`SourceLoader`](crate::interpreter::host::SourceLoader).
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// No file exists at the path.
    #[error("file '{path}' not found")]
    NotFound {
        /// The requested path.
        path: String,
    },
    /// The file exists but could not be read as text.
    #[error("could not read '{path}': {source}")]
    Read {
        /// The requested path.
        path:   String,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}
