/// The lexer module tokenizes source code for further parsing.
///
/// The lexer reads the raw source text and produces a sequence of lexemes,
/// each carrying a token (keyword, literal, identifier or operator) and its
/// line and column. The sequence always ends with an end-of-input sentinel.
///
/// # Responsibilities
/// - Converts the input character stream into tokens with source location.
/// - Decodes numeric and string literals and folds the word operators `and`,
///   `or` and `not` into their symbolic forms.
/// - Reports the first character no pattern accepts.
pub mod lexer;
/// The parser module builds the abstract syntax tree (AST) from tokens.
///
/// Recursive descent over the lexeme sequence, one function per precedence
/// level. Member access and function declarations are desugared here.
pub mod parser;
/// The value module defines the runtime data types for evaluation.
///
/// # Responsibilities
/// - Defines the `Value` enum, closures and builtins.
/// - Implements truthiness, structural equality, deep copies and display.
pub mod value;
/// Lexical scopes shared between call frames and closures.
pub mod environment;
/// The evaluator module executes AST nodes and computes results.
///
/// The evaluator walks the AST against an [`environment::Environment`],
/// producing a value together with a control signal (`return`, `break`,
/// `continue` or `exit`) that unwinds until the construct that consumes it.
///
/// # Responsibilities
/// - Evaluates every expression and statement kind.
/// - Applies operator semantics, calls builtins and user functions.
/// - Reports runtime errors such as division by zero or bad indices.
pub mod evaluator;
/// Collaborators the evaluator talks to: where imported files come from and
/// where `print` output goes.
pub mod host;
/// Hooks wrapped around the evaluation of every node, with a profiler and an
/// assignment watcher built on them.
pub mod instrument;
