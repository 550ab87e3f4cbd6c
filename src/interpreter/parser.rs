/// Parser entry points and the assignment level of the expression grammar.
///
/// Holds [`core::parse`], which turns a token sequence into a
/// [`crate::ast::Program`], and the shared `ParseResult` alias.
pub mod core;

/// Prefix operators, postfix chains and primary expressions.
///
/// Covers negation, logical not, indexing, member access, calls, literals,
/// list and object literals, function literals and grouping.
pub mod unary;

/// Binary operator precedence levels.
///
/// Implements the ladder from logical OR down to multiplication, all
/// left-associative.
pub mod binary;

/// Brace-delimited blocks and `;`-separated statement lists.
pub mod block;

/// Small helpers shared by the parsing modules.
pub mod utils;

/// Statement parsing: control flow, declarations and keyword statements.
pub mod statement;
