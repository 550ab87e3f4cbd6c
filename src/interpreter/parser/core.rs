use std::iter::Peekable;

use crate::{
    ast::{AssignTarget, Block, Expr, Program},
    error::ParseError,
    interpreter::{
        lexer::{Lexeme, Token},
        parser::{binary::parse_logical_or, block::parse_statement_list},
    },
    util::ensure_sufficient_stack,
};

pub type ParseResult<T> = Result<T, ParseError>;

/// Parses a whole token sequence into a [`Program`].
///
/// The tokens are treated as the body of an implicit top-level block that is
/// closed by the end-of-input sentinel. Parsing is a pure function of its
/// input: the same tokens always produce the same tree.
///
/// # Errors
/// Returns the first `ParseError` encountered; there is no recovery.
///
/// # Example
/// ```
/// use quill::interpreter::{lexer::scan, parser::core::parse};
///
/// let tokens = scan("x = 1; print x").unwrap();
/// let program = parse(&tokens).unwrap();
///
/// assert_eq!(program.body.statements.len(), 2);
/// ```
pub fn parse(tokens: &[Lexeme]) -> ParseResult<Program> {
    let line = tokens.first().map_or(1, |lexeme| lexeme.line);
    let mut iter = tokens.iter().peekable();
    let statements = parse_statement_list(&mut iter, &Token::Eof)?;

    Ok(Program { body: Block { statements, line } })
}

/// Parses a full expression.
///
/// This is the entry point for expression parsing. It begins at the
/// lowest-precedence level, assignment, and recursively descends through the
/// precedence hierarchy.
///
/// Grammar: `expression := "extern"? logical_or ("=" expression)?`
///
/// # Errors
/// - `ExternWithoutAssignment` if `extern` is not followed by an assignment.
/// - `InvalidExternTarget` if `extern` is applied to anything but a bare
///   identifier.
/// - `InvalidAssignmentTarget` if the left of `=` is not assignable.
pub fn parse_expression<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Lexeme> + Clone
{
    ensure_sufficient_stack(|| parse_assignment(tokens))
}

fn parse_assignment<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Lexeme> + Clone
{
    let extern_line = tokens.next_if(|lexeme| lexeme.token == Token::Extern)
                            .map(|lexeme| lexeme.line);
    let target = parse_logical_or(tokens)?;
    let line = extern_line.unwrap_or_else(|| target.line_number());

    if tokens.next_if(|lexeme| lexeme.token == Token::Equals).is_none() {
        return match extern_line {
            Some(line) => Err(ParseError::ExternWithoutAssignment { line }),
            None => Ok(target),
        };
    }

    // Right-associative: `a = b = c` assigns `c` to `b`, then to `a`.
    let value = parse_expression(tokens)?;

    let target = match (target, extern_line) {
        (Expr::Identifier { name, .. }, is_extern) => AssignTarget::Variable { name,
                                                                               is_extern:
                                                                                   is_extern.is_some() },
        (_, Some(line)) => return Err(ParseError::InvalidExternTarget { line }),
        (Expr::Index { base, index, .. }, None) => AssignTarget::Index { base, index },
        (other, None) => {
            return Err(ParseError::InvalidAssignmentTarget { target: other.kind().to_string(),
                                                             line:   other.line_number(), });
        },
    };

    Ok(Expr::Assign { target,
                      value: Box::new(value),
                      line })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        ast::{BinaryOperator, LiteralValue, LogicalOperator, Statement, UnaryOperator},
        interpreter::lexer::scan,
    };

    fn parse_source(source: &str) -> ParseResult<Program> {
        parse(&scan(source).unwrap())
    }

    fn expr_of(source: &str) -> Expr {
        let program = parse_source(source).unwrap();
        match program.body.statements.into_iter().next() {
            Some(Statement::Expression { expr, .. }) => expr,
            other => panic!("expected an expression statement, got {other:?}"),
        }
    }

    fn int(value: i64) -> Box<Expr> {
        Box::new(Expr::Literal { value: LiteralValue::Integer(value),
                                 line:  1, })
    }

    fn ident(name: &str) -> Box<Expr> {
        Box::new(Expr::Identifier { name: name.to_string(),
                                    line: 1, })
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        assert_eq!(expr_of("1 + 2 * 3"),
                   Expr::Binary { left:  int(1),
                                  op:    BinaryOperator::Add,
                                  right: Box::new(Expr::Binary { left:  int(2),
                                                                 op:    BinaryOperator::Mul,
                                                                 right: int(3),
                                                                 line:  1, }),
                                  line:  1, });
    }

    #[test]
    fn subtraction_is_left_associative() {
        assert_eq!(expr_of("1 - 2 - 3"),
                   Expr::Binary { left:  Box::new(Expr::Binary { left:  int(1),
                                                                 op:    BinaryOperator::Sub,
                                                                 right: int(2),
                                                                 line:  1, }),
                                  op:    BinaryOperator::Sub,
                                  right: int(3),
                                  line:  1, });
    }

    #[test]
    fn assignment_is_right_associative() {
        assert_eq!(expr_of("a = b = 1"),
                   Expr::Assign { target: AssignTarget::Variable { name:      "a".to_string(),
                                                                   is_extern: false, },
                                  value:  Box::new(Expr::Assign { target: AssignTarget::Variable {
                                                                      name:      "b".to_string(),
                                                                      is_extern: false,
                                                                  },
                                                                  value:  int(1),
                                                                  line:   1, }),
                                  line:   1, });
    }

    #[test]
    fn and_binds_tighter_than_or() {
        assert_eq!(expr_of("a or b and not c"),
                   Expr::Logical { left:  ident("a"),
                                   op:    LogicalOperator::Or,
                                   right: Box::new(Expr::Logical { left:  ident("b"),
                                                                   op:    LogicalOperator::And,
                                                                   right: Box::new(Expr::Unary {
                                                                       op:   UnaryOperator::Not,
                                                                       expr: ident("c"),
                                                                       line: 1,
                                                                   }),
                                                                   line:  1, }),
                                   line:  1, });
    }

    #[test]
    fn member_access_desugars_to_string_index() {
        assert_eq!(expr_of("p.x"),
                   Expr::Index { base:  ident("p"),
                                 index: Box::new(Expr::Literal { value: LiteralValue::Str("x".to_string()),
                                                                 line:  1, }),
                                 line:  1, });
    }

    #[test]
    fn extern_marks_identifier_target() {
        match expr_of("extern total = 5") {
            Expr::Assign { target: AssignTarget::Variable { name, is_extern },
                           .. } => {
                assert_eq!(name, "total");
                assert!(is_extern);
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn extern_without_assignment_fails() {
        assert_eq!(parse_source("extern x;"),
                   Err(ParseError::ExternWithoutAssignment { line: 1 }));
    }

    #[test]
    fn extern_on_index_fails() {
        assert_eq!(parse_source("extern a[0] = 1;"),
                   Err(ParseError::InvalidExternTarget { line: 1 }));
    }

    #[test]
    fn literal_is_not_assignable() {
        assert_eq!(parse_source("1 = 2;"),
                   Err(ParseError::InvalidAssignmentTarget { target: "number".to_string(),
                                                             line:   1, }));
    }

    #[test]
    fn parsing_is_deterministic() {
        let tokens = scan("function f(a) { return a * 2 } x = [f(1), {\"k\": f(2)}];").unwrap();
        assert_eq!(parse(&tokens), parse(&tokens));
    }

    #[test]
    fn empty_program() {
        assert_eq!(parse_source("").unwrap().body.statements, Vec::new());
    }
}
