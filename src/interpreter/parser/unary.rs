use std::{iter::Peekable, rc::Rc};

use crate::{
    ast::{Expr, FunctionDef, LiteralValue, UnaryOperator},
    interpreter::{
        lexer::{Lexeme, Token},
        parser::{
            block::parse_block,
            core::{ParseResult, parse_expression},
            utils::{expect, parse_comma_separated, parse_identifier, parse_parameters, unexpected},
        },
    },
    util::ensure_sufficient_stack,
};

/// Parses a unary expression.
///
/// Handles the prefix operators `-` (negation) and `!` / `not` (logical
/// negation). Both are right-recursive, so `--x` and `!!x` nest.
///
/// Grammar:
/// ```text
/// unary := ("-" | "!") unary
///        | postfix
/// ```
///
/// # Errors
/// Propagates any error from the operand.
pub(crate) fn parse_unary<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Lexeme> + Clone
{
    let op = match tokens.peek().copied().map(|lexeme| &lexeme.token) {
        Some(Token::Minus) => UnaryOperator::Negate,
        Some(Token::Bang) => UnaryOperator::Not,
        _ => return parse_postfix(tokens),
    };
    let line = tokens.next().map_or(0, |lexeme| lexeme.line);
    let expr = ensure_sufficient_stack(|| parse_unary(tokens))?;

    Ok(Expr::Unary { op,
                     expr: Box::new(expr),
                     line })
}

/// Parses a primary expression followed by any number of postfix operations:
/// indexing `[expr]`, member access `.name` and calls `(args...)`.
///
/// Member access is sugar for indexing with a string literal, so `p.x` and
/// `p["x"]` produce the same tree.
fn parse_postfix<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Lexeme> + Clone
{
    let mut node = parse_primary(tokens)?;
    loop {
        let Some(lexeme) = tokens.peek().copied() else {
            break;
        };
        let line = lexeme.line;
        node = match lexeme.token {
            Token::LBracket => {
                tokens.next();
                let index = parse_expression(tokens)?;
                expect(tokens, &Token::RBracket)?;
                Expr::Index { base: Box::new(node),
                              index: Box::new(index),
                              line }
            },
            Token::Dot => {
                tokens.next();
                let name = parse_identifier(tokens)?;
                Expr::Index { base: Box::new(node),
                              index: Box::new(Expr::Literal { value: LiteralValue::Str(name),
                                                              line }),
                              line }
            },
            Token::LParen => {
                tokens.next();
                let arguments = parse_comma_separated(tokens, parse_expression, &Token::RParen, false)?;
                Expr::Call { callee: Box::new(node),
                             arguments,
                             line }
            },
            _ => break,
        };
    }
    Ok(node)
}

/// Parses a primary expression.
///
/// Primary expressions are the atoms of the grammar: identifiers, literals,
/// list and object literals, function literals and parenthesised
/// expressions.
///
/// # Errors
/// `UnexpectedToken` (or `UnexpectedEndOfInput`) when no expression can
/// start at the current token.
pub(crate) fn parse_primary<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Lexeme> + Clone
{
    let Some(lexeme) = tokens.peek().copied() else {
        return Err(unexpected(None, "an expression"));
    };
    let line = lexeme.line;

    let literal = match &lexeme.token {
        Token::Identifier(name) => {
            tokens.next();
            return Ok(Expr::Identifier { name: name.clone(),
                                         line });
        },
        // Only the statement form claims the keyword; anywhere else `print`
        // names the builtin.
        Token::Print => {
            tokens.next();
            return Ok(Expr::Identifier { name: "print".to_string(),
                                         line });
        },
        Token::Integer(n) => LiteralValue::Integer(*n),
        Token::Real(r) => LiteralValue::Real(*r),
        Token::Str(s) => LiteralValue::Str(s.clone()),
        Token::Bool(b) => LiteralValue::Bool(*b),
        Token::Null => LiteralValue::Null,
        Token::LBracket => return parse_list_literal(tokens),
        Token::LBrace => return parse_object_literal(tokens),
        Token::Function => return parse_function_literal(tokens),
        Token::LParen => return parse_grouping(tokens),
        _ => return Err(unexpected(Some(lexeme), "an expression")),
    };
    tokens.next();

    Ok(Expr::Literal { value: literal,
                       line })
}

/// Parses a list literal of the form `[expr1, expr2, ..., exprN]`.
///
/// An empty list `[]` and a trailing comma are both accepted.
fn parse_list_literal<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Lexeme> + Clone
{
    let line = expect(tokens, &Token::LBracket)?.line;
    let items = parse_comma_separated(tokens, parse_expression, &Token::RBracket, true)?;

    Ok(Expr::List { items, line })
}

/// Parses an object literal of the form `{key: value, ...}`.
///
/// Keys are arbitrary expressions; the evaluator requires them to produce
/// strings.
fn parse_object_literal<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Lexeme> + Clone
{
    let line = expect(tokens, &Token::LBrace)?.line;
    let entries = parse_comma_separated(tokens,
                                        |tokens| {
                                            let key = parse_expression(tokens)?;
                                            expect(tokens, &Token::Colon)?;
                                            let value = parse_expression(tokens)?;
                                            Ok((key, value))
                                        },
                                        &Token::RBrace,
                                        true)?;

    Ok(Expr::Object { entries, line })
}

/// Parses an anonymous function literal: `function (params) { body }`.
pub(in crate::interpreter::parser) fn parse_function_literal<'a, I>(tokens: &mut Peekable<I>)
                                                                    -> ParseResult<Expr>
    where I: Iterator<Item = &'a Lexeme> + Clone
{
    let line = expect(tokens, &Token::Function)?.line;
    let params = parse_parameters(tokens)?;
    let body = parse_block(tokens)?;

    Ok(Expr::Function { def: Rc::new(FunctionDef { params, body }),
                        line })
}

/// Parses a parenthesized expression: `(expr)`.
fn parse_grouping<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Lexeme> + Clone
{
    expect(tokens, &Token::LParen)?;
    let expr = parse_expression(tokens)?;
    expect(tokens, &Token::RParen)?;

    Ok(expr)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{error::ParseError, interpreter::lexer::scan};

    fn parse_unary_source(source: &str) -> ParseResult<Expr> {
        let tokens = scan(source).unwrap();
        parse_unary(&mut tokens.iter().peekable())
    }

    #[test]
    fn prefix_operators_nest() {
        let expr = parse_unary_source("-!x").unwrap();
        let Expr::Unary { op: UnaryOperator::Negate,
                          expr: inner,
                          .. } = expr
        else {
            panic!("expected negation");
        };
        assert!(matches!(*inner,
                         Expr::Unary { op: UnaryOperator::Not,
                                       .. }));
    }

    #[test]
    fn postfix_operations_chain() {
        let expr = parse_unary_source("f(1)[0].name").unwrap();
        let Expr::Index { base, .. } = expr else {
            panic!("expected member access");
        };
        let Expr::Index { base, .. } = *base else {
            panic!("expected indexing");
        };
        assert!(matches!(*base, Expr::Call { .. }));
    }

    #[test]
    fn list_and_object_accept_trailing_commas() {
        let list = parse_unary_source("[1, 2,]").unwrap();
        assert!(matches!(list, Expr::List { ref items, .. } if items.len() == 2));

        let object = parse_unary_source("{\"a\": 1, \"b\": 2,}").unwrap();
        assert!(matches!(object, Expr::Object { ref entries, .. } if entries.len() == 2));
    }

    #[test]
    fn call_arguments_reject_trailing_comma() {
        assert!(matches!(parse_unary_source("f(1,)"),
                         Err(ParseError::UnexpectedToken { .. })));
    }

    #[test]
    fn function_literal_keeps_parameters() {
        let Expr::Function { def, .. } = parse_unary_source("function(a, b) { return a }").unwrap()
        else {
            panic!("expected a function literal");
        };
        assert_eq!(def.params, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(def.body.statements.len(), 1);
    }

    #[test]
    fn object_entry_needs_colon() {
        assert_eq!(parse_unary_source("{\"a\" 1}"),
                   Err(ParseError::UnexpectedToken { expected: "':'".to_string(),
                                                     found:    "number 1".to_string(),
                                                     line:     1,
                                                     column:   6, }));
    }

    #[test]
    fn missing_operand_reports_end_of_input() {
        assert_eq!(parse_unary_source("-"),
                   Err(ParseError::UnexpectedEndOfInput { expected: "an expression".to_string(),
                                                          line:     1,
                                                          column:   2, }));
    }
}
