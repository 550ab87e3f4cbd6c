use std::{iter::Peekable, rc::Rc};

use crate::{
    ast::{AssignTarget, Block, Expr, FunctionDef, Statement},
    interpreter::{
        lexer::{Lexeme, Token},
        parser::{
            block::parse_block,
            core::{ParseResult, parse_expression},
            utils::{expect, parse_identifier, parse_parameters, peek_token},
        },
    },
};

/// Parses a single statement.
///
/// The leading token selects the statement kind. Anything that does not start
/// with a statement keyword is parsed as an expression statement.
///
/// A statement beginning with `function` is a named declaration:
/// `function name(params) { body }` becomes the expression statement
/// `name = function(params) { body }`.
///
/// # Errors
/// Propagates any `ParseError` from the statement's parts.
pub fn parse_statement<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Statement>
    where I: Iterator<Item = &'a Lexeme> + Clone
{
    let line = tokens.peek().map_or(0, |lexeme| lexeme.line);

    match peek_token(tokens) {
        Token::If => parse_if(tokens),
        Token::While => parse_while(tokens),
        Token::Function => parse_function_declaration(tokens),
        Token::Return => {
            tokens.next();
            let value = parse_optional_expression(tokens)?;
            Ok(Statement::Return { value, line })
        },
        Token::Print => {
            tokens.next();
            let value = parse_optional_expression(tokens)?;
            Ok(Statement::Print { value, line })
        },
        Token::Exit => {
            tokens.next();
            let value = parse_optional_expression(tokens)?;
            Ok(Statement::Exit { value, line })
        },
        Token::Import => {
            tokens.next();
            let path = parse_expression(tokens)?;
            Ok(Statement::Import { path, line })
        },
        Token::Break => {
            tokens.next();
            Ok(Statement::Break { line })
        },
        Token::Continue => {
            tokens.next();
            Ok(Statement::Continue { line })
        },
        Token::Assert => {
            tokens.next();
            let condition = parse_expression(tokens)?;
            let explanation = match tokens.next_if(|lexeme| lexeme.token == Token::Comma) {
                Some(_) => Some(parse_expression(tokens)?),
                None => None,
            };
            Ok(Statement::Assert { condition,
                                   explanation,
                                   line })
        },
        _ => {
            let expr = parse_expression(tokens)?;
            Ok(Statement::Expression { expr, line })
        },
    }
}

/// Parses the operand of `return`, `print` and `exit`, which is absent when
/// the statement is directly followed by `;`, `}` or the end of input.
fn parse_optional_expression<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Option<Expr>>
    where I: Iterator<Item = &'a Lexeme> + Clone
{
    match peek_token(tokens) {
        Token::Semicolon | Token::RBrace | Token::Eof => Ok(None),
        _ => parse_expression(tokens).map(Some),
    }
}

/// Parses `if (condition) { ... }` with an optional `else { ... }`.
///
/// `else if` is accepted and nests the second `if` as the only statement of
/// the `else` block.
fn parse_if<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Statement>
    where I: Iterator<Item = &'a Lexeme> + Clone
{
    let line = expect(tokens, &Token::If)?.line;
    let condition = parse_condition(tokens)?;
    let then_branch = parse_block(tokens)?;

    let else_branch = if tokens.next_if(|lexeme| lexeme.token == Token::Else).is_some() {
        if *peek_token(tokens) == Token::If {
            let nested = parse_if(tokens)?;
            let line = nested.line_number();
            Some(Block { statements: vec![nested],
                         line })
        } else {
            Some(parse_block(tokens)?)
        }
    } else {
        None
    };

    Ok(Statement::If { condition,
                       then_branch,
                       else_branch,
                       line })
}

/// Parses `while (condition) { ... }`.
fn parse_while<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Statement>
    where I: Iterator<Item = &'a Lexeme> + Clone
{
    let line = expect(tokens, &Token::While)?.line;
    let condition = parse_condition(tokens)?;
    let body = parse_block(tokens)?;

    Ok(Statement::While { condition,
                          body,
                          line })
}

fn parse_condition<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Lexeme> + Clone
{
    expect(tokens, &Token::LParen)?;
    let condition = parse_expression(tokens)?;
    expect(tokens, &Token::RParen)?;
    Ok(condition)
}

/// Parses `function name(params) { body }` into an assignment statement.
fn parse_function_declaration<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Statement>
    where I: Iterator<Item = &'a Lexeme> + Clone
{
    let line = expect(tokens, &Token::Function)?.line;
    let name = parse_identifier(tokens)?;
    let params = parse_parameters(tokens)?;
    let body = parse_block(tokens)?;

    let function = Expr::Function { def: Rc::new(FunctionDef { params, body }),
                                    line };
    let expr = Expr::Assign { target: AssignTarget::Variable { name,
                                                               is_extern: false },
                              value: Box::new(function),
                              line };

    Ok(Statement::Expression { expr, line })
}
