use std::iter::Peekable;

use crate::{
    ast::{Block, Statement},
    error::ParseError,
    interpreter::{
        lexer::{Lexeme, Token},
        parser::{
            core::ParseResult,
            statement::parse_statement,
            utils::{expect, peek_token, unexpected},
        },
    },
    util::ensure_sufficient_stack,
};

/// Parses a block delimited by braces.
///
/// Grammar: `block := "{" statement_list "}"`
///
/// # Returns
/// A [`Block`] carrying the line of its opening brace.
///
/// # Errors
/// Returns a `ParseError` if the braces are missing or a statement inside is
/// malformed.
pub fn parse_block<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Block>
    where I: Iterator<Item = &'a Lexeme> + Clone
{
    let line = expect(tokens, &Token::LBrace)?.line;
    let statements = ensure_sufficient_stack(|| parse_statement_list(tokens, &Token::RBrace))?;
    expect(tokens, &Token::RBrace)?;

    Ok(Block { statements, line })
}

/// Parses `;`-separated statements up to, but not including, `closing`.
///
/// Stray semicolons are skipped. A statement must be followed by `;` or by
/// `closing`, unless it ends in a block of its own (`if`, `while`, or a
/// function declaration), in which case the separator may be left out.
///
/// The top level is parsed with `closing` set to the end-of-input sentinel,
/// where a stray `}` is reported as a trailing token.
///
/// # Errors
/// Returns a `ParseError` for a malformed statement or a missing separator.
pub(in crate::interpreter::parser) fn parse_statement_list<'a, I>(tokens: &mut Peekable<I>,
                                                                  closing: &Token)
                                                                  -> ParseResult<Vec<Statement>>
    where I: Iterator<Item = &'a Lexeme> + Clone
{
    let mut statements = Vec::new();

    loop {
        match peek_token(tokens) {
            tok if tok == closing => break,
            Token::Semicolon => {
                tokens.next();
                continue;
            },
            Token::RBrace if *closing == Token::Eof => {
                return Err(trailing(tokens.peek().copied()));
            },
            Token::Eof => return Err(unexpected(tokens.peek().copied(), &closing.to_string())),
            _ => {},
        }

        let statement = parse_statement(tokens)?;
        let needs_separator = !statement.is_block_bodied();
        statements.push(statement);

        if needs_separator {
            match peek_token(tokens) {
                Token::Semicolon => {
                    tokens.next();
                },
                tok if tok == closing => {},
                _ => return Err(unexpected(tokens.peek().copied(), "';'")),
            }
        }
    }

    Ok(statements)
}

fn trailing(found: Option<&Lexeme>) -> ParseError {
    match found {
        Some(lexeme) => ParseError::TrailingTokens { found:  lexeme.token.to_string(),
                                                     line:   lexeme.line,
                                                     column: lexeme.column, },
        None => unexpected(None, "end of input"),
    }
}
