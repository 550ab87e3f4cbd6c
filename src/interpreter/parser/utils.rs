use std::iter::Peekable;

use crate::{
    error::ParseError,
    interpreter::{
        lexer::{Lexeme, Token},
        parser::core::ParseResult,
    },
};

/// Returns the next token without consuming it.
///
/// A stream that has run dry reads as [`Token::Eof`], so callers only ever
/// have to handle the sentinel.
pub(in crate::interpreter::parser) fn peek_token<'a, I>(tokens: &mut Peekable<I>) -> &'a Token
    where I: Iterator<Item = &'a Lexeme>
{
    const EOF: &Token = &Token::Eof;
    tokens.peek().copied().map_or(EOF, |lexeme| &lexeme.token)
}

/// Builds the error for finding `found` where `expected` was required.
///
/// The end-of-input sentinel (or an exhausted stream) turns into
/// `UnexpectedEndOfInput`; anything else into `UnexpectedToken`.
pub(in crate::interpreter::parser) fn unexpected(found: Option<&Lexeme>, expected: &str) -> ParseError {
    match found {
        Some(lexeme) if lexeme.token != Token::Eof => {
            ParseError::UnexpectedToken { expected: expected.to_string(),
                                          found:    lexeme.token.to_string(),
                                          line:     lexeme.line,
                                          column:   lexeme.column, }
        },
        Some(lexeme) => ParseError::UnexpectedEndOfInput { expected: expected.to_string(),
                                                           line:     lexeme.line,
                                                           column:   lexeme.column, },
        None => ParseError::UnexpectedEndOfInput { expected: expected.to_string(),
                                                   line:     0,
                                                   column:   0, },
    }
}

/// Consumes the next token if it equals `expected`, otherwise fails without
/// consuming anything.
///
/// # Returns
/// The consumed lexeme, so callers can read its position.
///
/// # Errors
/// `UnexpectedToken` or `UnexpectedEndOfInput` naming `expected`.
pub(in crate::interpreter::parser) fn expect<'a, I>(tokens: &mut Peekable<I>,
                                                    expected: &Token)
                                                    -> ParseResult<&'a Lexeme>
    where I: Iterator<Item = &'a Lexeme>
{
    tokens.next_if(|lexeme| lexeme.token == *expected)
          .ok_or_else(|| unexpected(tokens.peek().copied(), &expected.to_string()))
}

/// Parses a plain identifier and returns its name.
///
/// # Errors
/// Returns a `ParseError` if the next token is not an identifier.
pub(in crate::interpreter::parser) fn parse_identifier<'a, I>(tokens: &mut Peekable<I>)
                                                              -> ParseResult<String>
    where I: Iterator<Item = &'a Lexeme>
{
    match tokens.peek().copied() {
        Some(Lexeme { token: Token::Identifier(name),
                      .. }) => {
            tokens.next();
            Ok(name.clone())
        },
        other => Err(unexpected(other, "identifier")),
    }
}

/// Parses a comma-separated list of items up to and including `closing`.
///
/// An immediately encountered closing token produces an empty list. When
/// `allow_trailing_comma` is set, a comma directly before `closing` is
/// accepted (`[1, 2,]`).
///
/// Grammar (simplified): `list := (item ("," item)* ","?)? closing`
///
/// # Errors
/// Returns a `ParseError` if an item fails to parse or a token other than a
/// comma or `closing` follows an item.
pub(in crate::interpreter::parser) fn parse_comma_separated<'a, I, T>(
    tokens: &mut Peekable<I>,
    parse_item: impl Fn(&mut Peekable<I>) -> ParseResult<T>,
    closing: &Token,
    allow_trailing_comma: bool)
    -> ParseResult<Vec<T>>
    where I: Iterator<Item = &'a Lexeme> + Clone
{
    let mut items = Vec::new();
    if tokens.next_if(|lexeme| lexeme.token == *closing).is_some() {
        return Ok(items);
    }
    loop {
        items.push(parse_item(tokens)?);
        match peek_token(tokens) {
            Token::Comma => {
                tokens.next();
                if allow_trailing_comma && tokens.next_if(|lexeme| lexeme.token == *closing).is_some() {
                    break;
                }
            },
            tok if tok == closing => {
                tokens.next();
                break;
            },
            _ => return Err(unexpected(tokens.peek().copied(), &format!("',' or {closing}"))),
        }
    }
    Ok(items)
}

/// Parses a parenthesised parameter list: `( name ("," name)* )`.
///
/// # Errors
/// Returns a `ParseError` if a parameter is not an identifier or the list is
/// not closed.
pub(in crate::interpreter::parser) fn parse_parameters<'a, I>(tokens: &mut Peekable<I>)
                                                              -> ParseResult<Vec<String>>
    where I: Iterator<Item = &'a Lexeme> + Clone
{
    expect(tokens, &Token::LParen)?;
    parse_comma_separated(tokens, parse_identifier, &Token::RParen, false)
}
