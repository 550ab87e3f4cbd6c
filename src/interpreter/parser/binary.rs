use std::iter::Peekable;

use crate::{
    ast::{BinaryOperator, Expr, LogicalOperator},
    interpreter::{
        lexer::{Lexeme, Token},
        parser::{core::ParseResult, unary::parse_unary},
    },
};

/// Parses logical OR expressions.
///
/// The rule is: `logical_or := logical_and ("||" logical_and)*`
///
/// # Returns
/// An `Expr::Logical` tree, or the operand itself when no `||` follows.
pub fn parse_logical_or<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Lexeme> + Clone
{
    let mut left = parse_logical_and(tokens)?;
    while let Some(lexeme) = tokens.next_if(|lexeme| lexeme.token == Token::OrOr) {
        let right = parse_logical_and(tokens)?;
        left = Expr::Logical { left: Box::new(left),
                               op: LogicalOperator::Or,
                               right: Box::new(right),
                               line: lexeme.line };
    }
    Ok(left)
}

/// Parses logical AND expressions.
///
/// The rule is: `logical_and := relational ("&&" relational)*`
pub fn parse_logical_and<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Lexeme> + Clone
{
    let mut left = parse_relational(tokens)?;
    while let Some(lexeme) = tokens.next_if(|lexeme| lexeme.token == Token::AndAnd) {
        let right = parse_relational(tokens)?;
        left = Expr::Logical { left: Box::new(left),
                               op: LogicalOperator::And,
                               right: Box::new(right),
                               line: lexeme.line };
    }
    Ok(left)
}

/// Parses relational and equality operators.
///
/// All six comparison operators share one level and associate to the left,
/// so `a < b == c` parses as `(a < b) == c`.
///
/// The rule is: `relational := additive (("<" | ">" | "<=" | ">=" | "==" |
/// "!=") additive)*`
pub fn parse_relational<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Lexeme> + Clone
{
    parse_left_associative(tokens, parse_additive, |op| {
        matches!(op,
                 BinaryOperator::Less
                 | BinaryOperator::Greater
                 | BinaryOperator::LessEqual
                 | BinaryOperator::GreaterEqual
                 | BinaryOperator::Equal
                 | BinaryOperator::NotEqual)
    })
}

/// Parses addition and subtraction expressions.
///
/// The rule is: `additive := multiplicative (("+" | "-") multiplicative)*`
pub fn parse_additive<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Lexeme> + Clone
{
    parse_left_associative(tokens, parse_multiplicative, |op| {
        matches!(op, BinaryOperator::Add | BinaryOperator::Sub)
    })
}

/// Parses multiplication-level expressions.
///
/// The rule is: `multiplicative := unary (("*" | "/" | "%") unary)*`
pub fn parse_multiplicative<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Lexeme> + Clone
{
    parse_left_associative(tokens, parse_unary, |op| {
        matches!(op, BinaryOperator::Mul | BinaryOperator::Div | BinaryOperator::Mod)
    })
}

/// Folds `operand (op operand)*` into a left-leaning tree for every operator
/// accepted by `accepts`.
fn parse_left_associative<'a, I>(tokens: &mut Peekable<I>,
                                 parse_operand: fn(&mut Peekable<I>) -> ParseResult<Expr>,
                                 accepts: fn(BinaryOperator) -> bool)
                                 -> ParseResult<Expr>
    where I: Iterator<Item = &'a Lexeme> + Clone
{
    let mut left = parse_operand(tokens)?;
    loop {
        if let Some(lexeme) = tokens.peek().copied()
           && let Some(op) = token_to_binary_operator(&lexeme.token)
           && accepts(op)
        {
            tokens.next();
            let right = parse_operand(tokens)?;
            left = Expr::Binary { left: Box::new(left),
                                  op,
                                  right: Box::new(right),
                                  line: lexeme.line };
            continue;
        }
        break;
    }
    Ok(left)
}

/// Converts a token into its corresponding strict binary operator, if any.
///
/// # Returns
/// - `Some(BinaryOperator)` if the token represents a binary operator.
/// - `None` otherwise.
const fn token_to_binary_operator(token: &Token) -> Option<BinaryOperator> {
    match token {
        Token::Plus => Some(BinaryOperator::Add),
        Token::Minus => Some(BinaryOperator::Sub),
        Token::Star => Some(BinaryOperator::Mul),
        Token::Slash => Some(BinaryOperator::Div),
        Token::Percent => Some(BinaryOperator::Mod),
        Token::Less => Some(BinaryOperator::Less),
        Token::Greater => Some(BinaryOperator::Greater),
        Token::LessEqual => Some(BinaryOperator::LessEqual),
        Token::GreaterEqual => Some(BinaryOperator::GreaterEqual),
        Token::EqualEqual => Some(BinaryOperator::Equal),
        Token::BangEqual => Some(BinaryOperator::NotEqual),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{ast::LiteralValue, interpreter::lexer::scan};

    fn parse_binary(source: &str) -> Expr {
        let tokens = scan(source).unwrap();
        parse_logical_or(&mut tokens.iter().peekable()).unwrap()
    }

    #[test]
    fn comparisons_chain_left_to_right() {
        let Expr::Binary { left, op, .. } = parse_binary("1 < 2 == true") else {
            panic!("expected a binary expression");
        };
        assert_eq!(op, BinaryOperator::Equal);
        assert!(matches!(*left,
                         Expr::Binary { op: BinaryOperator::Less,
                                        .. }));
    }

    #[test]
    fn additive_binds_tighter_than_relational() {
        let Expr::Binary { op, right, .. } = parse_binary("a < b + 1") else {
            panic!("expected a binary expression");
        };
        assert_eq!(op, BinaryOperator::Less);
        assert!(matches!(*right,
                         Expr::Binary { op: BinaryOperator::Add,
                                        .. }));
    }

    #[test]
    fn operator_line_is_recorded() {
        let expr = parse_binary("1\n+\n2");
        assert_eq!(expr,
                   Expr::Binary { left:  Box::new(Expr::Literal { value: LiteralValue::Integer(1),
                                                                  line:  1, }),
                                  op:    BinaryOperator::Add,
                                  right: Box::new(Expr::Literal { value: LiteralValue::Integer(2),
                                                                  line:  3, }),
                                  line:  2, });
    }
}
