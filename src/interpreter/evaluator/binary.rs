use std::cmp::Ordering;

use crate::{
    ast::BinaryOperator,
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        value::core::{ObjectMap, Value},
    },
    util::num::f64_to_i64_truncated,
};

/// Applies a strict binary operator to two evaluated operands.
///
/// Integer arithmetic stays integral and is checked; as soon as one operand is
/// a real, the operation is carried out on reals. Division always yields a
/// real.
///
/// # Errors
/// - `TypeError` for operand types the operator does not support.
/// - `DivisionByZero` / `ModuloByZero` for a zero right operand.
/// - `Overflow` when integer arithmetic overflows, or when string repetition
///   would build a string longer than 1GiB.
pub fn eval_binary(op: BinaryOperator, left: &Value, right: &Value, line: usize) -> EvalResult<Value> {
    match op {
        BinaryOperator::Add => add(left, right, line),
        BinaryOperator::Sub => arithmetic(op, left, right, line, i64::checked_sub, |a, b| a - b),
        BinaryOperator::Mul => multiply(left, right, line),
        BinaryOperator::Div => divide(left, right, line),
        BinaryOperator::Mod => modulo(left, right, line),
        BinaryOperator::Equal => Ok(Value::Bool(left == right)),
        BinaryOperator::NotEqual => Ok(Value::Bool(left != right)),
        BinaryOperator::Less
        | BinaryOperator::Greater
        | BinaryOperator::LessEqual
        | BinaryOperator::GreaterEqual => compare(op, left, right, line),
    }
}

fn type_error(verb: &str, left: &Value, right: &Value, line: usize) -> RuntimeError {
    RuntimeError::TypeError { details: format!("cannot {verb} {} and {}", left.type_name(), right.type_name()),
                              line }
}

/// `+`: numeric sum, string concatenation, array concatenation or object
/// merge. Containers are deep-copied so the result shares nothing with the
/// operands; on a key conflict the right object wins.
fn add(left: &Value, right: &Value, line: usize) -> EvalResult<Value> {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Ok(Value::from(format!("{a}{b}"))),
        (Value::Array(a), Value::Array(b)) => {
            let items: Vec<Value> = a.borrow().iter().chain(b.borrow().iter()).cloned().collect();
            Ok(Value::from(items).deep_copy())
        },
        (Value::Object(a), Value::Object(b)) => {
            let mut merged: ObjectMap = a.borrow().clone();
            merged.extend(b.borrow().iter().map(|(key, value)| (key.clone(), value.clone())));
            Ok(Value::from(merged).deep_copy())
        },
        _ if left.is_number() && right.is_number() => {
            arithmetic(BinaryOperator::Add, left, right, line, i64::checked_add, |a, b| a + b)
        },
        _ => Err(type_error("add", left, right, line)),
    }
}

fn arithmetic(op: BinaryOperator,
              left: &Value,
              right: &Value,
              line: usize,
              on_integers: fn(i64, i64) -> Option<i64>,
              on_reals: fn(f64, f64) -> f64)
              -> EvalResult<Value> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => {
            on_integers(*a, *b).map(Value::Integer)
                               .ok_or(RuntimeError::Overflow { line })
        },
        _ => match (left.as_f64(), right.as_f64()) {
            (Some(a), Some(b)) => Ok(Value::Real(on_reals(a, b))),
            _ => {
                let verb = match op {
                    BinaryOperator::Sub => "subtract",
                    BinaryOperator::Mul => "multiply",
                    _ => "add",
                };
                Err(type_error(verb, left, right, line))
            },
        },
    }
}

/// Longest string, in bytes, that repetition may build (1GiB).
const MAX_REPEAT_LEN: usize = 1 << 30;

/// `*`: numeric product, or string repetition when the other side is a
/// number. The count is truncated toward zero and a negative count gives the
/// empty string.
fn multiply(left: &Value, right: &Value, line: usize) -> EvalResult<Value> {
    match (left, right) {
        (Value::Str(s), count) | (count, Value::Str(s)) if count.is_number() => {
            let count = match count {
                Value::Real(r) => f64_to_i64_truncated(*r, line)?,
                Value::Integer(n) => *n,
                _ => 0,
            };
            repeat(s, usize::try_from(count).unwrap_or(0), line)
        },
        _ => arithmetic(BinaryOperator::Mul, left, right, line, i64::checked_mul, |a, b| a * b),
    }
}

/// Builds `s` repeated `count` times, or fails with `Overflow` when the result
/// would exceed `MAX_REPEAT_LEN` or cannot be allocated.
fn repeat(s: &str, count: usize, line: usize) -> EvalResult<Value> {
    let len = s.len()
               .checked_mul(count)
               .filter(|len| *len <= MAX_REPEAT_LEN)
               .ok_or(RuntimeError::Overflow { line })?;
    if len == 0 {
        return Ok(Value::from(""));
    }

    let mut repeated = String::new();
    repeated.try_reserve_exact(len)
            .map_err(|_| RuntimeError::Overflow { line })?;
    for _ in 0..count {
        repeated.push_str(s);
    }
    Ok(Value::from(repeated))
}

/// `/`: always real division.
fn divide(left: &Value, right: &Value, line: usize) -> EvalResult<Value> {
    let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) else {
        return Err(type_error("divide", left, right, line));
    };
    if b == 0.0 {
        return Err(RuntimeError::DivisionByZero { line });
    }
    Ok(Value::Real(a / b))
}

/// `%`: floored modulo, so the result takes the sign of the divisor
/// (`-7 % 3 == 2`).
fn modulo(left: &Value, right: &Value, line: usize) -> EvalResult<Value> {
    match (left, right) {
        (Value::Integer(_), Value::Integer(0)) => Err(RuntimeError::ModuloByZero { line }),
        (Value::Integer(a), Value::Integer(b)) => {
            let remainder = a.checked_rem(*b).ok_or(RuntimeError::Overflow { line })?;
            if remainder != 0 && (remainder < 0) != (*b < 0) {
                Ok(Value::Integer(remainder + b))
            } else {
                Ok(Value::Integer(remainder))
            }
        },
        _ => {
            let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) else {
                return Err(type_error("take the modulo of", left, right, line));
            };
            if b == 0.0 {
                return Err(RuntimeError::ModuloByZero { line });
            }
            let remainder = a % b;
            if remainder != 0.0 && (remainder < 0.0) != (b < 0.0) {
                Ok(Value::Real(remainder + b))
            } else {
                Ok(Value::Real(remainder))
            }
        },
    }
}

/// Ordering comparisons accept two numbers or two strings.
fn compare(op: BinaryOperator, left: &Value, right: &Value, line: usize) -> EvalResult<Value> {
    let ordering = match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => match (left.as_f64(), right.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => {
                return Err(RuntimeError::TypeError { details: format!("cannot compare {} and {} with {op}",
                                                                      left.type_name(),
                                                                      right.type_name()),
                                                     line });
            },
        },
    };

    // Any comparison involving NaN is false.
    let result = ordering.is_some_and(|ordering| match op {
                                          BinaryOperator::Less => ordering == Ordering::Less,
                                          BinaryOperator::Greater => ordering == Ordering::Greater,
                                          BinaryOperator::LessEqual => ordering != Ordering::Greater,
                                          BinaryOperator::GreaterEqual => ordering != Ordering::Less,
                                          _ => false,
                                      });
    Ok(Value::Bool(result))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn eval(op: BinaryOperator, left: Value, right: Value) -> EvalResult<Value> {
        eval_binary(op, &left, &right, 1)
    }

    #[test]
    fn integer_arithmetic_stays_integral() {
        assert_eq!(eval(BinaryOperator::Add, 2.into(), 3.into()).unwrap(), Value::Integer(5));
        assert_eq!(eval(BinaryOperator::Mul, 4.into(), (-2).into()).unwrap(), Value::Integer(-8));
    }

    #[test]
    fn mixed_arithmetic_promotes_to_real() {
        assert_eq!(eval(BinaryOperator::Sub, 1.into(), 0.5.into()).unwrap(), Value::Real(0.5));
    }

    #[test]
    fn division_is_always_real() {
        assert_eq!(eval(BinaryOperator::Div, 10.into(), 2.into()).unwrap(), Value::Real(5.0));
        assert_eq!(eval(BinaryOperator::Div, 5.0.into(), 2.into()).unwrap(), Value::Real(2.5));
    }

    #[test]
    fn division_and_modulo_by_zero_fail() {
        assert!(matches!(eval(BinaryOperator::Div, 5.into(), 0.into()),
                         Err(RuntimeError::DivisionByZero { line: 1 })));
        assert!(matches!(eval(BinaryOperator::Div, 5.into(), 0.0.into()),
                         Err(RuntimeError::DivisionByZero { .. })));
        assert!(matches!(eval(BinaryOperator::Mod, 5.into(), 0.into()),
                         Err(RuntimeError::ModuloByZero { .. })));
        assert!(matches!(eval(BinaryOperator::Mod, 5.5.into(), 0.into()),
                         Err(RuntimeError::ModuloByZero { .. })));
    }

    #[test]
    fn modulo_is_floored() {
        assert_eq!(eval(BinaryOperator::Mod, (-7).into(), 3.into()).unwrap(), Value::Integer(2));
        assert_eq!(eval(BinaryOperator::Mod, 7.into(), (-3).into()).unwrap(), Value::Integer(-2));
        assert_eq!(eval(BinaryOperator::Mod, 10.into(), 3.into()).unwrap(), Value::Integer(1));
        assert_eq!(eval(BinaryOperator::Mod, (-5.5).into(), 2.into()).unwrap(), Value::Real(0.5));
    }

    #[test]
    fn overflow_is_reported() {
        assert!(matches!(eval(BinaryOperator::Add, i64::MAX.into(), 1.into()),
                         Err(RuntimeError::Overflow { .. })));
        assert!(matches!(eval(BinaryOperator::Mod, i64::MIN.into(), (-1).into()),
                         Err(RuntimeError::Overflow { .. })));
    }

    #[test]
    fn string_repetition_truncates_the_count() {
        assert_eq!(eval(BinaryOperator::Mul, "ab".into(), 2.9.into()).unwrap(), Value::from("abab"));
        assert_eq!(eval(BinaryOperator::Mul, 3.into(), "x".into()).unwrap(), Value::from("xxx"));
        assert_eq!(eval(BinaryOperator::Mul, "x".into(), (-1).into()).unwrap(), Value::from(""));
    }

    #[test]
    fn oversized_repetition_is_an_overflow() {
        assert!(matches!(eval(BinaryOperator::Mul, "ab".into(), 1_000_000_000_000_000_000_i64.into()),
                         Err(RuntimeError::Overflow { line: 1 })));
        assert!(matches!(eval(BinaryOperator::Mul, "x".into(), i64::MAX.into()),
                         Err(RuntimeError::Overflow { .. })));
        assert_eq!(eval(BinaryOperator::Mul, "".into(), i64::MAX.into()).unwrap(), Value::from(""));
    }

    #[test]
    fn concatenation_copies_its_operands() {
        let left = Value::from(vec![Value::Integer(1), Value::Integer(2)]);
        let right = Value::from(vec![Value::Integer(3), Value::Integer(4)]);
        let sum = eval(BinaryOperator::Add, left.clone(), right).unwrap();

        if let Value::Array(items) = &left {
            items.borrow_mut()[0] = Value::Integer(99);
        }

        assert_eq!(sum.to_string(), "[1, 2, 3, 4]");
        assert_eq!(left.to_string(), "[99, 2]");
    }

    #[test]
    fn concatenating_an_array_with_itself() {
        let inner = Value::from(vec![Value::Integer(1)]);
        let array = Value::from(vec![inner.clone()]);
        let sum = eval(BinaryOperator::Add, array.clone(), array).unwrap();

        if let Value::Array(items) = &inner {
            items.borrow_mut().push(Value::Integer(2));
        }

        assert_eq!(sum.to_string(), "[[1], [1]]");
        assert!(matches!(eval(BinaryOperator::Add, Value::from(Vec::new()), ObjectMap::new().into()),
                         Err(RuntimeError::TypeError { .. })));
    }

    #[test]
    fn object_merge_prefers_the_right_side() {
        let left: ObjectMap = [("a".to_string(), Value::Integer(1)), ("b".to_string(), Value::Integer(2))].into_iter()
                                                                                                       .collect();
        let right: ObjectMap = [("b".to_string(), Value::Integer(3))].into_iter().collect();
        let merged = eval(BinaryOperator::Add, left.into(), right.into()).unwrap();

        assert_eq!(merged.to_string(), r#"{"a": 1, "b": 3}"#);
    }

    #[test]
    fn mismatched_types_fail() {
        assert!(matches!(eval(BinaryOperator::Add, 1.into(), "1".into()),
                         Err(RuntimeError::TypeError { .. })));
        assert!(matches!(eval(BinaryOperator::Less, 1.into(), "1".into()),
                         Err(RuntimeError::TypeError { .. })));
        assert!(matches!(eval(BinaryOperator::Sub, "a".into(), "b".into()),
                         Err(RuntimeError::TypeError { .. })));
    }

    #[test]
    fn comparisons() {
        assert_eq!(eval(BinaryOperator::LessEqual, 2.into(), 2.0.into()).unwrap(), Value::Bool(true));
        assert_eq!(eval(BinaryOperator::Greater, "b".into(), "a".into()).unwrap(), Value::Bool(true));
        assert_eq!(eval(BinaryOperator::Less, f64::NAN.into(), 1.into()).unwrap(), Value::Bool(false));
        assert_eq!(eval(BinaryOperator::Equal, Value::Null, Value::Null).unwrap(), Value::Bool(true));
        assert_eq!(eval(BinaryOperator::NotEqual, 1.into(), "1".into()).unwrap(), Value::Bool(true));
    }
}
