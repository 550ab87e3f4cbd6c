use crate::{error::RuntimeError, interpreter::evaluator::core::EvalResult};

/// Converts an `i64` to `f64` for mixed integer/real arithmetic.
///
/// Values beyond `2^53` lose precision, exactly as they would in any
/// language that promotes integers to doubles.
///
/// ## Example
/// ```
/// use quill::util::num::i64_to_f64;
///
/// assert_eq!(i64_to_f64(-3), -3.0);
/// ```
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub const fn i64_to_f64(value: i64) -> f64 {
    value as f64
}

/// Truncates an `f64` toward zero and converts it to `i64`.
///
/// This is the conversion used when a real is used as an array index, as a
/// repetition count, or passed to `int`.
///
/// ## Errors
/// - `RuntimeError::TypeError` if the value is NaN or infinite.
/// - `RuntimeError::Overflow` if the truncated value does not fit in an `i64`.
///
/// ## Example
/// ```
/// use quill::{error::RuntimeError, util::num::f64_to_i64_truncated};
///
/// assert_eq!(f64_to_i64_truncated(2.9, 1).unwrap(), 2);
/// assert_eq!(f64_to_i64_truncated(-2.9, 1).unwrap(), -2);
///
/// let err = f64_to_i64_truncated(1e300, 7).unwrap_err();
/// assert!(matches!(err, RuntimeError::Overflow { line: 7 }));
/// ```
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_precision_loss)]
pub fn f64_to_i64_truncated(value: f64, line: usize) -> EvalResult<i64> {
    if !value.is_finite() {
        return Err(RuntimeError::TypeError { details: format!("Cannot convert non-finite value {value:?} to an integer"),
                                             line });
    }
    let truncated = value.trunc();
    // `i64::MAX as f64` rounds up to 2^63, which is itself out of range.
    if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return Err(RuntimeError::Overflow { line });
    }
    Ok(truncated as i64)
}

/// Converts a container length to `i64`, saturating at `i64::MAX`.
#[must_use]
pub fn usize_to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Checks an integer index against a container length.
///
/// Negative indices are never valid; there is no counting from the end.
///
/// ## Example
/// ```
/// use quill::util::num::checked_index;
///
/// assert_eq!(checked_index(2, 3), Some(2));
/// assert_eq!(checked_index(3, 3), None);
/// assert_eq!(checked_index(-1, 3), None);
/// ```
#[must_use]
pub fn checked_index(index: i64, len: usize) -> Option<usize> {
    usize::try_from(index).ok().filter(|i| *i < len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_rejects_non_finite() {
        assert!(matches!(f64_to_i64_truncated(f64::NAN, 3),
                         Err(RuntimeError::TypeError { line: 3, .. })));
        assert!(matches!(f64_to_i64_truncated(f64::NEG_INFINITY, 3),
                         Err(RuntimeError::TypeError { line: 3, .. })));
    }

    #[test]
    fn truncation_goes_toward_zero() {
        assert_eq!(f64_to_i64_truncated(0.99, 1).unwrap(), 0);
        assert_eq!(f64_to_i64_truncated(-0.99, 1).unwrap(), 0);
        assert_eq!(f64_to_i64_truncated(1e15, 1).unwrap(), 1_000_000_000_000_000);
    }

    #[test]
    fn index_bounds() {
        assert_eq!(checked_index(0, 0), None);
        assert_eq!(checked_index(0, 1), Some(0));
        assert_eq!(checked_index(i64::MIN, 10), None);
    }
}
