use std::rc::Rc;

use crate::{
    error::RuntimeError,
    interpreter::{evaluator::core::EvalResult, value::core::Value},
    util::num::{checked_index, f64_to_i64_truncated},
};

/// Reads `base[index]`.
///
/// A numeric index (reals are truncated) selects an array element and must be
/// in `[0, len)`. A string index selects an object entry that must exist.
///
/// # Errors
/// - `TypeError` when the index is neither a number nor a string, or does not
///   fit the base.
/// - `IndexOutOfBounds` and `MissingKey` as described above.
pub fn read_index(base: &Value, index: &Value, line: usize) -> EvalResult<Value> {
    match index {
        Value::Integer(_) | Value::Real(_) => {
            let Value::Array(items) = base else {
                return Err(RuntimeError::TypeError { details: format!("cannot index a {} with a number",
                                                                      base.type_name()),
                                                     line });
            };
            let items = items.borrow();
            let position = array_position(index, items.len(), line)?;
            Ok(items[position].clone())
        },
        Value::Str(key) => {
            let Value::Object(entries) = base else {
                return Err(RuntimeError::TypeError { details: format!("cannot index a {} with a string",
                                                                      base.type_name()),
                                                     line });
            };
            entries.borrow()
                   .get(&**key)
                   .cloned()
                   .ok_or_else(|| RuntimeError::MissingKey { key: key.to_string(),
                                                             line })
        },
        other => Err(RuntimeError::TypeError { details: format!("cannot index with a {}", other.type_name()),
                                               line }),
    }
}

/// Performs `base[index] = value`.
///
/// Array writes must hit an existing element; object writes may add a key.
///
/// # Errors
/// - `TypeError` when the base is not a container or the index type does not
///   fit it.
/// - `IndexOutOfBounds` for an array index outside `[0, len)`.
pub fn write_index(base: &Value, index: &Value, value: Value, line: usize) -> EvalResult<()> {
    match base {
        Value::Array(items) => {
            let mut items = items.borrow_mut();
            let position = array_position(index, items.len(), line)?;
            items[position] = value;
            Ok(())
        },
        Value::Object(entries) => {
            let Value::Str(key) = index else {
                return Err(RuntimeError::TypeError { details: format!("object key must be a string, found {}",
                                                                      index.type_name()),
                                                     line });
            };
            entries.borrow_mut().insert(key.to_string(), value);
            Ok(())
        },
        other => Err(RuntimeError::TypeError { details: format!("cannot assign into a {}", other.type_name()),
                                               line }),
    }
}

fn array_position(index: &Value, len: usize, line: usize) -> EvalResult<usize> {
    let index = match index {
        Value::Integer(n) => *n,
        Value::Real(r) => f64_to_i64_truncated(*r, line)?,
        other => {
            return Err(RuntimeError::TypeError { details: format!("array index must be a number, found {}",
                                                                  other.type_name()),
                                                 line });
        },
    };
    checked_index(index, len).ok_or(RuntimeError::IndexOutOfBounds { index,
                                                                      len,
                                                                      line })
}

/// Converts an evaluated object key, which must be a string.
///
/// # Errors
/// `TypeError` for any other type.
pub fn object_key(key: &Value, line: usize) -> EvalResult<Rc<str>> {
    match key {
        Value::Str(s) => Ok(Rc::clone(s)),
        other => Err(RuntimeError::TypeError { details: format!("object key must be a string, found {}",
                                                                other.type_name()),
                                               line }),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::interpreter::value::core::ObjectMap;

    fn array() -> Value {
        Value::from(vec![Value::Integer(10), Value::Integer(20), Value::Integer(30)])
    }

    #[test]
    fn reads_in_bounds_and_truncates_reals() {
        assert_eq!(read_index(&array(), &Value::Integer(2), 1).unwrap(), Value::Integer(30));
        assert_eq!(read_index(&array(), &Value::Real(1.9), 1).unwrap(), Value::Integer(20));
    }

    #[test]
    fn rejects_out_of_range_indices() {
        assert!(matches!(read_index(&array(), &Value::Integer(3), 1),
                         Err(RuntimeError::IndexOutOfBounds { index: 3, len: 3, .. })));
        assert!(matches!(read_index(&array(), &Value::Integer(-1), 1),
                         Err(RuntimeError::IndexOutOfBounds { index: -1, .. })));
        assert!(matches!(write_index(&array(), &Value::Integer(3), Value::Null, 1),
                         Err(RuntimeError::IndexOutOfBounds { .. })));
    }

    #[test]
    fn string_keys_need_objects() {
        assert!(matches!(read_index(&array(), &Value::from("a"), 4),
                         Err(RuntimeError::TypeError { line: 4, .. })));
        let object = Value::from(ObjectMap::new());
        assert!(matches!(read_index(&object, &Value::from("a"), 4),
                         Err(RuntimeError::MissingKey { .. })));
    }

    #[test]
    fn object_writes_add_keys() {
        let object = Value::from(ObjectMap::new());
        write_index(&object, &Value::from("k"), Value::Integer(1), 1).unwrap();
        assert_eq!(read_index(&object, &Value::from("k"), 1).unwrap(), Value::Integer(1));
        assert!(matches!(write_index(&object, &Value::Integer(0), Value::Null, 1),
                         Err(RuntimeError::TypeError { .. })));
    }

    #[test]
    fn boolean_index_is_rejected() {
        assert!(matches!(read_index(&array(), &Value::Bool(true), 1),
                         Err(RuntimeError::TypeError { .. })));
    }
}
