use crate::{
    error::RuntimeError,
    interpreter::{evaluator::core::EvalResult, host::Output, value::core::Value},
    util::num::{f64_to_i64_truncated, i64_to_f64, usize_to_i64},
};

/// The host-provided functions reachable by name from every scope.
///
/// A builtin is only found when no scope in the chain binds the same name, so
/// scripts may shadow them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// `len(x)`: length of a string, array or object.
    Len,
    /// `str(x)`: the display form of any value.
    Str,
    /// `int(x)`: integer conversion.
    Int,
    /// `float(x)`: real conversion.
    Float,
    /// `print(args...)`: writes the arguments on one line.
    Print,
}

impl Builtin {
    /// Every builtin, in declaration order.
    pub const ALL: [Self; 5] = [Self::Len, Self::Str, Self::Int, Self::Float, Self::Print];

    /// Looks a builtin up by the name scripts call it with.
    ///
    /// # Example
    /// ```
    /// use quill::interpreter::value::builtin::Builtin;
    ///
    /// assert_eq!(Builtin::from_name("len"), Some(Builtin::Len));
    /// assert_eq!(Builtin::from_name("length"), None);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|builtin| builtin.name() == name)
    }

    /// The name scripts call the builtin with.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Len => "len",
            Self::Str => "str",
            Self::Int => "int",
            Self::Float => "float",
            Self::Print => "print",
        }
    }

    /// Applies the builtin to already evaluated arguments.
    ///
    /// The single-argument builtins look only at their first argument and
    /// return a neutral value (`0`, `""`, `0.0`) when called with none.
    ///
    /// # Errors
    /// - `TypeError` when the argument's type is not supported.
    /// - `InvalidArgument` when a string cannot be converted to a number.
    /// - `Overflow` when a real is too large for `int`.
    pub fn call(self, args: &[Value], output: &Output, line: usize) -> EvalResult<Value> {
        match self {
            Self::Print => {
                let text = args.iter()
                               .map(ToString::to_string)
                               .collect::<Vec<_>>()
                               .join(" ");
                output.write_line(&text);
                Ok(Value::Null)
            },
            Self::Len => args.first().map_or(Ok(Value::Integer(0)), |arg| len(arg, line)),
            Self::Str => Ok(args.first().map_or_else(|| Value::from(""), |arg| Value::from(arg.to_string()))),
            Self::Int => args.first().map_or(Ok(Value::Integer(0)), |arg| to_int(arg, line)),
            Self::Float => args.first().map_or(Ok(Value::Real(0.0)), |arg| to_float(arg, line)),
        }
    }
}

fn len(arg: &Value, line: usize) -> EvalResult<Value> {
    let len = match arg {
        Value::Str(s) => s.chars().count(),
        Value::Array(items) => items.borrow().len(),
        Value::Object(entries) => entries.borrow().len(),
        other => {
            return Err(RuntimeError::TypeError { details: format!("len() of a {}", other.type_name()),
                                                 line });
        },
    };
    Ok(Value::Integer(usize_to_i64(len)))
}

fn to_int(arg: &Value, line: usize) -> EvalResult<Value> {
    match arg {
        Value::Integer(n) => Ok(Value::Integer(*n)),
        Value::Real(r) => f64_to_i64_truncated(*r, line).map(Value::Integer),
        Value::Bool(b) => Ok(Value::Integer(i64::from(*b))),
        Value::Str(s) => s.trim()
                          .parse()
                          .map(Value::Integer)
                          .map_err(|_| RuntimeError::InvalidArgument { details: format!("int() cannot convert {:?}", &**s),
                                                                       line }),
        other => Err(RuntimeError::TypeError { details: format!("int() of a {}", other.type_name()),
                                               line }),
    }
}

fn to_float(arg: &Value, line: usize) -> EvalResult<Value> {
    match arg {
        Value::Integer(n) => Ok(Value::Real(i64_to_f64(*n))),
        Value::Real(r) => Ok(Value::Real(*r)),
        Value::Bool(b) => Ok(Value::Real(if *b { 1.0 } else { 0.0 })),
        Value::Str(s) => s.trim()
                          .parse()
                          .map(Value::Real)
                          .map_err(|_| RuntimeError::InvalidArgument { details: format!("float() cannot convert {:?}", &**s),
                                                                       line }),
        other => Err(RuntimeError::TypeError { details: format!("float() of a {}", other.type_name()),
                                               line }),
    }
}
