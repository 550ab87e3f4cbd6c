use std::{cell::RefCell, fmt, rc::Rc};

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    ast::{FunctionDef, LiteralValue},
    interpreter::{environment::Environment, value::builtin::Builtin},
    util::{ensure_sufficient_stack, num::i64_to_f64},
};

/// The insertion-ordered mapping behind an object value.
pub type ObjectMap = IndexMap<String, Value>;

/// Represents a runtime value in the interpreter.
///
/// Arrays and objects are shared, mutable containers: cloning a `Value`
/// clones the handle, so every holder sees later element writes. `+` on two
/// containers is the only operation that produces an independent copy (see
/// [`Value::deep_copy`]).
#[derive(Debug, Clone)]
pub enum Value {
    /// The absence of a value.
    Null,
    /// A boolean value (`true` or `false`).
    Bool(bool),
    /// A 64-bit signed integer.
    Integer(i64),
    /// A double precision floating-point number.
    Real(f64),
    /// An immutable string.
    Str(Rc<str>),
    /// An ordered, mutable, 0-indexed sequence.
    Array(Rc<RefCell<Vec<Self>>>),
    /// A string-keyed mutable mapping that remembers insertion order.
    Object(Rc<RefCell<ObjectMap>>),
    /// A user function together with the scope it was created in.
    Function(Rc<Closure>),
    /// One of the host-provided functions.
    Builtin(Builtin),
}

/// A function value: parameters and body plus the captured environment.
///
/// The environment is held by reference, so a closure observes (and makes)
/// later changes to the scope it was created in.
pub struct Closure {
    /// Parameters and body shared with the function literal.
    pub def: Rc<FunctionDef>,
    /// The scope that was current when the literal was evaluated.
    pub env: Environment,
}

impl fmt::Debug for Closure {
    // The captured scope may contain this very closure.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
         .field("params", &self.def.params)
         .finish_non_exhaustive()
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(Rc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(Rc::from(v))
    }
}

impl From<Vec<Self>> for Value {
    fn from(v: Vec<Self>) -> Self {
        Self::Array(Rc::new(RefCell::new(v)))
    }
}

impl From<ObjectMap> for Value {
    fn from(v: ObjectMap) -> Self {
        Self::Object(Rc::new(RefCell::new(v)))
    }
}

impl From<&LiteralValue> for Value {
    fn from(literal: &LiteralValue) -> Self {
        match literal {
            LiteralValue::Integer(n) => Self::Integer(*n),
            LiteralValue::Real(r) => Self::Real(*r),
            LiteralValue::Str(s) => Self::from(s.as_str()),
            LiteralValue::Bool(b) => Self::Bool(*b),
            LiteralValue::Null => Self::Null,
        }
    }
}

impl Value {
    /// The name of the value's type as used in error messages.
    ///
    /// Integers and reals are both `number`.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Integer(_) | Self::Real(_) => "number",
            Self::Str(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Function(_) => "function",
            Self::Builtin(_) => "builtin",
        }
    }

    /// Converts the value to a boolean for conditional contexts.
    ///
    /// `null` is false, booleans are themselves, numbers are true when
    /// nonzero, strings, arrays and objects are true when nonempty, and
    /// functions are always true.
    ///
    /// # Example
    /// ```
    /// use quill::interpreter::value::core::Value;
    ///
    /// assert!(!Value::Null.is_truthy());
    /// assert!(!Value::Integer(0).is_truthy());
    /// assert!(Value::from("a").is_truthy());
    /// assert!(!Value::from(Vec::new()).is_truthy());
    /// ```
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Integer(n) => *n != 0,
            Self::Real(r) => *r != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::Array(items) => !items.borrow().is_empty(),
            Self::Object(entries) => !entries.borrow().is_empty(),
            Self::Function(_) | Self::Builtin(_) => true,
        }
    }

    /// Whether the value is an integer or a real.
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Real(_))
    }

    /// Returns the numeric value as an `f64`, or `None` for non-numbers.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(i64_to_f64(*n)),
            Self::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// Produces a structurally independent copy.
    ///
    /// Arrays and objects are copied recursively so that mutating either the
    /// copy or the original never affects the other. Sharing inside the value
    /// is preserved: a container reachable twice is copied once, which also
    /// makes self-referencing containers safe to copy. Scalars, functions and
    /// builtins are returned as is.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        self.deep_copy_with(&mut FxHashMap::default())
    }

    fn deep_copy_with(&self, copies: &mut FxHashMap<*const (), Self>) -> Self {
        ensure_sufficient_stack(|| match self {
            Self::Array(items) => {
                let key = Rc::as_ptr(items).cast::<()>();
                if let Some(copy) = copies.get(&key) {
                    return copy.clone();
                }
                let copy = Self::from(Vec::new());
                copies.insert(key, copy.clone());
                let elements: Vec<Self> = items.borrow()
                                               .iter()
                                               .map(|item| item.deep_copy_with(copies))
                                               .collect();
                if let Self::Array(target) = &copy {
                    *target.borrow_mut() = elements;
                }
                copy
            },
            Self::Object(entries) => {
                let key = Rc::as_ptr(entries).cast::<()>();
                if let Some(copy) = copies.get(&key) {
                    return copy.clone();
                }
                let copy = Self::from(ObjectMap::new());
                copies.insert(key, copy.clone());
                let map: ObjectMap = entries.borrow()
                                            .iter()
                                            .map(|(k, v)| (k.clone(), v.deep_copy_with(copies)))
                                            .collect();
                if let Self::Object(target) = &copy {
                    *target.borrow_mut() = map;
                }
                copy
            },
            other => other.clone(),
        })
    }

    /// Writes the value the way it appears inside a container: strings are
    /// quoted, everything else is rendered as by `Display`.
    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>, seen: &mut FxHashSet<*const ()>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{:?}", &**s),
            other => other.fmt_with(f, seen),
        }
    }

    fn fmt_with(&self, f: &mut fmt::Formatter<'_>, seen: &mut FxHashSet<*const ()>) -> fmt::Result {
        ensure_sufficient_stack(|| match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Real(r) => write!(f, "{r:?}"),
            Self::Str(s) => write!(f, "{s}"),
            Self::Array(items) => {
                let key = Rc::as_ptr(items).cast::<()>();
                if !seen.insert(key) {
                    return write!(f, "[...]");
                }
                write!(f, "[")?;
                for (index, item) in items.borrow().iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    item.fmt_nested(f, seen)?;
                }
                seen.remove(&key);
                write!(f, "]")
            },
            Self::Object(entries) => {
                let key = Rc::as_ptr(entries).cast::<()>();
                if !seen.insert(key) {
                    return write!(f, "{{...}}");
                }
                write!(f, "{{")?;
                for (index, (name, value)) in entries.borrow().iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name:?}: ")?;
                    value.fmt_nested(f, seen)?;
                }
                seen.remove(&key);
                write!(f, "}}")
            },
            Self::Function(closure) => write!(f, "<function({})>", closure.def.params.join(", ")),
            Self::Builtin(builtin) => write!(f, "<builtin {}>", builtin.name()),
        })
    }

    /// The value as it appears inside a container, with strings quoted.
    ///
    /// # Example
    /// ```
    /// use quill::interpreter::value::core::Value;
    ///
    /// assert_eq!(Value::from("hi").repr(), "\"hi\"");
    /// assert_eq!(Value::Real(2.0).repr(), "2.0");
    /// ```
    #[must_use]
    pub fn repr(&self) -> String {
        struct Repr<'a>(&'a Value);

        impl fmt::Display for Repr<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt_nested(f, &mut FxHashSet::default())
            }
        }

        Repr(self).to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_with(f, &mut FxHashSet::default())
    }
}

/// Structural equality with no coercion between types, except that integers
/// and reals compare by numeric value. Functions are equal only to
/// themselves.
///
/// A pair of containers met again while it is still being compared is taken
/// as equal, so comparing self-referencing containers terminates.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equal_with(other, &mut FxHashSet::default())
    }
}

impl Value {
    fn equal_with(&self, other: &Self, pairs: &mut FxHashSet<(*const (), *const ())>) -> bool {
        ensure_sufficient_stack(|| match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Real(a), Self::Real(b)) => a == b,
            (Self::Integer(a), Self::Real(b)) | (Self::Real(b), Self::Integer(a)) => {
                i64_to_f64(*a) == *b
            },
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => {
                if Rc::ptr_eq(a, b) || !pairs.insert((Rc::as_ptr(a).cast(), Rc::as_ptr(b).cast())) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                if a.len() != b.len() {
                    return false;
                }
                for (x, y) in a.iter().zip(b.iter()) {
                    if !x.equal_with(y, pairs) {
                        return false;
                    }
                }
                true
            },
            (Self::Object(a), Self::Object(b)) => {
                if Rc::ptr_eq(a, b) || !pairs.insert((Rc::as_ptr(a).cast(), Rc::as_ptr(b).cast())) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                if a.len() != b.len() {
                    return false;
                }
                for (key, x) in &*a {
                    match b.get(key) {
                        Some(y) if x.equal_with(y, pairs) => {},
                        _ => return false,
                    }
                }
                true
            },
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Builtin(a), Self::Builtin(b)) => a == b,
            _ => false,
        })
    }

    /// Moves the elements out of a container nobody else holds.
    fn release_children(&self, pending: &mut Vec<Self>) {
        match self {
            Self::Array(items) if Rc::strong_count(items) == 1 => {
                if let Ok(mut items) = items.try_borrow_mut() {
                    pending.append(&mut items);
                }
            },
            Self::Object(entries) if Rc::strong_count(entries) == 1 => {
                if let Ok(mut entries) = entries.try_borrow_mut() {
                    pending.extend(entries.drain(..).map(|(_, value)| value));
                }
            },
            _ => {},
        }
    }
}

/// Releases nested containers from a worklist instead of recursing once per
/// level of nesting.
impl Drop for Value {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.release_children(&mut pending);
        while let Some(value) = pending.pop() {
            value.release_children(&mut pending);
        }
    }
}
