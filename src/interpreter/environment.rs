//! Lexical scopes for the evaluator.
//!
//! An [`Environment`] is a shared handle to one scope. Closures and active
//! calls hold handles to the scopes they need, and a scope lives as long as
//! its longest holder. Writes through one handle are visible through every
//! other handle to the same scope.

use std::{cell::RefCell, fmt, rc::Rc};

use rustc_hash::FxHashMap;

use crate::interpreter::value::core::Value;

/// A single scope: its own bindings and the scope it is nested in.
#[derive(Default)]
struct Scope {
    bindings: FxHashMap<String, Value>,
    parent:   Option<Environment>,
}

/// A reference-counted handle to a scope.
///
/// Cloning the handle does not copy the scope.
#[derive(Clone, Default)]
pub struct Environment(Rc<RefCell<Scope>>);

impl Environment {
    /// Creates an empty top-level scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty scope nested inside `self`.
    #[must_use]
    pub fn child(&self) -> Self {
        Self(Rc::new(RefCell::new(Scope { bindings: FxHashMap::default(),
                                          parent:   Some(self.clone()), })))
    }

    /// The enclosing scope, if any.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.0.borrow().parent.clone()
    }

    /// Binds `name` in this scope, replacing any previous local binding.
    /// Bindings of the same name in enclosing scopes are left untouched.
    pub fn define(&self, name: &str, value: Value) {
        let mut scope = self.0.borrow_mut();
        if let Some(slot) = scope.bindings.get_mut(name) {
            *slot = value;
        } else {
            scope.bindings.insert(name.to_string(), value);
        }
    }

    /// Looks `name` up in this scope, then in each enclosing scope outward.
    ///
    /// # Example
    /// ```
    /// use quill::interpreter::{environment::Environment, value::core::Value};
    ///
    /// let global = Environment::new();
    /// global.define("x", Value::Integer(1));
    /// let local = global.child();
    ///
    /// assert_eq!(local.lookup("x"), Some(Value::Integer(1)));
    /// assert_eq!(local.lookup("y"), None);
    /// ```
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let mut current = self.clone();
        loop {
            let parent = {
                let scope = current.0.borrow();
                if let Some(value) = scope.bindings.get(name) {
                    return Some(value.clone());
                }
                scope.parent.clone()
            };
            current = parent?;
        }
    }

    /// Whether `name` is bound in this scope itself.
    #[must_use]
    pub fn has_local(&self, name: &str) -> bool {
        self.0.borrow().bindings.contains_key(name)
    }

    /// Finds the nearest enclosing scope (not `self`) that already binds
    /// `name`.
    #[must_use]
    pub fn find_enclosing(&self, name: &str) -> Option<Self> {
        let mut current = self.parent()?;
        loop {
            if current.has_local(name) {
                return Some(current);
            }
            current = current.parent()?;
        }
    }

    /// Rebinds `name` in the nearest enclosing scope that already binds it.
    ///
    /// This is what an `extern` assignment does. The search skips `self`, so
    /// a local binding of the same name is never the one updated.
    ///
    /// # Returns
    /// `false` if no enclosing scope binds `name`; nothing is changed then.
    pub fn assign_enclosing(&self, name: &str, value: Value) -> bool {
        match self.find_enclosing(name) {
            Some(scope) => {
                scope.define(name, value);
                true
            },
            None => false,
        }
    }

    /// Whether both handles refer to the same scope.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Names bound in this scope itself, sorted.
    #[must_use]
    pub fn local_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.0.borrow().bindings.keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Environment {
    // Bindings may hold closures that point back at this scope.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
         .field("names", &self.local_names())
         .field("has_parent", &self.0.borrow().parent.is_some())
         .finish()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn define_shadows_without_touching_parent() {
        let global = Environment::new();
        global.define("x", Value::Integer(1));
        let local = global.child();
        local.define("x", Value::Integer(2));

        assert_eq!(local.lookup("x"), Some(Value::Integer(2)));
        assert_eq!(global.lookup("x"), Some(Value::Integer(1)));
    }

    #[test]
    fn assign_enclosing_skips_the_current_scope() {
        let global = Environment::new();
        global.define("x", Value::Integer(1));
        let local = global.child();
        local.define("x", Value::Integer(10));

        assert!(local.assign_enclosing("x", Value::Integer(5)));
        assert_eq!(global.lookup("x"), Some(Value::Integer(5)));
        assert_eq!(local.lookup("x"), Some(Value::Integer(10)));
    }

    #[test]
    fn assign_enclosing_finds_the_nearest_binding() {
        let global = Environment::new();
        global.define("x", Value::Integer(1));
        let middle = global.child();
        middle.define("x", Value::Integer(2));
        let inner = middle.child();

        assert!(inner.assign_enclosing("x", Value::Integer(3)));
        assert_eq!(middle.lookup("x"), Some(Value::Integer(3)));
        assert_eq!(global.lookup("x"), Some(Value::Integer(1)));
    }

    #[test]
    fn assign_enclosing_fails_without_a_binding() {
        let global = Environment::new();
        let local = global.child();
        local.define("x", Value::Integer(1));

        assert!(!local.assign_enclosing("x", Value::Integer(2)));
        assert!(!global.assign_enclosing("x", Value::Integer(2)));
        assert!(!global.has_local("x"));
    }

    #[test]
    fn handles_share_one_scope() {
        let scope = Environment::new();
        let alias = scope.clone();
        alias.define("n", Value::Integer(7));

        assert!(scope.ptr_eq(&alias));
        assert_eq!(scope.lookup("n"), Some(Value::Integer(7)));
        assert_eq!(scope.local_names(), vec!["n".to_string()]);
    }
}
