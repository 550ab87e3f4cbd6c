use rustc_hash::FxHashSet;

use crate::{
    ast::{AssignTarget, Expr},
    error::RuntimeError,
    interpreter::{
        environment::Environment,
        evaluator::core::{Completion, Signal},
        host::Output,
        instrument::{Instrument, NodeRef},
    },
};

/// A watched assignment that has been entered but not yet exited.
struct Pending {
    name:    String,
    /// The scope a variable assignment binds in. `None` for element writes,
    /// which never create a binding.
    scope:   Option<Environment>,
    /// Cleared when another assignment binds `name` in `scope` before this
    /// one completes.
    created: bool,
}

/// Writes a line to its output for every assignment to a watched name.
///
/// Both plain assignments (`x = 1`) and element writes (`x[0] = 1`,
/// `x.field = 1`) count. The line reads
/// `[watch] x created: 1 @ line 3`, where `created` becomes `modified` when
/// the name was already bound in the scope being written by the time the
/// write happened.
pub struct Watch {
    names:   FxHashSet<String>,
    output:  Output,
    pending: Vec<Option<Pending>>,
}

impl Watch {
    /// Watches `names`, reporting to `output`.
    pub fn new(names: impl IntoIterator<Item = String>, output: Output) -> Self {
        Self { names: names.into_iter().collect(),
               output,
               pending: Vec::new() }
    }

    fn watched_target(&self, expr: &Expr, env: &Environment) -> Option<Pending> {
        let Expr::Assign { target, .. } = expr else {
            return None;
        };
        let (name, scope, created) = match target {
            AssignTarget::Variable { name, is_extern: true } => (name, env.find_enclosing(name), false),
            AssignTarget::Variable { name, is_extern: false } => (name, Some(env.clone()), !env.has_local(name)),
            AssignTarget::Index { base, .. } => match base.as_ref() {
                Expr::Identifier { name, .. } => (name, None, false),
                _ => return None,
            },
        };
        self.names.contains(name).then(|| Pending { name: name.clone(),
                                                    scope,
                                                    created })
    }

    /// Marks the outer pending assignments to `name` in `scope` as no longer
    /// creating the binding.
    fn bound(&mut self, name: &str, scope: &Environment) {
        for pending in self.pending.iter_mut().flatten() {
            if pending.name == name && pending.scope.as_ref().is_some_and(|s| s.ptr_eq(scope)) {
                pending.created = false;
            }
        }
    }
}

impl Instrument for Watch {
    fn enter(&mut self, node: NodeRef<'_>, env: &Environment) {
        let pending = match node {
            NodeRef::Expr(expr) => self.watched_target(expr, env),
            NodeRef::Statement(_) => None,
        };
        self.pending.push(pending);
    }

    fn exit(&mut self, node: NodeRef<'_>, _env: &Environment, result: Result<&Completion, &RuntimeError>) {
        let Some(Some(pending)) = self.pending.pop() else {
            return;
        };
        let Ok(completion) = result else {
            return;
        };
        if completion.signal != Signal::None {
            return;
        }
        if let Some(scope) = &pending.scope {
            self.bound(&pending.name, scope);
        }
        let action = if pending.created { "created" } else { "modified" };
        self.output.write_line(&format!("[watch] {} {action}: {} @ line {}",
                                        pending.name,
                                        completion.value.repr(),
                                        node.line()));
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::interpreter::evaluator::core::Interpreter;

    fn watch(source: &str, names: &[&str]) -> String {
        let output = Output::buffer();
        let watch = Watch::new(names.iter().map(ToString::to_string), output.clone());
        let mut interpreter = Interpreter::new().with_output(Output::buffer())
                                                .with_instrument(Box::new(watch));
        interpreter.run(source, &Environment::new()).unwrap();
        output.contents()
    }

    #[test]
    fn reports_creation_then_modification() {
        assert_eq!(watch("x = 1;\nx = \"two\";\ny = 3;", &["x"]),
                   "[watch] x created: 1 @ line 1\n[watch] x modified: \"two\" @ line 2\n");
    }

    #[test]
    fn reports_element_writes_on_the_base_name() {
        assert_eq!(watch("a = [1, 2];\na[0] = 5;\nb = a;", &["a"])
                       .lines()
                       .collect::<Vec<_>>(),
                   vec!["[watch] a created: [1, 2] @ line 1", "[watch] a modified: 5 @ line 2"]);
    }

    #[test]
    fn local_binding_in_a_call_counts_as_created() {
        let out = watch("n = 0;\nfunction f() { n = 1; extern n = 2 }\nf();", &["n"]);
        assert_eq!(out.lines().collect::<Vec<_>>(),
                   vec!["[watch] n created: 0 @ line 1",
                        "[watch] n created: 1 @ line 2",
                        "[watch] n modified: 2 @ line 2"]);
    }

    #[test]
    fn creation_is_decided_when_the_write_happens() {
        assert_eq!(watch("x = (x = 1) + 1;", &["x"]).lines().collect::<Vec<_>>(),
                   vec!["[watch] x created: 1 @ line 1", "[watch] x modified: 2 @ line 1"]);
    }

    #[test]
    fn bindings_in_other_scopes_do_not_count() {
        let out = watch("function f() { n = 5; return 1 }\nn = f();", &["n"]);
        assert_eq!(out.lines().collect::<Vec<_>>(),
                   vec!["[watch] n created: 5 @ line 1", "[watch] n created: 1 @ line 2"]);
    }

    #[test]
    fn element_writes_from_a_call_are_modifications() {
        let out = watch("a = [0];
function f() { a[0] = 1 }
f();", &["a"]);
        assert_eq!(out.lines().collect::<Vec<_>>(),
                   vec!["[watch] a created: [0] @ line 1", "[watch] a modified: 1 @ line 2"]);
    }
}
