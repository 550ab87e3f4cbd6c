use std::rc::Rc;

use crate::{
    ast::{AssignTarget, Expr, LogicalOperator},
    error::RuntimeError,
    interpreter::{
        environment::Environment,
        evaluator::{
            binary::eval_binary,
            core::{Completion, EvalResult, Interpreter},
            utils::{object_key, read_index, write_index},
        },
        value::{
            builtin::Builtin,
            core::{Closure, ObjectMap, Value},
        },
    },
};

impl Interpreter {
    /// Evaluates one expression node. Sub-expressions go back through
    /// [`Interpreter::eval_expr`] so instruments see every node.
    pub(crate) fn dispatch_expr(&mut self, expr: &Expr, env: &Environment) -> EvalResult<Completion> {
        let value = match expr {
            Expr::Literal { value, .. } => Value::from(value),
            Expr::Identifier { name, line } => Self::lookup(name, env, *line)?,
            Expr::List { items, .. } => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(propagate!(self.eval_expr(item, env)));
                }
                Value::from(values)
            },
            Expr::Object { entries, line } => {
                let mut map = ObjectMap::with_capacity(entries.len());
                for (key, value) in entries {
                    let key = propagate!(self.eval_expr(key, env));
                    let key = object_key(&key, *line)?;
                    let value = propagate!(self.eval_expr(value, env));
                    map.insert(key.to_string(), value);
                }
                Value::from(map)
            },
            Expr::Unary { op, expr, line } => {
                let operand = propagate!(self.eval_expr(expr, env));
                Self::eval_unary(*op, &operand, *line)?
            },
            Expr::Binary { left, op, right, line } => {
                let left = propagate!(self.eval_expr(left, env));
                let right = propagate!(self.eval_expr(right, env));
                eval_binary(*op, &left, &right, *line)?
            },
            Expr::Logical { left, op, right, .. } => {
                let left = propagate!(self.eval_expr(left, env));
                let decided = match op {
                    LogicalOperator::And => !left.is_truthy(),
                    LogicalOperator::Or => left.is_truthy(),
                };
                if decided {
                    left
                } else {
                    let right = propagate!(self.eval_expr(right, env));
                    Value::Bool(right.is_truthy())
                }
            },
            Expr::Index { base, index, line } => {
                let base = propagate!(self.eval_expr(base, env));
                let index = propagate!(self.eval_expr(index, env));
                read_index(&base, &index, *line)?
            },
            Expr::Assign { target, value, line } => {
                let value = propagate!(self.eval_expr(value, env));
                match target {
                    AssignTarget::Variable { name, is_extern: true } => {
                        if !env.assign_enclosing(name, value.clone()) {
                            return Err(RuntimeError::ExternNotFound { name: name.clone(),
                                                                      line: *line });
                        }
                    },
                    AssignTarget::Variable { name, is_extern: false } => env.define(name, value.clone()),
                    AssignTarget::Index { base, index } => {
                        let base = propagate!(self.eval_expr(base, env));
                        let index = propagate!(self.eval_expr(index, env));
                        write_index(&base, &index, value.clone(), *line)?;
                    },
                }
                value
            },
            Expr::Function { def, .. } => Value::Function(Rc::new(Closure { def: Rc::clone(def),
                                                                            env: env.clone() })),
            Expr::Call { callee, arguments, line } => return self.eval_call(callee, arguments, env, *line),
        };
        Ok(Completion::normal(value))
    }

    /// Resolves a name through the scope chain, then among the builtins.
    fn lookup(name: &str, env: &Environment, line: usize) -> EvalResult<Value> {
        env.lookup(name)
           .or_else(|| Builtin::from_name(name).map(Value::Builtin))
           .ok_or_else(|| RuntimeError::UnknownIdentifier { name: name.to_string(),
                                                            line })
    }
}
