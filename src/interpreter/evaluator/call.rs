use tracing::{trace, warn};

use crate::{
    ast::Expr,
    error::RuntimeError,
    interpreter::{
        environment::Environment,
        evaluator::core::{Completion, EvalResult, Interpreter, Signal},
        value::core::{Closure, Value},
    },
};

impl Interpreter {
    /// Evaluates a call: the callee first, then the arguments left to right.
    pub(crate) fn eval_call(&mut self,
                            callee: &Expr,
                            arguments: &[Expr],
                            env: &Environment,
                            line: usize)
                            -> EvalResult<Completion> {
        let function = propagate!(self.eval_expr(callee, env));
        let mut args = Vec::with_capacity(arguments.len());
        for argument in arguments {
            args.push(propagate!(self.eval_expr(argument, env)));
        }

        match &function {
            Value::Builtin(builtin) => Ok(Completion::normal(builtin.call(&args, &self.output, line)?)),
            Value::Function(closure) => {
                let name = match callee {
                    Expr::Identifier { name, .. } => name.as_str(),
                    _ => "<anonymous>",
                };
                self.call_closure(closure, args, name, line)
            },
            other => Err(RuntimeError::NotCallable { type_name: other.type_name(),
                                                     line }),
        }
    }

    /// Runs a user function in a fresh scope whose parent is the scope the
    /// function was created in.
    ///
    /// Parameters are bound positionally: missing arguments become `null` and
    /// surplus ones are dropped. A `return` becomes the call's value, falling
    /// off the end yields `null`, and any other signal keeps unwinding.
    ///
    /// # Errors
    /// - `StackOverflow` when the call would exceed the call depth limit.
    /// - Any runtime error raised by the body.
    pub fn call_closure(&mut self,
                        closure: &Closure,
                        args: Vec<Value>,
                        name: &str,
                        line: usize)
                        -> EvalResult<Completion> {
        if self.depth >= self.max_call_depth {
            warn!(function = name, limit = self.max_call_depth, line, "call depth limit reached");
            return Err(RuntimeError::StackOverflow { limit: self.max_call_depth,
                                                     line });
        }
        trace!(function = name, arity = args.len(), depth = self.depth, "call");

        let scope = closure.env.child();
        let mut args = args.into_iter();
        for param in &closure.def.params {
            scope.define(param, args.next().unwrap_or(Value::Null));
        }

        self.depth += 1;
        let result = self.eval_block(&closure.def.body, &scope);
        self.depth -= 1;

        let completion = result?;
        Ok(match completion.signal {
            Signal::Return => Completion::normal(completion.value),
            Signal::None => Completion::normal(Value::Null),
            _ => completion,
        })
    }
}
