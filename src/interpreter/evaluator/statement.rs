use tracing::{debug, warn};

use crate::{
    ast::{Block, Expr, Statement},
    error::{ImportError, RuntimeError},
    interpreter::{
        environment::Environment,
        evaluator::core::{Completion, EvalResult, Interpreter, Signal},
        lexer::scan,
        parser::core::parse,
        value::core::Value,
    },
};

impl Interpreter {
    /// Evaluates one statement node.
    pub(crate) fn dispatch_statement(&mut self, statement: &Statement, env: &Environment) -> EvalResult<Completion> {
        match statement {
            Statement::Expression { expr, .. } => self.eval_expr(expr, env),
            Statement::If { condition,
                            then_branch,
                            else_branch,
                            .. } => {
                let condition = propagate!(self.eval_expr(condition, env));
                if condition.is_truthy() {
                    self.eval_block(then_branch, env)
                } else if let Some(else_branch) = else_branch {
                    self.eval_block(else_branch, env)
                } else {
                    Ok(Completion::normal(Value::Null))
                }
            },
            Statement::While { condition, body, .. } => self.eval_while(condition, body, env),
            Statement::Print { value, .. } => {
                let value = match value {
                    Some(expr) => propagate!(self.eval_expr(expr, env)),
                    None => {
                        self.output.write_line("");
                        return Ok(Completion::normal(Value::Null));
                    },
                };
                self.output.write_line(&value.to_string());
                Ok(Completion::normal(value))
            },
            Statement::Return { value, .. } => {
                let value = match value {
                    Some(expr) => propagate!(self.eval_expr(expr, env)),
                    None => Value::Null,
                };
                Ok(Completion::signal(value, Signal::Return))
            },
            Statement::Exit { value, line } => {
                let code = match value {
                    Some(expr) => match propagate!(self.eval_expr(expr, env)) {
                        Value::Integer(code) => code,
                        other => {
                            return Err(RuntimeError::InvalidExitCode { type_name: other.type_name(),
                                                                       line:      *line, });
                        },
                    },
                    None => 0,
                };
                Ok(Completion::signal(Value::Integer(code), Signal::Exit(code)))
            },
            Statement::Import { path, line } => {
                let path = propagate!(self.eval_expr(path, env));
                let Value::Str(path) = &path else {
                    return Err(RuntimeError::TypeError { details: format!("import path must be a string, found {}",
                                                                          path.type_name()),
                                                         line:    *line, });
                };
                self.import(path, env, *line)
            },
            Statement::Break { .. } => Ok(Completion::signal(Value::Null, Signal::Break)),
            Statement::Continue { .. } => Ok(Completion::signal(Value::Null, Signal::Continue)),
            Statement::Assert { condition,
                                explanation,
                                line, } => {
                let condition = propagate!(self.eval_expr(condition, env));
                if condition.is_truthy() {
                    return Ok(Completion::normal(Value::Null));
                }
                let message = match explanation {
                    Some(expr) => Some(propagate!(self.eval_expr(expr, env)).to_string()),
                    None => None,
                };
                Err(RuntimeError::AssertionFailed { message,
                                                    line: *line })
            },
        }
    }

    /// Evaluates the statements of a block in order, in `env` itself.
    ///
    /// Blocks do not open a scope of their own; only function calls do. The
    /// value is that of the last statement, or `null` for an empty block.
    /// Any signal stops the block and is handed to the caller.
    ///
    /// # Errors
    /// The first runtime error raised by a statement.
    pub fn eval_block(&mut self, block: &Block, env: &Environment) -> EvalResult<Completion> {
        let mut last = Value::Null;
        for statement in &block.statements {
            last = propagate!(self.eval_statement(statement, env));
        }
        Ok(Completion::normal(last))
    }

    fn eval_while(&mut self, condition: &Expr, body: &Block, env: &Environment) -> EvalResult<Completion> {
        loop {
            let condition = propagate!(self.eval_expr(condition, env));
            if !condition.is_truthy() {
                break;
            }
            let completion = self.eval_block(body, env)?;
            match completion.signal {
                Signal::None | Signal::Continue => {},
                Signal::Break => break,
                Signal::Return | Signal::Exit(_) => return Ok(completion),
            }
        }
        Ok(Completion::normal(Value::Null))
    }

    /// Reads, scans and parses `path`, then evaluates it straight into `env`
    /// as if its text stood in place of the `import` statement.
    ///
    /// An active import counts towards the call depth limit, so a file that
    /// imports itself fails with `StackOverflow`.
    #[tracing::instrument(level = "debug", skip(self, env))]
    fn import(&mut self, path: &str, env: &Environment, line: usize) -> EvalResult<Completion> {
        if self.depth >= self.max_call_depth {
            warn!(path, limit = self.max_call_depth, line, "import depth limit reached");
            return Err(RuntimeError::StackOverflow { limit: self.max_call_depth,
                                                     line });
        }

        let failed = |source: ImportError| RuntimeError::ImportFailed { path: path.to_string(),
                                                                        source,
                                                                        line };

        let source = self.loader
                         .read_text_file(path)
                         .map_err(|e| failed(e.into()))?;
        let tokens = scan(&source).map_err(|e| failed(e.into()))?;
        let program = parse(&tokens).map_err(|e| failed(e.into()))?;

        debug!(statements = program.body.statements.len(), "importing");
        self.depth += 1;
        let result = self.eval_top_level(&program.body, env);
        self.depth -= 1;

        let completion = result?;
        debug!("import finished");
        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        error::{Error, LoadError},
        interpreter::{
            evaluator::core::Outcome,
            host::{MemoryLoader, Output},
        },
    };

    fn interpreter(output: &Output) -> Interpreter {
        let loader = MemoryLoader::new().with_file("lib.ql", "function double(x) { return x * 2 }\nshared = 1;")
                                        .with_file("bad.ql", "x = ;")
                                        .with_file("exit.ql", "exit 3")
                                        .with_file("self.ql", "import \"self.ql\"")
                                        .with_file("outer.ql", "import \"lib.ql\"; tripled = double(shared) + shared");
        Interpreter::new().with_output(output.clone())
                          .with_loader(Box::new(loader))
    }

    fn run(source: &str) -> (Result<Outcome, Error>, String) {
        let output = Output::buffer();
        let result = interpreter(&output).run(source, &Environment::new());
        (result, output.contents())
    }

    #[test]
    fn while_break_yields_null() {
        assert_eq!(run("while (true) { break }").0.unwrap(), Outcome::Completed(Value::Null));
    }

    #[test]
    fn continue_rechecks_the_condition() {
        let (result, output) = run("i = 0; while (i < 5) { i = i + 1; if (i % 2 == 0) { continue } print i }");
        result.unwrap();
        assert_eq!(output, "1\n3\n5\n");
    }

    #[test]
    fn untaken_branches_are_not_evaluated() {
        let (result, _) = run("if (false) { missing } else if (0) { missing } else { x = 1 }; x");
        assert_eq!(result.unwrap(), Outcome::Completed(Value::Integer(1)));
    }

    #[test]
    fn print_writes_display_strings() {
        let (result, output) = run("print \"a\"; print; print [\"a\", 1.0]");
        result.unwrap();
        assert_eq!(output, "a\n\n[\"a\", 1.0]\n");
    }

    #[test]
    fn exit_code_must_be_an_integer() {
        assert!(matches!(run("exit 1.5").0,
                         Err(Error::Runtime(RuntimeError::InvalidExitCode { type_name: "number", .. }))));
        assert_eq!(run("while (true) { if (true) { exit 2 } }").0.unwrap(), Outcome::Exited(2));
    }

    #[test]
    fn assert_carries_its_explanation() {
        assert!(run("assert 1 == 1, missing").0.is_ok());
        let (result, _) = run("assert 1 == 2, \"math is \" + str(\"broken\")");
        match result {
            Err(Error::Runtime(RuntimeError::AssertionFailed { message, line })) => {
                assert_eq!(message.as_deref(), Some("math is broken"));
                assert_eq!(line, 1);
            },
            other => panic!("expected an assertion failure, got {other:?}"),
        }
        assert!(matches!(run("assert false").0,
                         Err(Error::Runtime(RuntimeError::AssertionFailed { message: None, .. }))));
    }

    #[test]
    fn import_evaluates_into_the_current_scope() {
        let (result, _) = run("import \"lib.ql\"; double(shared + 20)");
        assert_eq!(result.unwrap(), Outcome::Completed(Value::Integer(42)));
    }

    #[test]
    fn import_failures_are_wrapped() {
        assert!(matches!(run("import \"nope.ql\"").0,
                         Err(Error::Runtime(RuntimeError::ImportFailed { source:
                                                                             ImportError::Load(LoadError::NotFound { .. }),
                                                                         .. }))));
        assert!(matches!(run("import \"bad.ql\"").0,
                         Err(Error::Runtime(RuntimeError::ImportFailed { source: ImportError::Parse(_),
                                                                         .. }))));
        assert!(matches!(run("import 5").0, Err(Error::Runtime(RuntimeError::TypeError { .. }))));
    }

    #[test]
    fn exit_inside_an_import_ends_the_run() {
        assert_eq!(run("import \"exit.ql\"; print 1").0.unwrap(), Outcome::Exited(3));
    }

    #[test]
    fn self_import_hits_the_depth_limit() {
        let output = Output::buffer();
        let result = interpreter(&output).with_max_call_depth(20)
                                         .run("import \"self.ql\"", &Environment::new());
        assert!(matches!(result, Err(Error::Runtime(RuntimeError::StackOverflow { limit: 20, .. }))));
    }

    #[test]
    fn nested_imports_within_the_limit_work() {
        let output = Output::buffer();
        let result = interpreter(&output).with_max_call_depth(2)
                                         .run("import \"outer.ql\"; tripled", &Environment::new());
        assert_eq!(result.unwrap(), Outcome::Completed(Value::Integer(3)));
    }
}
