use crate::{
    ast::{Block, Expr, Program, Statement},
    error::{Error, RuntimeError},
    interpreter::{
        environment::Environment,
        host::{FileSystemLoader, Output, SourceLoader},
        instrument::{Instrument, NodeRef},
        lexer::scan,
        parser::core::parse,
        value::core::Value,
    },
    util::ensure_sufficient_stack,
};

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or a
/// `RuntimeError` describing the failure.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// How many user-function calls and imports may be active at once by default.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1_000;

/// Out-of-band control flow travelling alongside a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Evaluation finished normally.
    None,
    /// A `return` is unwinding to the nearest function call.
    Return,
    /// A `break` is unwinding to the nearest loop.
    Break,
    /// A `continue` is unwinding to the nearest loop.
    Continue,
    /// An `exit` is unwinding to the top-level driver with this status.
    Exit(i64),
}

/// The result of evaluating any node: a value and a control signal.
///
/// Anything other than [`Signal::None`] stops the enclosing expressions and
/// statements until the construct that consumes it is reached.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// The produced value. For `return` it is the returned value, for `exit`
    /// the status.
    pub value:  Value,
    /// The control signal.
    pub signal: Signal,
}

impl Completion {
    /// A completion without a signal.
    #[must_use]
    pub const fn normal(value: Value) -> Self {
        Self { value,
               signal: Signal::None }
    }

    /// A completion carrying `signal`.
    #[must_use]
    pub const fn signal(value: Value, signal: Signal) -> Self {
        Self { value, signal }
    }
}

/// How a program run ended, when it did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The last statement's value, or `null` for an empty program.
    Completed(Value),
    /// An `exit` statement ended the run with this status.
    Exited(i64),
}

/// Stores the runtime evaluation state.
///
/// The interpreter owns the collaborators evaluation talks to (the output
/// sink, the import loader and any instruments) and tracks the current call
/// depth. Variable bindings live in [`Environment`]s passed to each call, so
/// one interpreter can run code against any number of scopes.
///
/// ## Usage
/// ```
/// use quill::interpreter::{
///     environment::Environment,
///     evaluator::core::{Interpreter, Outcome},
///     host::Output,
///     value::core::Value,
/// };
///
/// let output = Output::buffer();
/// let mut interpreter = Interpreter::new().with_output(output.clone());
/// let globals = Environment::new();
///
/// let outcome = interpreter.run("x = 6 * 7; print x; x", &globals).unwrap();
///
/// assert_eq!(outcome, Outcome::Completed(Value::Integer(42)));
/// assert_eq!(output.contents(), "42\n");
/// ```
pub struct Interpreter {
    pub(crate) output:         Output,
    pub(crate) loader:         Box<dyn SourceLoader>,
    pub(crate) instruments:    Vec<Box<dyn Instrument>>,
    pub(crate) depth:          usize,
    pub(crate) max_call_depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates an interpreter printing to stdout, importing from the
    /// filesystem, with no instruments and the default call depth limit.
    #[must_use]
    pub fn new() -> Self {
        Self { output:         Output::Stdout,
               loader:         Box::new(FileSystemLoader),
               instruments:    Vec::new(),
               depth:          0,
               max_call_depth: DEFAULT_MAX_CALL_DEPTH, }
    }

    /// Sends `print` output to `output`.
    #[must_use]
    pub fn with_output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    /// Reads imported files through `loader`.
    #[must_use]
    pub fn with_loader(mut self, loader: Box<dyn SourceLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Adds an instrument. Instruments are entered in the order they were
    /// added and exited in reverse.
    #[must_use]
    pub fn with_instrument(mut self, instrument: Box<dyn Instrument>) -> Self {
        self.instruments.push(instrument);
        self
    }

    /// Limits how many user-function calls and imports may be active at once.
    #[must_use]
    pub const fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    /// The sink `print` writes to.
    #[must_use]
    pub const fn output(&self) -> &Output {
        &self.output
    }

    /// Reports of all instruments that produce one.
    #[must_use]
    pub fn reports(&self) -> Vec<String> {
        self.instruments
            .iter()
            .filter_map(|instrument| instrument.report())
            .collect()
    }

    /// Scans, parses and evaluates `source` in `env`.
    ///
    /// # Errors
    /// The first lexical, syntax or runtime error.
    pub fn run(&mut self, source: &str, env: &Environment) -> Result<Outcome, Error> {
        let tokens = scan(source)?;
        let program = parse(&tokens)?;
        Ok(self.evaluate_program(&program, env)?)
    }

    /// Evaluates a parsed program in `env` and reports how it ended.
    ///
    /// # Errors
    /// Any runtime error, including a `return`, `break` or `continue` that
    /// reaches the top level.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn evaluate_program(&mut self, program: &Program, env: &Environment) -> EvalResult<Outcome> {
        let completion = self.evaluate(program, env)?;
        Ok(match completion.signal {
            Signal::Exit(code) => Outcome::Exited(code),
            _ => Outcome::Completed(completion.value),
        })
    }

    /// Evaluates a parsed program in `env`.
    ///
    /// The returned signal is either [`Signal::None`] or [`Signal::Exit`].
    ///
    /// # Errors
    /// Any runtime error, including a `return`, `break` or `continue` that
    /// reaches the top level.
    pub fn evaluate(&mut self, program: &Program, env: &Environment) -> EvalResult<Completion> {
        self.eval_top_level(&program.body, env)
    }

    /// Runs top-level statements, where `exit` ends evaluation and the other
    /// signals have nothing left to unwind to.
    pub(crate) fn eval_top_level(&mut self, body: &Block, env: &Environment) -> EvalResult<Completion> {
        let mut last = Value::Null;
        for statement in &body.statements {
            let completion = self.eval_statement(statement, env)?;
            let line = statement.line_number();
            match completion.signal {
                Signal::None => last = completion.value,
                Signal::Exit(_) => return Ok(completion),
                Signal::Return => return Err(RuntimeError::ReturnOutsideFunction { line }),
                Signal::Break => return Err(RuntimeError::BreakOutsideLoop { line }),
                Signal::Continue => return Err(RuntimeError::ContinueOutsideLoop { line }),
            }
        }
        Ok(Completion::normal(last))
    }

    /// Evaluates an expression in `env`.
    ///
    /// # Errors
    /// Any runtime error raised while evaluating the expression.
    pub fn eval_expr(&mut self, expr: &Expr, env: &Environment) -> EvalResult<Completion> {
        ensure_sufficient_stack(|| {
            self.instrumented(NodeRef::Expr(expr), env, |this| this.dispatch_expr(expr, env))
        })
    }

    /// Evaluates a statement in `env`.
    ///
    /// # Errors
    /// Any runtime error raised while evaluating the statement.
    pub fn eval_statement(&mut self, statement: &Statement, env: &Environment) -> EvalResult<Completion> {
        ensure_sufficient_stack(|| {
            self.instrumented(NodeRef::Statement(statement), env, |this| {
                    this.dispatch_statement(statement, env)
                })
        })
    }

    fn instrumented(&mut self,
                    node: NodeRef<'_>,
                    env: &Environment,
                    evaluate: impl FnOnce(&mut Self) -> EvalResult<Completion>)
                    -> EvalResult<Completion> {
        if self.instruments.is_empty() {
            return evaluate(self);
        }
        for instrument in &mut self.instruments {
            instrument.enter(node, env);
        }
        let result = evaluate(self);
        for instrument in self.instruments.iter_mut().rev() {
            instrument.exit(node, env, result.as_ref());
        }
        result
    }
}
