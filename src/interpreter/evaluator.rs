/// Evaluates `$completion` (an `EvalResult<Completion>`), returning early
/// from the enclosing function when it failed or carries a control signal,
/// and yielding its value otherwise.
macro_rules! propagate {
    ($completion:expr) => {{
        let completion = $completion?;
        if completion.signal != $crate::interpreter::evaluator::core::Signal::None {
            return Ok(completion);
        }
        completion.value
    }};
}

/// Core evaluation logic and interpreter state.
///
/// Contains the [`core::Interpreter`], its configuration, the completion and
/// signal types, and the program-level entry points.
pub mod core;

/// Expression evaluation: names, literals, containers, indexing, assignment
/// and short-circuit logic.
pub mod expression;

/// Statement and block evaluation, including loops, `import` and `assert`.
pub mod statement;

/// Binary operator semantics on already evaluated operands.
pub mod binary;

/// Unary operator semantics.
pub mod unary;

/// Calls of builtins and user functions.
pub mod call;

/// Index resolution shared by reads and writes.
pub mod utils;
