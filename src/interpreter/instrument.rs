//! Hooks invoked around the evaluation of every node.
//!
//! An [`Instrument`] observes evaluation without changing it: the evaluator
//! calls [`Instrument::enter`] before evaluating a node and
//! [`Instrument::exit`] with the outcome afterwards, and the outcome is passed
//! on untouched.

use crate::{
    ast::{Expr, Statement},
    error::RuntimeError,
    interpreter::{environment::Environment, evaluator::core::Completion},
};

/// Per-node-kind, per-line and per-function timings.
pub mod profiler;

/// Reports assignments to a chosen set of names.
pub mod watch;

/// A node about to be, or just, evaluated.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    /// An expression node.
    Expr(&'a Expr),
    /// A statement node.
    Statement(&'a Statement),
}

impl NodeRef<'_> {
    /// A short name for the kind of node, such as `call` or `while`.
    #[must_use]
    pub const fn kind(self) -> &'static str {
        match self {
            Self::Expr(expr) => expr.kind(),
            Self::Statement(statement) => statement.kind(),
        }
    }

    /// The source line the node starts on.
    #[must_use]
    pub const fn line(self) -> usize {
        match self {
            Self::Expr(expr) => expr.line_number(),
            Self::Statement(statement) => statement.line_number(),
        }
    }
}

/// An observer of evaluation.
///
/// Calls nest like the tree: every `enter` is matched by exactly one `exit`
/// for the same node, and all nodes entered in between have already exited.
pub trait Instrument {
    /// Called before `node` is evaluated in `env`.
    fn enter(&mut self, node: NodeRef<'_>, env: &Environment);

    /// Called after `node` was evaluated in `env`, with its result.
    fn exit(&mut self, node: NodeRef<'_>, env: &Environment, result: Result<&Completion, &RuntimeError>);

    /// A human-readable summary of what was observed, if the instrument
    /// produces one.
    fn report(&self) -> Option<String> {
        None
    }
}
