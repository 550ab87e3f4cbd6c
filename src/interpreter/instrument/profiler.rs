use std::{
    collections::BTreeMap,
    fmt::Write as _,
    time::{Duration, Instant},
};

use crate::{
    ast::Expr,
    error::RuntimeError,
    interpreter::{
        environment::Environment,
        evaluator::core::Completion,
        instrument::{Instrument, NodeRef},
    },
};

/// Aggregated timings of one group of evaluations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// How many evaluations were recorded.
    pub count: u64,
    /// Their summed duration.
    pub total: Duration,
    /// The shortest one.
    pub min:   Duration,
    /// The longest one.
    pub max:   Duration,
}

impl Timing {
    fn new(duration: Duration) -> Self {
        Self { count: 1,
               total: duration,
               min:   duration,
               max:   duration, }
    }

    fn record(&mut self, duration: Duration) {
        self.count += 1;
        self.total += duration;
        self.min = self.min.min(duration);
        self.max = self.max.max(duration);
    }

    /// Mean duration of the recorded evaluations.
    #[must_use]
    pub fn average(&self) -> Duration {
        u32::try_from(self.count).map_or(Duration::ZERO, |count| self.total / count.max(1))
    }
}

fn record(timings: &mut BTreeMap<String, Timing>, key: &str, duration: Duration) {
    match timings.get_mut(key) {
        Some(timing) => timing.record(duration),
        None => {
            timings.insert(key.to_string(), Timing::new(duration));
        },
    }
}

/// Measures how long evaluation spends per node kind, per source line and per
/// called function.
///
/// Durations are inclusive: a node's time contains the time of every node
/// nested inside it.
#[derive(Debug, Default)]
pub struct Profiler {
    started:   Vec<Instant>,
    kinds:     BTreeMap<String, Timing>,
    lines:     BTreeMap<usize, Timing>,
    functions: BTreeMap<String, Timing>,
}

impl Profiler {
    /// Creates a profiler with nothing recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Timings keyed by node kind (`call`, `+`, `while`, ...).
    #[must_use]
    pub const fn kinds(&self) -> &BTreeMap<String, Timing> {
        &self.kinds
    }

    /// Timings keyed by source line.
    #[must_use]
    pub const fn lines(&self) -> &BTreeMap<usize, Timing> {
        &self.lines
    }

    /// Timings of calls keyed by callee name. Calls of anything other than a
    /// plain name are grouped under `<anonymous>`.
    #[must_use]
    pub const fn functions(&self) -> &BTreeMap<String, Timing> {
        &self.functions
    }
}

impl Instrument for Profiler {
    fn enter(&mut self, _node: NodeRef<'_>, _env: &Environment) {
        self.started.push(Instant::now());
    }

    fn exit(&mut self, node: NodeRef<'_>, _env: &Environment, _result: Result<&Completion, &RuntimeError>) {
        let Some(started) = self.started.pop() else {
            return;
        };
        let duration = started.elapsed();

        record(&mut self.kinds, node.kind(), duration);
        match self.lines.get_mut(&node.line()) {
            Some(timing) => timing.record(duration),
            None => {
                self.lines.insert(node.line(), Timing::new(duration));
            },
        }

        if let NodeRef::Expr(Expr::Call { callee, .. }) = node {
            let name = match callee.as_ref() {
                Expr::Identifier { name, .. } => name.as_str(),
                _ => "<anonymous>",
            };
            record(&mut self.functions, name, duration);
        }
    }

    fn report(&self) -> Option<String> {
        let mut out = String::new();

        let mut kinds: Vec<_> = self.kinds.iter().collect();
        kinds.sort_by(|a, b| b.1.total.cmp(&a.1.total));
        let _ = writeln!(out, "{:<12} {:>8} {:>14} {:>14} {:>14}", "node", "count", "total", "min", "max");
        for (kind, timing) in kinds {
            let _ = writeln!(out,
                             "{:<12} {:>8} {:>14} {:>14} {:>14}",
                             kind,
                             timing.count,
                             format!("{:?}", timing.total),
                             format!("{:?}", timing.min),
                             format!("{:?}", timing.max));
        }

        if !self.functions.is_empty() {
            let _ = writeln!(out, "\n{:<12} {:>8} {:>14} {:>14}", "function", "calls", "total", "average");
            for (name, timing) in &self.functions {
                let _ = writeln!(out,
                                 "{:<12} {:>8} {:>14} {:>14}",
                                 name,
                                 timing.count,
                                 format!("{:?}", timing.total),
                                 format!("{:?}", timing.average()));
            }
        }

        let mut lines: Vec<_> = self.lines.iter().collect();
        lines.sort_by(|a, b| b.1.total.cmp(&a.1.total));
        let _ = writeln!(out, "\n{:<12} {:>8} {:>14}", "line", "count", "total");
        for (line, timing) in lines.into_iter().take(10) {
            let _ = writeln!(out, "{:<12} {:>8} {:>14}", line, timing.count, format!("{:?}", timing.total));
        }

        Some(out)
    }
}
