use std::{
    fs,
    io::{self, BufRead, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use quill::{
    Environment, Interpreter, Outcome, Value,
    interpreter::{
        evaluator::core::DEFAULT_MAX_CALL_DEPTH,
        host::Output,
        instrument::{profiler::Profiler, watch::Watch},
    },
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// quill is a small dynamically-typed scripting language.
///
/// With no files and no `--eval`, starts an interactive session.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Script files to run, in order, sharing one global scope.
    files: Vec<PathBuf>,

    /// Runs the given source after any files.
    #[arg(short, long, value_name = "SOURCE")]
    eval: Option<String>,

    /// Reports every assignment to this variable (may be repeated).
    #[arg(short, long, value_name = "NAME")]
    watch: Vec<String>,

    /// Prints a timing profile to stderr when the run ends.
    #[arg(long)]
    profile: bool,

    /// How many user-function calls and imports may be active at once.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_depth: usize,
}

/// How a run of one or more sources ended.
enum Finish {
    Done,
    Exited(i64),
    Failed,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging();

    let mut interpreter = Interpreter::new().with_max_call_depth(args.max_depth);
    if !args.watch.is_empty() {
        interpreter = interpreter.with_instrument(Box::new(Watch::new(args.watch.clone(), Output::Stdout)));
    }
    if args.profile {
        interpreter = interpreter.with_instrument(Box::new(Profiler::new()));
    }
    let globals = Environment::new();

    let finish = if args.files.is_empty() && args.eval.is_none() {
        repl(&mut interpreter, &globals)
    } else {
        run_all(&mut interpreter, &globals, &args)
    };

    for report in interpreter.reports() {
        eprintln!("{report}");
    }

    match finish {
        Finish::Done => ExitCode::SUCCESS,
        Finish::Failed => ExitCode::FAILURE,
        Finish::Exited(code) => exit_code(code),
    }
}

/// Installs a stderr subscriber, but only when `RUST_LOG` asks for one.
fn init_logging() {
    if std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr))
                                  .with(EnvFilter::from_default_env())
                                  .init();
}

fn run_all(interpreter: &mut Interpreter, globals: &Environment, args: &Args) -> Finish {
    let mut sources = Vec::new();
    for path in &args.files {
        match fs::read_to_string(path) {
            Ok(source) => sources.push(source),
            Err(e) => {
                eprintln!("Error: could not read '{}': {e}", path.display());
                return Finish::Failed;
            },
        }
    }
    sources.extend(args.eval.clone());

    for source in &sources {
        match interpreter.run(source, globals) {
            Ok(Outcome::Completed(_)) => {},
            Ok(Outcome::Exited(code)) => return Finish::Exited(code),
            Err(e) => {
                eprintln!("Error: {e}");
                return Finish::Failed;
            },
        }
    }
    Finish::Done
}

/// Reads and runs one line at a time. Errors are reported and the session
/// goes on; `exit` ends it.
fn repl(interpreter: &mut Interpreter, globals: &Environment) -> Finish {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            return Finish::Done;
        }
        let Some(Ok(line)) = lines.next() else {
            return Finish::Done;
        };
        if line.trim().is_empty() {
            continue;
        }

        match interpreter.run(&line, globals) {
            Ok(Outcome::Completed(Value::Null)) => {},
            Ok(Outcome::Completed(value)) => println!("{}", value.repr()),
            Ok(Outcome::Exited(code)) => return Finish::Exited(code),
            Err(e) => eprintln!("Error: {e}"),
        }
    }
}

/// Process statuses are a byte wide; the low byte of the code is used.
fn exit_code(code: i64) -> ExitCode {
    ExitCode::from(code.to_le_bytes()[0])
}
