//! The evaluator's view of the outside world: where `import` reads files
//! from and where `print` writes to.

use std::{
    cell::RefCell,
    io::{self, Write},
    rc::Rc,
};

use rustc_hash::FxHashMap;

use crate::error::LoadError;

/// Reads the text of imported files.
pub trait SourceLoader {
    /// Returns the whole contents of the file at `path`.
    ///
    /// # Errors
    /// `LoadError::NotFound` when nothing exists at `path`, `LoadError::Read`
    /// for any other failure.
    fn read_text_file(&self, path: &str) -> Result<String, LoadError>;
}

/// Loads imports from the real filesystem. Relative paths resolve against the
/// process's working directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSystemLoader;

impl SourceLoader for FileSystemLoader {
    fn read_text_file(&self, path: &str) -> Result<String, LoadError> {
        std::fs::read_to_string(path).map_err(|source| match source.kind() {
                                         io::ErrorKind::NotFound => {
                                             LoadError::NotFound { path: path.to_string() }
                                         },
                                         _ => LoadError::Read { path: path.to_string(),
                                                                source },
                                     })
    }
}

/// Serves imports from an in-memory table of path to source text.
#[derive(Debug, Default, Clone)]
pub struct MemoryLoader {
    files: FxHashMap<String, String>,
}

impl MemoryLoader {
    /// Creates a loader with no files.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a file.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<String>, source: impl Into<String>) -> Self {
        self.files.insert(path.into(), source.into());
        self
    }
}

impl SourceLoader for MemoryLoader {
    fn read_text_file(&self, path: &str) -> Result<String, LoadError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| LoadError::NotFound { path: path.to_string() })
    }
}

/// A line-oriented text sink.
///
/// Cloning a `Buffer` output shares the buffer, so a caller can keep one
/// clone and read back what the interpreter wrote through another.
#[derive(Debug, Clone, Default)]
pub enum Output {
    /// Standard output.
    #[default]
    Stdout,
    /// An in-memory buffer.
    Buffer(Rc<RefCell<String>>),
}

impl Output {
    /// Creates an empty in-memory sink.
    #[must_use]
    pub fn buffer() -> Self {
        Self::Buffer(Rc::default())
    }

    /// Writes `line` followed by a newline.
    ///
    /// A failed write to stdout (a closed pipe, for instance) is logged and
    /// otherwise ignored.
    pub fn write_line(&self, line: &str) {
        match self {
            Self::Stdout => {
                let mut stdout = io::stdout().lock();
                if let Err(error) = writeln!(stdout, "{line}") {
                    tracing::warn!(%error, "failed to write to stdout");
                }
            },
            Self::Buffer(buffer) => {
                let mut buffer = buffer.borrow_mut();
                buffer.push_str(line);
                buffer.push('\n');
            },
        }
    }

    /// Everything written so far; always empty for stdout.
    #[must_use]
    pub fn contents(&self) -> String {
        match self {
            Self::Stdout => String::new(),
            Self::Buffer(buffer) => buffer.borrow().clone(),
        }
    }
}
