//! Cell executor: runs test-cell source against a notebook's shared namespace.
//!
//! Dynamic execution is isolated behind the [`CellExecutor`] trait. The one implementation, [`Interpreter`], is a
//! tree-walking interpreter for the Python subset parsed by `testmynb_syntax`.
//!
//! ## Notes
//!
//! - **Namespaces accumulate**: a [`Namespace`] is created empty by its notebook and passed to every cell of that
//!   notebook in document order, so later cells see names bound by earlier ones.
//! - **Compile before run**: a cell that does not parse raises `SyntaxError` without executing any statement, and
//!   misplaced `return`/`break`/`continue` are rejected the same way.
//! - **Output**: `print` writes to the interpreter's sink, stdout unless replaced with
//!   [`Interpreter::with_output`].
//! - **No limits**: there is no timeout and no sandbox. Deep recursion is stopped with `RecursionError` once the
//!   call depth reaches the interpreter's recursion limit.
//!
//! ## Examples
//!
//! ```rust
//! use testmynb::interp::{CellExecutor, Interpreter, Namespace};
//!
//! let mut interpreter = Interpreter::new();
//! let mut namespace = Namespace::default();
//! interpreter.execute("total = sum(range(4))\n", &mut namespace).unwrap();
//! let err = interpreter.execute("assert total == 7, total\n", &mut namespace).unwrap_err();
//! assert!(err.is_assertion());
//! assert_eq!(err.message, "6");
//! ```
//!
//! ## See also
//!
//! - [`crate::notebook::TestCell::run`] for how raised exceptions become test outcomes.

mod builtins;
mod eval;
mod exceptions;
mod exec;
mod format;
mod methods;
mod modules;
mod scope;
pub mod value;

#[cfg(test)]
mod tests;

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

pub use exceptions::{CELL_FILE, MODULE_FRAME, RaisedException, TRACEBACK_HEADER};
pub use value::Value;

use exceptions::{Raised, TraceFrame};
use exec::check_control_flow;
use scope::{Globals, Scope};

/// Call depth at which `RecursionError` is raised, counting the cell's own frame (CPython's default).
pub const DEFAULT_RECURSION_LIMIT: usize = 1000;

/// Execute cell source against a namespace.
///
/// Implementations exist per scripting dialect; the notebook layer only relies on this trait.
pub trait CellExecutor {
    /// The binding environment shared by the cells of one notebook.
    type Namespace: Default;

    /// Human-readable name and version of the executed dialect, for report headers.
    fn dialect(&self) -> String;

    /// Run `source` to completion against `namespace`.
    ///
    /// ## Errors
    /// Returns the exception that escaped the cell, with its formatted traceback. Bindings made before the
    /// exception stay in the namespace.
    fn execute(&mut self, source: &str, namespace: &mut Self::Namespace) -> Result<(), RaisedException>;
}

/// Name → value bindings shared by the test cells of one notebook.
#[derive(Default)]
pub struct Namespace {
    globals: Globals,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.globals.borrow().get(name).cloned()
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.globals.borrow_mut().insert(name.to_string(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.globals.borrow().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.globals.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.globals.borrow().is_empty()
    }

    /// Bound names in binding order.
    pub fn names(&self) -> Vec<String> {
        self.globals.borrow().keys().cloned().collect()
    }
}

/// Byte offsets of line starts, for mapping spans to 1-based line numbers.
#[derive(Debug)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    pub fn line(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }
}

/// An active call frame, for tracebacks.
struct FrameState {
    name: Rc<str>,
    lines: Rc<LineIndex>,
    /// Start of the statement currently executing in this frame.
    offset: usize,
}

/// How a block finished.
#[derive(Debug)]
enum Flow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

/// Tree-walking interpreter for test cells.
pub struct Interpreter {
    out: Box<dyn Write>,
    frames: Vec<FrameState>,
    /// Exceptions being handled by enclosing `except` blocks, innermost last (for bare `raise`).
    handling: Vec<Raised>,
    recursion_limit: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }

    /// An interpreter whose `print` output goes to `out`.
    pub fn with_output(out: impl Write + 'static) -> Self {
        Self {
            out: Box::new(out),
            frames: Vec::new(),
            handling: Vec::new(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit.max(1);
        self
    }

    fn set_offset(&mut self, offset: usize) {
        if let Some(frame) = self.frames.last_mut() {
            frame.offset = offset;
        }
    }

    fn current_lines(&self) -> Rc<LineIndex> {
        self.frames
            .last()
            .map(|f| f.lines.clone())
            .unwrap_or_else(|| Rc::new(LineIndex::new("")))
    }

    /// Record the active frames on an exception that has not been located yet.
    fn stamp(&self, mut raised: Raised) -> Raised {
        if raised.frames.is_empty() {
            raised.frames = self
                .frames
                .iter()
                .map(|f| TraceFrame {
                    line: f.lines.line(f.offset),
                    name: f.name.clone(),
                })
                .collect();
        }
        raised
    }
}

impl CellExecutor for Interpreter {
    type Namespace = Namespace;

    fn dialect(&self) -> String {
        format!("Python subset (testmynb {})", crate::version::TESTMYNB_VERSION)
    }

    #[tracing::instrument(skip_all, fields(source_len = source.len()))]
    fn execute(&mut self, source: &str, namespace: &mut Namespace) -> Result<(), RaisedException> {
        let program = testmynb_syntax::parse_source(source)
            .map_err(|errors| RaisedException::from_compile_errors(source, &errors))?;
        check_control_flow(&program.body, false, false)
            .map_err(|error| RaisedException::from_compile_errors(source, &[error]))?;

        self.frames.clear();
        self.handling.clear();
        self.frames.push(FrameState {
            name: MODULE_FRAME.into(),
            lines: Rc::new(LineIndex::new(source)),
            offset: 0,
        });

        let scope = Scope::module(namespace.globals.clone());
        let result = self.exec_block(&program.body, &scope);
        self.frames.clear();
        if let Err(error) = self.out.flush() {
            tracing::debug!(%error, "failed to flush cell output");
        }

        match result {
            Ok(_) => Ok(()),
            Err(raised) => {
                let exc = RaisedException::from_raised(&raised);
                tracing::debug!(kind = exc.kind_name(), message = %exc.message, "cell raised");
                Err(exc)
            }
        }
    }
}

/// A cloneable in-memory output sink, for capturing `print` output.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
