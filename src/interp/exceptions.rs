//! Exception propagation and Python-style traceback rendering.
//!
//! Inside the interpreter an exception travels as a [`Raised`] error value. When it escapes a cell it is turned
//! into a [`RaisedException`] whose `traceback` text has the layout the notebook layer rewrites:
//!
//! ```text
//! Traceback (most recent call last):
//!   File "<string>", line 3, in <module>
//!   File "<string>", line 2, in check
//! AssertionError: totals differ
//! ```
//!
//! Syntax errors have a single frame line without the `, in <frame>` suffix, like CPython's `exec`.

use std::fmt;
use std::fmt::Write as _;
use std::rc::Rc;

use testmynb_core::errors::ExceptionKind;
use testmynb_core::lang::exceptions;
use testmynb_syntax::diagnostics::{CompileError, ErrorKind};

use super::value::{ExceptionObj, Value};

/// First line of every traceback.
pub const TRACEBACK_HEADER: &str = "Traceback (most recent call last):";
/// File name reported by every frame; the notebook layer replaces it with the notebook path.
pub const CELL_FILE: &str = "<string>";
/// Frame name of the cell body.
pub const MODULE_FRAME: &str = "<module>";

/// One active frame at the time an exception was raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceFrame {
    pub line: usize,
    pub name: Rc<str>,
}

/// An exception unwinding through the interpreter.
#[derive(Clone)]
pub struct Raised {
    pub exc: Rc<ExceptionObj>,
    /// Outermost frame first. Empty until the interpreter records the active frames.
    pub frames: Vec<TraceFrame>,
}

pub type ExecResult<T> = Result<T, Raised>;

impl Raised {
    /// Raise `kind` with a single message argument (no arguments when `message` is empty).
    pub fn new(kind: ExceptionKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let args = if message.is_empty() {
            Vec::new()
        } else {
            vec![Value::from(message)]
        };
        Self::with_args(kind, args)
    }

    pub fn with_args(kind: ExceptionKind, args: Vec<Value>) -> Self {
        Self::from_exception(Rc::new(ExceptionObj { kind, args }))
    }

    pub fn from_exception(exc: Rc<ExceptionObj>) -> Self {
        Self {
            exc,
            frames: Vec::new(),
        }
    }

    pub fn kind(&self) -> ExceptionKind {
        self.exc.kind
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::TypeError, message)
    }

    pub fn value_error(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::ValueError, message)
    }

    pub fn index_error(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::IndexError, message)
    }

    pub fn overflow(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::OverflowError, message)
    }

    pub fn zero_division(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::ZeroDivisionError, message)
    }

    /// `KeyError` carrying the missing key itself, so the message is its repr.
    pub fn key_error(key: Value) -> Self {
        Self::with_args(ExceptionKind::KeyError, vec![key])
    }

    pub fn attribute_error(value: &Value, name: &str) -> Self {
        Self::new(
            ExceptionKind::AttributeError,
            format!("'{}' object has no attribute '{name}'", value.type_name()),
        )
    }

    /// `AttributeError` for `value.name = ...` or `del value.name`; the attributes of builtin values and modules
    /// cannot be rebound.
    pub fn readonly_attribute(value: &Value, name: &str, exists: bool) -> Self {
        let message = match value {
            Value::Module(module) => format!("module '{}' attribute '{name}' is read-only", module.name),
            _ if exists => format!("'{}' object attribute '{name}' is read-only", value.type_name()),
            _ => return Self::attribute_error(value, name),
        };
        Self::new(ExceptionKind::AttributeError, message)
    }
}

impl fmt::Debug for Raised {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Raised")
            .field("kind", &self.exc.kind)
            .field("message", &self.exc.message())
            .field("frames", &self.frames)
            .finish()
    }
}

/// An exception that escaped a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaisedException {
    pub kind: ExceptionKind,
    /// `str()` of the exception; may be empty.
    pub message: String,
    /// Formatted traceback, terminated by a newline.
    pub traceback: String,
}

impl RaisedException {
    pub fn kind_name(&self) -> &'static str {
        exceptions::as_str(self.kind)
    }

    /// Whether the exception signals a failed expectation rather than broken test code.
    pub fn is_assertion(&self) -> bool {
        exceptions::is_subclass(self.kind, ExceptionKind::AssertionError)
    }

    pub(crate) fn from_raised(raised: &Raised) -> Self {
        let kind = raised.kind();
        let message = raised.exc.message();
        let mut traceback = format!("{TRACEBACK_HEADER}\n");
        for frame in &raised.frames {
            let _ = writeln!(traceback, "  File \"{CELL_FILE}\", line {}, in {}", frame.line, frame.name);
        }
        traceback.push_str(&summary_line(kind, &message));
        traceback.push('\n');
        Self {
            kind,
            message,
            traceback,
        }
    }

    /// Report the first syntax error of a cell.
    pub(crate) fn from_compile_errors(source: &str, errors: &[CompileError]) -> Self {
        let (kind, message, line) = match errors.first() {
            Some(error) => {
                let kind = match error.kind {
                    ErrorKind::Indentation => ExceptionKind::IndentationError,
                    ErrorKind::Syntax | ErrorKind::Error => ExceptionKind::SyntaxError,
                };
                (kind, error.message.clone(), error.line(source))
            }
            None => (ExceptionKind::SyntaxError, "invalid syntax".to_string(), 1),
        };
        let traceback = format!(
            "{TRACEBACK_HEADER}\n  File \"{CELL_FILE}\", line {line}\n{}\n",
            summary_line(kind, &message)
        );
        Self {
            kind,
            message,
            traceback,
        }
    }
}

impl fmt::Display for RaisedException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&summary_line(self.kind, &self.message))
    }
}

impl std::error::Error for RaisedException {}

/// `Kind` or `Kind: message`.
fn summary_line(kind: ExceptionKind, message: &str) -> String {
    if message.is_empty() {
        exceptions::as_str(kind).to_string()
    } else {
        format!("{}: {message}", exceptions::as_str(kind))
    }
}
