#![forbid(unsafe_code)]
//! testmynb: run the `%%testcell` cells of Jupyter notebooks as tests.
//!
//! A test notebook is an `.ipynb` file whose name starts with `test_`. Each code cell starting with the
//! `%%testcell` magic is a test. The cells of one notebook run in document order against one shared namespace;
//! a cell passes when it completes, fails when an assertion does not hold and errors on any other exception.
//!
//! Cells are executed by an embedded interpreter for a Python subset ([`interp`]), parsed by `testmynb_syntax`.
//!
//! ## Modules
//!
//! - [`notebook`] - Notebook documents, test-cell extraction and per-cell outcomes
//! - [`handler`] - Running many notebooks and aggregating their outcomes
//! - [`report`] - The console report
//! - [`cli`] - Command-line front end
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Cell code**: Exceptions raised by executed cells are values, never panics. A cell cannot crash the runner.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **True invariants**: If a panic represents a bug (logic error), use `.expect("INVARIANT: reason")` with a
//!   clear explanation.

pub mod cli;
pub mod config;
pub mod handler;
pub mod interp;
pub mod notebook;
pub mod numeric_adapters;
pub mod report;
pub mod version;

pub use config::{AdvisoryMode, ColorChoice, RunConfig};
pub use handler::{RunSummary, TestHandler};
pub use interp::{CellExecutor, Interpreter, Namespace};
pub use notebook::{Notebook, Outcome, TestCell};
