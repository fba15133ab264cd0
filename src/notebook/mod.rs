//! Notebooks and their test cells.
//!
//! A [`Notebook`] is built from a notebook document. Every code cell whose source starts with `%%testcell` becomes
//! a [`TestCell`], in document order. Running the notebook runs those cells one after another against a single
//! namespace owned by the notebook, so a cell sees every binding made by the cells before it.
//!
//! ## Notes
//!
//! - **Result string**: one character per test cell after a run (`.` passed, `F` failed, `E` errored).
//! - **Stack**: failed and errored cells with their rewritten tracebacks, in cell order. Passing cells have no
//!   entry. Both are replaced in full by every run.
//! - **Identity**: notebooks compare and hash by file name, not path.
//!
//! ## Examples
//!
//! ```rust
//! use std::path::Path;
//!
//! use testmynb::interp::{Interpreter, SharedBuffer};
//! use testmynb::notebook::{Notebook, NotebookDocument};
//!
//! let json = r#"{"nbformat": 4, "nbformat_minor": 5, "metadata": {}, "cells": [
//!     {"cell_type": "code", "source": "%%testcell a\nx = 1"},
//!     {"cell_type": "code", "source": "%%testcell b\nassert x == 1"}
//! ]}"#;
//! let document = NotebookDocument::from_json_str(json, Path::new("test_doc.ipynb")).unwrap();
//! let mut notebook: Notebook = Notebook::from_document(Path::new("test_doc.ipynb"), document, false);
//!
//! let mut interpreter = Interpreter::with_output(SharedBuffer::default());
//! notebook.run(&mut interpreter);
//! assert_eq!(notebook.result(), Some(".."));
//! ```

pub mod cell;
pub mod document;
pub mod magic;
pub mod notary;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use indexmap::IndexMap;

pub use cell::{Advisory, NotebookRef, Outcome, TestCell};
pub use document::{CellType, DocumentCell, NotebookDocument, NotebookError};
pub use notary::{HmacNotary, Notary};

use crate::interp::{CellExecutor, Interpreter};

/// Detail recorded for a cell that did not pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackEntry {
    pub outcome: Outcome,
    pub traceback: String,
}

/// A notebook with its extracted test cells.
///
/// The namespace type follows the executor the notebook is run with.
pub struct Notebook<E: CellExecutor = Interpreter> {
    path: PathBuf,
    name: String,
    trusted: bool,
    document: NotebookDocument,
    namespace: E::Namespace,
    tests: Vec<TestCell>,
    result: Option<String>,
    /// Test-cell index → entry, for cells that did not pass.
    stack: Option<IndexMap<usize, StackEntry>>,
}

impl<E: CellExecutor> Notebook<E> {
    /// Load a notebook file and check its signature.
    ///
    /// ## Errors
    /// Any [`NotebookError`] from reading the document.
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path, notary: &dyn Notary) -> Result<Self, NotebookError> {
        let document = NotebookDocument::from_path(path)?;
        let trusted = notary.check_signature(&document.raw);
        Ok(Self::from_document(path, document, trusted))
    }

    /// Build a notebook from an already parsed document.
    ///
    /// `path` is made absolute when possible; the display name is its last component.
    pub fn from_document(path: &Path, document: NotebookDocument, trusted: bool) -> Self {
        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let owner = Rc::new(NotebookRef {
            path: path.clone(),
            name: name.clone(),
        });
        let tests = extract_codes(&document, &owner);
        tracing::debug!(notebook = %name, tests = tests.len(), "test cells extracted");
        Self {
            path,
            name,
            trusted,
            document,
            namespace: E::Namespace::default(),
            tests,
            result: None,
            stack: None,
        }
    }

    /// Absolute path of the notebook file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name of the notebook.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn trusted(&self) -> bool {
        self.trusted
    }

    pub fn document(&self) -> &NotebookDocument {
        &self.document
    }

    pub fn tests(&self) -> &[TestCell] {
        &self.tests
    }

    pub fn namespace(&self) -> &E::Namespace {
        &self.namespace
    }

    /// Start the next run from an empty namespace.
    pub fn reset_namespace(&mut self) {
        self.namespace = E::Namespace::default();
    }

    /// Result string of the last run, or `None` before the first run.
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn stack(&self) -> Option<&IndexMap<usize, StackEntry>> {
        self.stack.as_ref()
    }

    /// Run every test cell in order against the notebook's namespace.
    ///
    /// Cell exceptions are recorded, never returned. The namespace is not cleared first, so a second run sees the
    /// bindings of the first; call [`Notebook::reset_namespace`] to start fresh.
    #[tracing::instrument(skip_all, fields(notebook = %self.name))]
    pub fn run(&mut self, executor: &mut E) {
        let mut result = String::with_capacity(self.tests.len());
        let mut stack = IndexMap::new();
        for (index, cell) in self.tests.iter_mut().enumerate() {
            let (outcome, traceback) = cell.run(executor, &mut self.namespace);
            if let Some(c) = outcome.as_char() {
                result.push(c);
            }
            if !outcome.is_passing() {
                stack.insert(index, StackEntry { outcome, traceback });
            }
        }
        tracing::info!(notebook = %self.name, %result, "notebook run finished");
        self.result = Some(result);
        self.stack = Some(stack);
    }

    /// Errored cells of the last run with their tracebacks.
    pub fn get_error_stack(&self) -> IndexMap<&TestCell, &str> {
        self.stack_with(Outcome::Errored)
    }

    /// Failed cells of the last run with their tracebacks.
    pub fn get_fail_stack(&self) -> IndexMap<&TestCell, &str> {
        self.stack_with(Outcome::Failed)
    }

    fn stack_with(&self, outcome: Outcome) -> IndexMap<&TestCell, &str> {
        let Some(stack) = &self.stack else {
            return IndexMap::new();
        };
        stack
            .iter()
            .filter(|(_, entry)| entry.outcome == outcome)
            .filter_map(|(index, entry)| Some((self.tests.get(*index)?, entry.traceback.as_str())))
            .collect()
    }
}

/// Test cells of a document, in order.
fn extract_codes(document: &NotebookDocument, owner: &Rc<NotebookRef>) -> Vec<TestCell> {
    document
        .code_cells()
        .filter(|cell| magic::is_test_cell(&cell.source))
        .enumerate()
        .map(|(position, cell)| TestCell::new(&cell.source, owner.clone(), position))
        .collect()
}

impl<E: CellExecutor> PartialEq for Notebook<E> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<E: CellExecutor> Eq for Notebook<E> {}

impl<E: CellExecutor> PartialEq<str> for Notebook<E> {
    fn eq(&self, other: &str) -> bool {
        self.name == other
    }
}

impl<E: CellExecutor> Hash for Notebook<E> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl<E: CellExecutor> fmt::Debug for Notebook<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notebook")
            .field("path", &self.path)
            .field("trusted", &self.trusted)
            .field("tests", &self.tests.len())
            .field("result", &self.result)
            .finish()
    }
}

impl<E: CellExecutor> fmt::Display for Notebook<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::SharedBuffer;

    fn notebook(sources: &[&str]) -> Notebook {
        let cells: Vec<serde_json::Value> = sources
            .iter()
            .map(|source| serde_json::json!({"cell_type": "code", "source": source}))
            .collect();
        let json = serde_json::json!({"nbformat": 4, "nbformat_minor": 5, "metadata": {}, "cells": cells});
        let document = NotebookDocument::from_json_str(&json.to_string(), Path::new("test_unit.ipynb")).unwrap();
        Notebook::from_document(Path::new("/work/test_unit.ipynb"), document, false)
    }

    fn interpreter() -> Interpreter {
        Interpreter::with_output(SharedBuffer::default())
    }

    #[test]
    fn test_only_marked_code_cells_are_tests() {
        let nb = notebook(&["x = 1", "%%testcell a\nassert True", " %%testcell late\nassert True"]);
        assert_eq!(nb.tests().len(), 1);
        assert_eq!(nb.tests()[0].name(), "a");
        assert_eq!(nb.name(), "test_unit.ipynb");
        assert_eq!(nb.path(), Path::new("/work/test_unit.ipynb"));
        assert_eq!(nb.result(), None);
        assert!(nb.stack().is_none());
    }

    #[test]
    fn test_run_builds_result_and_stack() {
        let mut nb = notebook(&[
            "%%testcell ok\nassert True",
            "%%testcell bad\nassert False",
            "%%testcell boom\nraise ValueError('x')",
        ]);
        nb.run(&mut interpreter());
        assert_eq!(nb.result(), Some(".FE"));

        let fails = nb.get_fail_stack();
        assert_eq!(fails.len(), 1);
        assert_eq!(fails.keys().next().unwrap().name(), "bad");
        let errors = nb.get_error_stack();
        assert_eq!(errors.len(), 1);
        let (cell, traceback) = errors.first().unwrap();
        assert_eq!(cell.name(), "boom");
        assert!(traceback.ends_with("ValueError: x\n"));
    }

    #[test]
    fn test_rerun_replaces_result() {
        let mut nb = notebook(&["%%testcell count\ntry:\n    n += 1\nexcept NameError:\n    n = 0\nassert n == 0"]);
        let mut interpreter = interpreter();
        nb.run(&mut interpreter);
        assert_eq!(nb.result(), Some("."));
        nb.run(&mut interpreter);
        assert_eq!(nb.result(), Some("F"));
        assert_eq!(nb.stack().unwrap().len(), 1);

        nb.reset_namespace();
        nb.run(&mut interpreter);
        assert_eq!(nb.result(), Some("."));
        assert!(nb.stack().unwrap().is_empty());
    }

    #[test]
    fn test_equality_is_by_name() {
        let a = notebook(&[]);
        let document = NotebookDocument::from_json_str(r#"{"nbformat": 4, "cells": []}"#, Path::new("x")).unwrap();
        let b: Notebook = Notebook::from_document(Path::new("/elsewhere/test_unit.ipynb"), document, true);
        assert_eq!(a, b);
        assert!(a == *"test_unit.ipynb");
    }
}
