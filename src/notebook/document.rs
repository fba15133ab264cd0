//! Reading `.ipynb` files.
//!
//! Only the parts needed to find test cells are modelled: the format version, each cell's type tag and its source.
//! The raw JSON is kept alongside for the trust check, which signs the whole document.
//!
//! ## Notes
//!
//! - `source` may be a single string or a list of line strings; lists are joined without separators, since each
//!   element already carries its trailing newline.
//! - nbformat 3 files keep their cells under `worksheets[].cells[]` and store code in `input`. They are flattened to
//!   the same shape as nbformat 4.

use std::fs;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;

/// Oldest and newest `nbformat` major versions that can be read.
pub const SUPPORTED_FORMATS: std::ops::RangeInclusive<u64> = 3..=4;

/// Errors while loading a notebook file.
#[derive(Debug, Error, Diagnostic)]
pub enum NotebookError {
    #[error("cannot read notebook {}", path.display())]
    #[diagnostic(code(testmynb::notebook::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid notebook JSON", path.display())]
    #[diagnostic(
        code(testmynb::notebook::json),
        help("the file must be a Jupyter notebook saved as JSON")
    )]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} uses nbformat {found}, which is not supported", path.display())]
    #[diagnostic(code(testmynb::notebook::format), help("re-save the notebook with Jupyter to upgrade it to nbformat 4"))]
    UnsupportedFormat { path: PathBuf, found: u64 },
}

/// Cell type tag from the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    Code,
    Markdown,
    Raw,
    /// nbformat 3 heading cells.
    Heading,
    #[serde(other)]
    Other,
}

/// One cell of a notebook document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentCell {
    pub cell_type: CellType,
    pub source: String,
}

/// A parsed notebook document.
#[derive(Debug, Clone)]
pub struct NotebookDocument {
    pub nbformat: u64,
    pub nbformat_minor: u64,
    pub cells: Vec<DocumentCell>,
    /// The document as read, for signature checks.
    pub raw: serde_json::Value,
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum Source {
    Text(String),
    Lines(Vec<String>),
}

impl Source {
    fn into_text(self) -> String {
        match self {
            Source::Text(text) => text,
            Source::Lines(lines) => lines.concat(),
        }
    }
}

#[derive(Deserialize)]
struct RawCell {
    cell_type: CellType,
    #[serde(default)]
    source: Option<Source>,
    /// nbformat 3 code cells.
    #[serde(default)]
    input: Option<Source>,
}

impl From<RawCell> for DocumentCell {
    fn from(cell: RawCell) -> Self {
        let source = cell.source.or(cell.input).map(Source::into_text).unwrap_or_default();
        Self {
            cell_type: cell.cell_type,
            source,
        }
    }
}

#[derive(Deserialize)]
struct Worksheet {
    #[serde(default)]
    cells: Vec<RawCell>,
}

#[derive(Deserialize)]
struct RawNotebook {
    nbformat: u64,
    #[serde(default)]
    nbformat_minor: u64,
    #[serde(default)]
    cells: Vec<RawCell>,
    #[serde(default)]
    worksheets: Vec<Worksheet>,
}

// ============================================================================
// Loading
// ============================================================================

impl NotebookDocument {
    /// Read and parse a notebook file.
    ///
    /// ## Errors
    /// - [`NotebookError::Io`] if the file cannot be read.
    /// - [`NotebookError::Json`] if it is not notebook JSON.
    /// - [`NotebookError::UnsupportedFormat`] for nbformat versions other than 3 and 4.
    pub fn from_path(path: &Path) -> Result<Self, NotebookError> {
        let text = fs::read_to_string(path).map_err(|source| NotebookError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text, path)
    }

    /// Parse notebook JSON. `path` is only used in error messages.
    ///
    /// ## Errors
    /// See [`NotebookDocument::from_path`].
    pub fn from_json_str(text: &str, path: &Path) -> Result<Self, NotebookError> {
        let json_error = |source| NotebookError::Json {
            path: path.to_path_buf(),
            source,
        };
        let raw: serde_json::Value = serde_json::from_str(text).map_err(json_error)?;
        let notebook = RawNotebook::deserialize(&raw).map_err(json_error)?;
        if !SUPPORTED_FORMATS.contains(&notebook.nbformat) {
            return Err(NotebookError::UnsupportedFormat {
                path: path.to_path_buf(),
                found: notebook.nbformat,
            });
        }

        let cells = if notebook.nbformat < 4 {
            notebook
                .worksheets
                .into_iter()
                .flat_map(|worksheet| worksheet.cells)
                .map(DocumentCell::from)
                .collect()
        } else {
            notebook.cells.into_iter().map(DocumentCell::from).collect()
        };

        tracing::trace!(path = %path.display(), nbformat = notebook.nbformat, "notebook parsed");
        Ok(Self {
            nbformat: notebook.nbformat,
            nbformat_minor: notebook.nbformat_minor,
            cells,
            raw,
        })
    }

    /// Code cells in document order.
    pub fn code_cells(&self) -> impl Iterator<Item = &DocumentCell> {
        self.cells.iter().filter(|cell| cell.cell_type == CellType::Code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<NotebookDocument, NotebookError> {
        NotebookDocument::from_json_str(text, Path::new("test_doc.ipynb"))
    }

    #[test]
    fn test_list_and_string_sources() {
        let doc = parse(
            r##"{
                "nbformat": 4, "nbformat_minor": 5, "metadata": {},
                "cells": [
                    {"cell_type": "markdown", "metadata": {}, "source": "# Title"},
                    {"cell_type": "code", "metadata": {}, "outputs": [], "execution_count": null,
                     "source": ["%%testcell a\n", "assert True"]}
                ]
            }"##,
        )
        .unwrap();
        assert_eq!(doc.nbformat, 4);
        assert_eq!(doc.cells.len(), 2);
        assert_eq!(doc.cells[0].cell_type, CellType::Markdown);
        let code: Vec<_> = doc.code_cells().collect();
        assert_eq!(code.len(), 1);
        assert_eq!(code[0].source, "%%testcell a\nassert True");
    }

    #[test]
    fn test_v3_worksheets_are_flattened() {
        let doc = parse(
            r#"{
                "nbformat": 3, "nbformat_minor": 0, "metadata": {},
                "worksheets": [{"cells": [
                    {"cell_type": "heading", "level": 1, "source": ["Sums"]},
                    {"cell_type": "code", "language": "python", "input": ["%%testcell s\n", "assert 1 + 1 == 2"]}
                ]}]
            }"#,
        )
        .unwrap();
        assert_eq!(doc.cells[0].cell_type, CellType::Heading);
        assert_eq!(doc.cells[1].source, "%%testcell s\nassert 1 + 1 == 2");
    }

    #[test]
    fn test_unknown_cell_types_are_kept() {
        let doc = parse(r#"{"nbformat": 4, "cells": [{"cell_type": "widget", "source": ""}]}"#).unwrap();
        assert_eq!(doc.cells[0].cell_type, CellType::Other);
    }

    #[test]
    fn test_malformed_json_is_reported() {
        let err = parse("{\"nbformat\": 4, \"cells\": [").unwrap_err();
        assert!(matches!(err, NotebookError::Json { .. }));
        let err = parse(r#"{"cells": []}"#).unwrap_err();
        assert!(matches!(err, NotebookError::Json { .. }));
    }

    #[test]
    fn test_unsupported_format() {
        let err = parse(r#"{"nbformat": 2, "cells": []}"#).unwrap_err();
        assert!(matches!(err, NotebookError::UnsupportedFormat { found: 2, .. }));
        assert_eq!(err.to_string(), "test_doc.ipynb uses nbformat 2, which is not supported");
    }

    #[test]
    fn test_missing_file() {
        let err = NotebookDocument::from_path(Path::new("/nonexistent/test_missing.ipynb")).unwrap_err();
        assert!(matches!(err, NotebookError::Io { .. }));
    }
}
