//! A single `%%testcell` code cell and its outcome.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::LazyLock;

use regex::Regex;

use super::magic::{self, IGNORE_FLAG};
use crate::interp::{CELL_FILE, CellExecutor, MODULE_FRAME};

/// Name given to a test cell whose magic line has no positional token.
pub const UNNAMED_CELL: &str = "unnamed";

/// Indentation of the source line spliced into a rewritten traceback.
const SOURCE_LINE_INDENT: &str = "    ";

static FRAME_LINE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"line ([0-9]+)").expect("INVARIANT: valid regex"));

// ============================================================================
// Outcome
// ============================================================================

/// How a test cell finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Outcome {
    #[default]
    NotRun,
    Passed,
    /// An assertion did not hold.
    Failed,
    /// Any other exception, including syntax errors.
    Errored,
}

impl Outcome {
    /// The result-string character: `.`, `F` or `E`. Cells that have not run have none.
    pub const fn as_char(self) -> Option<char> {
        match self {
            Outcome::NotRun => None,
            Outcome::Passed => Some('.'),
            Outcome::Failed => Some('F'),
            Outcome::Errored => Some('E'),
        }
    }

    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(Outcome::Passed),
            'F' => Some(Outcome::Failed),
            'E' => Some(Outcome::Errored),
            _ => None,
        }
    }

    pub const fn is_passing(self) -> bool {
        matches!(self, Outcome::Passed)
    }
}

// ============================================================================
// Advisories
// ============================================================================

/// A non-blocking warning about how a test cell is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Advisory {
    /// The magic line has no name token.
    MissingName,
    /// No statement starts with `assert` and the cell is not marked `-n`.
    MissingAssert,
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::MissingName => f.write_str("Cell title missing."),
            Advisory::MissingAssert => f.write_str("Assert statement missing."),
        }
    }
}

// ============================================================================
// TestCell
// ============================================================================

/// Path and display name of the notebook that owns a cell.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct NotebookRef {
    pub path: PathBuf,
    pub name: String,
}

/// One extracted test cell.
///
/// ## Notes
///
/// - `source` is the cell source without its magic line; that is what runs and what tracebacks quote.
/// - Cells compare and hash by owning notebook path and position, so cells of different notebooks never collide as
///   map keys even when they share a name.
#[derive(Debug, Clone)]
pub struct TestCell {
    name: String,
    ignore: bool,
    source: String,
    notebook: Rc<NotebookRef>,
    position: usize,
    advisories: Vec<Advisory>,
    outcome: Outcome,
    traceback: String,
}

impl TestCell {
    /// Build a test cell from raw cell source whose first line is the magic line.
    ///
    /// ## Parameters
    /// - `raw`: the full cell source, magic line included.
    /// - `notebook`: the owning notebook.
    /// - `position`: index of this cell among the notebook's test cells.
    pub fn new(raw: &str, notebook: Rc<NotebookRef>, position: usize) -> Self {
        let ignore = magic::parse_cell_magic(raw).iter().any(|arg| arg == IGNORE_FLAG);
        let first_line = raw.split('\n').next().unwrap_or_default();
        let name = magic::split_line(first_line).into_iter().next();
        let source = strip_magic_line(raw).to_string();

        let mut advisories = Vec::new();
        if name.is_none() {
            advisories.push(Advisory::MissingName);
        }
        if !ignore && !magic::search_assert(&source) {
            advisories.push(Advisory::MissingAssert);
        }

        Self {
            name: name.unwrap_or_else(|| UNNAMED_CELL.to_string()),
            ignore,
            source,
            notebook,
            position,
            advisories,
            outcome: Outcome::NotRun,
            traceback: String::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the magic line carried `-n`.
    pub fn ignore(&self) -> bool {
        self.ignore
    }

    /// The cleaned source that is executed.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn notebook_path(&self) -> &Path {
        &self.notebook.path
    }

    pub fn notebook_name(&self) -> &str {
        &self.notebook.name
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Rewritten traceback of the last run; empty unless the cell failed or errored.
    pub fn traceback(&self) -> &str {
        &self.traceback
    }

    /// Execute the cell against the notebook's namespace and record the outcome.
    ///
    /// Assertion errors make the cell [`Outcome::Failed`]; every other exception makes it [`Outcome::Errored`].
    /// Exceptions never escape. A re-run overwrites the previous outcome.
    ///
    /// ## Returns
    /// The outcome and the rewritten traceback (empty when the cell passed).
    #[tracing::instrument(skip_all, fields(notebook = %self.notebook.name, cell = %self.name))]
    pub fn run<E: CellExecutor>(&mut self, executor: &mut E, namespace: &mut E::Namespace) -> (Outcome, String) {
        let (outcome, traceback) = match executor.execute(&self.source, namespace) {
            Ok(()) => (Outcome::Passed, String::new()),
            Err(exc) => {
                let outcome = if exc.is_assertion() {
                    Outcome::Failed
                } else {
                    Outcome::Errored
                };
                (outcome, self.rewrite_traceback(&exc.traceback))
            }
        };
        tracing::debug!(?outcome, "test cell finished");
        self.outcome = outcome;
        self.traceback = traceback.clone();
        (outcome, traceback)
    }

    /// Point the cell-level frame of an executor traceback at this cell.
    ///
    /// The header line is dropped, so the first line is the cell frame with the notebook path as its file and the
    /// cell name as its frame name. The offending source line follows it, indented. Deeper frames are kept as-is.
    pub fn rewrite_traceback(&self, traceback: &str) -> String {
        let mut lines: Vec<String> = traceback.split('\n').map(str::to_string).collect();
        if lines.len() < 2 {
            return traceback.to_string();
        }
        lines.remove(0);

        let frame = &lines[0];
        let line_number = FRAME_LINE_NUMBER
            .captures(frame)
            .and_then(|captures| captures[1].parse::<usize>().ok());
        lines[0] = frame
            .replace(&format!("\"{CELL_FILE}\""), &format!("\"{}\"", self.notebook.path.display()))
            .replace(MODULE_FRAME, &self.name);

        let source_line = line_number
            .and_then(|n| n.checked_sub(1))
            .and_then(|index| self.source.split('\n').nth(index));
        if let Some(source_line) = source_line {
            lines.insert(1, format!("{SOURCE_LINE_INDENT}{source_line}"));
        }
        lines.join("\n")
    }
}

/// Remove the magic line once, including its newline.
///
/// A cell made of the magic line alone has empty source.
fn strip_magic_line(raw: &str) -> &str {
    match raw.split_once('\n') {
        Some((first, rest)) if magic::is_test_cell(first) => rest,
        None if magic::is_test_cell(raw) => "",
        _ => raw,
    }
}

impl PartialEq for TestCell {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position && self.notebook.path == other.notebook.path
    }
}

impl Eq for TestCell {}

impl Hash for TestCell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.notebook.path.hash(state);
        self.position.hash(state);
    }
}

/// Displays as the cleaned source, the way the report quotes a cell.
impl fmt::Display for TestCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::{Interpreter, Namespace, SharedBuffer};

    fn notebook() -> Rc<NotebookRef> {
        Rc::new(NotebookRef {
            path: PathBuf::from("/work/test_sums.ipynb"),
            name: "test_sums.ipynb".to_string(),
        })
    }

    fn run(cell: &mut TestCell) -> (Outcome, String) {
        let mut interpreter = Interpreter::with_output(SharedBuffer::default());
        let mut namespace = Namespace::default();
        cell.run(&mut interpreter, &mut namespace)
    }

    #[test]
    fn test_name_and_flags_come_from_the_magic_line() {
        let cell = TestCell::new("%%testcell totals -n\nx = 1", notebook(), 0);
        assert_eq!(cell.name(), "totals");
        assert!(cell.ignore());
        assert_eq!(cell.source(), "x = 1");
        assert!(cell.advisories().is_empty());
    }

    #[test]
    fn test_missing_name_and_assert_are_advised() {
        let cell = TestCell::new("%%testcell # note\nx = 1", notebook(), 0);
        assert_eq!(cell.name(), UNNAMED_CELL);
        assert!(!cell.ignore());
        assert_eq!(cell.advisories(), &[Advisory::MissingName, Advisory::MissingAssert]);
    }

    #[test]
    fn test_magic_line_is_stripped_once() {
        let cell = TestCell::new("%%testcell a\n%%testcell b\nassert True", notebook(), 0);
        assert_eq!(cell.source(), "%%testcell b\nassert True");
        assert_eq!(TestCell::new("%%testcell alone", notebook(), 0).source(), "");
    }

    #[test]
    fn test_passing_cell_has_empty_traceback() {
        let mut cell = TestCell::new("%%testcell t1\nassert True", notebook(), 0);
        assert_eq!(run(&mut cell), (Outcome::Passed, String::new()));
        assert_eq!(cell.outcome(), Outcome::Passed);
    }

    #[test]
    fn test_failed_assertion_traceback_is_rewritten() {
        let mut cell = TestCell::new("%%testcell t1\nx = 2\nassert x == 3", notebook(), 0);
        let (outcome, traceback) = run(&mut cell);
        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(
            traceback,
            "  File \"/work/test_sums.ipynb\", line 2, in t1\n    assert x == 3\nAssertionError\n"
        );
        assert_eq!(cell.traceback(), traceback);
    }

    #[test]
    fn test_other_exceptions_error() {
        let mut cell = TestCell::new("%%testcell t1\nraise ValueError()", notebook(), 0);
        let (outcome, traceback) = run(&mut cell);
        assert_eq!(outcome, Outcome::Errored);
        assert!(traceback.ends_with("    raise ValueError()\nValueError\n"));
    }

    #[test]
    fn test_syntax_error_frame_is_rewritten_too() {
        let cell = TestCell::new("%%testcell broken\nx = = 1", notebook(), 0);
        let rewritten = cell.rewrite_traceback(
            "Traceback (most recent call last):\n  File \"<string>\", line 1\nSyntaxError: invalid syntax\n",
        );
        assert_eq!(
            rewritten,
            "  File \"/work/test_sums.ipynb\", line 1\n    x = = 1\nSyntaxError: invalid syntax\n"
        );
    }

    #[test]
    fn test_inner_frames_are_kept() {
        let cell = TestCell::new("%%testcell nested\ncheck()", notebook(), 0);
        let rewritten = cell.rewrite_traceback(
            "Traceback (most recent call last):\n  File \"<string>\", line 1, in <module>\n  File \"<string>\", line 2, in check\nValueError\n",
        );
        assert_eq!(
            rewritten,
            "  File \"/work/test_sums.ipynb\", line 1, in nested\n    check()\n  File \"<string>\", line 2, in check\nValueError\n"
        );
    }

    #[test]
    fn test_identity_is_notebook_and_position() {
        let a = TestCell::new("%%testcell same\nassert True", notebook(), 0);
        let b = TestCell::new("%%testcell same\nassert True", notebook(), 1);
        let other = Rc::new(NotebookRef {
            path: PathBuf::from("/work/test_other.ipynb"),
            name: "test_other.ipynb".to_string(),
        });
        let c = TestCell::new("%%testcell same\nassert True", other, 0);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_outcome_chars_round_trip() {
        for outcome in [Outcome::Passed, Outcome::Failed, Outcome::Errored] {
            let c = outcome.as_char().unwrap();
            assert_eq!(Outcome::from_char(c), Some(outcome));
        }
        assert_eq!(Outcome::NotRun.as_char(), None);
    }
}
