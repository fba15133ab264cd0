//! Running a set of notebooks and aggregating their outcomes.
//!
//! [`TestHandler`] runs notebooks one after another and unions their failure and error stacks. The outcome of the
//! whole run is a [`RunSummary`], which holds everything a [`crate::report::Reporter`] prints.
//!
//! ## Notes
//!
//! - Cells from different notebooks never collide in the unioned stacks, since cell identity includes the owning
//!   notebook's path.
//! - The run fails when any cell failed or errored. Advisories never affect this.

use indexmap::IndexMap;

use crate::config::AdvisoryMode;
use crate::interp::{CellExecutor, Interpreter};
use crate::notebook::{Advisory, Notebook, Outcome, TestCell};

/// Pass/fail/error tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counts {
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
}

impl Counts {
    /// Tally the characters of a result string.
    pub fn from_result(result: &str) -> Self {
        let mut counts = Self::default();
        for c in result.chars() {
            match Outcome::from_char(c) {
                Some(Outcome::Passed) => counts.passed += 1,
                Some(Outcome::Failed) => counts.failed += 1,
                Some(Outcome::Errored) => counts.errored += 1,
                Some(Outcome::NotRun) | None => {}
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.errored
    }
}

impl std::ops::AddAssign for Counts {
    fn add_assign(&mut self, other: Self) {
        self.passed += other.passed;
        self.failed += other.failed;
        self.errored += other.errored;
    }
}

/// One notebook's line in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookLine {
    pub name: String,
    pub trusted: bool,
    pub result: String,
}

/// A failed or errored cell in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellFailure {
    pub notebook: String,
    pub cell: String,
    pub source: String,
    pub traceback: String,
}

/// An advisory in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryLine {
    pub notebook: String,
    pub cell: String,
    pub advisory: Advisory,
}

/// Everything known about a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Number of test cells across all notebooks.
    pub test_count: usize,
    pub notebooks: Vec<NotebookLine>,
    pub failures: Vec<CellFailure>,
    pub errors: Vec<CellFailure>,
    /// Only filled when advisories are routed to the report.
    pub advisories: Vec<AdvisoryLine>,
    pub counts: Counts,
}

impl RunSummary {
    pub fn success(&self) -> bool {
        self.failures.is_empty() && self.errors.is_empty()
    }
}

/// Runs notebooks in order.
pub struct TestHandler<E: CellExecutor = Interpreter> {
    notebooks: Vec<Notebook<E>>,
    advisories: AdvisoryMode,
}

impl<E: CellExecutor> TestHandler<E> {
    pub fn new(notebooks: Vec<Notebook<E>>) -> Self {
        Self {
            notebooks,
            advisories: AdvisoryMode::default(),
        }
    }

    pub fn with_advisories(mut self, mode: AdvisoryMode) -> Self {
        self.advisories = mode;
        self
    }

    pub fn notebooks(&self) -> &[Notebook<E>] {
        &self.notebooks
    }

    /// Run every notebook, then summarise.
    #[tracing::instrument(skip_all, fields(notebooks = self.notebooks.len()))]
    pub fn run(&mut self, executor: &mut E) -> RunSummary {
        if self.advisories == AdvisoryMode::Log {
            self.log_advisories();
        }
        for notebook in &mut self.notebooks {
            notebook.run(executor);
        }
        let summary = self.summary();
        tracing::info!(
            passed = summary.counts.passed,
            failed = summary.counts.failed,
            errored = summary.counts.errored,
            "test run finished"
        );
        summary
    }

    /// Total number of test cells.
    pub fn test_count(&self) -> usize {
        self.notebooks.iter().map(|notebook| notebook.tests().len()).sum()
    }

    /// Errored cells of every notebook, in notebook then cell order.
    pub fn collect_errors(&self) -> IndexMap<&TestCell, &str> {
        let mut errors = IndexMap::new();
        for notebook in &self.notebooks {
            errors.extend(notebook.get_error_stack());
        }
        errors
    }

    /// Failed cells of every notebook, in notebook then cell order.
    pub fn collect_fails(&self) -> IndexMap<&TestCell, &str> {
        let mut fails = IndexMap::new();
        for notebook in &self.notebooks {
            fails.extend(notebook.get_fail_stack());
        }
        fails
    }

    /// Tallies over every notebook's result string. Notebooks that have not run count nothing.
    pub fn counts(&self) -> Counts {
        let mut counts = Counts::default();
        for notebook in &self.notebooks {
            counts += Counts::from_result(notebook.result().unwrap_or_default());
        }
        counts
    }

    /// Whether no cell failed or errored in the last run.
    pub fn success(&self) -> bool {
        self.collect_errors().is_empty() && self.collect_fails().is_empty()
    }

    pub fn summary(&self) -> RunSummary {
        let notebooks = self
            .notebooks
            .iter()
            .map(|notebook| NotebookLine {
                name: notebook.name().to_string(),
                trusted: notebook.trusted(),
                result: notebook.result().unwrap_or_default().to_string(),
            })
            .collect();
        let advisories = if self.advisories == AdvisoryMode::Report {
            self.advisory_lines().collect()
        } else {
            Vec::new()
        };
        RunSummary {
            test_count: self.test_count(),
            notebooks,
            failures: failure_lines(self.collect_fails()),
            errors: failure_lines(self.collect_errors()),
            advisories,
            counts: self.counts(),
        }
    }

    fn advisory_lines(&self) -> impl Iterator<Item = AdvisoryLine> + '_ {
        self.notebooks.iter().flat_map(|notebook| {
            notebook.tests().iter().flat_map(|cell| {
                cell.advisories().iter().map(|advisory| AdvisoryLine {
                    notebook: cell.notebook_name().to_string(),
                    cell: cell.name().to_string(),
                    advisory: *advisory,
                })
            })
        })
    }

    fn log_advisories(&self) {
        for line in self.advisory_lines() {
            tracing::warn!(notebook = %line.notebook, cell = %line.cell, "{}", line.advisory);
        }
    }
}

fn failure_lines(stack: IndexMap<&TestCell, &str>) -> Vec<CellFailure> {
    stack
        .into_iter()
        .map(|(cell, traceback)| CellFailure {
            notebook: cell.notebook_name().to_string(),
            cell: cell.name().to_string(),
            source: cell.source().to_string(),
            traceback: traceback.to_string(),
        })
        .collect()
}
