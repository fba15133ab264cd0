//! Presenting a finished run.
//!
//! A [`Reporter`] receives the [`RunSummary`] of a run. [`ConsoleReporter`] prints the human-readable report:
//!
//! ```text
//! ================= Test My Notebook (0.1.0) =================
//! Platform linux
//! Executor Python subset (testmynb 0.1.0)
//! Working Directory: /work
//!
//! 2 test cells across 1 notebook(s) detected.
//!
//! Notebooks:
//! Untrusted test_sums.ipynb: .F
//!
//! ====================== Failed Test(s) ======================
//! ---- test_sums.ipynb: totals ----
//! assert 1 + 1 == 3
//! -----------------------------------------
//!   File "/work/test_sums.ipynb", line 1, in totals
//!     assert 1 + 1 == 3
//! AssertionError
//!
//! ========= 1 test(s) passed, 1 failed, and 0 raised an error =========
//! ```

mod terminal;
pub mod style;

use std::io;

pub use terminal::{ConsoleReporter, ReportHeader, ReportOptions};

use crate::handler::RunSummary;

/// Receives the outcome of a run.
pub trait Reporter {
    /// ## Errors
    /// Returns any error from writing the report.
    fn report(&mut self, summary: &RunSummary) -> io::Result<()>;
}
