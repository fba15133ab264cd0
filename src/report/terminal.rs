use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::PathBuf;

use super::Reporter;
use super::style::{self, DEFAULT_WIDTH, RULE, green, h1, orange, red};
use crate::handler::{CellFailure, RunSummary};

/// Lines printed under the opening banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportHeader {
    pub version: String,
    pub platform: String,
    /// Name of the executed dialect, from [`crate::interp::CellExecutor::dialect`].
    pub dialect: String,
    pub working_directory: PathBuf,
}

impl ReportHeader {
    /// Header for the current process.
    pub fn detect(dialect: impl Into<String>) -> Self {
        Self {
            version: crate::version::TESTMYNB_VERSION.to_string(),
            platform: std::env::consts::OS.to_string(),
            dialect: dialect.into(),
            working_directory: std::env::current_dir().unwrap_or_default(),
        }
    }
}

/// Presentation switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub width: usize,
    pub color: bool,
    /// Print only the final tally.
    pub quiet: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            color: false,
            quiet: false,
        }
    }
}

/// The console report.
pub struct ConsoleReporter {
    out: Box<dyn Write>,
    header: ReportHeader,
    options: ReportOptions,
}

impl ConsoleReporter {
    pub fn new(out: impl Write + 'static, header: ReportHeader, options: ReportOptions) -> Self {
        Self {
            out: Box::new(out),
            header,
            options,
        }
    }

    /// A reporter on stdout sized to the terminal.
    pub fn stdout(header: ReportHeader, color: bool, quiet: bool) -> Self {
        let options = ReportOptions {
            width: style::terminal_width().unwrap_or(DEFAULT_WIDTH),
            color,
            quiet,
        };
        Self::new(io::stdout(), header, options)
    }

    /// The full report text.
    pub fn render(&self, summary: &RunSummary) -> String {
        let mut text = String::new();
        if !self.options.quiet {
            self.render_header(summary, &mut text);
            self.render_notebooks(summary, &mut text);
            if !summary.failures.is_empty() {
                let banner = red(h1("Failed Test(s)", self.options.width).trim_end(), self.options.color);
                self.render_failures(&banner, &summary.failures, &mut text);
            }
            if !summary.errors.is_empty() {
                let banner = orange(h1("Errored Test(s)", self.options.width).trim_end(), self.options.color);
                self.render_failures(&banner, &summary.errors, &mut text);
            }
            self.render_advisories(summary, &mut text);
        }
        text.push_str(&self.final_remarks(summary));
        text
    }

    fn render_header(&self, summary: &RunSummary, text: &mut String) {
        let header = &self.header;
        text.push_str(&h1(&format!("Test My Notebook ({})", header.version), self.options.width));
        let _ = writeln!(text, "Platform {}", header.platform);
        let _ = writeln!(text, "Executor {}", header.dialect);
        let _ = writeln!(text, "Working Directory: {}", header.working_directory.display());
        let _ = writeln!(text);
        let _ = writeln!(
            text,
            "{} test cells across {} notebook(s) detected.",
            summary.test_count,
            summary.notebooks.len()
        );
        let _ = writeln!(text);
    }

    fn render_notebooks(&self, summary: &RunSummary, text: &mut String) {
        text.push_str("Notebooks:\n");
        for notebook in &summary.notebooks {
            let trust = if notebook.trusted {
                green("Trusted", self.options.color)
            } else {
                red("Untrusted", self.options.color)
            };
            let _ = writeln!(text, "{trust} {}: {}", notebook.name, notebook.result);
        }
        let _ = writeln!(text);
    }

    fn render_failures(&self, banner: &str, failures: &[CellFailure], text: &mut String) {
        let _ = writeln!(text, "{banner}");
        for failure in failures {
            let _ = writeln!(text, "---- {}: {} ----", failure.notebook, failure.cell);
            let _ = writeln!(text, "{}", failure.source.trim_end_matches('\n'));
            let _ = writeln!(text, "{}", red(RULE, self.options.color));
            let _ = writeln!(text, "{}", failure.traceback.trim_end_matches('\n'));
            let _ = writeln!(text);
        }
    }

    fn render_advisories(&self, summary: &RunSummary, text: &mut String) {
        if summary.advisories.is_empty() {
            return;
        }
        let _ = writeln!(text, "{}", orange(h1("Warnings", self.options.width).trim_end(), self.options.color));
        for line in &summary.advisories {
            let _ = writeln!(text, "[testmynb] {}: {}: {}", line.notebook, line.cell, line.advisory);
        }
        let _ = writeln!(text);
    }

    fn final_remarks(&self, summary: &RunSummary) -> String {
        let color = self.options.color;
        let counts = summary.counts;
        let message = format!(
            "{}, {},{}",
            green(&format!("{} test(s) passed", counts.passed), color),
            red(&format!("{} failed", counts.failed), color),
            orange(&format!(" and {} raised an error", counts.errored), color),
        );
        h1(&message, self.options.width)
    }
}

impl Reporter for ConsoleReporter {
    fn report(&mut self, summary: &RunSummary) -> io::Result<()> {
        let text = self.render(summary);
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{Counts, NotebookLine};
    use crate::interp::SharedBuffer;

    fn header() -> ReportHeader {
        ReportHeader {
            version: "0.1.0".to_string(),
            platform: "linux".to_string(),
            dialect: "Python subset".to_string(),
            working_directory: PathBuf::from("/work"),
        }
    }

    fn summary() -> RunSummary {
        RunSummary {
            test_count: 2,
            notebooks: vec![NotebookLine {
                name: "test_sums.ipynb".to_string(),
                trusted: true,
                result: "..".to_string(),
            }],
            counts: Counts {
                passed: 2,
                failed: 0,
                errored: 0,
            },
            ..RunSummary::default()
        }
    }

    #[test]
    fn test_passing_run_has_no_failure_sections() {
        let reporter = ConsoleReporter::new(io::sink(), header(), ReportOptions::default());
        let text = reporter.render(&summary());
        assert!(text.starts_with("========================== Test My Notebook (0.1.0) ==========================\n"));
        assert!(text.contains("Trusted test_sums.ipynb: ..\n"));
        assert!(!text.contains("Failed Test(s)"));
        assert!(text.ends_with(" 2 test(s) passed, 0 failed, and 0 raised an error ==============\n"));
    }

    #[test]
    fn test_quiet_prints_only_the_tally() {
        let options = ReportOptions {
            quiet: true,
            ..ReportOptions::default()
        };
        let reporter = ConsoleReporter::new(io::sink(), header(), options);
        let text = reporter.render(&summary());
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_report_writes_to_sink() {
        let buffer = SharedBuffer::default();
        let mut reporter = ConsoleReporter::new(buffer.clone(), header(), ReportOptions::default());
        reporter.report(&summary()).unwrap();
        assert_eq!(buffer.contents(), reporter.render(&summary()));
    }

    #[test]
    fn test_colour_only_when_enabled() {
        let options = ReportOptions {
            color: true,
            ..ReportOptions::default()
        };
        let coloured = ConsoleReporter::new(io::sink(), header(), options).render(&summary());
        assert!(coloured.contains("\u{1b}[38;5;82mTrusted\u{1b}[0m"));
        let plain = ConsoleReporter::new(io::sink(), header(), ReportOptions::default()).render(&summary());
        assert_eq!(style::strip_ansi(&coloured), plain);
    }
}
