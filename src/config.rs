//! Run configuration for testmynb
//!
//! Built by the CLI from flags and environment variables; library users construct it directly.

use std::path::PathBuf;

/// When to colour report output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Colour when writing to a terminal
    #[default]
    Auto,
    Always,
    Never,
}

/// Where cell advisories (missing name, missing assert) go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum AdvisoryMode {
    /// Drop them
    Off,
    /// Emit them as `warn` log events
    #[default]
    Log,
    /// Print them in a `Warnings` section of the report
    Report,
}

/// Run configuration
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// Notebook files or directories to search; empty means the working directory
    pub paths: Vec<PathBuf>,
    pub color: ColorChoice,
    /// Report width in columns; `None` uses the terminal width
    pub width: Option<usize>,
    pub advisories: AdvisoryMode,
    /// Print only the final tally
    pub quiet: bool,
}

impl RunConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    /// Set a fixed report width
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_advisories(mut self, mode: AdvisoryMode) -> Self {
        self.advisories = mode;
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Whether output should be coloured, given whether stdout is a terminal.
    pub fn use_color(&self, is_terminal: bool) -> bool {
        match self.color {
            ColorChoice::Auto => is_terminal,
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert!(config.paths.is_empty());
        assert_eq!(config.color, ColorChoice::Auto);
        assert_eq!(config.width, None);
        assert_eq!(config.advisories, AdvisoryMode::Log);
        assert!(!config.quiet);
    }

    #[test]
    fn test_builder_chain() {
        let config = RunConfig::new()
            .with_paths(vec![PathBuf::from("notebooks")])
            .with_color(ColorChoice::Never)
            .with_width(100)
            .with_advisories(AdvisoryMode::Report)
            .with_quiet(true);
        assert_eq!(config.paths, vec![PathBuf::from("notebooks")]);
        assert_eq!(config.width, Some(100));
        assert_eq!(config.advisories, AdvisoryMode::Report);
        assert!(config.quiet);
    }

    #[test]
    fn test_use_color() {
        assert!(RunConfig::new().use_color(true));
        assert!(!RunConfig::new().use_color(false));
        assert!(RunConfig::new().with_color(ColorChoice::Always).use_color(false));
        assert!(!RunConfig::new().with_color(ColorChoice::Never).use_color(true));
    }
}
