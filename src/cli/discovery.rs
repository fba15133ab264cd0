//! Locating test notebooks.
//!
//! Files named on the command line are taken as they are. Directories are searched recursively for file names
//! starting with `test_` and containing `.ipynb` after at least one more character; anything inside an
//! `.ipynb_checkpoints` directory is skipped. Directory entries are visited in file-name order.

use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Directory where Jupyter keeps autosave copies.
pub const CHECKPOINT_DIR: &str = ".ipynb_checkpoints";

const TEST_PREFIX: &str = "test_";
const NOTEBOOK_EXTENSION: &str = ".ipynb";

/// Errors that occur while locating notebooks
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("path does not exist: {}", .0.display())]
    MissingPath(PathBuf),

    #[error("cannot search {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("cannot determine the working directory: {0}")]
    WorkingDirectory(#[from] std::io::Error),
}

/// Whether a file name follows the test-notebook convention, `^test_.+\.ipynb`.
pub fn is_test_notebook_name(name: &str) -> bool {
    name.strip_prefix(TEST_PREFIX)
        .is_some_and(|rest| rest.match_indices(NOTEBOOK_EXTENSION).any(|(index, _)| index > 0))
}

/// Notebooks to run for the given command-line paths; no paths searches the working directory.
///
/// ## Errors
/// - [`DiscoveryError::MissingPath`] for a path that is neither a file nor a directory.
/// - [`DiscoveryError::Walk`] if a directory cannot be read.
#[tracing::instrument(skip_all, fields(paths = paths.len()))]
pub fn find_notebooks(paths: &[PathBuf]) -> Result<Vec<PathBuf>, DiscoveryError> {
    if paths.is_empty() {
        let cwd = std::env::current_dir()?;
        return search_directory(&cwd);
    }

    let mut notebooks = Vec::new();
    for path in paths {
        if path.is_file() {
            notebooks.push(path.clone());
        } else if path.is_dir() {
            notebooks.extend(search_directory(path)?);
        } else {
            return Err(DiscoveryError::MissingPath(path.clone()));
        }
    }
    tracing::debug!(found = notebooks.len(), "notebooks discovered");
    Ok(notebooks)
}

fn search_directory(root: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    let mut notebooks = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_checkpoint_dir(entry));
    for entry in walker {
        let entry = entry.map_err(|source| DiscoveryError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && is_test_notebook_name(&entry.file_name().to_string_lossy()) {
            notebooks.push(entry.into_path());
        }
    }
    Ok(notebooks)
}

fn is_checkpoint_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_type().is_dir() && entry.file_name() == CHECKPOINT_DIR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_convention() {
        assert!(is_test_notebook_name("test_sums.ipynb"));
        assert!(!is_test_notebook_name("test_.ipynb"));
        assert!(!is_test_notebook_name("sums_test.ipynb"));
        assert!(!is_test_notebook_name("test_sums.py"));
        assert!(!is_test_notebook_name("Test_sums.ipynb"));
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let err = find_notebooks(&[PathBuf::from("/nonexistent/testmynb/dir")]).unwrap_err();
        assert!(matches!(err, DiscoveryError::MissingPath(_)));
    }
}
