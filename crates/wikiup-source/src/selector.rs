//! Candidate file selection.
//!
//! A run's candidates come from exactly one source: paths named on the
//! command line, or the files touched by the most recent commit of a git
//! repository. Explicit directories are walked recursively for Markdown
//! files; explicit files are taken as-is, whatever their extension.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::warn;

use crate::git;

/// Where candidate files come from, resolved once at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputSet {
    /// Files and directories named on the command line.
    ExplicitPaths(Vec<PathBuf>),
    /// Markdown files touched by the last commit of this repository.
    GitDiff(PathBuf),
}

/// Selection error.
#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    /// Neither explicit paths nor a usable git repository.
    #[error("no input files: pass files or directories, or run inside a git repository")]
    NoInput,

    /// A git invocation failed.
    #[error("{0}")]
    Git(String),
}

/// Resolve the input mode for a run.
///
/// Explicit paths win over git selection; when no paths are given and
/// `repo` is not inside a git work tree there is nothing to publish from.
pub fn resolve_inputs(paths: Vec<PathBuf>, repo: &Path) -> Result<InputSet, SelectError> {
    if !paths.is_empty() {
        return Ok(InputSet::ExplicitPaths(paths));
    }
    if git::is_git_repo(repo) {
        return Ok(InputSet::GitDiff(repo.to_path_buf()));
    }
    Err(SelectError::NoInput)
}

/// Produce the ordered, de-duplicated candidate list for an input set.
///
/// Paths that name nothing on disk are logged and skipped. Duplicates are
/// detected on the resolved path, so a file reached both directly and via
/// its directory appears once, at its first position.
pub fn select_files(input: &InputSet) -> Result<Vec<PathBuf>, SelectError> {
    let mut selection = Selection::default();
    match input {
        InputSet::ExplicitPaths(paths) => {
            for path in paths {
                if path.is_dir() {
                    collect_directory(path, &mut selection);
                } else if path.is_file() {
                    selection.push(path.clone());
                } else {
                    warn!("Skipping {}: no such file or directory", path.display());
                }
            }
        }
        InputSet::GitDiff(repo) => {
            for path in git::changed_markdown_files(repo)? {
                selection.push(path);
            }
        }
    }
    Ok(selection.into_paths())
}

/// Ordered set of selected paths, keyed by their canonical form.
#[derive(Default)]
struct Selection {
    seen: HashSet<PathBuf>,
    paths: Vec<PathBuf>,
}

impl Selection {
    fn push(&mut self, path: PathBuf) {
        let key = path.canonicalize().unwrap_or_else(|_| path.clone());
        if self.seen.insert(key) {
            self.paths.push(path);
        }
    }

    fn into_paths(self) -> Vec<PathBuf> {
        self.paths
    }
}

/// Walk a directory for Markdown files, hidden entries excluded.
fn collect_directory(dir: &Path, selection: &mut Selection) {
    let walker = WalkBuilder::new(dir)
        .standard_filters(false)
        .hidden(true)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();
    for entry in walker {
        match entry {
            Ok(entry) => {
                let is_file = entry.file_type().is_some_and(|file_type| file_type.is_file());
                if is_file && git::is_markdown(entry.path()) {
                    selection.push(entry.path().to_path_buf());
                }
            }
            Err(err) => warn!("Skipping unreadable entry under {}: {err}", dir.display()),
        }
    }
}
