//! Git subprocess helpers for diff-based selection.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::selector::SelectError;

/// Run a git command in the given repository.
fn run_git(args: &[&str], repo: &Path) -> std::io::Result<Output> {
    Command::new("git").args(args).current_dir(repo).output()
}

/// Whether the path is a directory inside a git work tree.
pub(crate) fn is_git_repo(path: &Path) -> bool {
    path.is_dir()
        && run_git(&["rev-parse", "--git-dir"], path)
            .map(|output| output.status.success())
            .unwrap_or(false)
}

/// Markdown files added or modified by the most recent commit.
///
/// `diff-tree --root` makes a root commit list its whole tree, so the
/// first commit of a repository behaves like any other. Paths that no
/// longer exist in the work tree are dropped.
pub(crate) fn changed_markdown_files(repo: &Path) -> Result<Vec<PathBuf>, SelectError> {
    let args = [
        "diff-tree",
        "--no-commit-id",
        "--name-only",
        "-r",
        "--root",
        "--diff-filter=AM",
        "HEAD",
    ];
    let output = run_git(&args, repo).map_err(|e| SelectError::Git(format!("failed to run git: {e}")))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SelectError::Git(format!("git diff-tree failed: {}", stderr.trim())));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let files = stdout
        .lines()
        .filter(|line| is_markdown(Path::new(line)))
        .map(|line| repo.join(line))
        .filter(|path| path.is_file())
        .collect();
    Ok(files)
}

pub(crate) fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn git(args: &[&str], dir: &Path) {
        let output = Command::new("git").args(args).current_dir(dir).output().unwrap();
        assert!(
            output.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    fn init_repo(dir: &Path) {
        git(&["init", "-q"], dir);
        git(&["config", "user.email", "ci@example.invalid"], dir);
        git(&["config", "user.name", "CI"], dir);
        git(&["config", "commit.gpgsign", "false"], dir);
    }

    fn commit_all(dir: &Path, message: &str) {
        git(&["add", "-A"], dir);
        git(&["commit", "-qm", message], dir);
    }

    #[test]
    fn test_root_commit_lists_its_markdown_files() {
        let dir = TempDir::new().unwrap();
        init_repo(dir.path());
        fs::write(dir.path().join("a.md"), "# a\n").unwrap();
        fs::write(dir.path().join("b.txt"), "b\n").unwrap();
        commit_all(dir.path(), "initial");

        let files = changed_markdown_files(dir.path()).unwrap();
        assert_eq!(files, vec![dir.path().join("a.md")]);
    }

    #[test]
    fn test_only_last_commit_is_considered() {
        let dir = TempDir::new().unwrap();
        init_repo(dir.path());
        fs::write(dir.path().join("old.md"), "# old\n").unwrap();
        commit_all(dir.path(), "first");
        fs::write(dir.path().join("new.md"), "# new\n").unwrap();
        commit_all(dir.path(), "second");

        let files = changed_markdown_files(dir.path()).unwrap();
        assert_eq!(files, vec![dir.path().join("new.md")]);
    }

    #[test]
    fn test_modified_files_are_included() {
        let dir = TempDir::new().unwrap();
        init_repo(dir.path());
        fs::write(dir.path().join("doc.md"), "v1\n").unwrap();
        commit_all(dir.path(), "first");
        fs::write(dir.path().join("doc.md"), "v2\n").unwrap();
        commit_all(dir.path(), "second");

        let files = changed_markdown_files(dir.path()).unwrap();
        assert_eq!(files, vec![dir.path().join("doc.md")]);
    }

    #[test]
    fn test_deleted_files_are_dropped() {
        let dir = TempDir::new().unwrap();
        init_repo(dir.path());
        fs::write(dir.path().join("doc.md"), "v1\n").unwrap();
        commit_all(dir.path(), "first");
        fs::remove_file(dir.path().join("doc.md")).unwrap();
        commit_all(dir.path(), "remove");

        let files = changed_markdown_files(dir.path()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_repo_without_commits_is_an_error() {
        let dir = TempDir::new().unwrap();
        init_repo(dir.path());
        assert!(matches!(
            changed_markdown_files(dir.path()),
            Err(SelectError::Git(_))
        ));
    }

    #[test]
    fn test_is_git_repo() {
        let plain = TempDir::new().unwrap();
        assert!(!is_git_repo(plain.path()));

        let repo = TempDir::new().unwrap();
        init_repo(repo.path());
        assert!(is_git_repo(repo.path()));
    }

    #[test]
    fn test_is_markdown_matches_extension_case_insensitively() {
        assert!(is_markdown(Path::new("a.md")));
        assert!(is_markdown(Path::new("a.MD")));
        assert!(!is_markdown(Path::new("a.markdown.txt")));
        assert!(!is_markdown(Path::new("md")));
    }
}
