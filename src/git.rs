use crate::constants::DEFAULT_CONTEXT;
use anyhow::{Context, Result, bail};
use git2::{Delta, DiffFormat, DiffOptions, Repository, RepositoryState, Tree};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// the version control operations a commit run needs
pub trait Vcs {
    /// fail unless we're inside a repository that can take a commit
    fn assert_repo(&self) -> Result<()>;

    /// every path differing between HEAD and the working tree, staged or not
    fn changed_files(&self) -> Result<Vec<String>>;

    /// every path differing between HEAD and the index
    fn staged_files(&self) -> Result<Vec<String>>;

    fn stage_files(&self, files: &[String]) -> Result<()>;

    /// unified diff of the index against HEAD, limited to `files`
    fn diff(&self, files: &[String]) -> Result<String>;

    /// commit the index, returning git's stdout
    fn commit(&self, message: &str) -> Result<String>;

    /// push the current branch, returning git's stdout
    fn push(&self) -> Result<String>;
}

/// a git repository found from a path somewhere inside it
pub struct GitRepo {
    path: PathBuf,
}

impl GitRepo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn open(&self) -> Result<Repository> {
        Repository::discover(&self.path).context("not in a git repository")
    }

    fn workdir(repo: &Repository) -> Result<&Path> {
        match repo.workdir() {
            Some(workdir) => Ok(workdir),
            None => bail!("bare repositories are not supported"),
        }
    }

    /// run the git binary so hooks, signing and credential helpers behave as usual
    fn run_git(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.path)
            .stdin(Stdio::inherit())
            .output()
            .with_context(|| format!("failed to run git {}", args[0]))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let detail = [stderr.trim(), stdout.trim()]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            bail!("git {} failed ({}): {}", args[0], output.status, detail);
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Vcs for GitRepo {
    fn assert_repo(&self) -> Result<()> {
        let repo = self.open()?;
        Self::workdir(&repo)?;

        // check we're not in the middle of a git operation
        if repo.state() != RepositoryState::Clean {
            bail!("repository is in the middle of an operation (merge, rebase, etc)");
        }

        // check we're not on a detached HEAD
        if repo.head_detached().unwrap_or(false) {
            bail!("repository is in detached HEAD state");
        }

        Ok(())
    }

    fn changed_files(&self) -> Result<Vec<String>> {
        let repo = self.open()?;
        let tree = head_tree(&repo)?;

        let mut opts = DiffOptions::new();
        opts.include_untracked(true);
        opts.recurse_untracked_dirs(true);
        let diff = repo
            .diff_tree_to_workdir_with_index(tree.as_ref(), Some(&mut opts))
            .context("failed to diff working tree")?;

        Ok(paths_from_git_diff(&diff))
    }

    fn staged_files(&self) -> Result<Vec<String>> {
        let repo = self.open()?;
        let tree = head_tree(&repo)?;
        let diff = repo
            .diff_tree_to_index(tree.as_ref(), None, None)
            .context("failed to diff index")?;

        Ok(paths_from_git_diff(&diff))
    }

    fn stage_files(&self, files: &[String]) -> Result<()> {
        let repo = self.open()?;
        let workdir = Self::workdir(&repo)?.to_path_buf();
        let mut index = repo.index().context("failed to get git index")?;

        // collect all errors before writing index
        let mut errors = Vec::new();

        for file in files {
            let path = Path::new(file);
            // deleted files leave the index, everything else is added as-is
            let result = if workdir.join(path).symlink_metadata().is_ok() {
                index.add_path(path)
            } else {
                index.remove_path(path)
            };
            if let Err(e) = result {
                errors.push(format!("{file}: {e}"));
            }
        }

        // if there were any errors, reload index to rollback and report errors
        if !errors.is_empty() {
            if let Err(e) = index.read(true) {
                crate::warning!("failed to reload index during rollback: {}", e);
            }
            bail!("failed to stage files:\n  {}", errors.join("\n  "));
        }

        index.write().context("failed to write git index")
    }

    fn diff(&self, files: &[String]) -> Result<String> {
        let repo = self.open()?;
        let tree = head_tree(&repo)?;

        let mut opts = DiffOptions::new();
        opts.context_lines(DEFAULT_CONTEXT);
        opts.disable_pathspec_match(true);
        for file in files {
            opts.pathspec(file.as_str());
        }
        let diff = repo
            .diff_tree_to_index(tree.as_ref(), None, Some(&mut opts))
            .context("failed to create diff")?;

        format_diff(&diff)
    }

    fn commit(&self, message: &str) -> Result<String> {
        self.run_git(&["commit", "--message", message])
    }

    fn push(&self) -> Result<String> {
        self.run_git(&["push"])
    }
}

/// tree of HEAD, or None on an unborn branch (compare against the empty tree)
fn head_tree(repo: &Repository) -> Result<Option<Tree<'_>>> {
    match repo.head() {
        Ok(head) => Ok(Some(head.peel_to_tree().context("failed to get tree")?)),
        Err(e) if e.code() == git2::ErrorCode::UnbornBranch => Ok(None),
        Err(e) => Err(e).context("failed to get HEAD"),
    }
}

/// paths touched by a diff, in listing order
fn paths_from_git_diff(diff: &git2::Diff) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();

    for delta in diff.deltas() {
        let file = match delta.status() {
            Delta::Deleted => delta.old_file(),
            Delta::Added
            | Delta::Modified
            | Delta::Typechange
            | Delta::Renamed
            | Delta::Copied
            | Delta::Untracked => delta.new_file(),
            _ => continue, // skip ignored, unmodified, etc.
        };

        if let Some(path) = file.path() {
            let path = path.to_string_lossy().to_string();
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }

    paths
}

/// check if file diff should be ignored (lock files, minified files, etc.)
fn should_ignore_diff(path: &str) -> bool {
    let path_lower = path.to_lowercase();

    if path_lower.ends_with("-lock.json") || path_lower.ends_with("-lock.yaml") {
        return true;
    }

    if Path::new(&path_lower)
        .extension()
        .is_some_and(|ext| ext == "lock")
    {
        return true;
    }

    [".min.js", ".min.css", "-min.js", "-min.css"]
        .iter()
        .any(|suffix| path_lower.ends_with(suffix))
}

/// format a diff object into unified diff string, summarising ignored files
fn format_diff(diff: &git2::Diff) -> Result<String> {
    use std::fmt::Write;

    let mut output = String::new();
    let mut skip_current_file = false;

    diff.print(DiffFormat::Patch, |delta, _hunk, line| {
        let origin = line.origin();

        // file header decides whether the rest of this file is shown
        if origin == 'F' {
            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_default();
            let is_binary = delta.new_file().is_binary() || delta.old_file().is_binary();
            skip_current_file = is_binary || should_ignore_diff(&path);

            if skip_current_file {
                let _ = writeln!(output, "--- {path} (diff ignored)");
                return true;
            }
        }

        if skip_current_file {
            return true;
        }

        if matches!(origin, '+' | '-' | ' ') {
            output.push(origin);
        }
        output.push_str(&String::from_utf8_lossy(line.content()));
        true
    })
    .context("failed to format diff")?;

    Ok(output.trim_end_matches('\n').to_string())
}
