use super::{FileChange, RepoInspector, lock_file_excludes, parse_numstat};
use crate::errors::GitError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// [`RepoInspector`] backed by the `git` binary.
pub struct GitCli {
    repo_dir: PathBuf,
}

impl GitCli {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
        }
    }

    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    /// Run git with `args` and return stdout.
    ///
    /// Non-zero exits become [`GitError::CommandFailed`] carrying stderr.
    /// The child is killed if the returned future is dropped.
    async fn run<S: AsRef<str>>(&self, args: &[S]) -> Result<String, GitError> {
        let args: Vec<&str> = args.iter().map(|a| a.as_ref()).collect();
        let joined = args.join(" ");
        tracing::debug!(args = %joined, "running git");

        let output = Command::new("git")
            .args(&args)
            .current_dir(&self.repo_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(GitError::Spawn)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let stderr = if stderr.is_empty() {
                output.status.to_string()
            } else {
                stderr
            };
            return Err(GitError::CommandFailed {
                args: joined,
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Build `diff [--cached] <excludes> [-- paths]`.
    fn diff_args(cached: bool, paths: &[String]) -> Vec<String> {
        let mut args = vec!["diff".to_string()];
        if cached {
            args.push("--cached".to_string());
        }
        args.extend(lock_file_excludes());
        if !paths.is_empty() {
            args.push("--".to_string());
            args.extend(paths.iter().cloned());
        }
        args
    }

    /// Staged then unstaged diff for `paths` (all paths when empty).
    async fn combined_diff(&self, paths: &[String]) -> Result<String, GitError> {
        let staged_args = Self::diff_args(true, paths);
        let unstaged_args = Self::diff_args(false, paths);
        let (staged, unstaged) =
            tokio::try_join!(self.run(&staged_args), self.run(&unstaged_args))?;
        Ok(format!("{}\n{}", staged, unstaged))
    }
}

#[async_trait]
impl RepoInspector for GitCli {
    async fn status(&self) -> Result<String, GitError> {
        self.run(&["status"]).await
    }

    async fn diff(&self) -> Result<String, GitError> {
        self.combined_diff(&[]).await
    }

    async fn diff_stat_staged(&self) -> Result<Vec<FileChange>, GitError> {
        let out = self.run(&["diff", "--numstat", "--cached"]).await?;
        Ok(parse_numstat(&out))
    }

    async fn diff_stat_unstaged(&self) -> Result<Vec<FileChange>, GitError> {
        let out = self.run(&["diff", "--numstat"]).await?;
        Ok(parse_numstat(&out))
    }

    async fn diff_files(&self, paths: &[String]) -> Result<String, GitError> {
        if paths.is_empty() {
            return Ok(String::new());
        }
        self.combined_diff(paths).await
    }

    async fn history(&self, limit: usize) -> Result<String, GitError> {
        let count = format!("-{}", limit);
        self.run(&["log", count.as_str(), "--oneline"]).await
    }

    async fn stage_all(&self) -> Result<(), GitError> {
        self.run(&["add", "."]).await.map(|_| ())
    }

    async fn commit(&self, message: &str) -> Result<(), GitError> {
        self.run(&["commit", "-m", message]).await.map(|_| ())
    }

    async fn head_short_sha(&self) -> Result<Option<String>, GitError> {
        match self.run(&["rev-parse", "--short", "HEAD"]).await {
            Ok(out) => Ok(Some(out.trim().to_string())),
            Err(GitError::CommandFailed { stderr, .. })
                if stderr.contains("unknown revision") || stderr.contains("ambiguous argument") =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Repository;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn setup_repo() -> (GitCli, TempDir) {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "test").unwrap();
        config.set_str("user.email", "test@test.com").unwrap();
        drop(config);
        (GitCli::new(dir.path()), dir)
    }

    fn commit_all(dir: &Path, msg: &str) {
        let repo = Repository::open(dir).unwrap();
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = git2::Signature::now("test", "test@test.com").unwrap();
        if let Ok(head) = repo.head() {
            let parent = head.peel_to_commit().unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, msg, &tree, &[&parent])
                .unwrap();
        } else {
            repo.commit(Some("HEAD"), &sig, &sig, msg, &tree, &[])
                .unwrap();
        }
    }

    fn stage(dir: &Path, name: &str) {
        let repo = Repository::open(dir).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
    }

    #[test]
    fn test_diff_args_shape() {
        let args = GitCli::diff_args(true, &["src/app.ts".to_string()]);
        assert_eq!(args[0], "diff");
        assert_eq!(args[1], "--cached");
        assert!(args.contains(&":(exclude)yarn.lock".to_string()));
        let sep = args.iter().position(|a| a == "--").unwrap();
        assert_eq!(args[sep + 1], "src/app.ts");
        assert_eq!(sep + 2, args.len());

        let unstaged = GitCli::diff_args(false, &[]);
        assert!(!unstaged.contains(&"--cached".to_string()));
        assert!(!unstaged.contains(&"--".to_string()));
    }

    #[tokio::test]
    async fn test_history_fails_on_unborn_branch() {
        let (git, _dir) = setup_repo();
        let err = git.history(10).await.unwrap_err();
        assert!(err.is_unborn_branch());
        assert_eq!(git.head_short_sha().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_history_lists_commits_newest_first() {
        let (git, dir) = setup_repo();
        fs::write(dir.path().join("a.txt"), "one\n").unwrap();
        commit_all(dir.path(), "first commit");
        fs::write(dir.path().join("a.txt"), "two\n").unwrap();
        commit_all(dir.path(), "second commit");

        let log = git.history(10).await.unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("second commit"));
        assert!(lines[1].ends_with("first commit"));

        let one = git.history(1).await.unwrap();
        assert_eq!(one.lines().count(), 1);
        assert!(git.head_short_sha().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_diff_excludes_lock_files() {
        let (git, dir) = setup_repo();
        fs::write(dir.path().join("app.ts"), "let a = 1;\n").unwrap();
        fs::write(dir.path().join("package-lock.json"), "{}\n").unwrap();
        commit_all(dir.path(), "init");

        fs::write(dir.path().join("app.ts"), "let a = 2;\n").unwrap();
        fs::write(
            dir.path().join("package-lock.json"),
            "{\"lockfileVersion\": 3}\n",
        )
        .unwrap();

        let diff = git.diff().await.unwrap();
        assert!(diff.contains("let a = 2;"));
        assert!(!diff.contains("lockfileVersion"));

        let selected = git
            .diff_files(&["app.ts".to_string(), "package-lock.json".to_string()])
            .await
            .unwrap();
        assert!(selected.contains("let a = 2;"));
        assert!(!selected.contains("lockfileVersion"));

        // Stats still report the lock file.
        let stats = git.diff_stat_unstaged().await.unwrap();
        assert!(stats.iter().any(|c| c.path == "package-lock.json"));
    }

    #[tokio::test]
    async fn test_diff_combines_staged_and_unstaged() {
        let (git, dir) = setup_repo();
        fs::write(dir.path().join("a.rs"), "fn a() {}\n").unwrap();
        fs::write(dir.path().join("b.rs"), "fn b() {}\n").unwrap();
        commit_all(dir.path(), "init");

        fs::write(dir.path().join("a.rs"), "fn a_staged() {}\n").unwrap();
        stage(dir.path(), "a.rs");
        fs::write(dir.path().join("b.rs"), "fn b_unstaged() {}\n").unwrap();

        let diff = git.diff().await.unwrap();
        assert!(diff.contains("a_staged"));
        assert!(diff.contains("b_unstaged"));

        let staged = git.diff_stat_staged().await.unwrap();
        assert_eq!(staged, vec![FileChange::new("a.rs", 1, 1)]);
        let unstaged = git.diff_stat_unstaged().await.unwrap();
        assert_eq!(unstaged, vec![FileChange::new("b.rs", 1, 1)]);
    }

    #[tokio::test]
    async fn test_diff_files_empty_paths_is_empty() {
        let (git, _dir) = setup_repo();
        assert_eq!(git.diff_files(&[]).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_stage_all_and_commit() {
        let (git, dir) = setup_repo();
        fs::write(dir.path().join("new.txt"), "hello\n").unwrap();
        git.stage_all().await.unwrap();

        let staged = git.diff_stat_staged().await.unwrap();
        assert_eq!(staged, vec![FileChange::new("new.txt", 1, 0)]);

        git.commit("Add greeting").await.unwrap();
        let log = git.history(10).await.unwrap();
        assert!(log.contains("Add greeting"));
    }

    #[tokio::test]
    async fn test_status_outside_repository_fails() {
        let dir = tempdir().unwrap();
        let git = GitCli::new(dir.path());
        let err = git.status().await.unwrap_err();
        assert!(matches!(err, GitError::CommandFailed { .. }));
    }
}
