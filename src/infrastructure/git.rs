//! Repository synchronization through the `git` command line tool

use crate::error::{KlogError, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Version-controlled backing store of the log
pub trait VersionControl {
    /// Clone `uri` into `path`
    fn clone_from_remote(uri: &str, path: &Path) -> Result<Self>
    where
        Self: Sized;

    /// Fetch and merge the remote state
    fn pull(&self) -> Result<()>;

    /// Stage every change and commit it. Returns false when there was
    /// nothing to commit.
    fn commit_all(&self, message: &str) -> Result<bool>;

    /// Publish local commits to the remote
    fn push(&self) -> Result<()>;
}

/// A local git clone driven through `git -C <path>`
#[derive(Debug, Clone)]
pub struct GitRepository {
    path: PathBuf,
}

impl GitRepository {
    /// Use an existing clone at `path`
    pub fn open(path: PathBuf) -> Self {
        GitRepository { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn git(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(&self.path);
        cmd
    }

    /// Run a git command, failing on a non-zero exit status
    fn run(mut cmd: Command, what: &str) -> Result<()> {
        debug!("Running {:?}", cmd);
        let status = cmd
            .status()
            .map_err(|e| KlogError::Sync(format!("failed to run git {}: {}", what, e)))?;

        if !status.success() {
            return Err(KlogError::Sync(format!(
                "git {} exited with {}",
                what, status
            )));
        }
        Ok(())
    }
}

impl VersionControl for GitRepository {
    fn clone_from_remote(uri: &str, path: &Path) -> Result<Self> {
        info!("Cloning {} into {}", uri, path.display());

        let mut cmd = Command::new("git");
        cmd.arg("clone").arg(uri).arg(path);
        Self::run(cmd, "clone")?;

        Ok(GitRepository::open(path.to_path_buf()))
    }

    fn pull(&self) -> Result<()> {
        info!("Pulling {}", self.path.display());
        let mut cmd = self.git();
        cmd.arg("pull").arg("--ff-only");
        Self::run(cmd, "pull")
    }

    fn commit_all(&self, message: &str) -> Result<bool> {
        let mut add = self.git();
        add.arg("add").arg("--all");
        Self::run(add, "add")?;

        // `diff --cached --quiet` exits 0 when the index matches HEAD
        let mut diff = self.git();
        diff.arg("diff").arg("--cached").arg("--quiet");
        let status = diff
            .status()
            .map_err(|e| KlogError::Sync(format!("failed to run git diff: {}", e)))?;
        if status.success() {
            debug!("Nothing staged, skipping commit");
            return Ok(false);
        }

        let mut commit = self.git();
        commit.arg("commit").arg("--quiet").arg("-m").arg(message);
        Self::run(commit, "commit")?;

        info!("Committed: {}", message);
        Ok(true)
    }

    fn push(&self) -> Result<()> {
        info!("Pushing {}", self.path.display());
        let mut cmd = self.git();
        cmd.arg("push");
        Self::run(cmd, "push")
    }
}
