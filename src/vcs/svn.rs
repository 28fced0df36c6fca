// src/vcs/svn.rs

use std::path::Path;
use std::process::Command;

use tracing::info;

use crate::vcs::{VcsClient, VcsError};

/// Version-control client backed by the `svn` command-line tool.
///
/// Every call runs one subprocess with `--non-interactive`, so a missing or
/// mis-configured credential fails fast instead of hanging on a prompt.
pub struct SvnCliClient {
    username: Option<String>,
    password: Option<String>,
}

impl SvnCliClient {
    pub fn new(username: Option<String>, password: Option<String>) -> Self {
        Self { username, password }
    }

    fn command(&self, subcommand: &str) -> Command {
        let mut cmd = Command::new("svn");
        cmd.arg(subcommand).arg("--non-interactive");
        if let Some(user) = &self.username {
            cmd.arg("--username").arg(user);
        }
        if let Some(pass) = &self.password {
            cmd.arg("--password").arg(pass);
        }
        cmd
    }

    /// Run a prepared command, mapping a non-zero exit into a [`VcsError`]
    /// that names `path` and carries the trimmed stderr as root cause.
    fn run(&self, mut cmd: Command, path: &Path) -> Result<std::process::Output, VcsError> {
        let output = cmd
            .output()
            .map_err(|err| VcsError::new(-1, path, format!("spawning svn: {err}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VcsError::new(
                output.status.code().unwrap_or(-1),
                path,
                stderr.trim().to_string(),
            ));
        }

        Ok(output)
    }
}

impl VcsClient for SvnCliClient {
    fn is_working_copy(&self, path: &Path) -> bool {
        // `svn info` succeeds only inside a working copy.
        let mut cmd = self.command("info");
        cmd.arg(path);
        cmd.output().map(|out| out.status.success()).unwrap_or(false)
    }

    fn check_out(&self, url: &str, path: &Path) -> Result<bool, VcsError> {
        let mut cmd = self.command("checkout");
        cmd.arg("--ignore-externals").arg(url).arg(path);
        self.run(cmd, path)?;
        info!(path = %path.display(), url, "svn checked out working copy");
        Ok(true)
    }

    fn add(&self, path: &Path) -> Result<bool, VcsError> {
        let mut cmd = self.command("add");
        cmd.arg("--parents").arg(path);
        self.run(cmd, path)?;
        info!(path = %path.display(), "svn added");
        Ok(true)
    }

    fn commit(&self, path: &Path) -> Result<bool, VcsError> {
        let mut cmd = self.command("commit");
        cmd.arg("--depth")
            .arg("infinity")
            .arg("-m")
            .arg(format!("Committed by the relaywatch service. {}", path.display()))
            .arg(path);
        let output = self.run(cmd, path)?;

        // An empty commit exits 0 with no output; report it as "nothing to do"
        // rather than a success that did not happen.
        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            info!(path = %path.display(), "svn commit found no modification");
            return Ok(false);
        }

        info!(path = %path.display(), "svn committed");
        Ok(true)
    }

    fn delete(&self, path: &Path) -> Result<bool, VcsError> {
        let mut cmd = self.command("delete");
        cmd.arg("--force").arg(path);
        self.run(cmd, path)?;
        info!(path = %path.display(), "svn deleted");
        Ok(true)
    }
}
