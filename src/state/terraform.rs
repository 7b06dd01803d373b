//! Terraform CLI state backend.
//!
//! Drives `terraform state list|mv|rm` as child processes. Standard error of a
//! failed invocation is captured and returned as the diagnostic text.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::StateError;

use super::store::StateBackend;
use super::types::ResourceAddress;

/// Default executable name, resolved through `PATH`.
pub const DEFAULT_TERRAFORM_BIN: &str = "terraform";

/// State backend that shells out to the Terraform CLI.
#[derive(Debug, Clone)]
pub struct TerraformCli {
    /// Executable to invoke.
    program: PathBuf,
    /// Directory the executable runs in.
    working_dir: Option<PathBuf>,
    /// Value passed as `-lock=<bool>` to every mutating call.
    lock: bool,
}

impl TerraformCli {
    /// Creates a backend for the given executable with state locking enabled.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            working_dir: None,
            lock: true,
        }
    }

    /// Sets the directory Terraform runs in.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Sets whether Terraform should lock the state for each operation.
    #[must_use]
    pub const fn with_lock(mut self, lock: bool) -> Self {
        self.lock = lock;
        self
    }

    /// Returns the executable path.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Returns the `-lock=<bool>` flag passed to mutating calls.
    #[must_use]
    pub fn lock_flag(&self) -> String {
        format!("-lock={}", self.lock)
    }

    /// Runs the executable with the given arguments and waits for it to exit.
    async fn run(&self, args: &[&str]) -> Result<Output, StateError> {
        debug!("Running {} {}", self.program.display(), args.join(" "));

        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        command.output().await.map_err(|e| StateError::Spawn {
            program: self.program.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Extracts diagnostic text from a failed invocation.
    fn diagnostic(output: &Output) -> String {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if stderr.is_empty() {
            format!("terraform exited with {}", output.status)
        } else {
            stderr
        }
    }
}

impl Default for TerraformCli {
    fn default() -> Self {
        Self::new(DEFAULT_TERRAFORM_BIN)
    }
}

/// Splits `terraform state list` output into addresses, dropping blank lines.
#[must_use]
pub fn parse_listing(stdout: &str) -> Vec<ResourceAddress> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ResourceAddress::from)
        .collect()
}

#[async_trait]
impl StateBackend for TerraformCli {
    async fn list_addresses(&self) -> Result<Vec<ResourceAddress>, StateError> {
        let output = self.run(&["state", "list"]).await?;

        if !output.status.success() {
            return Err(StateError::ListingFailed {
                diagnostic: Self::diagnostic(&output),
            });
        }

        let addresses = parse_listing(&String::from_utf8_lossy(&output.stdout));
        debug!("Listed {} state resources", addresses.len());
        Ok(addresses)
    }

    async fn move_resource(
        &self,
        source: &ResourceAddress,
        target: &ResourceAddress,
    ) -> Result<(), StateError> {
        info!("Moving <{source}> resource to <{target}>");

        let lock = self.lock_flag();
        let output = self
            .run(&["state", "mv", &lock, source.as_str(), target.as_str()])
            .await?;

        if output.status.success() {
            Ok(())
        } else {
            Err(StateError::MoveFailed {
                source_address: source.to_string(),
                target: target.to_string(),
                diagnostic: Self::diagnostic(&output),
            })
        }
    }

    async fn remove_resource(&self, target: &ResourceAddress) -> Result<(), StateError> {
        info!("Deleting <{target}> resource");

        let lock = self.lock_flag();
        let output = self.run(&["state", "rm", &lock, target.as_str()]).await?;

        if output.status.success() {
            Ok(())
        } else {
            Err(StateError::RemoveFailed {
                target: target.to_string(),
                diagnostic: Self::diagnostic(&output),
            })
        }
    }

    fn backend_type(&self) -> &'static str {
        "terraform"
    }
}
