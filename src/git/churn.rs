//! Code churn rate from git history
//!
//! Counts the commits that touched a file within a trailing window and
//! maps the count onto a saturating 0.0..=1.0 scale. Any failure to
//! query history (no repository, git missing, timeout) yields 0.0.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// Change count at which the churn rate saturates at 1.0
pub const SATURATION_CHANGES: usize = 10;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Why a history query produced no count
#[derive(Error, Debug)]
pub enum ChurnError {
    #[error("history lookup disabled")]
    Disabled,

    #[error("failed to run git: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("failed to wait for git: {0}")]
    Wait(#[source] std::io::Error),

    #[error("git log timed out after {0:?}")]
    Timeout(Duration),

    #[error("git log exited with {0}")]
    Failed(ExitStatus),

    #[error("git log output could not be collected")]
    Output,
}

/// Something that can tell how often a file changed recently
pub trait ChurnSource: Send + Sync {
    /// Number of change events touching `path` within the source's window
    fn change_count(&self, path: &Path) -> Result<usize, ChurnError>;
}

/// Churn from `git log`, bounded by a hard timeout
#[derive(Debug, Clone)]
pub struct GitLogChurn {
    window_days: u32,
    timeout: Duration,
}

impl GitLogChurn {
    pub fn new(window_days: u32, timeout: Duration) -> Self {
        Self {
            window_days,
            timeout,
        }
    }
}

impl ChurnSource for GitLogChurn {
    fn change_count(&self, path: &Path) -> Result<usize, ChurnError> {
        // Run from the file's own directory so nested repositories resolve
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let file = path.file_name().map(Path::new).unwrap_or(path);

        let mut child = Command::new("git")
            .arg("--no-pager")
            .arg("log")
            .arg(format!("--since={} days ago", self.window_days))
            .arg("--format=format:")
            .arg("--name-only")
            .arg("--")
            .arg(file)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(ChurnError::Spawn)?;

        // Drain stdout on a separate thread so a full pipe cannot stall git
        let stdout = child.stdout.take();
        let reader = thread::spawn(move || {
            let mut buf = Vec::new();
            if let Some(mut out) = stdout {
                let _ = out.read_to_end(&mut buf);
            }
            buf
        });

        let status = wait_with_timeout(&mut child, self.timeout)?;
        if !status.success() {
            return Err(ChurnError::Failed(status));
        }

        let output = reader.join().map_err(|_| ChurnError::Output)?;
        Ok(String::from_utf8_lossy(&output)
            .lines()
            .filter(|line| !line.trim().is_empty())
            .count())
    }
}

/// Poll the child until it exits, killing it once `timeout` has elapsed
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<ExitStatus, ChurnError> {
    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ChurnError::Timeout(timeout));
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => return Err(ChurnError::Wait(e)),
        }
    }
}

/// History lookups switched off (`--no-git`)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

impl ChurnSource for NoHistory {
    fn change_count(&self, _path: &Path) -> Result<usize, ChurnError> {
        Err(ChurnError::Disabled)
    }
}

/// Reports the same change count for every file
#[derive(Debug, Clone, Copy)]
pub struct FixedChurn(pub usize);

impl ChurnSource for FixedChurn {
    fn change_count(&self, _path: &Path) -> Result<usize, ChurnError> {
        Ok(self.0)
    }
}

/// Saturating linear scale: `min(count / 10, 1.0)`
pub fn normalize_churn(change_count: usize) -> f64 {
    (change_count as f64 / SATURATION_CHANGES as f64).min(1.0)
}

/// Churn rate for `path`, 0.0 whenever history is unavailable
pub fn churn_rate(source: &dyn ChurnSource, path: &Path) -> f64 {
    match source.change_count(path) {
        Ok(count) => normalize_churn(count),
        Err(e) => {
            debug!("No churn for {}: {}", path.display(), e);
            0.0
        }
    }
}
