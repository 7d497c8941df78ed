//! Child-process plumbing shared by the external backends.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use once_cell::sync::OnceCell;
use tracing::warn;
use wait_timeout::ChildExt;

use super::{SearchError, SearchHit};

/// Captured result of a finished child.
#[derive(Debug)]
pub(crate) struct Output {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl Output {
    /// Interpret a grep-family exit status: 0 matched, 1 matched nothing,
    /// 2 hit an error somewhere in the tree.
    ///
    /// Status 2 still yields whatever matches made it to stdout; it is a
    /// failure only when stdout holds none.
    pub fn collect_hits<F>(&self, backend: &str, parse: F) -> Result<Vec<SearchHit>, SearchError>
    where
        F: FnOnce(&[u8]) -> Result<Vec<SearchHit>, SearchError>,
    {
        match self.status.code() {
            Some(0) => parse(&self.stdout),
            Some(1) => Ok(Vec::new()),
            Some(2) => match parse(&self.stdout) {
                Ok(hits) if !hits.is_empty() => {
                    warn!(
                        backend,
                        hits = hits.len(),
                        stderr = %self.stderr_text(),
                        "search reported errors, keeping partial results"
                    );
                    Ok(hits)
                }
                _ => Err(self.failed(backend)),
            },
            _ => Err(self.failed(backend)),
        }
    }

    fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }

    fn failed(&self, backend: &str) -> SearchError {
        SearchError::Failed {
            backend: backend.to_string(),
            status: self.status.to_string(),
            stderr: self.stderr_text(),
        }
    }
}

/// Resolve a program on PATH once per process.
pub(crate) fn locate(cell: &'static OnceCell<Option<PathBuf>>, program: &str) -> Option<&'static Path> {
    cell.get_or_init(|| which::which(program).ok()).as_deref()
}

/// Run `command` to completion or kill it at `timeout`.
///
/// Both pipes are drained on their own threads so a chatty child cannot
/// block on a full pipe while we wait on it.
pub(crate) fn run_with_timeout(
    backend: &str,
    mut command: Command,
    timeout: Duration,
) -> Result<Output, SearchError> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| SearchError::Spawn {
            backend: backend.to_string(),
            source,
        })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = match child.wait_timeout(timeout) {
        Ok(Some(status)) => status,
        Ok(None) => {
            let _ = child.kill();
            let _ = child.wait();
            let _ = stdout.join();
            let _ = stderr.join();
            return Err(SearchError::Timeout {
                backend: backend.to_string(),
                after: timeout,
            });
        }
        Err(source) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(SearchError::Spawn {
                backend: backend.to_string(),
                source,
            });
        }
    };

    Ok(Output {
        status,
        stdout: stdout.join().unwrap_or_default(),
        stderr: stderr.join().unwrap_or_default(),
    })
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}
