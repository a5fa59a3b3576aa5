//! Lifecycle of the host child process.

use std::env;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::protocol::{Request, Response};

/// Environment variable pointing at the host executable, for deployments
/// that do not ship it next to the embedding binary.
pub const HOST_EXE_ENV: &str = "UGRID_HOST_EXE";

/// How long teardown waits after terminating the host, so the process (and
/// the native library it holds) is fully gone before the caller continues.
/// Skipping this reintroduces process-teardown races on shutdown.
pub const REMOTE_EXIT_GRACE: Duration = Duration::from_millis(300);

const HOST_EXE_NAME: &str = "ugrid-host";

/// A running host process and the pipes to it.
pub struct RemoteInstance {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl RemoteInstance {
    /// Spawns the host found via `UGRID_HOST_EXE`, next to the current
    /// executable, or on `PATH`.
    pub fn spawn() -> io::Result<Self> {
        Self::spawn_at(&host_executable())
    }

    pub fn spawn_at(executable: &Path) -> io::Result<Self> {
        let mut child = Command::new(executable)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "host stdin unavailable"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "host stdout unavailable"))?;
        debug!(host = %executable.display(), pid = child.id(), "spawned grid host");
        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }

    /// Sends one request and blocks for the reply.
    pub fn call(&mut self, request: &Request) -> io::Result<Response> {
        let mut line = serde_json::to_string(request)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        line.push('\n');
        self.stdin.write_all(line.as_bytes())?;
        self.stdin.flush()?;

        let mut reply = String::new();
        let read = self.stdout.read_line(&mut reply)?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "grid host closed its end",
            ));
        }
        serde_json::from_str(&reply).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }

    /// Asks the host to exit, then makes sure it did. Returns only after the
    /// exit grace period has passed.
    pub fn shutdown(mut self) {
        if let Err(error) = self.call(&Request::Shutdown) {
            debug!(%error, "grid host did not acknowledge shutdown");
        }
        if let Err(error) = self.child.kill() {
            debug!(%error, "grid host already gone");
        }
        if let Err(error) = self.child.wait() {
            warn!(%error, "could not reap grid host");
        }
        thread::sleep(REMOTE_EXIT_GRACE);
    }
}

fn host_executable() -> PathBuf {
    if let Ok(path) = env::var(HOST_EXE_ENV) {
        return PathBuf::from(path);
    }
    if let Ok(current) = env::current_exe() {
        let sibling = current.with_file_name(format!("{HOST_EXE_NAME}{}", env::consts::EXE_SUFFIX));
        if sibling.exists() {
            return sibling;
        }
    }
    PathBuf::from(HOST_EXE_NAME)
}
