use crate::constants::limits::READ_CHUNK_BYTES;
use crate::errors::BridgeError;
use crate::services::command_builder::Invocation;
use crate::services::logger::Logger;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinError;

/// Captured outcome of one run of the external program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration_ms: u64,
    pub stdout_truncated: bool,
    pub stderr_truncated: bool,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> Result<ExecutionResult, BridgeError>;
}

#[derive(Debug, Clone)]
pub struct SystemProcessRunner {
    logger: Logger,
    timeout: Option<Duration>,
    max_capture_bytes: usize,
}

impl SystemProcessRunner {
    pub fn new(logger: Logger, timeout: Option<Duration>, max_capture_bytes: usize) -> Self {
        Self {
            logger: logger.child("process"),
            timeout,
            max_capture_bytes,
        }
    }

    fn captured(&self, stream: &str, joined: Result<Captured, JoinError>) -> Captured {
        joined.unwrap_or_else(|err| {
            self.logger.warn(
                "output reader failed",
                Some(&serde_json::json!({ "stream": stream, "error": err.to_string() })),
            );
            Captured {
                bytes: Vec::new(),
                truncated: true,
            }
        })
    }
}

/// Bytes kept from one stream. `truncated` is set when bytes were dropped,
/// either past the cap or because the pipe failed mid-read.
#[derive(Debug, Default)]
struct Captured {
    bytes: Vec<u8>,
    truncated: bool,
}

/// Reads `reader` to EOF, keeping at most `cap` bytes.
async fn drain<R>(reader: Option<R>, cap: usize) -> Captured
where
    R: AsyncRead + Unpin,
{
    let mut out = Captured::default();
    let Some(mut reader) = reader else {
        return out;
    };
    let mut buf = [0u8; READ_CHUNK_BYTES];
    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(_) => {
                out.truncated = true;
                break;
            }
        };
        let remaining = cap.saturating_sub(out.bytes.len());
        if n <= remaining {
            out.bytes.extend_from_slice(&buf[..n]);
        } else {
            out.bytes.extend_from_slice(&buf[..remaining]);
            out.truncated = true;
        }
    }
    out
}

/// Kills the process group led by the child when dropped while armed, so a
/// cancelled request also takes down anything the program started.
struct GroupGuard {
    pid: Option<u32>,
    armed: bool,
}

impl GroupGuard {
    fn new(pid: Option<u32>) -> Self {
        Self { pid, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }

    fn kill(&mut self) {
        if self.armed {
            kill_group(self.pid);
            self.armed = false;
        }
    }
}

impl Drop for GroupGuard {
    fn drop(&mut self) {
        self.kill();
    }
}

#[cfg(unix)]
fn kill_group(pid: Option<u32>) {
    if let Some(pid) = pid {
        // The child was spawned with `process_group(0)`, so its pid is the pgid.
        unsafe {
            libc::killpg(pid as libc::pid_t, libc::SIGKILL);
        }
    }
}

#[cfg(not(unix))]
fn kill_group(_pid: Option<u32>) {}

#[async_trait]
impl ProcessRunner for SystemProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ExecutionResult, BridgeError> {
        let mut cmd = tokio::process::Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .current_dir(&invocation.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        let started = Instant::now();
        let mut child = cmd
            .spawn()
            .map_err(|err| BridgeError::launch_failure(&invocation.program, err))?;
        let mut group = GroupGuard::new(child.id());
        self.logger.debug(
            "spawned",
            Some(&serde_json::json!({ "pid": child.id(), "program": invocation.program })),
        );

        let cap = self.max_capture_bytes;
        let mut stdout_task = tokio::spawn(drain(child.stdout.take(), cap));
        let mut stderr_task = tokio::spawn(drain(child.stderr.take(), cap));

        // One deadline covers the exit and both pipes reaching EOF; a
        // descendant holding the pipes open counts against it too.
        let collect = async {
            let status = child.wait().await;
            let stdout = (&mut stdout_task).await;
            let stderr = (&mut stderr_task).await;
            (status, stdout, stderr)
        };
        let collected = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, collect).await.ok(),
            None => Some(collect.await),
        };
        let Some((status, stdout, stderr)) = collected else {
            let timeout_ms = self.timeout.map(|t| t.as_millis() as u64).unwrap_or_default();
            self.logger.warn(
                "timed out, killing",
                Some(&serde_json::json!({ "timeout_ms": timeout_ms })),
            );
            group.kill();
            let _ = child.kill().await;
            stdout_task.abort();
            stderr_task.abort();
            return Err(BridgeError::Timeout { timeout_ms });
        };
        group.disarm();

        let status = status.map_err(|err| BridgeError::launch_failure(&invocation.program, err))?;
        let stdout = self.captured("stdout", stdout);
        let stderr = self.captured("stderr", stderr);
        if stdout.truncated || stderr.truncated {
            self.logger.warn(
                "output incomplete",
                Some(&serde_json::json!({
                    "max_capture_bytes": cap,
                    "stdout_truncated": stdout.truncated,
                    "stderr_truncated": stderr.truncated,
                })),
            );
        }

        Ok(ExecutionResult {
            stdout: String::from_utf8_lossy(&stdout.bytes).into_owned(),
            stderr: String::from_utf8_lossy(&stderr.bytes).into_owned(),
            exit_code: status.code().unwrap_or(-1),
            duration_ms: started.elapsed().as_millis() as u64,
            stdout_truncated: stdout.truncated,
            stderr_truncated: stderr.truncated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;

    /// Yields one chunk, then fails.
    struct BrokenPipe {
        sent: bool,
    }

    impl AsyncRead for BrokenPipe {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            if self.sent {
                return Poll::Ready(Err(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "reader gone",
                )));
            }
            self.sent = true;
            buf.put_slice(b"EPC=E2");
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn drain_caps_but_consumes_everything() {
        let data = vec![b'x'; 20_000];
        let out = drain(Some(&data[..]), 100).await;
        assert_eq!(out.bytes.len(), 100);
        assert!(out.truncated);

        let out = drain(Some(&b"short"[..]), 100).await;
        assert_eq!(out.bytes, b"short");
        assert!(!out.truncated);
    }

    #[tokio::test]
    async fn drain_without_pipe_is_empty() {
        let out = drain::<&[u8]>(None, 10).await;
        assert!(out.bytes.is_empty());
        assert!(!out.truncated);
    }

    #[tokio::test]
    async fn read_error_marks_output_incomplete() {
        let out = drain(Some(BrokenPipe { sent: false }), 1024).await;
        assert_eq!(out.bytes, b"EPC=E2");
        assert!(out.truncated);
    }

    #[tokio::test]
    async fn failed_reader_task_marks_output_incomplete() {
        let runner = SystemProcessRunner::new(
            Logger::new("test").with_level(crate::services::logger::LogLevel::Error),
            None,
            16,
        );
        let task = tokio::spawn(async { std::future::pending::<Captured>().await });
        task.abort();
        let out = runner.captured("stdout", task.await);
        assert!(out.bytes.is_empty());
        assert!(out.truncated);
    }
}
