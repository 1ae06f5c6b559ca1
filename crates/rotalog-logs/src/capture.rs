//! Forwarding process output into a destination

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{ChildStderr, ChildStdout};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::destination::SharedDestination;

/// Line counts for one captured stream
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CaptureStats {
    pub lines: u64,
    /// Lines the destination refused
    pub failed: u64,
}

#[derive(Debug, Clone, Copy)]
enum Echo {
    Off,
    Stdout,
    Stderr,
}

/// Async line capture into a [`SharedDestination`]
#[derive(Clone)]
pub struct LogCapture {
    destination: SharedDestination,
    echo: bool,
}

impl LogCapture {
    pub fn new(destination: SharedDestination) -> Self {
        Self {
            destination,
            echo: false,
        }
    }

    /// Also copy every captured line to the matching console stream
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Spawn tasks to capture a child's stdout and stderr
    pub fn spawn_capture(
        &self,
        stdout: Option<ChildStdout>,
        stderr: Option<ChildStderr>,
    ) -> (
        Option<JoinHandle<CaptureStats>>,
        Option<JoinHandle<CaptureStats>>,
    ) {
        let stdout_handle =
            stdout.map(|out| self.spawn_reader(out, "stdout", self.echo_for(Echo::Stdout)));
        let stderr_handle =
            stderr.map(|err| self.spawn_reader(err, "stderr", self.echo_for(Echo::Stderr)));
        (stdout_handle, stderr_handle)
    }

    /// Spawn a task forwarding any reader, echoing to stdout
    pub fn spawn_pipe<R>(&self, reader: R) -> JoinHandle<CaptureStats>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        self.spawn_reader(reader, "pipe", self.echo_for(Echo::Stdout))
    }

    fn echo_for(&self, target: Echo) -> Echo {
        if self.echo {
            target
        } else {
            Echo::Off
        }
    }

    fn spawn_reader<R>(
        &self,
        reader: R,
        source: &'static str,
        echo: Echo,
    ) -> JoinHandle<CaptureStats>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let destination = self.destination.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(reader).lines();
            let mut stats = CaptureStats::default();

            loop {
                let line = match lines.next_line().await {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(source, "Failed to read {}: {}", source, e);
                        break;
                    }
                };
                stats.lines += 1;

                match echo {
                    Echo::Off => {}
                    Echo::Stdout => println!("{}", line),
                    Echo::Stderr => eprintln!("{}", line),
                }

                if let Err(e) = destination.emit_line(&line) {
                    stats.failed += 1;
                    warn!(source, "Failed to write {}: {}", source, e);
                }
            }

            debug!(source, lines = stats.lines, failed = stats.failed, "Capture finished");
            stats
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::destination::LogDestination;
    use crate::mock::FlakyFs;
    use rotalog_core::RotationConfig;
    use std::fs;
    use std::io::Cursor;
    use std::process::Stdio;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn shared(config: RotationConfig) -> SharedDestination {
        SharedDestination::new(LogDestination::open(config).unwrap())
    }

    #[tokio::test]
    async fn test_pipe_forwards_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pipe.log");
        let capture = LogCapture::new(shared(RotationConfig::new(&path).utc(true)));

        let stats = capture
            .spawn_pipe(Cursor::new(b"one\ntwo\nthree".to_vec()))
            .await
            .unwrap();

        assert_eq!(stats, CaptureStats { lines: 3, failed: 0 });
        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\nthree\n");
    }

    #[tokio::test]
    async fn test_write_failures_do_not_stop_capture() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pipe.log");
        let flaky = Arc::new(FlakyFs::new());
        let config = RotationConfig::new(&path).delay(true).utc(true);
        let destination = LogDestination::builder(config)
            .with_fs(flaky.clone())
            .open()
            .unwrap();
        flaky.set_fail_open(true);

        let capture = LogCapture::new(SharedDestination::new(destination));
        let stats = capture
            .spawn_pipe(Cursor::new(b"a\nb\nc\n".to_vec()))
            .await
            .unwrap();

        assert_eq!(stats, CaptureStats { lines: 3, failed: 3 });
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_capture_child_output() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("child.log");
        let destination = shared(RotationConfig::new(&path).utc(true));
        let capture = LogCapture::new(destination.clone());

        let mut child = tokio::process::Command::new("sh")
            .arg("-c")
            .arg("echo out; echo err 1>&2")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();

        let (out, err) = capture.spawn_capture(child.stdout.take(), child.stderr.take());
        child.wait().await.unwrap();
        assert_eq!(out.unwrap().await.unwrap().lines, 1);
        assert_eq!(err.unwrap().await.unwrap().lines, 1);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("out\n"));
        assert!(content.contains("err\n"));
    }
}
