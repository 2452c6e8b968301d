//! Shell command runner - invokes steps as `sh -c` subprocesses

use crate::error::FailureReason;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Capability to run one step command to completion
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command`, feeding `stdin` to it when given
    ///
    /// Returns once the command has terminated.
    async fn run(&self, command: &str, stdin: Option<&[u8]>) -> Result<(), FailureReason>;
}

/// Runs commands through a POSIX shell and logs their output
#[derive(Debug, Clone)]
pub struct ShellRunner {
    /// Path to the shell executable
    shell: String,
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self {
            shell: "sh".to_string(),
        }
    }
}

impl ShellRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different shell, e.g. "/bin/bash"
    pub fn with_shell(shell: String) -> Self {
        Self { shell }
    }

    #[cfg(test)]
    pub fn shell(&self) -> &str {
        &self.shell
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str, stdin: Option<&[u8]>) -> Result<(), FailureReason> {
        debug!("Spawning {} -c with command length: {}", self.shell, command.len());

        let mut child = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| FailureReason::Spawn(e.to_string()))?;

        let pipe = child.stdin.take();
        let feed = async move {
            if let (Some(mut pipe), Some(input)) = (pipe, stdin) {
                // a command that never reads its input closes the pipe early
                if let Err(e) = pipe.write_all(input).await {
                    debug!("stdin not fully consumed: {}", e);
                }
            }
        };

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let out = async move {
            if let Some(stdout) = stdout {
                forward_lines(stdout, OutputStream::Stdout).await;
            }
        };
        let err = async move {
            if let Some(stderr) = stderr {
                forward_lines(stderr, OutputStream::Stderr).await;
            }
        };

        let ((), (), (), status) = tokio::join!(feed, out, err, child.wait());
        let status = status.map_err(|e| FailureReason::Io(e.to_string()))?;

        if status.success() {
            return Ok(());
        }

        match status.code() {
            Some(code) => {
                warn!("command exited with code {}", code);
                Err(FailureReason::ExitCode(code))
            }
            None => {
                warn!("command terminated by signal");
                Err(FailureReason::Signal)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum OutputStream {
    Stdout,
    Stderr,
}

/// Log each line of a child's output as soon as it is complete
async fn forward_lines<R>(reader: R, stream: OutputStream)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => {
                let text = String::from_utf8_lossy(&line);
                let text = text.trim_end_matches(['\n', '\r']);
                match stream {
                    OutputStream::Stdout => info!("{}", text),
                    OutputStream::Stderr => warn!("{}", text),
                }
            }
            Err(e) => {
                debug!("{:?} closed: {}", stream, e);
                break;
            }
        }
    }
}
