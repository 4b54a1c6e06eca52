//! Child process wrapper with line-buffered, deadline-bounded I/O.
//!
//! Referees and players are plain OS processes speaking newline-terminated
//! text over stdin/stdout. Each output stream is pumped by a dedicated thread
//! into a channel, so the engine can block on the next line with a deadline
//! instead of spinning on availability, and can drain stderr without ever
//! blocking. The child is killed and reaped when the wrapper is dropped,
//! whatever path the match took to get there.

use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use tracing::warn;

/// Why the next line could not be read from a child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReadLineError {
    /// No line arrived before the deadline.
    TimedOut,
    /// The child's output stream is closed, usually because it exited.
    Closed,
}

/// A spawned child process with line-oriented streams.
#[derive(Debug)]
pub(crate) struct LineProcess {
    name: String,
    child: Child,
    stdin: ChildStdin,
    stdout: Receiver<String>,
    stderr: Receiver<String>,
}

impl LineProcess {
    /// Spawn `command_line` (whitespace-split argv) with piped stdio.
    pub fn spawn(name: impl Into<String>, command_line: &str) -> anyhow::Result<LineProcess> {
        let name = name.into();
        let mut parts = command_line.split_whitespace();
        let program = parts
            .next()
            .with_context(|| format!("empty command line for {name}"))?;
        let mut child = Command::new(program)
            .args(parts)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("could not spawn {name}: {command_line}"))?;

        let stdin = child.stdin.take().expect("stdin was piped");
        let stdout = pump_lines(child.stdout.take().expect("stdout was piped"));
        let stderr = pump_lines(child.stderr.take().expect("stderr was piped"));

        Ok(LineProcess {
            name,
            child,
            stdin,
            stdout,
            stderr,
        })
    }

    /// Blocking read of the next stdout line, bounded by `timeout`.
    pub fn read_line(&self, timeout: Duration) -> Result<String, ReadLineError> {
        self.stdout.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => ReadLineError::TimedOut,
            RecvTimeoutError::Disconnected => ReadLineError::Closed,
        })
    }

    /// Write one newline-terminated line and flush.
    pub fn write_line(&mut self, line: &str) -> anyhow::Result<()> {
        writeln!(self.stdin, "{line}")
            .and_then(|()| self.stdin.flush())
            .with_context(|| format!("could not write to {}", self.name))
    }

    /// Write a pre-assembled block of newline-terminated text and flush once.
    pub fn write_text(&mut self, text: &str) -> anyhow::Result<()> {
        self.stdin
            .write_all(text.as_bytes())
            .and_then(|()| self.stdin.flush())
            .with_context(|| format!("could not write to {}", self.name))
    }

    /// Collect whatever the child has written to stderr so far. Never blocks.
    pub fn drain_stderr(&self) -> Vec<String> {
        self.stderr.try_iter().collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for LineProcess {
    fn drop(&mut self) {
        // Best effort: a teardown failure is logged, never escalated.
        if let Err(e) = self.child.kill() {
            warn!(process = %self.name, "could not kill child: {e}");
        }
        if let Err(e) = self.child.wait() {
            warn!(process = %self.name, "could not reap child: {e}");
        }
    }
}

fn pump_lines<R: Read + Send + 'static>(stream: R) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in BufReader::new(stream).lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
