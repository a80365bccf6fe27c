//! Agent subprocess execution with live output capture.
//!
//! Spawns the agent with stdin inherited (interactive pass-through) and both
//! output streams piped. Lines are consumed as they arrive: mirrored to the
//! console, appended to the optional transcript log, and collected into the
//! transcript handed back to the controller. A wall-clock deadline bounds the
//! whole iteration; on expiry the child is killed and the result is marked
//! timed-out. The child's exit code is never inspected: the completion
//! protocol is textual.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::process::{ChildStderr, ChildStdout, Command};
use tokio_util::codec::{FramedRead, LinesCodec};

use crate::config::RunConfig;
use crate::console;
use crate::error::{RalphError, Result};

/// Per-line buffer cap; a single line past this is a fatal read error for the
/// iteration.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Result of a single iteration. Created fresh each iteration and discarded
/// after completion/notes processing.
#[derive(Debug, Clone)]
pub struct IterationResult {
    /// Iteration number (1-indexed)
    pub iteration: u32,

    /// Full merged stdout+stderr transcript
    pub transcript: String,

    /// The deadline elapsed and the child was killed
    pub timed_out: bool,

    /// A completion marker was detected (set by the controller)
    pub completed: bool,
}

impl IterationResult {
    fn empty(iteration: u32) -> Self {
        Self {
            iteration,
            transcript: String::new(),
            timed_out: false,
            completed: false,
        }
    }
}

/// Append-only transcript log for the whole run.
///
/// Opened once; the single loop sequence is the only writer.
pub struct TranscriptLog {
    file: std::fs::File,
}

impl TranscriptLog {
    /// Open (or create) the log and write the session header.
    pub fn open(path: &Path) -> Result<Self> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        use std::io::Write;
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(file, "=== aider-ralph session started at {} ===\n", timestamp)?;

        Ok(Self { file })
    }

    pub fn iteration_start(&mut self, iteration: u32) -> std::io::Result<()> {
        use std::io::Write;
        writeln!(self.file, "=== Iteration {} ===", iteration)
    }

    pub fn line(&mut self, line: &str) -> std::io::Result<()> {
        use std::io::Write;
        writeln!(self.file, "{}", line)
    }

    pub fn iteration_end(&mut self, iteration: u32) -> std::io::Result<()> {
        use std::io::Write;
        writeln!(self.file, "\n=== End of Iteration {} ===\n", iteration)
    }
}

/// Seam between the controller and subprocess execution, so loop behavior can
/// be exercised against a scripted runner in tests.
#[async_trait]
pub trait IterationRunner {
    async fn run_iteration(
        &self,
        iteration: u32,
        prompt: &str,
        config: &RunConfig,
        log: Option<&mut TranscriptLog>,
    ) -> Result<IterationResult>;
}

/// The real runner: spawns the agent executable from PATH.
pub struct ProcessRunner;

impl ProcessRunner {
    /// Agent argv: the instruction message, auto-confirm, then pass-through
    /// options appended unmodified and unvalidated.
    fn build_args(prompt: &str, config: &RunConfig) -> Vec<String> {
        let mut args = vec![
            "--message".to_string(),
            prompt.to_string(),
            "--yes".to_string(),
        ];
        args.extend(config.agent_args.iter().cloned());
        args
    }
}

#[async_trait]
impl IterationRunner for ProcessRunner {
    async fn run_iteration(
        &self,
        iteration: u32,
        prompt: &str,
        config: &RunConfig,
        mut log: Option<&mut TranscriptLog>,
    ) -> Result<IterationResult> {
        let args = Self::build_args(prompt, config);

        if config.dry_run {
            console::info(&format!(
                "[DRY RUN] Would execute: {} {}",
                config.agent_bin,
                args.join(" ")
            ));
            return Ok(IterationResult::empty(iteration));
        }

        if config.verbose {
            console::info(&format!("Running: {} {}", config.agent_bin, args.join(" ")));
        }

        let mut child = Command::new(&config.agent_bin)
            .args(&args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RalphError::Spawn {
                program: config.agent_bin.clone(),
                source,
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RalphError::OutputStream("stdout was not piped".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| RalphError::OutputStream("stderr was not piped".to_string()))?;

        let mut transcript = String::new();

        let timed_out = if config.timeout_secs == 0 {
            drain_merged(stdout, stderr, &mut transcript, log.as_deref_mut()).await?;
            child.wait().await?;
            false
        } else {
            let deadline = Duration::from_secs(config.timeout_secs);
            let run = async {
                drain_merged(stdout, stderr, &mut transcript, log.as_deref_mut()).await?;
                child.wait().await?;
                Ok::<(), RalphError>(())
            };

            match tokio::time::timeout(deadline, run).await {
                Ok(result) => {
                    result?;
                    false
                }
                Err(_elapsed) => {
                    console::warn(&format!(
                        "Iteration timed out after {}s - {} was killed",
                        config.timeout_secs, config.agent_bin
                    ));
                    let _ = child.start_kill();
                    let _ = child.wait().await;
                    true
                }
            }
        };

        log::debug!(
            "iteration {} finished: {} transcript bytes, timed_out={}",
            iteration,
            transcript.len(),
            timed_out
        );

        Ok(IterationResult {
            iteration,
            transcript,
            timed_out,
            completed: false,
        })
    }
}

/// Drain both child streams line-by-line into one merged transcript,
/// mirroring each line to the console and the optional log sink as it
/// arrives.
async fn drain_merged(
    stdout: ChildStdout,
    stderr: ChildStderr,
    transcript: &mut String,
    mut log: Option<&mut TranscriptLog>,
) -> Result<()> {
    let codec = || LinesCodec::new_with_max_length(MAX_LINE_BYTES);
    let mut out_lines = FramedRead::new(stdout, codec());
    let mut err_lines = FramedRead::new(stderr, codec());
    let mut out_done = false;
    let mut err_done = false;

    while !(out_done && err_done) {
        let next = tokio::select! {
            line = out_lines.next(), if !out_done => {
                if line.is_none() {
                    out_done = true;
                }
                line
            }
            line = err_lines.next(), if !err_done => {
                if line.is_none() {
                    err_done = true;
                }
                line
            }
        };

        let Some(line) = next else { continue };
        let line = line.map_err(|e| RalphError::OutputStream(e.to_string()))?;

        println!("{}", line);
        transcript.push_str(&line);
        transcript.push('\n');

        if let Some(log) = log.as_deref_mut()
            && let Err(e) = log.line(&line)
        {
            log::warn!("failed to write transcript log line: {}", e);
        }
    }

    Ok(())
}
