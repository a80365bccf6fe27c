//! End-to-end loop scenarios.
//!
//! Exercises the controller against a scripted runner (prompt capture, notes
//! carry-forward) and against the real process runner with a shell-script
//! stub standing in for the agent.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use aider_ralph::config::{CompletionSpec, PromptSource, RunConfig, TagSpec};
use aider_ralph::runner::{
    IterationResult, IterationRunner, LoopController, LoopOutcome, ProcessRunner, TranscriptLog,
};
use aider_ralph::Result;

/// Plays back canned transcripts and records every prompt it was handed.
struct ScriptedRunner {
    transcripts: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    fn new(transcripts: Vec<&str>) -> Self {
        Self {
            transcripts: Mutex::new(transcripts.into_iter().map(String::from).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl IterationRunner for ScriptedRunner {
    async fn run_iteration(
        &self,
        iteration: u32,
        prompt: &str,
        _config: &RunConfig,
        _log: Option<&mut TranscriptLog>,
    ) -> Result<IterationResult> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let mut transcripts = self.transcripts.lock().unwrap();
        let transcript = if transcripts.is_empty() {
            String::new()
        } else {
            transcripts.remove(0)
        };

        Ok(IterationResult {
            iteration,
            transcript,
            timed_out: false,
            completed: false,
        })
    }
}

fn base_config(dir: &TempDir) -> RunConfig {
    RunConfig {
        delay_secs: 0,
        prompt: PromptSource::Literal("work on the project".to_string()),
        notes_file: dir.path().join("notes.md"),
        completion: CompletionSpec {
            tag: Some(TagSpec {
                tag: "ralph_status".to_string(),
                value: "COMPLETED".to_string(),
            }),
            promise: None,
        },
        ..Default::default()
    }
}

#[cfg(unix)]
fn stub_agent(dir: &TempDir, script_body: &str) -> String {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.path().join("stub-agent");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", script_body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().into_owned()
}

#[tokio::test]
async fn notes_from_iteration_k_appear_in_prompt_k_plus_one() {
    let dir = TempDir::new().unwrap();
    let runner = ScriptedRunner::new(vec![
        "did some work\n<ralph_notes>auth tokens live in src/token.rs</ralph_notes>",
        "<ralph_status>COMPLETED</ralph_status>",
    ]);
    let config = RunConfig {
        max_iterations: 5,
        ..base_config(&dir)
    };
    let controller = LoopController::new(config, runner, CancellationToken::new());

    let summary = controller.run().await;
    assert_eq!(summary.outcome, LoopOutcome::Completed);
    assert_eq!(summary.iterations, 2);
}

#[tokio::test]
async fn notes_roundtrip_is_verbatim() {
    let dir = TempDir::new().unwrap();
    let note = "auth tokens live in src/token.rs";
    let first = format!("<ralph_notes>{}</ralph_notes>", note);
    let runner = ScriptedRunner::new(vec![
        first.as_str(),
        "<ralph_status>COMPLETED</ralph_status>",
    ]);
    let config = RunConfig {
        max_iterations: 5,
        ..base_config(&dir)
    };
    let controller = LoopController::new(config, runner, CancellationToken::new());
    controller.run().await;

    let prompts = controller_prompts(&controller);
    assert_eq!(prompts.len(), 2);
    assert!(!prompts[0].contains(note));
    assert!(prompts[1].contains(note));
}

fn controller_prompts(controller: &LoopController<ScriptedRunner>) -> Vec<String> {
    controller.runner().prompts.lock().unwrap().clone()
}

#[tokio::test]
async fn dry_run_respects_cap_without_spawning() {
    let dir = TempDir::new().unwrap();
    let config = RunConfig {
        max_iterations: 3,
        dry_run: true,
        // A nonexistent binary proves nothing is ever spawned in dry-run
        agent_bin: "/nonexistent/agent".to_string(),
        ..base_config(&dir)
    };
    let controller = LoopController::new(config, ProcessRunner, CancellationToken::new());

    let summary = controller.run().await;
    assert_eq!(summary.outcome, LoopOutcome::Exhausted);
    assert_eq!(summary.iterations, 3);
}

#[cfg(unix)]
#[tokio::test]
async fn stub_agent_completion_ends_run() {
    let dir = TempDir::new().unwrap();
    let agent = stub_agent(
        &dir,
        "echo \"working...\"\nprintf '<ralph_status>\\nCOMPLETED\\n</ralph_status>\\n'",
    );
    let log_path = dir.path().join("session.log");
    let config = RunConfig {
        max_iterations: 5,
        agent_bin: agent,
        log_file: Some(log_path.clone()),
        ..base_config(&dir)
    };
    let controller = LoopController::new(config, ProcessRunner, CancellationToken::new());

    let summary = controller.run().await;
    assert_eq!(summary.outcome, LoopOutcome::Completed);
    assert_eq!(summary.iterations, 1);

    let log = std::fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("working..."));
    assert!(log.contains("=== End of Iteration 1 ==="));
}

#[cfg(unix)]
#[tokio::test]
async fn stub_agent_timeout_is_not_fatal() {
    let dir = TempDir::new().unwrap();
    let agent = stub_agent(&dir, "sleep 30");
    let config = RunConfig {
        max_iterations: 2,
        timeout_secs: 1,
        agent_bin: agent,
        ..base_config(&dir)
    };
    let controller = LoopController::new(config, ProcessRunner, CancellationToken::new());

    let start = std::time::Instant::now();
    let summary = controller.run().await;
    assert_eq!(summary.outcome, LoopOutcome::Exhausted);
    assert_eq!(summary.iterations, 2);
    assert!(start.elapsed() < Duration::from_secs(20));
}

#[cfg(unix)]
#[tokio::test]
async fn stub_agent_notes_reach_next_invocation() {
    let dir = TempDir::new().unwrap();
    // First run emits notes; later runs see them in the --message argument
    // and signal completion.
    let agent = stub_agent(
        &dir,
        r#"case "$2" in
*carried-context-token*) printf '<ralph_status>COMPLETED</ralph_status>\n' ;;
*) printf '<ralph_notes>carried-context-token</ralph_notes>\n' ;;
esac"#,
    );
    let config = RunConfig {
        max_iterations: 5,
        agent_bin: agent,
        ..base_config(&dir)
    };
    let controller = LoopController::new(config, ProcessRunner, CancellationToken::new());

    let summary = controller.run().await;
    assert_eq!(summary.outcome, LoopOutcome::Completed);
    assert_eq!(summary.iterations, 2);

    let notes = std::fs::read_to_string(dir.path().join("notes.md")).unwrap();
    assert!(notes.contains("carried-context-token"));
}
