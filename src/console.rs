//! User-facing console output.
//!
//! Timestamped, colored status lines for the operator. Diagnostics go through
//! the `log` facade instead; these helpers are the tool's visible UX.

use colored::*;

use crate::config::{PromptSource, RunConfig};

const BANNER: &str = r#"
    ____        __      __       ____        __      __
   / __ \____ _/ /___  / /_     / __ \____ _/ /___  / /_
  / /_/ / __ `/ / __ \/ __ \   / /_/ / __ `/ / __ \/ __ \
 / _, _/ /_/ / / /_/ / / / /  / _, _/ /_/ / / /_/ / / / /
/_/ |_|\__,_/_/ .___/_/ /_/  /_/ |_|\__,_/_/ .___/_/ /_/
             /_/                          /_/"#;

fn now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Print the startup banner.
pub fn banner() {
    println!("{}", BANNER.cyan().bold());
    println!();
    println!("{}", "Ralph Wiggum AI Loop Technique for Aider".yellow());
    println!("{}", "\"I'm learnding!\" - Ralph Wiggum".cyan());
    println!();
}

pub fn info(msg: &str) {
    println!("{} {}", format!("[{}]", now()).blue(), msg);
}

pub fn ok(msg: &str) {
    println!("{} {}", format!("[{}]", now()).green(), msg);
}

pub fn warn(msg: &str) {
    println!("{} {}", format!("[{}]", now()).yellow(), msg);
}

pub fn error(msg: &str) {
    println!("{} {}", format!("[{}]", now()).red(), msg);
}

pub fn iter(msg: &str) {
    println!("{} {}", format!("[{}]", now()).purple(), msg);
}

/// Print the iteration separator block shown before each subprocess run.
pub fn iteration_banner(iteration: u32, max_iterations: u32) {
    let bar = "=".repeat(59);
    println!();
    println!("{}", bar.bold());
    if max_iterations > 0 {
        println!(
            "{}",
            format!("  ITERATION {} / {}", iteration, max_iterations).purple()
        );
    } else {
        println!(
            "{}",
            format!("  ITERATION {} (unlimited)", iteration).purple()
        );
    }
    println!("{}", bar.bold());
    println!();
}

/// Print the configuration summary before the loop starts.
pub fn show_config(config: &RunConfig) {
    info("Configuration:");

    match &config.prompt {
        PromptSource::File(path) => {
            println!("  {} {}", "Prompt file:".cyan(), path.display());
        }
        PromptSource::Literal(text) => {
            let preview: String = if text.chars().count() > 50 {
                format!("{}...", text.chars().take(50).collect::<String>())
            } else {
                text.clone()
            };
            println!("  {} {}", "Prompt:".cyan(), preview);
        }
        PromptSource::Default => {
            println!("  {} {}", "Prompt:".cyan(), "built-in template");
        }
    }

    if config.max_iterations > 0 {
        println!("  {} {}", "Max iterations:".cyan(), config.max_iterations);
    } else {
        println!("  {} unlimited", "Max iterations:".cyan());
    }

    if let Some(tag) = &config.completion.tag {
        println!(
            "  {} <{}> {} </{}>",
            "Completion marker:".cyan(),
            tag.tag,
            tag.value,
            tag.tag
        );
    }
    if let Some(promise) = &config.completion.promise {
        println!("  {} {}", "Completion promise:".cyan(), promise);
    }

    println!("  {} {}s", "Timeout:".cyan(), config.timeout_secs);

    if let Some(specs) = &config.specs_file {
        println!("  {} {}", "Specs file:".cyan(), specs.display());
    }
    println!("  {} {}", "Notes file:".cyan(), config.notes_file.display());

    if !config.agent_args.is_empty() {
        println!(
            "  {} {}",
            "Aider options:".cyan(),
            config.agent_args.join(" ")
        );
    }

    if let Some(log) = &config.log_file {
        println!("  {} {}", "Log file:".cyan(), log.display());
    }

    println!();
}

/// Print the first lines of the assembled prompt (verbose mode).
pub fn prompt_preview(prompt: &str) {
    println!("{}", "--- Prompt ---".cyan());
    for (i, line) in prompt.lines().enumerate() {
        if i >= 20 {
            println!("... (truncated)");
            break;
        }
        println!("{}", line);
    }
    println!("{}", "--------------".cyan());
}
