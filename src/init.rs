//! Project scaffolding for the `init` subcommand.
//!
//! Creates a starter SPECS.md and the .ralph/ working directory. Existing
//! files are never overwritten; each piece is skipped with a notice instead.

use std::fs;
use std::path::Path;

use colored::*;

use crate::console;
use crate::error::Result;

const SPECS_FILE: &str = "SPECS.md";
const RALPH_DIR: &str = ".ralph";
const LOGS_DIR: &str = ".ralph/logs";

fn specs_template(project_name: &str) -> String {
    format!(
        r#"# {project_name}

## Project Overview
<!-- Describe what this project does in 2-3 sentences -->


## Goals
<!-- What are you trying to build? Be specific. -->

1.
2.
3.

## Technical Requirements
<!-- List specific technical requirements -->

- [ ]
- [ ]
- [ ]

## Implementation Phases
<!-- Break the work into phases completable in one loop session each -->

### Phase 1: Foundation

**Requirements:**
- [ ]
- [ ]

**Success Criteria:**
- All requirements implemented
- Tests passing

### Phase 2: Core Features

**Requirements:**
- [ ]
- [ ]

### Phase 3: Polish & Testing

**Requirements:**
- [ ]
- [ ]

## Development Process

1. Read and understand the current phase requirements
2. Implement one requirement at a time
3. Write tests for each requirement and run them after each change
4. Mark requirements as done [x] when complete
5. Move to the next phase when all requirements are complete

## Completion Signal

When ALL phases are complete and verified, output:

<ralph_status>
COMPLETED
</ralph_status>

To carry context into the next iteration, output it between
<ralph_notes> and </ralph_notes> markers.

If stuck on the same issue for many iterations, document what is blocking
progress inside a notes block and output NEEDS_HUMAN_REVIEW.
"#
    )
}

/// Initialize the current directory for aider-ralph.
pub fn run(project_name: Option<String>) -> Result<()> {
    let name = match project_name {
        Some(name) => name,
        None => std::env::current_dir()
            .ok()
            .and_then(|cwd| cwd.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "My Project".to_string()),
    };

    println!(
        "{} {}\n",
        "Initializing aider-ralph project:".cyan(),
        name.bold()
    );

    if Path::new(SPECS_FILE).exists() {
        console::warn(&format!("{} already exists. Skipping...", SPECS_FILE));
    } else {
        fs::write(SPECS_FILE, specs_template(&name))?;
        console::ok(&format!("Created {}", SPECS_FILE));
    }

    if Path::new(RALPH_DIR).exists() {
        console::warn(&format!("{}/ already exists. Skipping...", RALPH_DIR));
    } else {
        fs::create_dir_all(LOGS_DIR)?;
        console::ok(&format!("Created {}/ directory", RALPH_DIR));
    }

    add_logs_to_gitignore()?;

    println!();
    println!("{}", "Project initialized!".bold());
    println!();
    println!("{}", "Next steps:".cyan());
    println!("  1. Edit {} with your project requirements", SPECS_FILE.bold());
    println!(
        "  2. Run: {}",
        "aider-ralph -s SPECS.md -m 30 --completion-value COMPLETED -- --model sonnet".bold()
    );
    println!();
    println!("{}", "Tips:".cyan());
    println!("  - Break work into small, verifiable phases");
    println!("  - Include test commands so the agent can verify its work");
    println!("  - Set a realistic max-iterations as a safety net");
    println!();

    Ok(())
}

/// Append the logs directory to an existing .gitignore; no-op without one.
fn add_logs_to_gitignore() -> Result<()> {
    let gitignore = Path::new(".gitignore");
    if !gitignore.exists() {
        return Ok(());
    }

    let content = fs::read_to_string(gitignore)?;
    if content.contains(".ralph/logs") {
        return Ok(());
    }

    use std::io::Write;
    let mut file = fs::OpenOptions::new().append(true).open(gitignore)?;
    writeln!(file, "\n# aider-ralph logs\n.ralph/logs/")?;
    console::ok("Added .ralph/logs/ to .gitignore");

    Ok(())
}
