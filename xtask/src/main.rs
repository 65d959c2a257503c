// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Build automation for the Strata workspace.
// Run with: cargo xtask <command>

mod helpers;

use anyhow::Result;
use clap::{Parser, Subcommand};
use helpers::*;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "xtask", about = "Strata build automation", before_help = BANNER)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Build all crates.
    Build,
    /// Run unit, integration and doc tests.
    Test,
    /// Type-check all crates.
    Check,
    /// Format all code.
    Format,
    /// Run clippy with warnings as errors.
    Clippy,
    /// Run the accessor benchmarks.
    Bench,
    /// Build, test, check formatting and lint.
    All,
}

const BUILD: Task = Task {
    name: "Build",
    color: BLUE,
    info: "Compiling all workspace crates in debug mode",
    args: &["build", "--workspace"],
};

const TEST: Task = Task {
    name: "Tests",
    color: GREEN,
    info: "Running unit tests, integration tests and doc tests",
    args: &["test", "--workspace"],
};

const CHECK_TASK: Task = Task {
    name: "Check",
    color: CYAN,
    info: "Checking code for errors without building executables",
    args: &["check", "--workspace", "--all-targets"],
};

const FORMAT: Task = Task {
    name: "Format",
    color: MAGENTA,
    info: "Formatting code using rustfmt with default settings",
    args: &["fmt", "--all"],
};

const FORMAT_CHECK: Task = Task {
    name: "Format check",
    color: MAGENTA,
    info: "Verifying the code is formatted",
    args: &["fmt", "--all", "--", "--check"],
};

const CLIPPY: Task = Task {
    name: "Clippy",
    color: YELLOW,
    info: "Running Clippy linter with warnings as errors",
    args: &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
};

const BENCH: Task = Task {
    name: "Bench",
    color: BLUE,
    info: "Running criterion benchmarks of strata-data",
    args: &["bench", "-p", "strata-data"],
};

fn all() -> Result<()> {
    println!("{BANNER}");
    let pipeline = [BUILD, TEST, FORMAT_CHECK, CLIPPY];
    let start = Instant::now();
    let mut failed = Vec::new();
    for (i, task) in pipeline.iter().enumerate() {
        println!("\n{BOLD}[{}/{}]{RESET}", i + 1, pipeline.len());
        if run_task(task).is_err() {
            failed.push(task.name);
        }
    }
    let seconds = start.elapsed().as_secs_f64();
    if failed.is_empty() {
        print_success(&format!("All {} tasks passed in {seconds:.2}s", pipeline.len()));
        Ok(())
    } else {
        print_error(&format!("Failed: {}", failed.join(", ")));
        anyhow::bail!("{} of {} tasks failed", failed.len(), pipeline.len())
    }
}

fn main() -> Result<()> {
    match Cli::parse().command {
        Command::Build => run_task(&BUILD),
        Command::Test => run_task(&TEST),
        Command::Check => run_task(&CHECK_TASK),
        Command::Format => run_task(&FORMAT),
        Command::Clippy => run_task(&CLIPPY),
        Command::Bench => run_task(&BENCH),
        Command::All => all(),
    }
}
