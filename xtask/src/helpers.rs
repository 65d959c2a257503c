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

use anyhow::{bail, Result};
use std::process::Command;
use std::time::Instant;

// ANSI color codes
pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const GREEN: &str = "\x1b[32m";
pub const RED: &str = "\x1b[31m";
pub const BLUE: &str = "\x1b[34m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";
pub const MAGENTA: &str = "\x1b[35m";

// Visual symbols
pub const CHECK: &str = "✓";
pub const CROSS: &str = "✗";

pub const BANNER: &str = concat!(
    "\x1b[1m",
    "\x1b[36m",
    "╔═══════════════════════════════════════════════════════════╗\n",
    "║                       STRATA TASKS                        ║\n",
    "╚═══════════════════════════════════════════════════════════╝",
    "\x1b[0m"
);

/// One cargo invocation run by `cargo xtask`.
pub struct Task {
    pub name: &'static str,
    pub color: &'static str,
    pub info: &'static str,
    pub args: &'static [&'static str],
}

pub fn print_task_start(task: &Task) {
    println!("\n{BOLD}{}━━━ {} ━━━{RESET}", task.color, task.name);
    println!("{BOLD}Info:{RESET} {}", task.info);
}

pub fn print_success(message: &str) {
    println!("{BOLD}{GREEN} {CHECK} {message}{RESET}");
}

pub fn print_error(message: &str) {
    println!("{BOLD}{RED} {CROSS} {message}{RESET}");
}

/// Runs `cargo <args>` with inherited output. Fails if cargo does.
pub fn run_task(task: &Task) -> Result<()> {
    print_task_start(task);
    println!("{BOLD}{CYAN}Command:{RESET} cargo {}", task.args.join(" "));
    let start = Instant::now();
    let status = Command::new("cargo").args(task.args).status()?;
    let seconds = start.elapsed().as_secs_f64();
    if status.success() {
        print_success(&format!("{} completed in {seconds:.2}s", task.name));
        Ok(())
    } else {
        print_error(&format!("{} failed after {seconds:.2}s", task.name));
        bail!("{} failed", task.name)
    }
}
