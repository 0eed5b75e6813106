// src/exec/command.rs

//! Shell command action.

use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use crate::action::{Action, Flow};

/// Runs a shell command each time the condition holds.
///
/// A non-zero exit is an action failure: the monitor logs it and keeps
/// dispatching. With `quit_on_success`, the first successful run asks the
/// monitor to quit.
#[derive(Debug, Clone)]
pub struct CommandAction {
    cmd: String,
    quit_on_success: bool,
    runs: u64,
}

impl CommandAction {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self {
            cmd: cmd.into(),
            quit_on_success: false,
            runs: 0,
        }
    }

    pub fn quit_on_success(mut self, quit: bool) -> Self {
        self.quit_on_success = quit;
        self
    }

    pub fn cmd(&self) -> &str {
        &self.cmd
    }

    fn shell_command(&self) -> Command {
        // Build a shell command appropriate for the platform.
        if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(&self.cmd);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(&self.cmd);
            c
        }
    }
}

impl Action for CommandAction {
    fn run(&mut self) -> Result<Flow> {
        self.runs += 1;
        info!(cmd = %self.cmd, run = self.runs, "running command");

        let status = self
            .shell_command()
            .status()
            .with_context(|| format!("spawning `{}`", self.cmd))?;

        let code = status.code().unwrap_or(-1);
        debug!(cmd = %self.cmd, exit_code = code, success = status.success(), "command exited");

        if !status.success() {
            bail!("command `{}` exited with code {}", self.cmd, code);
        }

        if self.quit_on_success {
            Ok(Flow::Quit)
        } else {
            Ok(Flow::Continue)
        }
    }
}
