use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use nix::sys::signal::Signal;

use crate::debugger::Command;

#[derive(Clone, Debug, Subcommand)]
pub enum LaunchType {
    // Attach to an already executing target process.
    Pid {
        // PID of an existing process
        #[arg(short = 'p', long = "pid")]
        pid: i32,
    },
    // Launch the target under the debugger.
    Name {
        // Path to the target executable
        #[arg(short = 'n', long = "name")]
        name: PathBuf,
        // Arguments to the target, whitespace separated
        #[arg(long = "args")]
        args: Option<String>,
    },
}

impl LaunchType {
    /// The first resume command for this launch style. A freshly launched
    /// target needs `run`; an attached one is already live and gets `continue`.
    pub fn opening_resume(&self) -> Command {
        match self {
            LaunchType::Pid { .. } => Command::Continue,
            LaunchType::Name { .. } => Command::Run,
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(version, about = "ctgate (signal-gated resume driver for copytool debugging)")]
pub struct Options {
    /// Function the target should be stopped at.
    #[arg(long = "break-at", default_value = "llapi_hsm_action_end")]
    pub break_at: String,

    /// Signal that releases the gate and resumes the target early.
    #[arg(long = "signal", default_value = "SIGUSR2", value_parser = parse_signal)]
    pub signal: Signal,

    /// Number of poll iterations to wait for the gate signal.
    #[arg(long = "repeat", default_value_t = 20)]
    pub repeat: i32,

    /// Dwell per poll iteration, in milliseconds.
    #[arg(long = "interval-ms", default_value_t = 1000)]
    pub interval_ms: u64,

    /// Debugger binary to drive.
    #[arg(long = "gdb", default_value = "gdb")]
    pub gdb: PathBuf,

    /// Extra debugger commands, issued before the breakpoint is set.
    #[arg(long = "ex", value_name = "COMMAND")]
    pub extra_commands: Vec<String>,

    /// Session log destination. Defaults to a file under the user cache dir.
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub launch_type: LaunchType,
}

impl Options {
    pub fn validate(&self) -> Result<()> {
        if self.break_at.trim().is_empty() {
            return Err(anyhow!("breakpoint location must not be empty"));
        }

        if self.gdb.as_os_str().is_empty() {
            return Err(anyhow!("debugger binary path must not be empty"));
        }

        if let LaunchType::Pid { pid } = self.launch_type
            && pid <= 0
        {
            return Err(anyhow!("pid must be a positive process id, got {pid}"));
        }

        // parse the setup commands eagerly so a broken --ex fails before
        // anything is spawned
        self.setup_commands()?;

        Ok(())
    }

    /// The `--ex` commands, parsed into the wire vocabulary.
    pub fn setup_commands(&self) -> Result<Vec<Command>> {
        self.extra_commands
            .iter()
            .map(|raw| Command::try_from(raw.clone()))
            .collect()
    }
}

fn parse_signal(value: &str) -> Result<Signal, String> {
    if let Ok(number) = value.trim().parse::<i32>() {
        return Signal::try_from(number)
            .map_err(|e| format!("signal number {number} is not usable: {e}"));
    }

    let mut name = value.trim().to_uppercase();
    if !name.starts_with("SIG") {
        name.insert_str(0, "SIG");
    }
    name.parse::<Signal>()
        .map_err(|e| format!("unrecognized signal {value:?}: {e}"))
}
