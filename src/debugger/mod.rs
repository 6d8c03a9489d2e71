use std::fmt;

use anyhow::{Result, anyhow};

pub mod gdb;

/// The one seam between the gate and whatever debugger executes its commands.
///
/// Production code drives a spawned gdb through [`gdb::GdbSession`]; tests
/// substitute a recorder. Implementations deliver the command and report
/// delivery failures -- whether the debugger liked the command is the
/// debugger's business.
pub trait DebugSession {
    fn execute(&mut self, command: Command) -> Result<()>;
}

/// The wire vocabulary understood by the debugger session.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// Stop the target at a location (`break <location>`).
    Break { location: String },
    /// Start the target from scratch.
    Run,
    Continue,
    /// Exit the debugger (and kill the target if the debugger launched it).
    Quit,
    /// Anything else gdb understands, passed through verbatim.
    Raw(String),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Break { location } => write!(f, "break {location}"),
            Command::Run => write!(f, "run"),
            Command::Continue => write!(f, "continue"),
            Command::Quit => write!(f, "quit"),
            Command::Raw(line) => write!(f, "{line}"),
        }
    }
}

impl TryFrom<String> for Command {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Command> {
        let mut words = value.split_whitespace();
        let cmd = words.next().unwrap_or("").to_string();
        let args: Vec<String> = words.map(|s| s.to_string()).collect();

        let command = match cmd.to_lowercase().as_str() {
            "" => return Err(anyhow!("empty debugger command")),
            "run" | "r" => Command::Run,
            "continue" | "c" => Command::Continue,
            "quit" | "q" => Command::Quit,
            "break" | "b" => {
                if args.is_empty() {
                    return Err(anyhow!("break requires a location: {:?}", value));
                }
                Command::Break {
                    location: args.join(" "),
                }
            }
            // not part of our vocabulary; let gdb make sense of it
            _ => Command::Raw(value),
        };

        Ok(command)
    }
}
