use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, ChildStdin, Stdio};
use std::thread;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, trace};

use crate::debugger::{Command, DebugSession};
use crate::options::{LaunchType, Options};

/// A gdb process driven over its stdin.
///
/// The session owns the pipe ends but the child is deliberately never killed
/// or waited on. The whole point of the driver is to let the resumed target
/// finish its HSM action, so teardown is gdb's business: it winds down on
/// stdin EOF once this process exits.
pub struct GdbSession {
    child: Child,
    stdin: ChildStdin,
}

impl GdbSession {
    /// Spawn gdb for the configured launch type and start mirroring its
    /// output into our log.
    pub fn spawn(options: &Options) -> Result<GdbSession> {
        let mut gdb = std::process::Command::new(&options.gdb);
        gdb.arg("--nx").arg("-q");

        match &options.launch_type {
            LaunchType::Pid { pid } => {
                gdb.arg("-p").arg(pid.to_string());
            }
            LaunchType::Name { name, args } => {
                gdb.arg("--args").arg(name);
                if let Some(args) = args {
                    gdb.args(args.split_whitespace());
                }
            }
        }

        let mut child = gdb
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawning debugger {:?}", options.gdb))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("no stdin pipe on the spawned debugger"))?;

        // start the output mirrors; each thread ends on pipe EOF and is never
        // joined
        if let Some(stdout) = child.stdout.take() {
            thread::spawn(move || mirror_output(stdout, "stdout"));
        }
        if let Some(stderr) = child.stderr.take() {
            thread::spawn(move || mirror_output(stderr, "stderr"));
        }

        info!(pid = child.id(), gdb = %options.gdb.display(), "debugger session started");

        Ok(GdbSession { child, stdin })
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }
}

impl DebugSession for GdbSession {
    fn execute(&mut self, command: Command) -> Result<()> {
        trace!(%command, "forwarding command to gdb");
        writeln!(self.stdin, "{command}")
            .with_context(|| format!("delivering {command:?} to gdb"))?;
        self.stdin.flush().context("flushing gdb stdin")?;
        Ok(())
    }
}

/// Re-emit one of gdb's output streams through our log, so complaints like an
/// unknown breakpoint symbol end up somewhere a failing test can be triaged
/// from.
fn mirror_output<R: Read>(stream: R, label: &'static str) {
    let reader = BufReader::new(stream);
    for line in reader.lines() {
        match line {
            Ok(line) if !line.is_empty() => debug!(target: "gdb", stream = label, "{line}"),
            Ok(_) => {}
            Err(e) => {
                trace!(stream = label, "gdb output stream went away: {e}");
                break;
            }
        }
    }
}
