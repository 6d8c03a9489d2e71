use std::time::Duration;

use anyhow::Result;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use nix::sys::signal::Signal;
use tracing::{info, trace};

use crate::GateEvent;
use crate::debugger::{Command, DebugSession};
use crate::options::Options;

pub mod signal_watcher;

/// How a bounded wait ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WaitOutcome {
    /// The gate signal arrived and the target was resumed early.
    SignalReceived(Signal),
    /// The countdown ran out; the target was resumed anyway.
    CountdownLapsed,
}

/// The signal-gated resume component.
///
/// Holds everything the bounded wait needs: the breakpoint location, the
/// opening commands, the countdown, and the receiving end of the gate channel
/// fed by the signal watcher.
pub struct ResumeGate {
    break_at: String,
    setup: Vec<Command>,
    opening_resume: Command,
    signal: Signal,
    repeat: i32,
    interval: Duration,
    gate_rx: Receiver<GateEvent>,
}

impl ResumeGate {
    pub fn new(options: &Options, gate_rx: Receiver<GateEvent>) -> Result<ResumeGate> {
        Ok(ResumeGate {
            break_at: options.break_at.clone(),
            setup: options.setup_commands()?,
            opening_resume: options.launch_type.opening_resume(),
            signal: options.signal,
            repeat: options.repeat,
            interval: Duration::from_millis(options.interval_ms),
            gate_rx,
        })
    }

    /// Stop the target at the breakpoint, start it, and hold the resulting
    /// stop behind the gate: resume as soon as the gate signal arrives, or
    /// unconditionally once the countdown lapses.
    pub fn wait_for_signal<S: DebugSession>(&self, session: &mut S) -> Result<WaitOutcome> {
        for command in &self.setup {
            session.execute(command.clone())?;
        }
        session.execute(Command::Break {
            location: self.break_at.clone(),
        })?;

        info!(
            pid = std::process::id(),
            signal = self.signal.as_str(),
            "gate armed; signal this pid to resume the target early"
        );
        session.execute(self.opening_resume.clone())?;

        let mut repeat = self.repeat;
        while repeat > 0 {
            let (next, event) = poll(repeat, self.interval, &self.gate_rx);
            repeat = next;
            if let Some(event) = event {
                session.execute(Command::Continue)?;
                return Ok(WaitOutcome::SignalReceived(event.signal));
            }
            trace!(repeat, "gate dwell elapsed without the signal");
        }

        // countdown lapsed: unblock the target regardless
        session.execute(Command::Continue)?;
        Ok(WaitOutcome::CountdownLapsed)
    }
}

/// One iteration of the bounded wait: park on the gate channel for at most
/// `dwell`, then hand back the decremented countdown together with whatever
/// arrived. The decrement holds for any countdown value and any dwell, so the
/// arithmetic can be exercised with `Duration::ZERO` and no live watcher.
pub fn poll(repeat: i32, dwell: Duration, gate: &Receiver<GateEvent>) -> (i32, Option<GateEvent>) {
    let event = match gate.recv_timeout(dwell) {
        Ok(event) => Some(event),
        // a vanished watcher degrades to a fast countdown; the final resume
        // still runs
        Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
    };
    (repeat - 1, event)
}
