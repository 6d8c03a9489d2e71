use std::thread;

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender, bounded};
use nix::sys::signal::{SigSet, Signal};
use tracing::{error, trace};

use crate::GateEvent;

/// Watches for the gate signal and feeds it into the gate channel.
///
/// The signal is blocked process-wide before the watcher thread starts, so
/// delivery can only happen through `SigSet::wait` on that thread. Spawn this
/// before any other thread exists: later threads inherit the mask.
pub struct SignalWatcher;

impl SignalWatcher {
    pub fn spawn(signal: Signal) -> Result<Receiver<GateEvent>> {
        let mut mask = SigSet::empty();
        mask.add(signal);
        mask.thread_block()
            .with_context(|| format!("blocking {} for the gate", signal.as_str()))?;

        // capacity 1: the wait loop consumes a single event, extras are noise
        let (gate_tx, gate_rx) = bounded(1);
        thread::spawn(move || watch(mask, gate_tx));

        Ok(gate_rx)
    }
}

/// Runs for the life of the process, parked in sigwait. Never joined: either
/// the signal arrives and the driver exits shortly after, or the driver exits
/// on its own and takes the thread with it.
fn watch(mask: SigSet, gate_tx: Sender<GateEvent>) {
    loop {
        match mask.wait() {
            Ok(signal) => {
                trace!(signal = signal.as_str(), "gate signal received");
                // deliveries after the first are dropped on the floor
                let _ = gate_tx.try_send(GateEvent { signal });
            }
            Err(errno) => {
                error!("sigwait failed: {errno}");
                break;
            }
        }
    }
}
