use anyhow::Result;
use clap::Parser;
use ctgate::{
    debugger::gdb::GdbSession,
    gate::{ResumeGate, WaitOutcome, signal_watcher::SignalWatcher},
    logging,
    options::Options,
};
use tracing::info;

fn main() -> Result<()> {
    let options = Options::parse();
    options.validate()?;

    // mask the gate signal before any other thread exists, so the logging
    // worker and the gdb mirrors all inherit it
    let gate_rx = SignalWatcher::spawn(options.signal)?;

    let log_guard = logging::init(&options)?;

    let mut session = GdbSession::spawn(&options)?;
    let gate = ResumeGate::new(&options, gate_rx)?;

    match gate.wait_for_signal(&mut session)? {
        WaitOutcome::SignalReceived(signal) => {
            info!(signal = signal.as_str(), "target resumed by the gate signal");
            // flush the session log; exit() runs no destructors
            drop(log_guard);
            std::process::exit(0);
        }
        WaitOutcome::CountdownLapsed => {
            info!(
                gdb_pid = session.pid(),
                "countdown lapsed without the gate signal; target resumed anyway"
            );
            Ok(())
        }
    }
}
