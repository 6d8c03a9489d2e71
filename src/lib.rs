use nix::sys::signal::Signal;

pub mod debugger;
pub mod gate;
pub mod logging;
pub mod options;

/// Delivery of the external gate signal into the wait loop.
///
/// Produced by the signal watcher thread, consumed by the gate's poll loop.
/// Carrying the concrete signal lets the loop log which member of the watched
/// set fired; the resume behavior is the same for all of them.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GateEvent {
    pub signal: Signal,
}
