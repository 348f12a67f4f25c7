// Path lifecycle events and the per-tick FIFO that carries them.
//
// Both the simulation thread and search workers produce events. They all go
// through one `mpsc` channel, and the orchestrator drains it exactly once per
// tick, so consumers see a single ordered stream aligned with tick
// boundaries regardless of which thread produced each event.
//
// Consumers either read the drained events from `TickOutput` or register a
// `PathEventListener`, which is called for each event during the drain.
//
// See also: `orchestrator.rs` (producer and drainer).

use crate::movement::{FailureReason, MovementKind};
use crate::types::BlockPos;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathEvent {
    /// An initial or recovery search was dispatched.
    CalcStarted,
    /// A search finished and its path is now being executed.
    CalcFinishedNowExecuting,
    /// An initial or recovery search produced nothing usable.
    CalcFailed,
    /// A lookahead search for the next segment was dispatched.
    NextSegmentCalcStarted,
    NextSegmentCalcFinished,
    /// The current segment ended and the planned next one took over.
    ContinuingOntoPlannedNext,
    /// The agent reached the next segment before finishing the current one.
    SplicingOntoNextEarly,
    AtGoal,
    /// The current segment ended while the next one is still being computed.
    PathFinishedNextStillCalculating,
    NextCalcFailed,
    /// The planned next segment no longer fits and was dropped.
    DiscardNext,
    Canceled,
    /// A movement failed and the current segment was abandoned.
    SegmentFailed {
        at: BlockPos,
        kind: MovementKind,
        reason: FailureReason,
    },
}

/// Observer for drained events. Every method has a no-op default.
pub trait PathEventListener: Send {
    /// Called once per event, in queue order.
    fn on_event(&mut self, _tick: u64, _event: &PathEvent) {}

    /// Called after the drain with the number of events delivered, including
    /// ticks with none.
    fn on_drained(&mut self, _tick: u64, _count: usize) {}
}

/// Logs every event through `tracing`.
#[derive(Debug, Default)]
pub struct TracingListener;

impl PathEventListener for TracingListener {
    fn on_event(&mut self, tick: u64, event: &PathEvent) {
        match event {
            PathEvent::CalcFailed | PathEvent::NextCalcFailed => warn!(tick, ?event, "path event"),
            PathEvent::SegmentFailed { at, kind, reason } => {
                warn!(tick, %at, %kind, ?reason, "segment failed");
            }
            PathEvent::AtGoal | PathEvent::CalcFinishedNowExecuting => info!(tick, ?event, "path event"),
            _ => debug!(tick, ?event, "path event"),
        }
    }
}

/// Multi-producer FIFO of `PathEvent`s.
#[derive(Debug)]
pub struct EventQueue {
    sender: Sender<PathEvent>,
    receiver: Receiver<PathEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { sender, receiver }
    }

    /// A producer handle for another thread.
    pub fn sender(&self) -> Sender<PathEvent> {
        self.sender.clone()
    }

    pub fn push(&self, event: PathEvent) {
        // The receiver lives as long as `self`, so this cannot fail.
        let _ = self.sender.send(event);
    }

    /// Everything queued so far, oldest first. Never blocks.
    pub fn drain(&self) -> Vec<PathEvent> {
        self.receiver.try_iter().collect()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn drain_preserves_order_and_empties() {
        let queue = EventQueue::new();
        queue.push(PathEvent::CalcStarted);
        queue.push(PathEvent::CalcFinishedNowExecuting);
        queue.push(PathEvent::AtGoal);
        assert_eq!(
            queue.drain(),
            vec![
                PathEvent::CalcStarted,
                PathEvent::CalcFinishedNowExecuting,
                PathEvent::AtGoal
            ]
        );
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn events_from_other_threads_arrive_in_send_order() {
        let queue = EventQueue::new();
        let sender = queue.sender();
        queue.push(PathEvent::NextSegmentCalcStarted);
        thread::spawn(move || {
            sender.send(PathEvent::NextSegmentCalcFinished).unwrap();
            sender.send(PathEvent::DiscardNext).unwrap();
        })
        .join()
        .unwrap();
        assert_eq!(
            queue.drain(),
            vec![
                PathEvent::NextSegmentCalcStarted,
                PathEvent::NextSegmentCalcFinished,
                PathEvent::DiscardNext
            ]
        );
    }

    #[test]
    fn listener_defaults_are_no_ops() {
        struct Silent;
        impl PathEventListener for Silent {}
        let mut silent = Silent;
        silent.on_event(1, &PathEvent::Canceled);
        silent.on_drained(1, 0);
        TracingListener.on_event(
            2,
            &PathEvent::SegmentFailed {
                at: BlockPos::new(0, 1, 0),
                kind: MovementKind::Traverse,
                reason: FailureReason::Timeout,
            },
        );
    }
}
