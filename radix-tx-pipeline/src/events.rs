/*******************************************************************************
*   (c) 2022-2024 Zondax AG
*
*  Licensed under the Apache License, Version 2.0 (the "License");
*  you may not use this file except in compliance with the License.
*  You may obtain a copy of the License at
*
*      http://www.apache.org/licenses/LICENSE-2.0
*
*  Unless required by applicable law or agreed to in writing, software
*  distributed under the License is distributed on an "AS IS" BASIS,
*  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
*  See the License for the specific language governing permissions and
*  limitations under the License.
********************************************************************************/
//! Tracking events and their replayable fan-out channel
//!
//! Every pipeline transition emits exactly one event. Subscribers joining
//! late receive all prior events before live ones, so the full phase sequence
//! is observable at any time.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use radix_node_api::types::{
    BuiltTransaction, FinalizedTransaction, PendingTransaction, SignedTransaction, TransactionStatus, TxId,
};
use tokio::sync::broadcast;

use crate::errors::PipelineError;

/// Phase tag of a tracking event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxPhase {
    /// The node built the transaction from the intent
    Built,
    /// The caller was asked to confirm the built transaction
    ConfirmationRequested,
    /// The caller confirmed the built transaction
    Confirmed,
    /// The wallet produced a signature
    Signed,
    /// The node attached the signature and assigned a transaction id
    Finalized,
    /// The submit endpoint accepted the transaction
    Submitted,
    /// A fresh status was observed while polling
    StatusUpdate,
    /// A CONFIRMED status ended the lifecycle
    Completed,
}

/// One emission of the transaction pipeline
#[derive(Clone, Debug)]
pub enum TrackingEvent {
    /// The node built the transaction from the intent
    Built(BuiltTransaction),
    /// The caller was asked to confirm the built transaction
    ConfirmationRequested,
    /// The caller confirmed the built transaction
    Confirmed,
    /// The wallet produced a signature
    Signed(SignedTransaction),
    /// The node attached the signature and assigned a transaction id
    Finalized(FinalizedTransaction),
    /// The submit endpoint accepted the transaction
    Submitted(PendingTransaction),
    /// A fresh status was observed while polling; consecutive duplicates are
    /// suppressed
    StatusUpdate(TransactionStatus),
    /// A CONFIRMED status ended the lifecycle
    Completed(TxId),
    /// A stage failed; no further events follow
    Error {
        /// What went wrong
        error: PipelineError,
        /// The phase that was running when the failure was observed
        in_phase: TxPhase,
    },
}

impl TrackingEvent {
    /// Phase tag of this event
    pub fn phase(&self) -> TxPhase {
        match self {
            TrackingEvent::Built(_) => TxPhase::Built,
            TrackingEvent::ConfirmationRequested => TxPhase::ConfirmationRequested,
            TrackingEvent::Confirmed => TxPhase::Confirmed,
            TrackingEvent::Signed(_) => TxPhase::Signed,
            TrackingEvent::Finalized(_) => TxPhase::Finalized,
            TrackingEvent::Submitted(_) => TxPhase::Submitted,
            TrackingEvent::StatusUpdate(_) => TxPhase::StatusUpdate,
            TrackingEvent::Completed(_) => TxPhase::Completed,
            TrackingEvent::Error { in_phase, .. } => *in_phase,
        }
    }

    /// Whether this event ends the stream
    pub fn is_terminal(&self) -> bool {
        matches!(self, TrackingEvent::Completed(_) | TrackingEvent::Error { .. })
    }
}

const FANOUT_CAPACITY: usize = 64;

/// Multi-subscriber event channel with full replay for late subscribers
#[derive(Clone)]
pub(crate) struct EventLog {
    shared: Arc<Shared>,
}

struct Shared {
    history: Mutex<Vec<TrackingEvent>>,
    tx: broadcast::Sender<TrackingEvent>,
}

impl EventLog {
    pub(crate) fn new() -> Self {
        let (tx, _) = broadcast::channel(FANOUT_CAPACITY);
        Self { shared: Arc::new(Shared { history: Mutex::new(vec![]), tx }) }
    }

    /// Record and fan out one event
    pub(crate) fn emit(&self, event: TrackingEvent) {
        log::debug!("tracking event: {:?}", event.phase());

        let mut history = self.shared.history.lock().unwrap_or_else(|e| e.into_inner());
        history.push(event.clone());
        // no receivers is fine, the history keeps the event for later subscribers
        let _ = self.shared.tx.send(event);
    }

    /// Subscribe, replaying every event emitted so far
    pub(crate) fn subscribe(&self) -> EventSubscription {
        // the lock orders the snapshot before any concurrent emit reaches the
        // broadcast channel, so events are neither lost nor duplicated
        let history = self.shared.history.lock().unwrap_or_else(|e| e.into_inner());
        let rx = self.shared.tx.subscribe();

        EventSubscription { backlog: history.iter().cloned().collect(), rx, done: false }
    }
}

/// A subscription to the tracking events of one transaction
///
/// Yields the full event history first, then live events, and ends after the
/// terminal event.
pub struct EventSubscription {
    backlog: VecDeque<TrackingEvent>,
    rx: broadcast::Receiver<TrackingEvent>,
    done: bool,
}

impl EventSubscription {
    /// Next event, or `None` once a terminal event has been yielded
    pub async fn next(&mut self) -> Option<TrackingEvent> {
        if self.done {
            return None;
        }

        let event = match self.backlog.pop_front() {
            Some(event) => Some(event),
            None => loop {
                match self.rx.recv().await {
                    Ok(event) => break Some(event),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        log::warn!("event subscriber lagged, skipped {missed} events");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break None,
                }
            },
        };

        if let Some(event) = &event {
            if event.is_terminal() {
                self.done = true;
            }
        }

        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn late_subscriber_replays_history() {
        let log = EventLog::new();
        log.emit(TrackingEvent::ConfirmationRequested);
        log.emit(TrackingEvent::Confirmed);

        let mut sub = log.subscribe();
        assert_eq!(sub.next().await.unwrap().phase(), TxPhase::ConfirmationRequested);
        assert_eq!(sub.next().await.unwrap().phase(), TxPhase::Confirmed);
    }

    #[tokio::test]
    async fn subscription_ends_after_terminal_event() {
        let log = EventLog::new();
        log.emit(TrackingEvent::Completed(TxId("deadbeef".into())));

        let mut sub = log.subscribe();
        assert!(sub.next().await.unwrap().is_terminal());
        assert!(sub.next().await.is_none());
    }

    #[tokio::test]
    async fn live_events_follow_backlog() {
        let log = EventLog::new();
        log.emit(TrackingEvent::ConfirmationRequested);

        let mut sub = log.subscribe();
        log.emit(TrackingEvent::Confirmed);

        assert_eq!(sub.next().await.unwrap().phase(), TxPhase::ConfirmationRequested);
        assert_eq!(sub.next().await.unwrap().phase(), TxPhase::Confirmed);
    }
}
