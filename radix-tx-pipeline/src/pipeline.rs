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
//! The transaction pipeline
//!
//! One [`TransactionTracking`] drives one transaction through
//! build, confirmation, signing, finalization, submission and status polling.
//! Every transition emits exactly one tracking event; the first failure is
//! terminal and reported both on the event stream and on the completion
//! output. Nothing is retried; resubmission is the caller's call.

use std::sync::Arc;
use std::time::Duration;

use radix_node_api::types::{SignedTransaction, TransactionIntent, TxId, TxStatus};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, Interval, MissedTickBehavior};

use crate::confirmation::ConfirmationRequest;
use crate::errors::PipelineError;
use crate::events::{EventLog, EventSubscription, TrackingEvent, TxPhase};
use crate::intent::non_native_hrp;
use crate::node::TransactionNode;
use crate::wallet::Wallet;

/// How the confirmation step is resolved
#[derive(Debug, Default)]
pub enum UserConfirmation {
    /// Confirm automatically; the flow proceeds straight to signing
    #[default]
    Skip,
    /// Park until the caller confirms via the published
    /// [`ConfirmationRequest`]
    Manual,
}

/// What drives the status polling loop
#[derive(Debug)]
pub enum PollTrigger {
    /// Poll on a fixed period
    Interval(Duration),
    /// Poll once per received tick; the caller owns the pace
    Ticks(mpsc::Receiver<()>),
}

impl Default for PollTrigger {
    fn default() -> Self {
        PollTrigger::Interval(Duration::from_secs(1))
    }
}

/// Per-transaction options
#[derive(Debug, Default)]
pub struct TrackingOptions {
    /// How the confirmation step is resolved
    pub confirmation: UserConfirmation,
    /// What drives the status polling loop
    pub poll_trigger: PollTrigger,
}

/// Handle over one transaction's lifecycle
///
/// Dropping the handle cancels the driver task and with it every pending
/// subscription of this transaction.
pub struct TransactionTracking {
    events: EventLog,
    confirmations: watch::Receiver<Option<ConfirmationRequest>>,
    completion: Option<oneshot::Receiver<Result<TxId, PipelineError>>>,
    outcome: Option<Result<TxId, PipelineError>>,
    driver: JoinHandle<()>,
}

impl TransactionTracking {
    /// Start driving `intent` through the lifecycle
    pub fn submit(
        node: Arc<dyn TransactionNode>,
        wallet: Arc<dyn Wallet>,
        intent: TransactionIntent,
        options: TrackingOptions,
    ) -> Self {
        let events = EventLog::new();
        let (confirm_tx, confirm_rx) = watch::channel(None);
        let (done_tx, done_rx) = oneshot::channel();

        let driver = tokio::spawn(drive(node, wallet, intent, options, events.clone(), confirm_tx, done_tx));

        Self { events, confirmations: confirm_rx, completion: Some(done_rx), outcome: None, driver }
    }

    /// Subscribe to the tracking events, history included
    pub fn events(&self) -> EventSubscription {
        self.events.subscribe()
    }

    /// The pending confirmation request, waiting for it to be published
    ///
    /// Replayable: callers arriving after the request was published still
    /// receive it. `None` once the pipeline is past the point of publishing
    /// one.
    pub async fn confirmation(&mut self) -> Option<ConfirmationRequest> {
        loop {
            {
                let current = self.confirmations.borrow_and_update();
                if let Some(request) = current.as_ref() {
                    return Some(request.clone());
                }
            }

            if self.confirmations.changed().await.is_err() {
                let current = self.confirmations.borrow();
                return current.as_ref().cloned();
            }
        }
    }

    /// The final transaction id, or the first terminal error
    pub async fn completion(&mut self) -> Result<TxId, PipelineError> {
        if let Some(rx) = self.completion.take() {
            self.outcome = Some(rx.await.unwrap_or(Err(PipelineError::Aborted)));
        }

        match &self.outcome {
            Some(outcome) => outcome.clone(),
            None => Err(PipelineError::Aborted),
        }
    }

    /// Cancel the transaction's driver task and subscriptions
    ///
    /// In-flight node requests are abandoned. A device frame already on the
    /// wire completes on its own task (see [`ledger_radix::RadixApp::sign_tx`]);
    /// the rest of the stream is abandoned and the wallet resets its session
    /// before the next signing operation.
    pub fn cancel(&self) {
        self.driver.abort();
    }
}

impl Drop for TransactionTracking {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

enum TickSource {
    Interval(Interval),
    Ticks(mpsc::Receiver<()>),
}

impl TickSource {
    fn new(trigger: PollTrigger) -> Self {
        match trigger {
            PollTrigger::Interval(period) => {
                let mut ticker = interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                TickSource::Interval(ticker)
            }
            PollTrigger::Ticks(rx) => TickSource::Ticks(rx),
        }
    }

    /// False once a caller-supplied trigger is exhausted
    async fn tick(&mut self) -> bool {
        match self {
            TickSource::Interval(ticker) => {
                ticker.tick().await;
                true
            }
            TickSource::Ticks(rx) => rx.recv().await.is_some(),
        }
    }
}

fn fail(
    events: &EventLog,
    completion: oneshot::Sender<Result<TxId, PipelineError>>,
    error: PipelineError,
    in_phase: TxPhase,
) {
    log::warn!("transaction failed in phase {in_phase:?}: {error}");
    events.emit(TrackingEvent::Error { error: error.clone(), in_phase });
    let _ = completion.send(Err(error));
}

async fn drive(
    node: Arc<dyn TransactionNode>,
    wallet: Arc<dyn Wallet>,
    intent: TransactionIntent,
    options: TrackingOptions,
    events: EventLog,
    confirmations: watch::Sender<Option<ConfirmationRequest>>,
    completion: oneshot::Sender<Result<TxId, PipelineError>>,
) {
    // the Ledger app constraint is checked before anything leaves the process
    let hrp = match non_native_hrp(&intent) {
        Ok(hrp) => hrp,
        Err(e) => return fail(&events, completion, e, TxPhase::Signed),
    };

    let active = wallet.observe_active_account();
    let account = active.borrow().clone();
    drop(active);

    log::debug!("building transaction for {}", account.address);
    let built = match node.build_transaction(&intent, &account.address).await {
        Ok(built) => built,
        Err(e) => return fail(&events, completion, e.into(), TxPhase::Built),
    };
    events.emit(TrackingEvent::Built(built.clone()));

    let request = ConfirmationRequest::new(built.clone());
    confirmations.send_replace(Some(request.clone()));
    events.emit(TrackingEvent::ConfirmationRequested);

    if matches!(options.confirmation, UserConfirmation::Skip) {
        request.confirm();
    }
    request.acknowledged().await;
    events.emit(TrackingEvent::Confirmed);

    let signature = match wallet.sign(&built.transaction, hrp.as_deref()).await {
        Ok(signature) => signature,
        Err(e) => return fail(&events, completion, e.into(), TxPhase::Signed),
    };
    let signed = SignedTransaction {
        transaction: built.transaction,
        signature: signature.signature,
        public_key_of_signer: signature.public_key,
    };
    events.emit(TrackingEvent::Signed(signed.clone()));

    let finalized = match node.finalize_transaction(&signed).await {
        Ok(finalized) => finalized,
        Err(e) => return fail(&events, completion, e.into(), TxPhase::Finalized),
    };
    events.emit(TrackingEvent::Finalized(finalized.clone()));

    let pending = match node.submit_transaction(&finalized).await {
        Ok(pending) => pending,
        Err(e) => return fail(&events, completion, e.into(), TxPhase::Submitted),
    };
    events.emit(TrackingEvent::Submitted(pending.clone()));

    let mut ticks = TickSource::new(options.poll_trigger);
    let mut last: Option<TxStatus> = None;

    loop {
        if !ticks.tick().await {
            return fail(&events, completion, PipelineError::Aborted, TxPhase::StatusUpdate);
        }

        let status = match node.transaction_status(&pending.tx_id).await {
            Ok(status) => status,
            Err(e) => {
                // transient poll failures do not end the transaction
                log::warn!("status poll failed: {e}");
                continue;
            }
        };

        if last == Some(status.status) {
            continue;
        }
        last = Some(status.status);
        events.emit(TrackingEvent::StatusUpdate(status.clone()));

        match status.status {
            TxStatus::Pending => {}
            TxStatus::Confirmed => {
                events.emit(TrackingEvent::Completed(pending.tx_id.clone()));
                let _ = completion.send(Ok(pending.tx_id));
                return;
            }
            TxStatus::Failed => {
                return fail(
                    &events,
                    completion,
                    PipelineError::TxRejected(pending.tx_id.clone()),
                    TxPhase::StatusUpdate,
                );
            }
        }
    }
}
