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
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use env_logger::Env;
use ledger_radix::RadixPath;
use radix_node_api::types::{
    AccountAddress, BuiltTransaction, FinalizedTransaction, HexBytes, PendingTransaction, Rri, SignedTransaction,
    TransactionIntent, TransactionStatus, TxId, TxStatus, UnsignedTransaction,
};
use radix_node_api::Error as NodeError;
use radix_tx_pipeline::{
    Account, AccountSignature, IntentBuilder, PipelineError, PollTrigger, SignError, TrackingEvent, TrackingOptions,
    TransactionNode, TransactionTracking, TxPhase, UserConfirmation, Wallet,
};
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;

fn init_logging() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .is_test(true)
        .try_init();
}

fn account_fixture() -> Account {
    Account {
        address: AccountAddress("rdx1qspsender".into()),
        path: RadixPath::new(0, 0, 0).unwrap(),
    }
}

fn built_fixture() -> BuiltTransaction {
    BuiltTransaction {
        transaction: UnsignedTransaction {
            blob: HexBytes(vec![0x01, 0x02, 0x03]),
            instructions: vec![HexBytes(vec![0x01, 0x02]), HexBytes(vec![0x03])],
            hash_of_blob_to_sign: HexBytes(vec![0u8; 32]),
        },
        fee: "100".into(),
    }
}

fn xrd_intent() -> TransactionIntent {
    IntentBuilder::new()
        .transfer(
            AccountAddress("rdx1qspsender".into()),
            AccountAddress("rdx1qsprecipient".into()),
            "100",
            Rri("xrd_rr1qy5wfsfh".into()),
        )
        .unwrap()
        .build()
}

/// Poll trigger firing exactly `n` times
fn ticks(n: usize) -> PollTrigger {
    let (tx, rx) = mpsc::channel(n.max(1));
    for _ in 0..n {
        tx.try_send(()).unwrap();
    }
    PollTrigger::Ticks(rx)
}

struct MockNode {
    statuses: Mutex<VecDeque<Result<TxStatus, NodeError>>>,
    build_error: Option<String>,
    build_calls: AtomicUsize,
}

impl MockNode {
    fn with_statuses(statuses: Vec<Result<TxStatus, NodeError>>) -> Arc<Self> {
        Arc::new(Self { statuses: Mutex::new(statuses.into()), build_error: None, build_calls: AtomicUsize::new(0) })
    }

    fn failing_build(message: &str) -> Arc<Self> {
        Arc::new(Self {
            statuses: Mutex::new(VecDeque::new()),
            build_error: Some(message.to_owned()),
            build_calls: AtomicUsize::new(0),
        })
    }

    fn build_calls(&self) -> usize {
        self.build_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransactionNode for MockNode {
    async fn build_transaction(
        &self,
        _intent: &TransactionIntent,
        _fee_payer: &AccountAddress,
    ) -> Result<BuiltTransaction, NodeError> {
        self.build_calls.fetch_add(1, Ordering::SeqCst);

        match &self.build_error {
            Some(message) => Err(NodeError::BuildTxFromIntent(message.clone())),
            None => Ok(built_fixture()),
        }
    }

    async fn finalize_transaction(&self, signed: &SignedTransaction) -> Result<FinalizedTransaction, NodeError> {
        Ok(FinalizedTransaction { blob: signed.transaction.blob.clone(), tx_id: TxId("txfixture01".into()) })
    }

    async fn submit_transaction(&self, finalized: &FinalizedTransaction) -> Result<PendingTransaction, NodeError> {
        Ok(PendingTransaction { tx_id: finalized.tx_id.clone() })
    }

    async fn transaction_status(&self, tx_id: &TxId) -> Result<TransactionStatus, NodeError> {
        let next = self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(TxStatus::Pending));
        next.map(|status| TransactionStatus { tx_id: tx_id.clone(), status })
    }
}

struct MockWallet {
    active: watch::Sender<Account>,
    sign_calls: AtomicUsize,
}

impl MockWallet {
    fn new() -> Arc<Self> {
        let (active, _) = watch::channel(account_fixture());
        Arc::new(Self { active, sign_calls: AtomicUsize::new(0) })
    }

    fn sign_calls(&self) -> usize {
        self.sign_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Wallet for MockWallet {
    async fn sign(
        &self,
        _transaction: &UnsignedTransaction,
        _non_native_hrp: Option<&str>,
    ) -> Result<AccountSignature, SignError> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);

        Ok(AccountSignature { signature: HexBytes(vec![0x01; 64]), public_key: HexBytes(vec![0x02; 33]) })
    }

    fn observe_active_account(&self) -> watch::Receiver<Account> {
        self.active.subscribe()
    }
}

async fn drain_phases(tracking: &TransactionTracking) -> Vec<TxPhase> {
    let mut sub = tracking.events();
    let mut phases = vec![];
    while let Some(event) = timeout(Duration::from_secs(5), sub.next())
        .await
        .expect("timed out waiting for event")
    {
        phases.push(event.phase());
    }
    phases
}

#[tokio::test]
async fn auto_confirmed_happy_path() {
    init_logging();

    let node = MockNode::with_statuses(vec![Ok(TxStatus::Pending), Ok(TxStatus::Pending), Ok(TxStatus::Confirmed)]);
    let wallet = MockWallet::new();

    let mut tracking = TransactionTracking::submit(
        node.clone(),
        wallet.clone(),
        xrd_intent(),
        TrackingOptions { confirmation: UserConfirmation::Skip, poll_trigger: ticks(3) },
    );

    let tx_id = tracking.completion().await.unwrap();
    assert_eq!(tx_id, TxId("txfixture01".into()));

    // a subscriber arriving after completion still sees the whole sequence
    let phases = drain_phases(&tracking).await;
    assert_eq!(
        phases,
        vec![
            TxPhase::Built,
            TxPhase::ConfirmationRequested,
            TxPhase::Confirmed,
            TxPhase::Signed,
            TxPhase::Finalized,
            TxPhase::Submitted,
            TxPhase::StatusUpdate,
            TxPhase::StatusUpdate,
            TxPhase::Completed,
        ]
    );

    // consecutive PENDING statuses collapse into a single update
    let mut sub = tracking.events();
    let mut updates = vec![];
    while let Some(event) = sub.next().await {
        if let TrackingEvent::StatusUpdate(status) = event {
            updates.push(status.status);
        }
    }
    assert_eq!(updates, vec![TxStatus::Pending, TxStatus::Confirmed]);

    assert_eq!(node.build_calls(), 1);
    assert_eq!(wallet.sign_calls(), 1);
}

#[tokio::test]
async fn manual_confirmation_gates_signing() {
    init_logging();

    let node = MockNode::with_statuses(vec![Ok(TxStatus::Confirmed)]);
    let wallet = MockWallet::new();

    let mut tracking = TransactionTracking::submit(
        node.clone(),
        wallet.clone(),
        xrd_intent(),
        TrackingOptions { confirmation: UserConfirmation::Manual, poll_trigger: ticks(1) },
    );

    let mut sub = tracking.events();
    assert_eq!(sub.next().await.unwrap().phase(), TxPhase::Built);
    assert_eq!(sub.next().await.unwrap().phase(), TxPhase::ConfirmationRequested);

    // nothing moves until the caller confirms
    assert!(timeout(Duration::from_millis(100), sub.next()).await.is_err());
    assert_eq!(wallet.sign_calls(), 0);

    let request = tracking.confirmation().await.expect("request is published");
    assert_eq!(request.transaction(), &built_fixture());
    request.confirm();
    // confirming twice is a no-op
    request.confirm();

    assert_eq!(sub.next().await.unwrap().phase(), TxPhase::Confirmed);
    assert_eq!(sub.next().await.unwrap().phase(), TxPhase::Signed);
    assert_eq!(sub.next().await.unwrap().phase(), TxPhase::Finalized);
    assert_eq!(sub.next().await.unwrap().phase(), TxPhase::Submitted);
    assert_eq!(sub.next().await.unwrap().phase(), TxPhase::StatusUpdate);
    assert_eq!(sub.next().await.unwrap().phase(), TxPhase::Completed);

    assert_eq!(tracking.completion().await.unwrap(), TxId("txfixture01".into()));
    assert_eq!(wallet.sign_calls(), 1);
}

#[tokio::test]
async fn build_rejection_is_terminal() {
    init_logging();

    let node = MockNode::failing_build("intent invalid");
    let wallet = MockWallet::new();

    let mut tracking =
        TransactionTracking::submit(node.clone(), wallet.clone(), xrd_intent(), TrackingOptions::default());

    let err = tracking.completion().await.unwrap_err();
    assert_eq!(err, PipelineError::Node(NodeError::BuildTxFromIntent("intent invalid".into())));

    let mut sub = tracking.events();
    match sub.next().await.unwrap() {
        TrackingEvent::Error { error, in_phase } => {
            assert_eq!(error, err);
            assert_eq!(in_phase, TxPhase::Built);
        }
        other => panic!("expected error event, got {:?}", other.phase()),
    }
    assert!(sub.next().await.is_none());

    assert_eq!(wallet.sign_calls(), 0);
}

#[tokio::test]
async fn multiple_non_native_resources_fail_before_any_io() {
    init_logging();

    let intent = IntentBuilder::new()
        .transfer(
            AccountAddress("rdx1qspsender".into()),
            AccountAddress("rdx1qspb".into()),
            "1",
            Rri("foo_rb1qv9ee5j4".into()),
        )
        .unwrap()
        .transfer(
            AccountAddress("rdx1qspsender".into()),
            AccountAddress("rdx1qspc".into()),
            "2",
            Rri("bar_rb1qtxl4wcs".into()),
        )
        .unwrap()
        .build();

    let node = MockNode::with_statuses(vec![]);
    let wallet = MockWallet::new();

    let mut tracking = TransactionTracking::submit(node.clone(), wallet.clone(), intent, TrackingOptions::default());

    let err = tracking.completion().await.unwrap_err();
    assert_eq!(err, PipelineError::MultipleNonNativeRRIs);

    assert_eq!(node.build_calls(), 0);
    assert_eq!(wallet.sign_calls(), 0);

    let mut sub = tracking.events();
    assert!(matches!(sub.next().await.unwrap(), TrackingEvent::Error { .. }));
    assert!(sub.next().await.is_none());
}

#[tokio::test]
async fn failed_status_rejects_the_transaction() {
    init_logging();

    let node = MockNode::with_statuses(vec![Ok(TxStatus::Pending), Ok(TxStatus::Failed)]);
    let wallet = MockWallet::new();

    let mut tracking = TransactionTracking::submit(
        node.clone(),
        wallet.clone(),
        xrd_intent(),
        TrackingOptions { confirmation: UserConfirmation::Skip, poll_trigger: ticks(2) },
    );

    let err = tracking.completion().await.unwrap_err();
    assert_eq!(err, PipelineError::TxRejected(TxId("txfixture01".into())));

    let mut sub = tracking.events();
    let mut last = None;
    while let Some(event) = sub.next().await {
        last = Some(event);
    }
    match last.expect("events were emitted") {
        TrackingEvent::Error { in_phase, .. } => assert_eq!(in_phase, TxPhase::StatusUpdate),
        other => panic!("expected error event, got {:?}", other.phase()),
    }
}

#[tokio::test]
async fn transient_poll_failures_are_not_terminal() {
    init_logging();

    let node = MockNode::with_statuses(vec![
        Err(NodeError::TransactionStatus("connection reset".into())),
        Ok(TxStatus::Pending),
        Ok(TxStatus::Confirmed),
    ]);
    let wallet = MockWallet::new();

    let mut tracking = TransactionTracking::submit(
        node.clone(),
        wallet.clone(),
        xrd_intent(),
        TrackingOptions { confirmation: UserConfirmation::Skip, poll_trigger: ticks(3) },
    );

    assert_eq!(tracking.completion().await.unwrap(), TxId("txfixture01".into()));

    let mut sub = tracking.events();
    let mut updates = vec![];
    while let Some(event) = sub.next().await {
        if let TrackingEvent::StatusUpdate(status) = event {
            updates.push(status.status);
        }
    }
    assert_eq!(updates, vec![TxStatus::Pending, TxStatus::Confirmed]);
}

#[tokio::test]
async fn cancellation_fails_the_completion() {
    init_logging();

    let node = MockNode::with_statuses(vec![]);
    let wallet = MockWallet::new();

    let mut tracking = TransactionTracking::submit(
        node.clone(),
        wallet.clone(),
        xrd_intent(),
        TrackingOptions { confirmation: UserConfirmation::Manual, poll_trigger: ticks(0) },
    );

    // park the pipeline at the confirmation rendezvous, then cancel
    let mut sub = tracking.events();
    assert_eq!(sub.next().await.unwrap().phase(), TxPhase::Built);
    assert_eq!(sub.next().await.unwrap().phase(), TxPhase::ConfirmationRequested);

    tracking.cancel();

    let err = tracking.completion().await.unwrap_err();
    assert_eq!(err, PipelineError::Aborted);
    assert_eq!(wallet.sign_calls(), 0);
}
