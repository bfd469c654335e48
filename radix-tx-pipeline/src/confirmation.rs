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
//! Confirmation rendezvous between the pipeline and the caller

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use radix_node_api::types::BuiltTransaction;
use tokio::sync::Notify;

/// A built transaction waiting for the caller's go-ahead
///
/// The pipeline parks until [`ConfirmationRequest::confirm`] is invoked.
/// Confirming is idempotent; further calls are ignored.
#[derive(Clone)]
pub struct ConfirmationRequest {
    transaction: BuiltTransaction,
    signal: Arc<Signal>,
}

struct Signal {
    confirmed: AtomicBool,
    notify: Notify,
}

impl ConfirmationRequest {
    pub(crate) fn new(transaction: BuiltTransaction) -> Self {
        Self {
            transaction,
            signal: Arc::new(Signal { confirmed: AtomicBool::new(false), notify: Notify::new() }),
        }
    }

    /// The transaction awaiting confirmation
    pub fn transaction(&self) -> &BuiltTransaction {
        &self.transaction
    }

    /// Whether [`ConfirmationRequest::confirm`] has been invoked
    pub fn is_confirmed(&self) -> bool {
        self.signal.confirmed.load(Ordering::SeqCst)
    }

    /// Let the transaction proceed to signing
    pub fn confirm(&self) {
        if !self.signal.confirmed.swap(true, Ordering::SeqCst) {
            // a permit is stored if the pipeline is not parked yet
            self.signal.notify.notify_one();
        }
    }

    /// Pipeline side: park until confirmed
    pub(crate) async fn acknowledged(&self) {
        if self.signal.confirmed.load(Ordering::SeqCst) {
            return;
        }
        self.signal.notify.notified().await;
    }
}
