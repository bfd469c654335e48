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
//! Outer facade tying node, wallet and pipeline together

use std::sync::Arc;

use radix_node_api::types::{AccountAddress, Rri, TransactionIntent, ValidatorAddress};
use radix_node_api::NodeClient;
use tokio::sync::{broadcast, watch};

use crate::errors::PipelineError;
use crate::intent::IntentBuilder;
use crate::pipeline::{TrackingOptions, TransactionTracking};
use crate::wallet::{Account, CredentialStore, Keystore, Wallet};

const ERROR_FANOUT_CAPACITY: usize = 16;

/// Entry point for applications
///
/// Configuration methods return the client itself for chaining. Bootstrap
/// failures (unreachable node, unreadable keystore) are not tied to a
/// transaction and are published on the out-of-band [`RadixClient::errors`]
/// stream instead.
pub struct RadixClient {
    node: Option<Arc<NodeClient>>,
    wallet: Option<Arc<dyn Wallet>>,
    keystore: Option<Keystore>,
    errors: broadcast::Sender<PipelineError>,
}

impl Default for RadixClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RadixClient {
    /// A client with nothing configured yet
    pub fn new() -> Self {
        let (errors, _) = broadcast::channel(ERROR_FANOUT_CAPACITY);
        Self { node: None, wallet: None, keystore: None, errors }
    }

    /// Configure the node to talk to
    pub fn connect_node(mut self, endpoint: &str) -> Self {
        match NodeClient::new(endpoint) {
            Ok(client) => self.node = Some(Arc::new(client)),
            Err(e) => {
                log::error!("node bootstrap failed: {e}");
                let _ = self.errors.send(e.into());
            }
        }
        self
    }

    /// Configure the wallet capabilities
    pub fn with_wallet(mut self, wallet: Arc<dyn Wallet>) -> Self {
        self.wallet = Some(wallet);
        self
    }

    /// Load credentials from `store`
    pub fn login<C: CredentialStore>(mut self, store: &C) -> Self {
        match store.load() {
            Ok(keystore) => self.keystore = Some(keystore),
            Err(e) => {
                log::error!("keystore load failed: {e}");
                let _ = self.errors.send(PipelineError::LoadKeystore(e.to_string()));
            }
        }
        self
    }

    /// Out-of-band notifications not tied to a transaction
    pub fn errors(&self) -> broadcast::Receiver<PipelineError> {
        self.errors.subscribe()
    }

    /// The loaded keystore, if login succeeded
    pub fn keystore(&self) -> Option<&Keystore> {
        self.keystore.as_ref()
    }

    /// Observe the wallet's active account
    pub fn observe_active_account(&self) -> Option<watch::Receiver<Account>> {
        self.wallet.as_ref().map(|w| w.observe_active_account())
    }

    /// Address of the wallet's active account
    fn active_address(&self) -> Result<AccountAddress, PipelineError> {
        let wallet = self.wallet.as_ref().ok_or(PipelineError::MissingWallet)?;
        let active = wallet.observe_active_account();
        let address = active.borrow().address.clone();
        Ok(address)
    }

    /// Drive an intent through the transaction lifecycle
    pub fn submit_intent(
        &self,
        intent: TransactionIntent,
        options: TrackingOptions,
    ) -> Result<TransactionTracking, PipelineError> {
        let node = self.node.clone().ok_or(PipelineError::MissingNode)?;
        let wallet = self.wallet.clone().ok_or(PipelineError::MissingWallet)?;

        Ok(TransactionTracking::submit(node, wallet, intent, options))
    }

    /// Transfer tokens from the active account
    pub fn transfer_tokens(
        &self,
        to: AccountAddress,
        amount: &str,
        rri: Rri,
        options: TrackingOptions,
    ) -> Result<TransactionTracking, PipelineError> {
        let from = self.active_address()?;
        let intent = IntentBuilder::new().transfer(from, to, amount, rri)?.build();
        self.submit_intent(intent, options)
    }

    /// Stake tokens from the active account
    pub fn stake_tokens(
        &self,
        validator: ValidatorAddress,
        amount: &str,
        options: TrackingOptions,
    ) -> Result<TransactionTracking, PipelineError> {
        let from = self.active_address()?;
        let intent = IntentBuilder::new().stake(from, validator, amount)?.build();
        self.submit_intent(intent, options)
    }

    /// Withdraw staked tokens to the active account
    pub fn unstake_tokens(
        &self,
        validator: ValidatorAddress,
        amount: &str,
        options: TrackingOptions,
    ) -> Result<TransactionTracking, PipelineError> {
        let from = self.active_address()?;
        let intent = IntentBuilder::new().unstake(from, validator, amount)?.build();
        self.submit_intent(intent, options)
    }
}
