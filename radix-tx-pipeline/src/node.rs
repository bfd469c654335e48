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
//! Node operations consumed by the pipeline

use async_trait::async_trait;
use radix_node_api::types::{
    AccountAddress, BuiltTransaction, FinalizedTransaction, PendingTransaction, SignedTransaction, TransactionIntent,
    TransactionStatus, TxId,
};
use radix_node_api::{Error as NodeError, NodeClient};

/// The subset of the node API the pipeline drives
///
/// [`NodeClient`] is the production implementation; tests substitute their
/// own.
#[async_trait]
pub trait TransactionNode: Send + Sync {
    /// Build an unsigned transaction from an intent
    async fn build_transaction(
        &self,
        intent: &TransactionIntent,
        fee_payer: &AccountAddress,
    ) -> Result<BuiltTransaction, NodeError>;

    /// Attach a signature and assign a transaction id
    async fn finalize_transaction(&self, signed: &SignedTransaction) -> Result<FinalizedTransaction, NodeError>;

    /// Submit a finalized transaction to the mempool
    async fn submit_transaction(&self, finalized: &FinalizedTransaction) -> Result<PendingTransaction, NodeError>;

    /// Current status of a submitted transaction
    async fn transaction_status(&self, tx_id: &TxId) -> Result<TransactionStatus, NodeError>;
}

#[async_trait]
impl TransactionNode for NodeClient {
    async fn build_transaction(
        &self,
        intent: &TransactionIntent,
        fee_payer: &AccountAddress,
    ) -> Result<BuiltTransaction, NodeError> {
        NodeClient::build_transaction(self, intent, fee_payer).await
    }

    async fn finalize_transaction(&self, signed: &SignedTransaction) -> Result<FinalizedTransaction, NodeError> {
        NodeClient::finalize_transaction(self, signed).await
    }

    async fn submit_transaction(&self, finalized: &FinalizedTransaction) -> Result<PendingTransaction, NodeError> {
        NodeClient::submit_transaction(self, finalized).await
    }

    async fn transaction_status(&self, tx_id: &TxId) -> Result<TransactionStatus, NodeError> {
        NodeClient::transaction_status(self, tx_id).await
    }
}
