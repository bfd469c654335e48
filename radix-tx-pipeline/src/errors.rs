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
//! Error taxonomy of the transaction pipeline

use radix_node_api::types::TxId;

/// Failure of the signing capability
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SignError {
    /// The device (or software signer) refused or failed to sign
    #[error("signing failed: {0}")]
    Device(String),

    /// The signing operation was abandoned before completion
    #[error("signing aborted")]
    Aborted,
}

/// Rejected intent input
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IntentError {
    /// The amount is not a positive decimal string
    #[error("amount is not a positive decimal string: {0}")]
    InvalidAmount(String),

    /// A transfer names no recipient
    #[error("recipient address is empty")]
    MissingRecipient,

    /// A stake or unstake names no validator
    #[error("validator address is empty")]
    MissingValidator,
}

/// All the possible errors surfaced by the pipeline
///
/// A terminal pipeline failure is reported twice: once on the event stream,
/// tagged with the phase that was running, and once on the completion output.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum PipelineError {
    /// A node operation failed
    #[error(transparent)]
    Node(#[from] radix_node_api::Error),

    /// The signing capability failed
    #[error(transparent)]
    Sign(#[from] SignError),

    /// An intent input was rejected
    #[error(transparent)]
    Intent(#[from] IntentError),

    /// The intent moves more than one distinct non-native resource, which the
    /// Ledger app cannot display
    #[error("intent moves more than one distinct non-native resource")]
    MultipleNonNativeRRIs,

    /// The network reported the transaction as failed
    #[error("transaction {0} was rejected by the network")]
    TxRejected(TxId),

    /// Tracking was cancelled before a terminal status was observed
    #[error("tracking was cancelled before completion")]
    Aborted,

    /// The keystore could not be loaded during login
    #[error("could not load keystore: {0}")]
    LoadKeystore(String),

    /// A transaction was submitted before a node was configured
    #[error("no node has been configured")]
    MissingNode,

    /// A transaction was submitted before a wallet was configured
    #[error("no wallet has been configured")]
    MissingWallet,
}
