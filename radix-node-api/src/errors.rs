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
use thiserror::Error as ThisError;

/// One domain-tagged variant per node operation; each carries the underlying
/// failure message verbatim.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum Error {
    #[error("network id request failed: {0}")]
    NetworkId(String),
    #[error("token balances request failed: {0}")]
    TokenBalances(String),
    #[error("transaction history request failed: {0}")]
    TransactionHistory(String),
    #[error("native token request failed: {0}")]
    NativeToken(String),
    #[error("token info request failed: {0}")]
    TokenInfo(String),
    #[error("stake positions request failed: {0}")]
    StakesForAddress(String),
    #[error("unstake positions request failed: {0}")]
    UnstakesForAddress(String),
    #[error("validators request failed: {0}")]
    Validators(String),
    #[error("validator lookup failed: {0}")]
    LookupValidator(String),
    #[error("transaction lookup failed: {0}")]
    LookupTransaction(String),
    #[error("transaction status request failed: {0}")]
    TransactionStatus(String),
    #[error("network throughput request failed: {0}")]
    NetworkTxThroughput(String),
    #[error("network demand request failed: {0}")]
    NetworkTxDemand(String),
    #[error("could not build transaction from intent: {0}")]
    BuildTxFromIntent(String),
    #[error("could not finalize transaction: {0}")]
    FinalizeTx(String),
    #[error("could not submit signed transaction: {0}")]
    SubmitSignedTx(String),
    #[error("could not reach node: {0}")]
    GetNode(String),
}
