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
use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::errors::Error;
use crate::types::{
    AccountAddress, BuiltTransaction, FinalizedTransaction, NetworkId, NetworkTransactionDemand,
    NetworkTransactionThroughput, PendingTransaction, Rri, SignedTransaction, StakePosition, TokenBalances, TokenInfo,
    TransactionHistory, TransactionHistoryEntry, TransactionIntent, TransactionStatus, TxId, UnstakePosition,
    Validator, ValidatorAddress, Validators,
};

const JSONRPC_VERSION: &str = "2.0";
const DEFAULT_TIMEOUT_S: u64 = 30;

#[derive(serde::Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u32,
    method: &'a str,
    params: Value,
}

#[derive(serde::Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(serde::Deserialize)]
struct RpcErrorBody {
    code: i32,
    message: String,
}

/// Failure of a single request, before domain tagging
#[derive(Debug, thiserror::Error)]
enum RequestError {
    #[error("{0}")]
    Transport(String),
    #[error("node returned error {code}: {message}")]
    Rpc { code: i32, message: String },
    #[error("{0}")]
    Decode(String),
    #[error("node returned an empty response")]
    Empty,
}

impl From<reqwest::Error> for RequestError {
    fn from(value: reqwest::Error) -> Self {
        RequestError::Transport(value.to_string())
    }
}

impl From<serde_json::Error> for RequestError {
    fn from(value: serde_json::Error) -> Self {
        RequestError::Decode(value.to_string())
    }
}

/// Typed client for the node's JSON-RPC endpoint
///
/// Stateless request/response; a single client may be shared across tasks.
pub struct NodeClient {
    inner: reqwest::Client,
    url: Url,
}

impl NodeClient {
    /// Create a client for the node at `endpoint`
    ///
    /// The `/rpc` path is appended when missing.
    pub fn new(endpoint: &str) -> Result<Self, Error> {
        let mut url = Url::parse(endpoint).map_err(|e| Error::GetNode(e.to_string()))?;

        let mut path = url.path().to_string();
        if path.is_empty() || path == "/" {
            url.set_path("/rpc");
        } else if !path.ends_with("/rpc") {
            if path.ends_with('/') {
                path.truncate(path.len() - 1);
            }
            path.push_str("/rpc");
            url.set_path(&path);
        }

        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_S))
            .build()
            .map_err(|e| Error::GetNode(e.to_string()))?;

        Ok(Self { inner, url })
    }

    /// Endpoint this client talks to
    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RequestError> {
        let payload = RpcRequest { jsonrpc: JSONRPC_VERSION, id: 1, method, params };

        log::debug!("-> {} {}", self.url, method);

        let response = self.inner.post(self.url.clone()).json(&payload).send().await?;
        if !response.status().is_success() {
            return Err(RequestError::Transport(format!("HTTP status {} returned by node", response.status())));
        }

        let response: RpcResponse = response.json().await?;
        if let Some(error) = response.error {
            return Err(RequestError::Rpc { code: error.code, message: error.message });
        }

        let result = response.result.ok_or(RequestError::Empty)?;
        Ok(serde_json::from_value(result)?)
    }

    /// Magic byte identifying the network the node runs on
    pub async fn network_id(&self) -> Result<NetworkId, Error> {
        self.call("network.get_id", json!({}))
            .await
            .map_err(|e| Error::NetworkId(e.to_string()))
    }

    /// Token balances held by `address`
    pub async fn token_balances(&self, address: &AccountAddress) -> Result<TokenBalances, Error> {
        self.call("account.get_balances", json!({ "address": address }))
            .await
            .map_err(|e| Error::TokenBalances(e.to_string()))
    }

    /// A page of the transaction history of `address`
    pub async fn transaction_history(
        &self,
        address: &AccountAddress,
        size: usize,
        cursor: Option<&str>,
    ) -> Result<TransactionHistory, Error> {
        self.call("account.get_transaction_history", json!({ "address": address, "size": size, "cursor": cursor }))
            .await
            .map_err(|e| Error::TransactionHistory(e.to_string()))
    }

    /// Description of the native token
    pub async fn native_token(&self) -> Result<TokenInfo, Error> {
        self.call("tokens.get_native_token", json!({}))
            .await
            .map_err(|e| Error::NativeToken(e.to_string()))
    }

    /// Description of the token identified by `rri`
    pub async fn token_info(&self, rri: &Rri) -> Result<TokenInfo, Error> {
        self.call("tokens.get_info", json!({ "rri": rri }))
            .await
            .map_err(|e| Error::TokenInfo(e.to_string()))
    }

    /// Active stake positions of `address`
    ///
    /// Every returned position passes the [`StakePosition`] guard; a node
    /// answer with a malformed position is an error, not a partial result.
    pub async fn stakes(&self, address: &AccountAddress) -> Result<Vec<StakePosition>, Error> {
        let raw: Vec<Value> = self
            .call("account.get_stake_positions", json!({ "address": address }))
            .await
            .map_err(|e| Error::StakesForAddress(e.to_string()))?;

        raw.into_iter()
            .map(StakePosition::try_from)
            .collect::<Result<_, _>>()
            .map_err(|e| Error::StakesForAddress(e.to_string()))
    }

    /// Pending unstake positions of `address`
    ///
    /// Validated the same way as [`NodeClient::stakes`].
    pub async fn unstakes(&self, address: &AccountAddress) -> Result<Vec<UnstakePosition>, Error> {
        let raw: Vec<Value> = self
            .call("account.get_unstake_positions", json!({ "address": address }))
            .await
            .map_err(|e| Error::UnstakesForAddress(e.to_string()))?;

        raw.into_iter()
            .map(UnstakePosition::try_from)
            .collect::<Result<_, _>>()
            .map_err(|e| Error::UnstakesForAddress(e.to_string()))
    }

    /// The validator set of the next epoch
    pub async fn validators(&self) -> Result<Validators, Error> {
        self.call("validators.get_next_epoch_set", json!({ "size": 100 }))
            .await
            .map_err(|e| Error::Validators(e.to_string()))
    }

    /// Details of a single validator
    pub async fn lookup_validator(&self, address: &ValidatorAddress) -> Result<Validator, Error> {
        self.call("validators.lookup_validator", json!({ "validatorAddress": address }))
            .await
            .map_err(|e| Error::LookupValidator(e.to_string()))
    }

    /// Details of a transaction already on ledger
    pub async fn lookup_transaction(&self, tx_id: &TxId) -> Result<TransactionHistoryEntry, Error> {
        self.call("transactions.lookup_transaction", json!({ "txID": tx_id }))
            .await
            .map_err(|e| Error::LookupTransaction(e.to_string()))
    }

    /// Current status of a submitted transaction
    pub async fn transaction_status(&self, tx_id: &TxId) -> Result<TransactionStatus, Error> {
        self.call("transactions.get_transaction_status", json!({ "txID": tx_id }))
            .await
            .map_err(|e| Error::TransactionStatus(e.to_string()))
    }

    /// Transactions per second processed by the network
    pub async fn network_throughput(&self) -> Result<NetworkTransactionThroughput, Error> {
        self.call("network.get_throughput", json!({}))
            .await
            .map_err(|e| Error::NetworkTxThroughput(e.to_string()))
    }

    /// Transactions per second waiting in the mempool
    pub async fn network_demand(&self) -> Result<NetworkTransactionDemand, Error> {
        self.call("network.get_demand", json!({}))
            .await
            .map_err(|e| Error::NetworkTxDemand(e.to_string()))
    }

    /// Ask the node to build an unsigned transaction from an intent
    pub async fn build_transaction(
        &self,
        intent: &TransactionIntent,
        fee_payer: &AccountAddress,
    ) -> Result<BuiltTransaction, Error> {
        self.call(
            "construction.build_transaction",
            json!({ "actions": intent.actions, "feePayer": fee_payer, "message": intent.message }),
        )
        .await
        .map_err(|e| Error::BuildTxFromIntent(e.to_string()))
    }

    /// Ask the node to attach a signature and assign a transaction id
    pub async fn finalize_transaction(&self, signed: &SignedTransaction) -> Result<FinalizedTransaction, Error> {
        self.call(
            "construction.finalize_transaction",
            json!({
                "blob": signed.transaction.blob,
                "signature": signed.signature,
                "publicKeyOfSigner": signed.public_key_of_signer,
            }),
        )
        .await
        .map_err(|e| Error::FinalizeTx(e.to_string()))
    }

    /// Submit a finalized transaction to the mempool
    pub async fn submit_transaction(&self, finalized: &FinalizedTransaction) -> Result<PendingTransaction, Error> {
        self.call("construction.submit_transaction", json!({ "blob": finalized.blob, "txID": finalized.tx_id }))
            .await
            .map_err(|e| Error::SubmitSignedTx(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_rpc_path() {
        let client = NodeClient::new("http://127.0.0.1:8080").unwrap();
        assert_eq!(client.url().path(), "/rpc");

        let client = NodeClient::new("http://127.0.0.1:8080/node/").unwrap();
        assert_eq!(client.url().path(), "/node/rpc");

        let client = NodeClient::new("http://127.0.0.1:8080/rpc").unwrap();
        assert_eq!(client.url().path(), "/rpc");
    }

    #[test]
    fn invalid_endpoint_is_a_bootstrap_error() {
        let r = NodeClient::new("not an url");
        assert!(matches!(r, Err(Error::GetNode(_))));
    }
}
