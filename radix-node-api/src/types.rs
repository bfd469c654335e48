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
//! Request and response shapes of the node API

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Byte string carried over the wire as a hex string
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HexBytes(pub Vec<u8>);

impl HexBytes {
    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Byte length
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the byte string is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for HexBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for HexBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for HexBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map(HexBytes).map_err(serde::de::Error::custom)
    }
}

/// Node-assigned transaction identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(pub String);

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bech32 account address
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountAddress(pub String);

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bech32 validator address
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidatorAddress(pub String);

impl fmt::Display for ValidatorAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Radix resource identifier, e.g. `xrd_rr1qy5wfsfh`
///
/// The part before the underscore is the human-readable prefix of the
/// resource; `xrd` denotes the native token.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rri(pub String);

impl Rri {
    /// Human-readable prefix of the identifier
    pub fn hrp(&self) -> &str {
        self.0.split('_').next().unwrap_or(&self.0)
    }

    /// Whether the resource is the native token
    pub fn is_native(&self) -> bool {
        self.hrp() == "xrd"
    }
}

impl fmt::Display for Rri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Amount of a single resource
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAmount {
    pub rri: Rri,
    /// Amount in attos, as a decimal string
    pub amount: String,
}

/// Balances held by an account
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalances {
    pub owner: AccountAddress,
    pub token_balances: Vec<TokenAmount>,
}

/// One user action inside a transaction intent
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    /// Move tokens between accounts
    #[serde(rename = "TokenTransfer")]
    Transfer {
        from: AccountAddress,
        to: AccountAddress,
        amount: String,
        rri: Rri,
    },
    /// Delegate stake to a validator
    #[serde(rename = "StakeTokens")]
    Stake {
        from: AccountAddress,
        validator: ValidatorAddress,
        amount: String,
    },
    /// Withdraw stake from a validator
    #[serde(rename = "UnstakeTokens")]
    Unstake {
        from: AccountAddress,
        validator: ValidatorAddress,
        amount: String,
    },
}

/// Pre-build description of a transaction: ordered actions plus an optional
/// plaintext message
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionIntent {
    pub actions: Vec<Action>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// One entry of an account's transaction history
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionHistoryEntry {
    #[serde(rename = "txID")]
    pub tx_id: TxId,
    pub fee: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// A page of an account's transaction history
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionHistory {
    #[serde(default)]
    pub cursor: Option<String>,
    pub transactions: Vec<TransactionHistoryEntry>,
}

/// Description of a token resource
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub rri: Rri,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub description: Option<String>,
    pub granularity: String,
    pub current_supply: String,
    #[serde(default)]
    pub is_supply_mutable: bool,
}

/// Rejected stake or unstake position input
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvalidPosition {
    /// The validator address is empty
    #[error("validator address is empty")]
    MissingValidator,

    /// The amount is not a positive decimal string
    #[error("amount is not a positive decimal string: {0}")]
    InvalidAmount(String),

    /// The value is not a well-formed position object
    #[error("not a well-formed position object")]
    Malformed,
}

fn check_position_amount(amount: &str) -> Result<(), InvalidPosition> {
    let positive =
        !amount.is_empty() && amount.bytes().all(|b| b.is_ascii_digit()) && amount.bytes().any(|b| b != b'0');
    if positive {
        Ok(())
    } else {
        Err(InvalidPosition::InvalidAmount(amount.to_owned()))
    }
}

/// Stake delegated to a validator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakePosition {
    pub validator: ValidatorAddress,
    pub amount: String,
}

impl StakePosition {
    /// Validating factory; rejects an empty validator or a non-positive amount
    pub fn try_new(validator: ValidatorAddress, amount: &str) -> Result<Self, InvalidPosition> {
        if validator.0.is_empty() {
            return Err(InvalidPosition::MissingValidator);
        }
        check_position_amount(amount)?;

        Ok(Self { validator, amount: amount.to_owned() })
    }
}

impl TryFrom<serde_json::Value> for StakePosition {
    type Error = InvalidPosition;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        let raw: Self = serde_json::from_value(value).map_err(|_| InvalidPosition::Malformed)?;
        Self::try_new(raw.validator, &raw.amount)
    }
}

/// Stake being withdrawn from a validator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnstakePosition {
    pub validator: ValidatorAddress,
    pub amount: String,
    pub epochs_until: u32,
}

impl UnstakePosition {
    /// Validating factory; rejects an empty validator or a non-positive amount
    pub fn try_new(validator: ValidatorAddress, amount: &str, epochs_until: u32) -> Result<Self, InvalidPosition> {
        if validator.0.is_empty() {
            return Err(InvalidPosition::MissingValidator);
        }
        check_position_amount(amount)?;

        Ok(Self { validator, amount: amount.to_owned(), epochs_until })
    }
}

impl TryFrom<serde_json::Value> for UnstakePosition {
    type Error = InvalidPosition;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        let raw: Self = serde_json::from_value(value).map_err(|_| InvalidPosition::Malformed)?;
        Self::try_new(raw.validator, &raw.amount, raw.epochs_until)
    }
}

/// A registered validator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validator {
    pub address: ValidatorAddress,
    pub name: String,
    #[serde(default)]
    pub info_url: Option<String>,
    pub total_delegated_stake: String,
    #[serde(default)]
    pub is_external_stake_accepted: bool,
}

/// A page of the validator set
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validators {
    #[serde(default)]
    pub cursor: Option<String>,
    pub validators: Vec<Validator>,
}

/// Network identifier reported by the node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkId {
    pub network_id: u8,
}

/// Transactions per second currently processed by the network
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkTransactionThroughput {
    pub tps: f64,
}

/// Transactions per second currently waiting in the mempool
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkTransactionDemand {
    pub tps: f64,
}

/// On-ledger status of a submitted transaction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxStatus {
    Pending,
    Confirmed,
    Failed,
}

/// Status of a transaction as reported by the node
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatus {
    #[serde(rename = "txID")]
    pub tx_id: TxId,
    pub status: TxStatus,
}

/// Serialized instruction stream produced by the node's build step
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTransaction {
    /// The full serialized transaction
    pub blob: HexBytes,
    /// The blob split at instruction boundaries, in stream order
    pub instructions: Vec<HexBytes>,
    /// Hash the signer commits to
    pub hash_of_blob_to_sign: HexBytes,
}

impl UnsignedTransaction {
    /// Total byte count of the serialized stream
    pub fn byte_count(&self) -> u32 {
        self.blob.len() as u32
    }

    /// Number of instructions in the stream
    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }
}

/// Build result: the unsigned transaction and the fee charged for it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuiltTransaction {
    pub transaction: UnsignedTransaction,
    pub fee: String,
}

/// An unsigned transaction together with its signature and signer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction {
    pub transaction: UnsignedTransaction,
    /// Compact ECDSA signature over the blob hash
    pub signature: HexBytes,
    /// Compressed public key of the signer
    pub public_key_of_signer: HexBytes,
}

/// A signed transaction with its node-assigned identifier
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizedTransaction {
    pub blob: HexBytes,
    #[serde(rename = "txID")]
    pub tx_id: TxId,
}

/// A finalized transaction accepted by the submit endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTransaction {
    #[serde(rename = "txID")]
    pub tx_id: TxId,
}
