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
//! Wallet capabilities consumed by the pipeline
//!
//! The pipeline does not own the wallet; it receives the signing and
//! account-observation capabilities and nothing more.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use ledger_radix::{Exchange, RadixApp, RadixPath};
use radix_node_api::types::{AccountAddress, HexBytes, UnsignedTransaction};
use tokio::sync::{watch, Mutex};

use crate::errors::SignError;

/// An account the wallet can sign for
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    /// Bech32 address of the account
    pub address: AccountAddress,
    /// Derivation path of the account's key
    pub path: RadixPath,
}

/// A signature together with the public key that produced it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountSignature {
    /// Compact ECDSA signature
    pub signature: HexBytes,
    /// Compressed public key of the signer
    pub public_key: HexBytes,
}

/// Signing and account-observation capabilities of a wallet
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Sign a built transaction
    ///
    /// `non_native_hrp` names the single non-native resource moved by the
    /// transaction, if any; hardware wallets display it during review.
    async fn sign(
        &self,
        transaction: &UnsignedTransaction,
        non_native_hrp: Option<&str>,
    ) -> Result<AccountSignature, SignError>;

    /// Observe the wallet's active account; the current value is always
    /// available to new subscribers
    fn observe_active_account(&self) -> watch::Receiver<Account>;
}

/// Credential storage consulted once during login
pub trait CredentialStore {
    /// Load the keystore
    fn load(&self) -> Result<Keystore, Box<dyn std::error::Error + Send + Sync>>;
}

/// Encrypted key material as loaded from a credential store
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Keystore {
    /// Opaque encrypted contents
    pub contents: Vec<u8>,
}

/// Hardware wallet driving the Radix Ledger app
///
/// Device access is exclusive per transaction: the session is locked for the
/// whole SIGN_TX stream. Cancellation of a signing operation lands between
/// frames, the frame already on the wire completes on its own task (see
/// [`RadixApp::sign_tx`]). The abandoned stream still leaves the device
/// mid-protocol, so the session is marked dirty and reset before the next
/// use.
pub struct LedgerWallet<E> {
    device: Mutex<RadixApp<E>>,
    public_key: secp256k1::PublicKey,
    dirty: AtomicBool,
    active: watch::Sender<Account>,
}

impl<E> LedgerWallet<E>
where
    E: Exchange + Send + Sync + 'static,
    E::Error: std::error::Error + Send + 'static,
{
    /// Connect to the app and fetch the signer key for `account`
    pub async fn connect(app: RadixApp<E>, account: Account) -> Result<Self, SignError> {
        let public_key = app
            .get_public_key(&account.path, false)
            .await
            .map_err(|e| SignError::Device(e.to_string()))?;

        let (active, _) = watch::channel(account);

        Ok(Self { device: Mutex::new(app), public_key, dirty: AtomicBool::new(false), active })
    }

    /// Compressed public key of the active account's signer
    pub fn public_key(&self) -> &secp256k1::PublicKey {
        &self.public_key
    }

    /// Switch the active account
    pub fn set_active_account(&self, account: Account) {
        self.active.send_replace(account);
    }
}

#[async_trait]
impl<E> Wallet for LedgerWallet<E>
where
    E: Exchange + Send + Sync + 'static,
    E::Error: std::error::Error + Send + 'static,
{
    async fn sign(
        &self,
        transaction: &UnsignedTransaction,
        non_native_hrp: Option<&str>,
    ) -> Result<AccountSignature, SignError> {
        let path = self.active.borrow().path;

        let app = self.device.lock().await;

        if self.dirty.load(Ordering::SeqCst) {
            log::info!("resetting dirty device session");
            app.reset_session()
                .await
                .map_err(|e| SignError::Device(e.to_string()))?;
        }

        // dirty until the stream runs to completion
        self.dirty.store(true, Ordering::SeqCst);

        let signature = app
            .sign_tx(&path, transaction.byte_count(), &transaction.instructions, non_native_hrp)
            .await
            .map_err(|e| SignError::Device(e.to_string()))?;

        self.dirty.store(false, Ordering::SeqCst);

        Ok(AccountSignature {
            signature: signature.serialize_compact().to_vec().into(),
            public_key: self.public_key.serialize().to_vec().into(),
        })
    }

    fn observe_active_account(&self) -> watch::Receiver<Account> {
        self.active.subscribe()
    }
}
