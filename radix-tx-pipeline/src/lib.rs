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
//! Transaction lifecycle orchestration for Radix wallets
//!
//! Drives a transaction through build, user confirmation, signing,
//! finalization, submission and status polling, emitting one tracking event
//! per transition. Signing is a capability provided by a wallet; the
//! hardware implementation streams the transaction to the Radix Ledger app.

#![deny(trivial_casts, trivial_numeric_casts)]
#![deny(unused_import_braces, unused_qualifications)]
#![deny(missing_docs)]

/// Module containing the outer facade.
mod client;
pub use client::RadixClient;

/// Module containing the confirmation rendezvous.
mod confirmation;
pub use confirmation::ConfirmationRequest;

/// Module containing the error taxonomy.
pub mod errors;
pub use errors::{IntentError, PipelineError, SignError};

/// Module containing tracking events and subscriptions.
pub mod events;
pub use events::{EventSubscription, TrackingEvent, TxPhase};

/// Module containing intent assembly.
pub mod intent;
pub use intent::IntentBuilder;

/// Module containing the node capability consumed by the pipeline.
pub mod node;
pub use node::TransactionNode;

/// Module containing the pipeline itself.
pub mod pipeline;
pub use pipeline::{PollTrigger, TrackingOptions, TransactionTracking, UserConfirmation};

/// Module containing the wallet capabilities.
pub mod wallet;
pub use wallet::{Account, AccountSignature, CredentialStore, Keystore, LedgerWallet, Wallet};
