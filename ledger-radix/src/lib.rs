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
//! Support library for the Radix Ledger Nano S/S+/X app
//!
//! Covers the app's APDU protocol: public key retrieval, ECDH key exchange,
//! hash signing and the streamed transaction signing flow.

#![deny(trivial_casts, trivial_numeric_casts)]
#![deny(unused_import_braces, unused_qualifications)]
#![deny(missing_docs)]

/// Re-export APDU-related types from the `ledger_transport` crate.
pub use ledger_transport::{APDUAnswer, APDUCommand, APDUErrorCode, Exchange};

/// Module containing the app session and its operations.
mod app;
pub use app::RadixApp;

/// Module building APDU frames as pure values.
pub mod command;

/// Module building the SIGN_TX streaming frame sequence.
pub mod chunks;

/// Module containing configuration constants for the app protocol.
pub mod config;

/// Module containing the error types of this crate.
pub mod errors;
pub use errors::{Error, FrameError, PathError};

/// Module containing Radix BIP44 derivation paths.
pub mod path;
pub use path::RadixPath;

/// Module containing raw response shapes.
pub mod types;
pub use types::AppVersion;
