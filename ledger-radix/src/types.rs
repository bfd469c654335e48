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
//! Raw response shapes shared across the app methods

use std::fmt;

use crate::config::{PK_LEN_SECP256K1, PK_LEN_SECP256K1_UNCOMPRESSED, SIG_SIZE};

/// Compressed secp256k1 public key bytes
pub type PublicKeyRaw = [u8; PK_LEN_SECP256K1];

/// SEC1-uncompressed secp256k1 public key bytes
pub type UncompressedPublicKeyRaw = [u8; PK_LEN_SECP256K1_UNCOMPRESSED];

/// Compact ECDSA signature bytes
pub type SignatureRaw = [u8; SIG_SIZE];

/// Version reported by the Radix app
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppVersion {
    /// Major version
    pub major: u8,
    /// Minor version
    pub minor: u8,
    /// Patch version
    pub patch: u8,
}

impl fmt::Display for AppVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
