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
//! Radix BIP44 derivation paths and their device encoding
//!
//! The app accepts fixed-depth paths of the form `m/44'/536'/account'/change/index`.
//! On the wire a path is a one-byte component count followed by one big-endian
//! `u32` per component, with the hardening bit folded into the high bit.

use std::fmt;
use std::str::FromStr;

use crate::config::{PATH_COMPONENTS, RADIX_COIN_TYPE, SERIALIZED_PATH_SIZE};
use crate::errors::PathError;

/// High bit marking a hardened component
pub const HARDENED: u32 = 0x8000_0000;

/// BIP44 purpose component (hardened 44)
pub const PURPOSE: u32 = 44 | HARDENED;

/// A validated Radix derivation path
///
/// Components are stored with the hardening bit already applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RadixPath([u32; PATH_COMPONENTS]);

impl RadixPath {
    /// Build the canonical Radix path `m/44'/536'/account'/change/index`
    pub fn new(account: u32, change: u32, index: u32) -> Result<Self, PathError> {
        Self::from_components([
            PURPOSE,
            RADIX_COIN_TYPE | HARDENED,
            account | HARDENED,
            change,
            index,
        ])
    }

    /// Build a path from raw components, hardening bits included
    ///
    /// Rejects any path whose coin type is not the hardened Radix coin type.
    pub fn from_components(components: [u32; PATH_COMPONENTS]) -> Result<Self, PathError> {
        let coin_type = components[1];
        if coin_type & HARDENED == 0 {
            return Err(PathError::CoinTypeNotHardened);
        }
        if coin_type & !HARDENED != RADIX_COIN_TYPE {
            return Err(PathError::CoinType(coin_type & !HARDENED));
        }

        Ok(Self(components))
    }

    /// Raw components of the path, hardening bits included
    pub fn components(&self) -> &[u32; PATH_COMPONENTS] {
        &self.0
    }

    /// Account component, without the hardening bit
    pub fn account(&self) -> u32 {
        self.0[2] & !HARDENED
    }

    /// Address index component
    pub fn index(&self) -> u32 {
        self.0[4] & !HARDENED
    }

    /// Encode the path for the device
    ///
    /// Layout: `u8 count || count * u32_be(component)`, 21 bytes for Radix paths.
    pub fn serialize(&self) -> [u8; SERIALIZED_PATH_SIZE] {
        let mut out = [0u8; SERIALIZED_PATH_SIZE];
        out[0] = PATH_COMPONENTS as u8;
        for (i, component) in self.0.iter().enumerate() {
            out[1 + i * 4..][..4].copy_from_slice(&component.to_be_bytes());
        }
        out
    }

    /// Decode a path previously produced by [`RadixPath::serialize`]
    pub fn deserialize(bytes: &[u8]) -> Result<Self, PathError> {
        if bytes.len() != SERIALIZED_PATH_SIZE || bytes[0] as usize != PATH_COMPONENTS {
            return Err(PathError::Depth(bytes.first().copied().unwrap_or(0) as usize));
        }

        let mut components = [0u32; PATH_COMPONENTS];
        for (i, component) in components.iter_mut().enumerate() {
            let mut word = [0u8; 4];
            word.copy_from_slice(&bytes[1 + i * 4..][..4]);
            *component = u32::from_be_bytes(word);
        }

        Self::from_components(components)
    }
}

impl FromStr for RadixPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/');
        if parts.next() != Some("m") {
            return Err(PathError::Malformed);
        }

        let mut components = [0u32; PATH_COMPONENTS];
        let mut depth = 0;
        for part in parts {
            if depth >= PATH_COMPONENTS {
                return Err(PathError::Depth(depth + 1));
            }

            let (digits, hardened) = match part.strip_suffix('\'').or_else(|| part.strip_suffix('h')) {
                Some(digits) => (digits, HARDENED),
                None => (part, 0),
            };

            let index: u32 = digits.parse().map_err(|_| PathError::Malformed)?;
            if index & HARDENED != 0 {
                return Err(PathError::ComponentRange(index));
            }

            components[depth] = index | hardened;
            depth += 1;
        }

        if depth != PATH_COMPONENTS {
            return Err(PathError::Depth(depth));
        }

        Self::from_components(components)
    }
}

impl fmt::Display for RadixPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for component in self.0.iter() {
            let marker = if component & HARDENED != 0 { "'" } else { "" };
            write!(f, "/{}{}", component & !HARDENED, marker)?;
        }
        Ok(())
    }
}
