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
//! Error types surfaced by the Radix app support library

/// Errors produced while validating or encoding a Radix BIP44 path
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// The path does not have exactly the expected number of components
    #[error("expected 5 path components, found {0}")]
    Depth(usize),

    /// The coin type component is not the Radix registered one
    #[error("coin type must be 536, found {0}")]
    CoinType(u32),

    /// The coin type component is not hardened
    #[error("coin type must be hardened")]
    CoinTypeNotHardened,

    /// A component index does not fit in 31 bits
    #[error("path component {0} exceeds 31 bits")]
    ComponentRange(u32),

    /// The textual form of the path could not be parsed
    #[error("malformed path string")]
    Malformed,
}

/// Errors produced while assembling APDU frames, before any device I/O
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The HD path is not a valid Radix path
    #[error("invalid HD path: {0}")]
    InvalidPath(#[from] PathError),

    /// The HRP does not fit the one-byte length prefix of the metadata frame
    #[error("hrp of {0} bytes exceeds the one-byte length prefix")]
    HrpTooLong(usize),

    /// A single frame's data would exceed the APDU payload limit
    #[error("frame data of {0} bytes exceeds a single APDU payload")]
    ChunkTooLarge(usize),

    /// The transaction carries more instructions than the metadata frame can announce
    #[error("instruction count {0} exceeds the u16 field of the metadata frame")]
    TooManyInstructions(usize),

    /// The transaction stream carries no instructions
    #[error("transaction stream is empty")]
    EmptyStream,
}

/// Ledger Radix app error type, generic over the transport error
#[derive(Debug, thiserror::Error)]
pub enum Error<E: std::error::Error> {
    /// Error from the underlying APDU transport
    #[error("APDU exchange error: {0}")]
    Transport(E),

    /// The device answered with an unexpected status word
    #[error("device returned status {0:#06x} for instruction {1:#04x}")]
    DeviceStatus(u16, u8),

    /// A frame could not be assembled locally
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// The response payload does not have the documented shape
    #[error("unexpected response payload from device")]
    InvalidResponse,

    /// The exchange task ended before the device answered
    #[error("exchange interrupted before the device answered")]
    Interrupted,

    /// The response payload is not valid UTF-8
    #[error("response is not valid UTF-8")]
    Utf8,
}
