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
//! APDU frame construction
//!
//! Frames are plain [`APDUCommand`] values with no I/O attached; the
//! [`RadixApp`](crate::RadixApp) methods exchange them with the device.

use ledger_transport::APDUCommand;

use crate::config::{
    CLA, INS_GET_APP_NAME, INS_GET_PUBLIC_KEY, INS_GET_VERSION, INS_KEY_EXCHANGE, INS_SIGN_HASH, MAX_CHUNK_SIZE,
    P1_DISPLAY, P1_SILENT,
};
use crate::errors::FrameError;
use crate::path::RadixPath;

fn display_p1(display: bool) -> u8 {
    if display {
        P1_DISPLAY
    } else {
        P1_SILENT
    }
}

/// GET_VERSION frame
pub fn get_version() -> APDUCommand<Vec<u8>> {
    APDUCommand { cla: CLA, ins: INS_GET_VERSION, p1: 0x00, p2: 0x00, data: vec![] }
}

/// GET_APP_NAME frame
pub fn get_app_name() -> APDUCommand<Vec<u8>> {
    APDUCommand { cla: CLA, ins: INS_GET_APP_NAME, p1: 0x00, p2: 0x00, data: vec![] }
}

/// GET_PUBLIC_KEY frame
///
/// `display` requests on-device verification of the derived address.
pub fn get_public_key(path: &RadixPath, display: bool) -> APDUCommand<Vec<u8>> {
    APDUCommand {
        cla: CLA,
        ins: INS_GET_PUBLIC_KEY,
        p1: display_p1(display),
        p2: 0x00,
        data: path.serialize().to_vec(),
    }
}

/// DO_KEY_EXCHANGE frame
///
/// `other_party` is the counterparty public key in SEC1-uncompressed form.
/// `display` requests on-device display of the BIP path and the key.
pub fn key_exchange(path: &RadixPath, other_party: &secp256k1::PublicKey, display: bool) -> APDUCommand<Vec<u8>> {
    let pk = other_party.serialize_uncompressed();

    let mut data = path.serialize().to_vec();
    data.push(pk.len() as u8);
    data.extend_from_slice(&pk);

    APDUCommand { cla: CLA, ins: INS_KEY_EXCHANGE, p1: display_p1(display), p2: 0x00, data }
}

/// DO_SIGN_HASH frame
///
/// Fails locally when the hash would not fit a single frame together with the
/// path and its length prefix.
pub fn sign_hash(path: &RadixPath, hash: &[u8], display: bool) -> Result<APDUCommand<Vec<u8>>, FrameError> {
    let mut data = path.serialize().to_vec();
    if data.len() + 1 + hash.len() > MAX_CHUNK_SIZE {
        return Err(FrameError::ChunkTooLarge(data.len() + 1 + hash.len()));
    }

    data.push(hash.len() as u8);
    data.extend_from_slice(hash);

    Ok(APDUCommand { cla: CLA, ins: INS_SIGN_HASH, p1: display_p1(display), p2: 0x00, data })
}
