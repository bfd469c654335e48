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
//! Session with the Radix app running on a connected device

use std::sync::Arc;

use ledger_transport::{APDUCommand, APDUErrorCode, Exchange};

use crate::chunks;
use crate::command;
use crate::config::{PK_LEN_SECP256K1, PK_LEN_SECP256K1_UNCOMPRESSED, SIG_SIZE, VERSION_RESPONSE_SIZE};
use crate::errors::Error;
use crate::path::RadixPath;
use crate::types::AppVersion;

/// Radix Ledger App
///
/// Generic over the APDU transport; callers are expected to serialize access
/// to a given device, one in-flight command at a time. Requires a Tokio
/// runtime: each frame is exchanged on its own task so that a frame already
/// on the wire runs to completion even when the calling future is dropped,
/// and cancellation of a multi-frame flow lands between frames.
pub struct RadixApp<E> {
    transport: Arc<E>,
}

impl<E> RadixApp<E> {
    /// Connect to the Radix app over the given transport
    pub fn new(transport: E) -> Self {
        Self { transport: Arc::new(transport) }
    }

    /// Access the underlying transport
    pub fn transport(&self) -> &E {
        self.transport.as_ref()
    }
}

impl<E> RadixApp<E>
where
    E: Exchange + Send + Sync + 'static,
    E::Error: std::error::Error + Send + 'static,
{
    /// Exchange a single frame, mapping any non-OK status word to
    /// [`Error::DeviceStatus`] tagged with the instruction byte.
    ///
    /// The exchange runs on its own task: once a frame is on the wire the
    /// device must see it through, a truncated frame desynchronizes its
    /// state machine. Dropping this future mid-exchange detaches the frame
    /// task instead of cutting the transport off.
    async fn exchange(&self, command: APDUCommand<Vec<u8>>) -> Result<Vec<u8>, Error<E::Error>> {
        let ins = command.ins;
        let transport = Arc::clone(&self.transport);

        let frame_task = tokio::spawn(async move {
            let response = transport.exchange(&command).await.map_err(Error::Transport)?;

            match response.error_code() {
                Ok(APDUErrorCode::NoError) => Ok(response.apdu_data().to_vec()),
                Ok(err) => Err(Error::DeviceStatus(err as u16, ins)),
                Err(code) => Err(Error::DeviceStatus(code, ins)),
            }
        });

        match frame_task.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(Error::Interrupted),
        }
    }

    /// Retrieve the app version
    pub async fn get_version(&self) -> Result<AppVersion, Error<E::Error>> {
        let data = self.exchange(command::get_version()).await?;

        if data.len() < VERSION_RESPONSE_SIZE {
            return Err(Error::InvalidResponse);
        }

        Ok(AppVersion { major: data[0], minor: data[1], patch: data[2] })
    }

    /// Retrieve the app name
    pub async fn get_app_name(&self) -> Result<String, Error<E::Error>> {
        let data = self.exchange(command::get_app_name()).await?;

        let name = std::str::from_utf8(&data).map_err(|_| Error::Utf8)?;
        Ok(name.to_owned())
    }

    /// Retrieve the compressed public key for the given path
    ///
    /// `display` additionally shows the derived account address on the device
    /// for the user to verify.
    pub async fn get_public_key(
        &self,
        path: &RadixPath,
        display: bool,
    ) -> Result<secp256k1::PublicKey, Error<E::Error>> {
        let data = self.exchange(command::get_public_key(path, display)).await?;

        log::debug!("public key response of {} bytes", data.len());

        if data.len() < PK_LEN_SECP256K1 {
            return Err(Error::InvalidResponse);
        }

        secp256k1::PublicKey::from_slice(&data[..PK_LEN_SECP256K1]).map_err(|_| Error::InvalidResponse)
    }

    /// Perform an ECDH key exchange with the key at the given path
    ///
    /// Returns the shared point in SEC1-uncompressed form. `display` shows the
    /// BIP path and the counterparty key on the device.
    pub async fn do_key_exchange(
        &self,
        path: &RadixPath,
        other_party: &secp256k1::PublicKey,
        display: bool,
    ) -> Result<secp256k1::PublicKey, Error<E::Error>> {
        let data = self.exchange(command::key_exchange(path, other_party, display)).await?;

        if data.len() < PK_LEN_SECP256K1_UNCOMPRESSED {
            return Err(Error::InvalidResponse);
        }

        secp256k1::PublicKey::from_slice(&data[..PK_LEN_SECP256K1_UNCOMPRESSED]).map_err(|_| Error::InvalidResponse)
    }

    /// Sign a pre-computed hash with the key at the given path
    pub async fn sign_hash(
        &self,
        path: &RadixPath,
        hash: &[u8],
        display: bool,
    ) -> Result<secp256k1::ecdsa::Signature, Error<E::Error>> {
        let frame = command::sign_hash(path, hash, display)?;
        let data = self.exchange(frame).await?;

        signature_from_response(&data)
    }

    /// Sign a transaction by streaming its instructions to the device
    ///
    /// The metadata frame goes first, then one frame per instruction in order;
    /// the final instruction's response carries the signature. The stream is
    /// aborted on the first device error and must then be restarted from the
    /// metadata frame (see [`RadixApp::reset_session`]).
    ///
    /// Cancelling this future takes effect between frames: the in-flight
    /// frame completes on its own task, no further frame is sent, and the
    /// device is left mid-protocol until the session is reset.
    pub async fn sign_tx<I: AsRef<[u8]> + Sync>(
        &self,
        path: &RadixPath,
        byte_count: u32,
        instructions: &[I],
        hrp: Option<&str>,
    ) -> Result<secp256k1::ecdsa::Signature, Error<E::Error>> {
        let frames = chunks::sign_tx_frames(path, byte_count, instructions, hrp)?;

        log::info!("streaming transaction of {} instructions to device", instructions.len());

        let mut response = Vec::new();
        for frame in frames {
            response = self.exchange(frame).await?;
        }

        log::info!("transaction stream complete");

        signature_from_response(&response)
    }

    /// Return the device session to a known state
    ///
    /// Issued after an abandoned SIGN_TX stream; the device aborts any
    /// partially-streamed transaction when a new command arrives.
    pub async fn reset_session(&self) -> Result<(), Error<E::Error>> {
        self.get_version().await.map(|_| ())
    }
}

fn signature_from_response<E: std::error::Error>(data: &[u8]) -> Result<secp256k1::ecdsa::Signature, Error<E>> {
    if data.len() < SIG_SIZE {
        return Err(Error::InvalidResponse);
    }

    secp256k1::ecdsa::Signature::from_compact(&data[..SIG_SIZE]).map_err(|_| Error::InvalidResponse)
}
