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
//! SIGN_TX streaming frames
//!
//! A transaction is streamed to the device in two phases: one metadata frame
//! announcing the byte count, the instruction count and the non-native HRP,
//! then one frame per instruction in producer order. The device tracks the
//! remaining count; a frame may never be re-sent, so a failed stream must be
//! restarted from the metadata frame.

use ledger_transport::APDUCommand;

use crate::config::{
    CLA, INS_SIGN_TX, MAX_CHUNK_SIZE, MAX_HRP_LEN, P1_SIGN_TX_INSTRUCTION, P1_SIGN_TX_METADATA, P2_LAST, P2_MORE,
};
use crate::errors::FrameError;
use crate::path::RadixPath;

/// Assemble the complete SIGN_TX frame sequence
///
/// `byte_count` is the size of the serialized instruction stream as announced
/// to the device; `hrp` carries the human-readable prefix of the single
/// non-native resource moved by the transaction, if any.
///
/// All local preconditions are checked here, before any I/O happens.
pub fn sign_tx_frames<I: AsRef<[u8]>>(
    path: &RadixPath,
    byte_count: u32,
    instructions: &[I],
    hrp: Option<&str>,
) -> Result<Vec<APDUCommand<Vec<u8>>>, FrameError> {
    if instructions.is_empty() {
        return Err(FrameError::EmptyStream);
    }
    if instructions.len() > u16::MAX as usize {
        return Err(FrameError::TooManyInstructions(instructions.len()));
    }

    let hrp = hrp.unwrap_or("").as_bytes();
    if hrp.len() > MAX_HRP_LEN {
        return Err(FrameError::HrpTooLong(hrp.len()));
    }

    let mut frames = Vec::with_capacity(1 + instructions.len());
    frames.push(metadata_frame(path, byte_count, instructions.len() as u16, hrp)?);

    let last = instructions.len() - 1;
    for (i, instruction) in instructions.iter().enumerate() {
        let data = instruction.as_ref();
        if data.len() > MAX_CHUNK_SIZE {
            return Err(FrameError::ChunkTooLarge(data.len()));
        }

        frames.push(APDUCommand {
            cla: CLA,
            ins: INS_SIGN_TX,
            p1: P1_SIGN_TX_INSTRUCTION,
            p2: if i == last { P2_LAST } else { P2_MORE },
            data: data.to_vec(),
        });
    }

    Ok(frames)
}

fn metadata_frame(
    path: &RadixPath,
    byte_count: u32,
    instruction_count: u16,
    hrp: &[u8],
) -> Result<APDUCommand<Vec<u8>>, FrameError> {
    let mut data = path.serialize().to_vec();
    data.extend_from_slice(&byte_count.to_be_bytes());
    data.extend_from_slice(&instruction_count.to_be_bytes());
    data.push(hrp.len() as u8);
    data.extend_from_slice(hrp);

    if data.len() > MAX_CHUNK_SIZE {
        return Err(FrameError::ChunkTooLarge(data.len()));
    }

    Ok(APDUCommand { cla: CLA, ins: INS_SIGN_TX, p1: P1_SIGN_TX_METADATA, p2: 0x00, data })
}
