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
use std::collections::VecDeque;
use std::convert::Infallible;
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use env_logger::Env;
use tokio::sync::Semaphore;
use ledger_radix::config::{INS_GET_PUBLIC_KEY, INS_GET_VERSION, INS_SIGN_TX, SW_OK};
use ledger_radix::{APDUAnswer, APDUCommand, Error, Exchange, RadixApp, RadixPath};

fn init_logging() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .is_test(true)
        .try_init();
}

/// Header and payload of a frame recorded by the mock transport
#[derive(Clone, Debug, PartialEq, Eq)]
struct SentFrame {
    cla: u8,
    ins: u8,
    p1: u8,
    p2: u8,
    data: Vec<u8>,
}

/// Transport double replaying scripted answers and recording every frame sent
#[derive(Default)]
struct MockTransport {
    answers: Mutex<VecDeque<Vec<u8>>>,
    sent: Mutex<Vec<SentFrame>>,
}

impl MockTransport {
    fn with_answers(answers: Vec<Vec<u8>>) -> Self {
        Self { answers: Mutex::new(answers.into()), sent: Mutex::new(vec![]) }
    }

    fn answer(data: &[u8], retcode: u16) -> Vec<u8> {
        let mut out = data.to_vec();
        out.extend_from_slice(&retcode.to_be_bytes());
        out
    }

    fn sent(&self) -> Vec<SentFrame> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Exchange for MockTransport {
    type Error = Infallible;
    type AnswerType = Vec<u8>;

    async fn exchange<I>(&self, command: &APDUCommand<I>) -> Result<APDUAnswer<Vec<u8>>, Self::Error>
    where
        I: Deref<Target = [u8]> + Send + Sync,
    {
        self.sent.lock().unwrap().push(SentFrame {
            cla: command.cla,
            ins: command.ins,
            p1: command.p1,
            p2: command.p2,
            data: command.data.to_vec(),
        });

        let answer = self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected APDU frame");
        Ok(APDUAnswer::from_answer(answer).expect("scripted answer carries a status word"))
    }
}

fn default_path() -> RadixPath {
    RadixPath::new(0, 0, 0).unwrap()
}

fn compact_signature() -> Vec<u8> {
    let mut scalar = vec![0u8; 32];
    scalar[31] = 1;

    let mut sig = scalar.clone();
    sig.extend_from_slice(&scalar);
    sig
}

#[tokio::test]
async fn get_version_parses_semver_bytes() {
    init_logging();

    let transport = MockTransport::with_answers(vec![MockTransport::answer(&[2, 4, 1], SW_OK)]);
    let app = RadixApp::new(transport);

    let version = app.get_version().await.unwrap();
    assert_eq!(version.to_string(), "2.4.1");
}

#[tokio::test]
async fn get_app_name_decodes_utf8() {
    init_logging();

    let transport = MockTransport::with_answers(vec![MockTransport::answer(b"Radix", SW_OK)]);
    let app = RadixApp::new(transport);

    assert_eq!(app.get_app_name().await.unwrap(), "Radix");
}

#[tokio::test]
async fn get_public_key_sends_path_and_parses_key() {
    init_logging();

    let pk = hex::decode("031f6d238009787c20d5d7becb6b6ad54529fc0a3fd35088e85c2c3966bfec050e").unwrap();
    let transport = MockTransport::with_answers(vec![MockTransport::answer(&pk, SW_OK)]);
    let app = RadixApp::new(transport);

    let key = app.get_public_key(&default_path(), false).await.unwrap();
    assert_eq!(key.serialize().to_vec(), pk);

    let sent = app.transport().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].cla, 0xAA);
    assert_eq!(sent[0].ins, INS_GET_PUBLIC_KEY);
    assert_eq!(sent[0].p1, 0x00);
    assert_eq!(sent[0].data, default_path().serialize().to_vec());
}

#[tokio::test]
async fn unexpected_status_surfaces_instruction() {
    init_logging();

    let transport = MockTransport::with_answers(vec![MockTransport::answer(&[], 0x6E01)]);
    let app = RadixApp::new(transport);

    let err = app.get_public_key(&default_path(), true).await.unwrap_err();
    match err {
        Error::DeviceStatus(code, ins) => {
            assert_eq!(code, 0x6E01);
            assert_eq!(ins, INS_GET_PUBLIC_KEY);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let sent = app.transport().sent();
    assert_eq!(sent[0].p1, 0x01);
}

#[tokio::test]
async fn sign_tx_streams_metadata_then_instructions() {
    init_logging();

    let instructions = [vec![0x01u8, 0x02], vec![0x03u8]];
    let answers = vec![
        MockTransport::answer(&[], SW_OK),
        MockTransport::answer(&[], SW_OK),
        MockTransport::answer(&compact_signature(), SW_OK),
    ];
    let app = RadixApp::new(MockTransport::with_answers(answers));

    let signature = app
        .sign_tx(&default_path(), 0x100, &instructions, Some("foo"))
        .await
        .unwrap();
    assert_eq!(signature.serialize_compact().to_vec(), compact_signature());

    let sent = app.transport().sent();
    assert_eq!(sent.len(), 3);
    assert!(sent.iter().all(|f| f.ins == INS_SIGN_TX));
    assert_eq!(sent[0].p1, 0x4D);
    assert_eq!(sent[1].p1, 0x49);
    assert_eq!(sent[1].p2, 0x00);
    assert_eq!(sent[1].data, vec![0x01, 0x02]);
    assert_eq!(sent[2].p1, 0x49);
    assert_eq!(sent[2].p2, 0x01);
    assert_eq!(sent[2].data, vec![0x03]);
}

#[tokio::test]
async fn sign_tx_aborts_stream_on_device_error() {
    init_logging();

    let instructions = [vec![0x01u8], vec![0x02u8], vec![0x03u8]];
    let answers = vec![
        MockTransport::answer(&[], SW_OK),
        MockTransport::answer(&[], 0x6E05),
    ];
    let app = RadixApp::new(MockTransport::with_answers(answers));

    let err = app
        .sign_tx(&default_path(), 3, &instructions, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DeviceStatus(0x6E05, INS_SIGN_TX)));

    // the failing instruction ends the stream, nothing more is sent
    assert_eq!(app.transport().sent().len(), 2);
}

/// Transport whose answers are released manually, keeping frames in flight
struct GatedTransport {
    answers: Mutex<VecDeque<Vec<u8>>>,
    gate: Semaphore,
    started: AtomicUsize,
    completed: AtomicUsize,
}

impl GatedTransport {
    fn with_answers(answers: Vec<Vec<u8>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            gate: Semaphore::new(0),
            started: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        }
    }

    fn release(&self, frames: usize) {
        self.gate.add_permits(frames);
    }

    fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Exchange for GatedTransport {
    type Error = Infallible;
    type AnswerType = Vec<u8>;

    async fn exchange<I>(&self, _command: &APDUCommand<I>) -> Result<APDUAnswer<Vec<u8>>, Self::Error>
    where
        I: Deref<Target = [u8]> + Send + Sync,
    {
        self.started.fetch_add(1, Ordering::SeqCst);

        let _permit = self.gate.acquire().await.expect("gate closed");
        self.completed.fetch_add(1, Ordering::SeqCst);

        let answer = self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected APDU frame");
        Ok(APDUAnswer::from_answer(answer).expect("scripted answer carries a status word"))
    }
}

#[tokio::test]
async fn in_flight_frame_completes_after_caller_cancellation() {
    init_logging();

    let transport = GatedTransport::with_answers(vec![MockTransport::answer(&[], SW_OK)]);
    let app = Arc::new(RadixApp::new(transport));

    let signer = tokio::spawn({
        let app = Arc::clone(&app);
        async move {
            let instructions = [vec![0x01u8], vec![0x02u8]];
            let _ = app.sign_tx(&default_path(), 2, &instructions, None).await;
        }
    });

    // wait for the metadata frame to go out, then cancel mid-exchange
    while app.transport().started() == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    signer.abort();
    let _ = signer.await;

    // the frame on the wire still completes once the device answers
    app.transport().release(1);
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while app.transport().completed() == 0 {
        assert!(tokio::time::Instant::now() < deadline, "in-flight frame was truncated");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    // and nothing further is sent, cancellation landed between frames
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(app.transport().started(), 1);
}

#[tokio::test]
async fn reset_session_reissues_get_version() {
    init_logging();

    let app = RadixApp::new(MockTransport::with_answers(vec![MockTransport::answer(&[1, 0, 0], SW_OK)]));
    app.reset_session().await.unwrap();

    let sent = app.transport().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].ins, INS_GET_VERSION);
}
