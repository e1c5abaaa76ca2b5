//! Test doubles for the external collaborators

use crate::capture::{CaptureDevice, ChunkReceiver, ChunkSender, DeviceInfo};
use crate::export::service::TranscodingService;
use crate::export::types::{TranscodeError, TranscodeRequest};
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Default)]
struct FeedState {
    sender: Option<ChunkSender>,
    paused: bool,
    stopped: bool,
}

/// Handle used by a test to push chunks through a [`ScriptedDevice`]
#[derive(Clone, Default)]
pub struct DeviceFeed {
    state: Arc<Mutex<FeedState>>,
}

impl DeviceFeed {
    pub fn push(&self, data: &[u8]) {
        if let Some(sender) = &self.state.lock().sender {
            let _ = sender.send(data.to_vec().into());
        }
    }

    /// Close the stream as if the user stopped sharing
    pub fn end_stream(&self) {
        self.state.lock().sender = None;
    }

    pub fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    pub fn is_stopped(&self) -> bool {
        self.state.lock().stopped
    }
}

/// Capture device driven by the test through a [`DeviceFeed`]
pub struct ScriptedDevice {
    feed: DeviceFeed,
    deny: bool,
}

impl ScriptedDevice {
    pub fn new() -> Self {
        Self {
            feed: DeviceFeed::default(),
            deny: false,
        }
    }

    pub fn denied() -> Self {
        Self {
            feed: DeviceFeed::default(),
            deny: true,
        }
    }

    pub fn feed(&self) -> DeviceFeed {
        self.feed.clone()
    }
}

#[async_trait]
impl CaptureDevice for ScriptedDevice {
    fn info(&self) -> DeviceInfo {
        DeviceInfo {
            id: "scripted".to_string(),
            name: "Scripted display".to_string(),
            container: "webm".to_string(),
        }
    }

    async fn start(&mut self) -> AppResult<ChunkReceiver> {
        if self.deny {
            return Err(AppError::CaptureDeviceDenied("permission refused".to_string()));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.feed.state.lock();
        state.sender = Some(tx);
        state.stopped = false;
        state.paused = false;
        Ok(rx)
    }

    async fn pause(&mut self) -> AppResult<()> {
        self.feed.state.lock().paused = true;
        Ok(())
    }

    async fn resume(&mut self) -> AppResult<()> {
        self.feed.state.lock().paused = false;
        Ok(())
    }

    async fn stop(&mut self) -> AppResult<()> {
        let mut state = self.feed.state.lock();
        state.sender = None;
        state.stopped = true;
        Ok(())
    }
}

enum Outcome {
    Succeed(Vec<u8>),
    Fail,
    /// Never resolves
    Stall,
}

/// Transcoder that records every request and answers from a script
pub struct FakeTranscoder {
    outcomes: Mutex<Vec<Outcome>>,
    fallback: Outcome,
    requests: Mutex<Vec<TranscodeRequest>>,
}

impl FakeTranscoder {
    pub fn succeeding(output: Vec<u8>) -> Self {
        Self {
            outcomes: Mutex::new(Vec::new()),
            fallback: Outcome::Succeed(output),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            outcomes: Mutex::new(Vec::new()),
            fallback: Outcome::Fail,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fail the next call, then fall back to the default outcome
    pub fn fail_next(&self) {
        self.outcomes.lock().push(Outcome::Fail);
    }

    /// Succeed the next call with `output`
    pub fn succeed_next(&self, output: Vec<u8>) {
        self.outcomes.lock().push(Outcome::Succeed(output));
    }

    /// Leave the next call hanging forever
    pub fn stall_next(&self) {
        self.outcomes.lock().push(Outcome::Stall);
    }

    pub fn requests(&self) -> Vec<TranscodeRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl TranscodingService for FakeTranscoder {
    fn name(&self) -> &str {
        "fake"
    }

    async fn transcode(&self, request: TranscodeRequest) -> Result<Vec<u8>, TranscodeError> {
        self.requests.lock().push(request);

        let scripted = {
            let mut outcomes = self.outcomes.lock();
            if outcomes.is_empty() {
                None
            } else {
                Some(outcomes.remove(0))
            }
        };

        match scripted.as_ref().unwrap_or(&self.fallback) {
            Outcome::Succeed(bytes) => Ok(bytes.clone()),
            Outcome::Fail => Err(TranscodeError::Status(500)),
            Outcome::Stall => std::future::pending().await,
        }
    }
}
