//! Capture session
//!
//! A `CaptureSession` is the sole owner of the capture device and its chunk
//! stream for one recording. Stopping consumes the session, so once it has
//! been stopped nothing can reach the device through it again.

use super::state::{RecordingState, SessionClock};
use crate::capture::{concat_chunks, CaptureDevice, Chunk, ChunkReceiver, DeviceInfo};
use crate::utils::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;

/// How long to wait for the device to flush its final chunk after stop
const FINAL_CHUNK_TIMEOUT: Duration = Duration::from_secs(5);

/// Media handed over by a stopped session
#[derive(Debug, Clone)]
pub struct CapturedMedia {
    /// All chunks joined in capture order
    pub bytes: Vec<u8>,
    pub chunk_count: usize,
    /// Whole seconds of active recording
    pub duration_secs: u64,
    pub started_at: Option<DateTime<Utc>>,
    pub device: DeviceInfo,
}

/// Exclusive handle on an active recording
pub struct CaptureSession {
    device: Box<dyn CaptureDevice>,
    info: DeviceInfo,
    chunks_rx: Option<ChunkReceiver>,
    chunks: Vec<Chunk>,
    clock: SessionClock,
    state: RecordingState,
}

impl CaptureSession {
    /// Acquire `device` and start recording.
    ///
    /// If the device refuses, no session is created.
    pub async fn start(mut device: Box<dyn CaptureDevice>) -> AppResult<Self> {
        let info = device.info();
        tracing::info!("Starting capture on {} ({})", info.name, info.id);

        let chunks_rx = device.start().await.map_err(|e| {
            tracing::warn!("Capture device {} unavailable: {}", info.id, e);
            match e {
                AppError::CaptureDeviceDenied(_) => e,
                other => AppError::CaptureDeviceDenied(other.to_string()),
            }
        })?;

        let mut clock = SessionClock::default();
        clock.start();

        Ok(Self {
            device,
            info,
            chunks_rx: Some(chunks_rx),
            chunks: Vec::new(),
            clock,
            state: RecordingState::Recording,
        })
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == RecordingState::Paused
    }

    pub fn device_info(&self) -> &DeviceInfo {
        &self.info
    }

    /// Whole seconds of active (unpaused) recording so far
    pub fn elapsed_secs(&self) -> u64 {
        self.clock.elapsed_secs()
    }

    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    pub async fn pause(&mut self) -> AppResult<()> {
        if self.state != RecordingState::Recording {
            return Err(AppError::InvalidState("recording is not running".to_string()));
        }

        tracing::info!("Pausing recording");
        self.device.pause().await?;
        self.clock.pause();
        self.state = RecordingState::Paused;
        Ok(())
    }

    pub async fn resume(&mut self) -> AppResult<()> {
        if self.state != RecordingState::Paused {
            return Err(AppError::InvalidState("recording is not paused".to_string()));
        }

        tracing::info!("Resuming recording");
        self.device.resume().await?;
        self.clock.resume();
        self.state = RecordingState::Recording;
        Ok(())
    }

    /// Pause if recording, resume if paused
    pub async fn toggle_pause(&mut self) -> AppResult<RecordingState> {
        match self.state {
            RecordingState::Recording => self.pause().await?,
            RecordingState::Paused => self.resume().await?,
            RecordingState::Idle => {
                return Err(AppError::InvalidState("no active recording".to_string()))
            }
        }
        Ok(self.state)
    }

    /// Move any delivered chunks into the session buffer.
    ///
    /// Returns the number of chunks buffered so far.
    pub fn poll_chunks(&mut self) -> usize {
        if let Some(rx) = self.chunks_rx.as_mut() {
            loop {
                match rx.try_recv() {
                    Ok(chunk) => {
                        if !chunk.is_empty() {
                            self.chunks.push(chunk);
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        tracing::info!("Capture device {} ended its stream", self.info.id);
                        self.chunks_rx = None;
                        break;
                    }
                }
            }
        }
        self.chunks.len()
    }

    /// Whether the device closed its stream on its own (e.g. sharing stopped)
    pub fn device_ended(&mut self) -> bool {
        self.poll_chunks();
        self.chunks_rx.is_none()
    }

    /// Halt the device, collect the final chunks and release the session
    pub async fn stop(mut self) -> AppResult<CapturedMedia> {
        tracing::info!("Stopping capture on {}", self.info.id);

        if let Err(e) = self.device.stop().await {
            tracing::warn!("Capture device {} failed to stop cleanly: {}", self.info.id, e);
        }
        self.clock.stop();
        self.state = RecordingState::Idle;

        if let Some(mut rx) = self.chunks_rx.take() {
            let mut late = Vec::new();
            let drain = async {
                while let Some(chunk) = rx.recv().await {
                    late.push(chunk);
                }
            };
            let timed_out = tokio::time::timeout(FINAL_CHUNK_TIMEOUT, drain).await.is_err();
            self.chunks.extend(late.into_iter().filter(|c| !c.is_empty()));

            if timed_out {
                tracing::warn!(
                    "Capture device {} did not close its stream; using {} buffered chunks",
                    self.info.id,
                    self.chunks.len()
                );
            }
        }

        let media = CapturedMedia {
            bytes: concat_chunks(&self.chunks),
            chunk_count: self.chunks.len(),
            duration_secs: self.clock.elapsed_secs(),
            started_at: self.clock.started_at(),
            device: self.info.clone(),
        };

        tracing::info!(
            "Capture stopped: {} chunks, {} bytes, {}s",
            media.chunk_count,
            media.bytes.len(),
            media.duration_secs
        );
        Ok(media)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedDevice;

    #[tokio::test]
    async fn test_denied_device_creates_no_session() {
        let device = ScriptedDevice::denied();
        let result = CaptureSession::start(Box::new(device)).await;
        assert!(matches!(result, Err(AppError::CaptureDeviceDenied(_))));
    }

    #[tokio::test]
    async fn test_stop_collects_chunks_in_order() {
        let device = ScriptedDevice::new();
        let feed = device.feed();
        let mut session = CaptureSession::start(Box::new(device)).await.unwrap();

        feed.push(b"one-");
        feed.push(b"");
        feed.push(b"two-");
        assert_eq!(session.poll_chunks(), 2);
        feed.push(b"three");

        let media = session.stop().await.unwrap();
        assert_eq!(media.bytes, b"one-two-three");
        assert_eq!(media.chunk_count, 3);
        assert!(feed.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_freezes_elapsed() {
        let device = ScriptedDevice::new();
        let feed = device.feed();
        let mut session = CaptureSession::start(Box::new(device)).await.unwrap();

        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(session.toggle_pause().await.unwrap(), RecordingState::Paused);
        assert!(feed.is_paused());
        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(session.elapsed_secs(), 3);

        assert!(matches!(session.pause().await, Err(AppError::InvalidState(_))));
        session.resume().await.unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;

        let media = session.stop().await.unwrap();
        assert_eq!(media.duration_secs, 5);
    }

    #[tokio::test]
    async fn test_device_ended_detected() {
        let device = ScriptedDevice::new();
        let feed = device.feed();
        let mut session = CaptureSession::start(Box::new(device)).await.unwrap();

        assert!(!session.device_ended());
        feed.push(b"last");
        feed.end_stream();
        assert!(session.device_ended());

        let media = session.stop().await.unwrap();
        assert_eq!(media.bytes, b"last");
    }
}
