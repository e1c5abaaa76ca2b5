//! Capture trait definitions
//!
//! Platform-agnostic seam for the external capture device. A device hands
//! out encoded media chunks over a channel while it runs; closing the
//! channel means no further chunks will arrive.

use crate::utils::error::AppResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// One discrete unit of encoded media
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk(pub Vec<u8>);

impl Chunk {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Chunk {
    fn from(data: Vec<u8>) -> Self {
        Chunk(data)
    }
}

/// Receiving side of a device's chunk stream
pub type ChunkReceiver = mpsc::UnboundedReceiver<Chunk>;
/// Sending side of a device's chunk stream
pub type ChunkSender = mpsc::UnboundedSender<Chunk>;

/// Join chunks in capture order
pub fn concat_chunks(chunks: &[Chunk]) -> Vec<u8> {
    let total = chunks.iter().map(Chunk::len).sum();
    let mut bytes = Vec::with_capacity(total);
    for chunk in chunks {
        bytes.extend_from_slice(&chunk.0);
    }
    bytes
}

/// Information about a capture device
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Unique device ID
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Container the device encodes chunks in (e.g. "webm")
    pub container: String,
}

/// External device producing a live media stream
#[async_trait]
pub trait CaptureDevice: Send {
    fn info(&self) -> DeviceInfo;

    /// Acquire the device and begin producing chunks.
    ///
    /// Fails with `AppError::CaptureDeviceDenied` if the device cannot be
    /// acquired (e.g. permission refused).
    async fn start(&mut self) -> AppResult<ChunkReceiver>;

    async fn pause(&mut self) -> AppResult<()>;

    async fn resume(&mut self) -> AppResult<()>;

    /// Halt capture and release every track. The chunk channel is closed
    /// once the final chunk has been delivered.
    async fn stop(&mut self) -> AppResult<()>;
}
