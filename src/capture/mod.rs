//! Capture device abstraction
//!
//! Raw audio/video capture is an external collaborator; this module only
//! defines the seam the recorder talks to.

pub mod traits;

pub use traits::{concat_chunks, CaptureDevice, Chunk, ChunkReceiver, ChunkSender, DeviceInfo};
