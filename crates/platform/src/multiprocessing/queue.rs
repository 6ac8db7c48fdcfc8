//! crates/platform/src/multiprocessing/queue.rs
//! Length-prefixed message queue over a pipe.

use std::fs::File;
use std::io::{self, Read, Write};

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::lock::ProcessLock;
use super::pipe::Pipe;
use crate::error::QueueError;

const HEADER_LEN: usize = 4;

/// Pipe capacity asked for on systems that can grow pipes.
const REQUESTED_CAPACITY: usize = 1 << 20;

/// A multi-producer, multi-consumer queue that keeps working after a fork.
///
/// Each message is a frame of a 4-byte little-endian length followed by the
/// payload. Writers and readers are serialized with separate
/// [`ProcessLock`]s, so frames from different producers never interleave and
/// each frame is read by exactly one consumer.
///
/// The queue is bounded by the capacity of its pipe: a producer blocks while
/// unread frames fill it, until a consumer catches up. A payload larger than
/// [`max_payload`](Self::max_payload) could never be written without a
/// concurrent consumer, so it is rejected instead. Frames up to that size
/// always go through on an empty queue, even with no consumer running.
#[derive(Debug)]
pub struct Queue {
    reader: File,
    writer: File,
    read_lock: ProcessLock,
    write_lock: ProcessLock,
    max_payload: usize,
}

impl Queue {
    /// Creates an empty queue.
    ///
    /// # Errors
    ///
    /// Fails when the pipe or the lock files cannot be created.
    pub fn new() -> io::Result<Self> {
        let pipe = Pipe::new()?;
        pipe.request_capacity(REQUESTED_CAPACITY);
        let max_payload = pipe.capacity().saturating_sub(HEADER_LEN);
        let (reader, writer) = pipe.into_parts();
        Ok(Self {
            reader,
            writer,
            read_lock: ProcessLock::new()?,
            write_lock: ProcessLock::new()?,
            max_payload,
        })
    }

    /// Largest payload a single frame may carry.
    #[must_use]
    pub const fn max_payload(&self) -> usize {
        self.max_payload
    }

    /// Sends one raw frame.
    ///
    /// # Errors
    ///
    /// [`QueueError::TooLarge`] for payloads over
    /// [`max_payload`](Self::max_payload); I/O errors otherwise.
    pub fn put_bytes(&self, payload: &[u8]) -> Result<(), QueueError> {
        let too_large = || QueueError::TooLarge {
            len: payload.len(),
            limit: self.max_payload,
        };
        if payload.len() > self.max_payload {
            return Err(too_large());
        }
        let len = u32::try_from(payload.len()).map_err(|_| too_large())?;

        let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
        frame.extend_from_slice(&len.to_le_bytes());
        frame.extend_from_slice(payload);

        let _guard = self.write_lock.acquire()?;
        let mut writer = &self.writer;
        writer.write_all(&frame)?;
        writer.flush()?;
        Ok(())
    }

    /// Blocks until a frame is available and returns its payload.
    ///
    /// # Errors
    ///
    /// Returns an `UnexpectedEof` I/O error once every writer is closed.
    pub fn get_bytes(&self) -> Result<Vec<u8>, QueueError> {
        let _guard = self.read_lock.acquire()?;
        let mut reader = &self.reader;
        let mut header = [0_u8; HEADER_LEN];
        reader.read_exact(&mut header)?;
        let len = u32::from_le_bytes(header) as usize;
        let mut payload = vec![0_u8; len];
        reader.read_exact(&mut payload)?;
        Ok(payload)
    }

    /// Sends a value encoded as JSON.
    ///
    /// # Errors
    ///
    /// Fails when encoding or sending fails.
    pub fn put<T: Serialize>(&self, value: &T) -> Result<(), QueueError> {
        let payload = serde_json::to_vec(value)?;
        self.put_bytes(&payload)
    }

    /// Receives a JSON-encoded value.
    ///
    /// # Errors
    ///
    /// Fails when receiving or decoding fails.
    pub fn get<T: DeserializeOwned>(&self) -> Result<T, QueueError> {
        let payload = self.get_bytes()?;
        Ok(serde_json::from_slice(&payload)?)
    }
}
