// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fan-out dispatcher from a writer to N reader queues.
//!
//! `TopicFanout` clones a [`SampleEnvelope`] to all attached readers. The
//! payload bytes are shared (`Arc<[u8]>`), so a push copies an envelope, not
//! the encoded sample. Non-blocking, keep-last lossy: when a reader queue is
//! full the oldest pending sample is displaced.

use crate::sample::InstanceState;
use crossbeam::queue::ArrayQueue;
use std::sync::{Arc, RwLock};

/// One encoded sample in flight.
#[derive(Clone)]
pub struct SampleEnvelope {
    /// Writer-assigned sequence number.
    pub seq: u64,
    /// Liveliness tag (tombstones travel the same path as data).
    pub state: InstanceState,
    /// Encoded payload, shared across all reader queues.
    pub payload: Arc<[u8]>,
}

/// Bounded queue a reader drains with `pop`.
pub type SampleQueue = ArrayQueue<SampleEnvelope>;

/// Unique identifier for a reader attached to a fanout.
///
/// Based on the queue's Arc pointer address - two registrations with the
/// same queue are the same reader.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ReaderId(usize);

impl ReaderId {
    pub fn from_queue(queue: &Arc<SampleQueue>) -> Self {
        Self(Arc::as_ptr(queue) as usize)
    }
}

/// Reader registration stored by the [`TopicFanout`].
pub struct FanoutReader {
    id: ReaderId,
    queue: Arc<SampleQueue>,
}

impl FanoutReader {
    pub fn new(queue: Arc<SampleQueue>) -> Self {
        let id = ReaderId::from_queue(&queue);
        Self { id, queue }
    }
}

/// Fan-out from one writer to N reader queues.
///
/// `RwLock` is read-only in the hot path; attach/detach take the write lock.
pub struct TopicFanout {
    readers: RwLock<Vec<FanoutReader>>,
}

impl TopicFanout {
    pub fn new() -> Self {
        Self {
            readers: RwLock::new(Vec::new()),
        }
    }

    /// Attach a reader. Attaching the same queue twice is a no-op.
    pub fn add_reader(&self, reader: FanoutReader) {
        let mut readers = self.readers.write().unwrap_or_else(|e| e.into_inner());
        if readers.iter().any(|r| r.id == reader.id) {
            return;
        }
        readers.push(reader);
    }

    /// Detach a reader by id (no-op when absent).
    pub fn remove_reader(&self, id: ReaderId) {
        let mut readers = self.readers.write().unwrap_or_else(|e| e.into_inner());
        readers.retain(|r| r.id != id);
    }

    pub fn reader_count(&self) -> usize {
        let readers = self.readers.read().unwrap_or_else(|e| e.into_inner());
        readers.len()
    }

    /// Deliver an envelope to every attached reader.
    ///
    /// Keep-last semantics: a full queue displaces its oldest entry.
    pub fn push(&self, envelope: SampleEnvelope) {
        let readers = self.readers.read().unwrap_or_else(|e| e.into_inner());
        for reader in readers.iter() {
            if reader.queue.force_push(envelope.clone()).is_some() {
                log::debug!(
                    "[TopicFanout] reader queue full, displaced oldest (seq={})",
                    envelope.seq
                );
            }
        }
    }
}
