// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sample metadata surfaced alongside taken data.

/// Per-sample instance liveliness state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstanceState {
    /// Live data written by a writer.
    Alive,
    /// Tombstone produced by `DataWriter::dispose`.
    NotAliveDisposed,
    /// Instance lost all writers. Not produced by this middleware; present
    /// so consumers can match exhaustively against the DDS state set.
    NotAliveNoWriters,
}

impl InstanceState {
    /// Whether the sample carries live data.
    #[inline]
    pub fn is_alive(self) -> bool {
        matches!(self, InstanceState::Alive)
    }
}

/// Metadata attached to every taken sample.
#[derive(Clone, Copy, Debug)]
pub struct SampleInfo {
    /// Liveliness tag of the instance the sample belongs to.
    pub instance_state: InstanceState,
    /// Writer-assigned sequence number (starts at 1 per writer).
    pub sequence: u64,
}

/// A taken sample: decoded data plus its metadata.
#[derive(Debug)]
pub struct Sample<T> {
    pub data: T,
    pub info: SampleInfo,
}
