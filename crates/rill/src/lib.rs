// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # rill
//!
//! A small intra-process publish/subscribe middleware with a DDS-shaped API.
//!
//! ## Overview
//!
//! rill moves typed samples between writers and readers inside one process.
//! Key concepts:
//!
//! - **Participant**: Entry point to a domain, factory for all entities
//! - **Topic**: Named data channel with an associated registered type
//! - **Publisher/Subscriber**: Intermediate grouping entities
//! - **DataWriter/DataReader**: Endpoints that send/receive typed data
//! - **Instance state**: Per-sample liveliness tag (`Alive` vs. tombstones)
//!
//! There is no network transport and no discovery protocol: endpoints that
//! share a domain, topic name, and type are matched automatically inside the
//! process, whichever side is created first.
//!
//! ## Quick Start
//!
//! ```no_run
//! use rill::{DdsType, Participant, QoS, Result};
//!
//! #[derive(Debug)]
//! struct Ping { seq: u32 }
//!
//! impl DdsType for Ping {
//!     fn type_name() -> &'static str { "Ping" }
//!     fn encode_cdr(&self, buf: &mut Vec<u8>) -> Result<()> {
//!         rill::cdr::put_u32(buf, self.seq);
//!         Ok(())
//!     }
//!     fn decode_cdr(buf: &[u8]) -> Result<Self> {
//!         let mut pos = 0;
//!         Ok(Ping { seq: rill::cdr::get_u32(buf, &mut pos)? })
//!     }
//! }
//!
//! let participant = Participant::builder("monitor").domain_id(0).build()?;
//! participant.register_type::<Ping>()?;
//! let topic = participant.create_topic::<Ping>("sensors/ping")?;
//!
//! let publisher = participant.create_publisher(QoS::default())?;
//! let writer = publisher.create_writer(&topic)?;
//! let subscriber = participant.create_subscriber(QoS::default())?;
//! let reader = subscriber.create_reader(&topic)?;
//!
//! writer.write(&Ping { seq: 1 })?;
//! if let Some(sample) = reader.take_next_sample()? {
//!     println!("got seq={}", sample.data.seq);
//! }
//! # Ok::<(), rill::Error>(())
//! ```
//!
//! ## Entity Hierarchy
//!
//! ```text
//! Participant
//! +-- Publisher
//! |   +-- DataWriter<T>  ------> Topic<T>
//! +-- Subscriber
//!     +-- DataReader<T>  <------ Topic<T>
//! ```

/// Writer-to-reader fan-out delivery primitives.
pub mod fanout;
mod participant;
mod publisher;
/// QoS policy definitions (reliability, history).
pub mod qos;
mod reader;
/// Domain registry for intra-process auto-binding.
pub mod registry;
mod sample;
mod subscriber;
mod topic;
/// Type support: the [`DdsType`] serialization seam and CDR-style codecs.
pub mod types;
mod writer;

pub use participant::{Participant, ParticipantBuilder, MAX_DOMAIN_ID};
pub use publisher::Publisher;
pub use qos::{History, QoS, Reliability};
pub use reader::DataReader;
pub use sample::{InstanceState, Sample, SampleInfo};
pub use subscriber::Subscriber;
pub use topic::Topic;
pub use types::cdr;
pub use types::DdsType;
pub use writer::DataWriter;

// Intra-process auto-binding
pub use registry::{BindToken, DomainRegistry, DomainState, EndpointKind, MatchKey, TypeId};

/// Errors returned by rill operations.
#[derive(Debug)]
pub enum Error {
    /// Domain ID out of range (0-232).
    InvalidDomainId(u32),
    /// Type registration failed (duplicate registration).
    RegistrationFailed,
    /// Topic/type mismatch (type not registered with the participant).
    TypeMismatch,
    /// Invalid state for the requested operation.
    InvalidState(String),
    /// Sample encoding/decoding failed.
    SerializationError,
    /// Buffer too small while decoding.
    BufferTooSmall,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidDomainId(id) => write!(f, "Invalid domain_id: {} (must be 0-232)", id),
            Error::RegistrationFailed => write!(f, "Type registration failed"),
            Error::TypeMismatch => write!(f, "Type mismatch"),
            Error::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            Error::SerializationError => write!(f, "Sample serialization failed"),
            Error::BufferTooSmall => write!(f, "Buffer too small for decoding"),
        }
    }
}

impl std::error::Error for Error {}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
