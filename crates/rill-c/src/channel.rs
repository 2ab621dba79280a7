// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Channel - the entity-lifecycle manager and data paths behind the C
//! surface.
//!
//! A [`Channel`] owns one complete entity set (participant, topic,
//! publisher, subscriber, writer, reader) on a single topic. Construction is
//! transactional: the entities are created in strict dependency order and a
//! failure at any stage drops every stage already built, so no partially
//! constructed set is ever observable. Dropping the channel tears the set
//! down in reverse dependency order.

use std::sync::Arc;

use parking_lot::Mutex;
use rill::{
    DataReader, DataWriter, Participant, Publisher, QoS, Result, Subscriber, Topic,
};

use crate::record::MessageRecord;

/// Name announced by every channel participant.
const PARTICIPANT_NAME: &str = "rill-channel";

/// Configuration for [`Channel::open`].
#[derive(Clone, Debug)]
pub struct ChannelConfig {
    topic: String,
    domain_id: u32,
}

impl ChannelConfig {
    /// Configure a channel on `topic`, domain 0.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            domain_id: 0,
        }
    }

    /// Set the domain id (default: 0).
    pub fn domain_id(mut self, domain_id: u32) -> Self {
        self.domain_id = domain_id;
        self
    }

    /// Topic name this channel is bound to.
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

/// The entity set: exists as a whole or not at all.
///
/// Field order is teardown order (writer, reader, then the entities they
/// depend on, participant last).
struct EntitySet {
    writer: DataWriter<MessageRecord>,
    reader: DataReader<MessageRecord>,
    _topic: Topic<MessageRecord>,
    _publisher: Publisher,
    _subscriber: Subscriber,
    _participant: Arc<Participant>,
}

/// A single-topic publish/subscribe channel.
///
/// Every operation serializes on one internal lock for its entire duration;
/// concurrent callers interleave but never observe intermediate state. No
/// operation blocks waiting for data: `take` is always an immediate poll.
///
/// A `Channel` that exists is always fully constructed; there is no
/// half-open or error state. Channels are independent of each other - two
/// channels on the same topic and domain exchange messages.
pub struct Channel {
    topic: String,
    inner: Mutex<EntitySet>,
}

impl Channel {
    /// Open a channel: build the complete entity set for the configured
    /// topic.
    ///
    /// Construction order: participant, type registration, topic, publisher,
    /// writer, subscriber, reader. Each stage is checked; on failure the
    /// stages already built are released (ownership rollback) and the error
    /// is returned.
    pub fn open(config: ChannelConfig) -> Result<Channel> {
        let participant = Participant::builder(PARTICIPANT_NAME)
            .domain_id(config.domain_id)
            .build()?;
        participant.register_type::<MessageRecord>()?;
        let topic = participant.create_topic::<MessageRecord>(&config.topic)?;
        let publisher = participant.create_publisher(QoS::default())?;
        let writer = publisher.create_writer(&topic)?;
        let subscriber = participant.create_subscriber(QoS::default())?;
        let reader = subscriber.create_reader(&topic)?;

        log::info!(
            "[Channel] open topic='{}' domain={}",
            config.topic,
            config.domain_id
        );

        Ok(Channel {
            topic: config.topic,
            inner: Mutex::new(EntitySet {
                writer,
                reader,
                _topic: topic,
                _publisher: publisher,
                _subscriber: subscriber,
                _participant: participant,
            }),
        })
    }

    /// Topic name this channel publishes and polls.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Publish a record built from the two scalar inputs.
    pub fn write(&self, index: u32, message: &str) -> Result<()> {
        let set = self.inner.lock();
        set.writer.write(&MessageRecord::new(index, message))
    }

    /// Publish a fully-formed record.
    pub fn write_record(&self, record: &MessageRecord) -> Result<()> {
        let set = self.inner.lock();
        set.writer.write(record)
    }

    /// Poll for the next pending record. Non-blocking.
    ///
    /// Pops exactly one sample per call. A sample whose instance state is
    /// not alive is consumed but reported as no data; the next call sees the
    /// sample behind it.
    pub fn take(&self) -> Result<Option<MessageRecord>> {
        let set = self.inner.lock();
        let sample = match set.reader.take_next_sample()? {
            Some(sample) => sample,
            None => return Ok(None),
        };

        if !sample.info.instance_state.is_alive() {
            log::debug!(
                "[Channel] consumed non-alive sample topic='{}' seq={}",
                self.topic,
                sample.info.sequence
            );
            return Ok(None);
        }

        Ok(Some(sample.data))
    }
}
