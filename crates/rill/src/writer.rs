// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DataWriter - publishes typed samples on a topic.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::fanout::{SampleEnvelope, TopicFanout};
use crate::registry::{next_endpoint_id, BindToken};
use crate::sample::InstanceState;
use crate::{DdsType, QoS, Result, Topic};

/// A typed writer that publishes samples of `T` on one topic.
///
/// Created through [`Publisher::create_writer`](crate::Publisher::create_writer).
/// Matching readers in the same domain receive every sample written after
/// they were bound; there is no late-joiner replay.
///
/// # Thread Safety
///
/// `DataWriter<T>` is `Send + Sync`; `write` takes `&self`.
pub struct DataWriter<T: DdsType> {
    topic_name: String,
    qos: QoS,
    fanout: Arc<TopicFanout>,
    next_seq: AtomicU64,
    /// Unregisters from the domain on drop.
    _bind_token: BindToken,
    _phantom: core::marker::PhantomData<T>,
}

impl<T: DdsType> DataWriter<T> {
    pub(crate) fn new(topic: &Topic<T>, qos: QoS) -> Result<Self> {
        let fanout = Arc::new(TopicFanout::new());
        let bind_token = topic.participant.domain().register_writer(
            topic.match_key(),
            next_endpoint_id(),
            fanout.clone(),
            qos.reliability,
        );

        log::debug!(
            "[DataWriter] created topic='{}' type='{}'",
            topic.name,
            T::type_name()
        );

        Ok(Self {
            topic_name: topic.name.clone(),
            qos,
            fanout,
            next_seq: AtomicU64::new(1),
            _bind_token: bind_token,
            _phantom: core::marker::PhantomData,
        })
    }

    /// Topic this writer publishes on.
    pub fn topic_name(&self) -> &str {
        &self.topic_name
    }

    /// QoS policies for this writer.
    pub fn qos(&self) -> &QoS {
        &self.qos
    }

    /// Publish a sample to all bound readers. Non-blocking.
    pub fn write(&self, sample: &T) -> Result<()> {
        self.publish(sample, InstanceState::Alive)
    }

    /// Publish a disposal tombstone for the instance described by `sample`.
    ///
    /// Readers observe the tombstone as a sample whose instance state is
    /// `NotAliveDisposed`.
    pub fn dispose(&self, sample: &T) -> Result<()> {
        self.publish(sample, InstanceState::NotAliveDisposed)
    }

    fn publish(&self, sample: &T, state: InstanceState) -> Result<()> {
        let mut buf = Vec::new();
        sample.encode_cdr(&mut buf)?;

        let envelope = SampleEnvelope {
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            state,
            payload: Arc::from(buf),
        };

        log::trace!(
            "[DataWriter] publish topic='{}' seq={} state={:?} len={}",
            self.topic_name,
            envelope.seq,
            envelope.state,
            envelope.payload.len()
        );

        self.fanout.push(envelope);
        Ok(())
    }

    /// Number of readers currently bound to this writer.
    pub fn matched_readers(&self) -> usize {
        self.fanout.reader_count()
    }
}
