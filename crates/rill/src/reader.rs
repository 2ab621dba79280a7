// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DataReader - polls typed samples from a topic.

use std::sync::Arc;

use crossbeam::queue::ArrayQueue;

use crate::fanout::{FanoutReader, ReaderId, SampleQueue};
use crate::registry::{next_endpoint_id, BindToken, DomainState, MatchKey};
use crate::sample::{Sample, SampleInfo};
use crate::{DdsType, QoS, Result, Topic};

/// A typed reader that receives samples of `T` from one topic.
///
/// Created through [`Subscriber::create_reader`](crate::Subscriber::create_reader).
/// All take operations are non-blocking polls: they return immediately with
/// `Ok(None)` when nothing is pending.
///
/// # Thread Safety
///
/// `DataReader<T>` is `Send + Sync`; `take_next_sample` takes `&self`.
pub struct DataReader<T: DdsType> {
    topic_name: String,
    qos: QoS,
    queue: Arc<SampleQueue>,
    domain: Arc<DomainState>,
    key: MatchKey,
    /// Unregisters from the domain on drop.
    _bind_token: BindToken,
    _phantom: core::marker::PhantomData<T>,
}

impl<T: DdsType> DataReader<T> {
    pub(crate) fn new(topic: &Topic<T>, qos: QoS) -> Result<Self> {
        let queue: Arc<SampleQueue> = Arc::new(ArrayQueue::new(qos.history.depth()));
        let key = topic.match_key();
        let domain = Arc::clone(topic.participant.domain());

        let queue_for_callback = queue.clone();
        let bind_token = domain.register_reader(
            key.clone(),
            next_endpoint_id(),
            queue.clone(),
            qos.reliability,
            move |fanout| {
                fanout.add_reader(FanoutReader::new(queue_for_callback.clone()));
            },
        );

        log::debug!(
            "[DataReader] created topic='{}' type='{}'",
            topic.name,
            T::type_name()
        );

        Ok(Self {
            topic_name: topic.name.clone(),
            qos,
            queue,
            domain,
            key,
            _bind_token: bind_token,
            _phantom: core::marker::PhantomData,
        })
    }

    /// Topic this reader subscribes to.
    pub fn topic_name(&self) -> &str {
        &self.topic_name
    }

    /// QoS policies for this reader.
    pub fn qos(&self) -> &QoS {
        &self.qos
    }

    /// Number of samples currently pending.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Take the next pending sample, removing it from the queue.
    ///
    /// Non-blocking. Returns `Ok(None)` when no sample is pending; decoding
    /// failures surface as errors and consume the sample.
    pub fn take_next_sample(&self) -> Result<Option<Sample<T>>> {
        let envelope = match self.queue.pop() {
            Some(envelope) => envelope,
            None => return Ok(None),
        };

        let data = T::decode_cdr(&envelope.payload)?;
        log::trace!(
            "[DataReader] take topic='{}' seq={} state={:?}",
            self.topic_name,
            envelope.seq,
            envelope.state
        );

        Ok(Some(Sample {
            data,
            info: SampleInfo {
                instance_state: envelope.state,
                sequence: envelope.seq,
            },
        }))
    }

    /// Alias for [`take_next_sample`](Self::take_next_sample).
    #[inline]
    pub fn take(&self) -> Result<Option<Sample<T>>> {
        self.take_next_sample()
    }
}

impl<T: DdsType> Drop for DataReader<T> {
    fn drop(&mut self) {
        // Detach the queue from every bound writer; the bind token then
        // removes the registry entry.
        let id = ReaderId::from_queue(&self.queue);
        for fanout in self.domain.find_writers(&self.key) {
            fanout.remove_reader(id);
        }
    }
}
