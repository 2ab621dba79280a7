// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Subscriber entity - creates and manages DataReader instances.
//!
//! Deliberately mirrors [`Publisher`](crate::Publisher); the symmetric pair
//! is part of the API contract.

use std::sync::Arc;

use crate::{DataReader, DdsType, Error, Participant, QoS, Result, Topic};

/// Intermediate entity between Participant and DataReader.
///
/// Readers created through a subscriber inherit its QoS.
pub struct Subscriber {
    qos: QoS,
    participant: Arc<Participant>,
}

impl Subscriber {
    pub(crate) fn new(qos: QoS, participant: Arc<Participant>) -> Self {
        Self { qos, participant }
    }

    /// QoS policies for this subscriber.
    pub fn qos(&self) -> &QoS {
        &self.qos
    }

    /// Create a DataReader for the given topic.
    ///
    /// The topic must belong to the same participant as this subscriber.
    pub fn create_reader<T: DdsType>(&self, topic: &Topic<T>) -> Result<DataReader<T>> {
        if !Arc::ptr_eq(&self.participant, &topic.participant) {
            return Err(Error::InvalidState(
                "topic belongs to a different participant".to_string(),
            ));
        }
        DataReader::new(topic, self.qos.clone())
    }
}
