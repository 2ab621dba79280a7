// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Publisher entity - creates and manages DataWriter instances.
//!
//! Publisher and Subscriber are intentionally symmetric: users expect the
//! DDS entity pair even though the two types share most of their shape.

use std::sync::Arc;

use crate::{DataWriter, DdsType, Error, Participant, QoS, Result, Topic};

/// Intermediate entity between Participant and DataWriter.
///
/// Writers created through a publisher inherit its QoS.
pub struct Publisher {
    qos: QoS,
    participant: Arc<Participant>,
}

impl Publisher {
    pub(crate) fn new(qos: QoS, participant: Arc<Participant>) -> Self {
        Self { qos, participant }
    }

    /// QoS policies for this publisher.
    pub fn qos(&self) -> &QoS {
        &self.qos
    }

    /// Create a DataWriter for the given topic.
    ///
    /// The topic must belong to the same participant as this publisher.
    pub fn create_writer<T: DdsType>(&self, topic: &Topic<T>) -> Result<DataWriter<T>> {
        if !Arc::ptr_eq(&self.participant, &topic.participant) {
            return Err(Error::InvalidState(
                "topic belongs to a different participant".to_string(),
            ));
        }
        DataWriter::new(topic, self.qos.clone())
    }
}
