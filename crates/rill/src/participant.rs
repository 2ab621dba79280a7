// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Participant entity - entry point to a domain, factory for all entities.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use crate::registry::{DomainRegistry, DomainState};
use crate::{DdsType, Error, Publisher, QoS, Result, Subscriber, Topic};

/// Highest valid domain id (RTPS port-mapping range).
pub const MAX_DOMAIN_ID: u32 = 232;

/// Entry point to a rill domain.
///
/// A participant pins its domain's endpoint registry alive and acts as the
/// factory for topics, publishers, and subscribers. Types must be registered
/// before a topic can be created for them.
///
/// # Example
///
/// ```no_run
/// use rill::Participant;
///
/// let participant = Participant::builder("my_app")
///     .domain_id(0)
///     .build()?;
/// # Ok::<(), rill::Error>(())
/// ```
pub struct Participant {
    name: String,
    domain: Arc<DomainState>,
    registered_types: RwLock<HashSet<&'static str>>,
}

/// Builder for [`Participant`].
pub struct ParticipantBuilder {
    name: String,
    domain_id: u32,
}

impl Participant {
    /// Create a participant with default settings (domain 0).
    pub fn new(name: &str) -> Result<Arc<Self>> {
        Self::builder(name).build()
    }

    /// Create a new participant builder.
    pub fn builder(name: &str) -> ParticipantBuilder {
        ParticipantBuilder {
            name: name.to_string(),
            domain_id: 0,
        }
    }

    /// Participant name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Domain this participant belongs to.
    pub fn domain_id(&self) -> u32 {
        self.domain.domain_id
    }

    /// Register a type with this participant.
    ///
    /// Registering the same type name twice fails with
    /// [`Error::RegistrationFailed`].
    pub fn register_type<T: DdsType>(&self) -> Result<()> {
        let mut types = self
            .registered_types
            .write()
            .unwrap_or_else(|e| e.into_inner());
        if !types.insert(T::type_name()) {
            return Err(Error::RegistrationFailed);
        }
        log::debug!(
            "[Participant] '{}' registered type '{}'",
            self.name,
            T::type_name()
        );
        Ok(())
    }

    /// Whether a type name has been registered.
    pub fn is_type_registered(&self, type_name: &str) -> bool {
        let types = self
            .registered_types
            .read()
            .unwrap_or_else(|e| e.into_inner());
        types.contains(type_name)
    }

    /// Create a topic binding a name to a registered type.
    ///
    /// Fails with [`Error::TypeMismatch`] when `T` was not registered first.
    pub fn create_topic<T: DdsType>(self: &Arc<Self>, name: &str) -> Result<Topic<T>> {
        if !self.is_type_registered(T::type_name()) {
            return Err(Error::TypeMismatch);
        }
        Ok(Topic::new(name.to_string(), Arc::clone(self)))
    }

    /// Create a publisher with the given QoS.
    pub fn create_publisher(self: &Arc<Self>, qos: QoS) -> Result<Publisher> {
        Ok(Publisher::new(qos, Arc::clone(self)))
    }

    /// Create a subscriber with the given QoS.
    pub fn create_subscriber(self: &Arc<Self>, qos: QoS) -> Result<Subscriber> {
        Ok(Subscriber::new(qos, Arc::clone(self)))
    }

    pub(crate) fn domain(&self) -> &Arc<DomainState> {
        &self.domain
    }
}

impl std::fmt::Debug for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Participant")
            .field("name", &self.name)
            .field("domain_id", &self.domain.domain_id)
            .finish()
    }
}

impl ParticipantBuilder {
    /// Set the domain ID (default: 0).
    pub fn domain_id(mut self, domain_id: u32) -> Self {
        self.domain_id = domain_id;
        self
    }

    /// Build the participant.
    ///
    /// Fails with [`Error::InvalidDomainId`] when the domain id is outside
    /// 0-232.
    pub fn build(self) -> Result<Arc<Participant>> {
        if self.domain_id > MAX_DOMAIN_ID {
            return Err(Error::InvalidDomainId(self.domain_id));
        }

        let domain = DomainRegistry::global().get_or_create(self.domain_id);
        log::info!(
            "[Participant] '{}' joined domain {}",
            self.name,
            self.domain_id
        );

        Ok(Arc::new(Participant {
            name: self.name,
            domain,
            registered_types: RwLock::new(HashSet::new()),
        }))
    }
}
