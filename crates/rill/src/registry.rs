// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Domain registry for intra-process auto-binding.
//!
//! When a reader and a writer share the same (topic, type) within a domain,
//! they are bound automatically, whichever side is created first.
//!
//! # Architecture
//!
//! ```text
//! DomainRegistry (static global)
//! +-- domains: Mutex<HashMap<DomainId, Weak<DomainState>>>
//!
//! DomainState (one per domain, per process)
//! +-- domain_id: u32
//! +-- endpoints: RwLock<HashMap<MatchKey, Vec<LocalEndpointEntry>>>
//! +-- [strong ref held by Participant]
//!
//! MatchKey
//! +-- topic_name: Arc<str>
//! +-- type_id: TypeId (hash of the type name)
//! ```
//!
//! # Auto-Binding Flow
//!
//! 1. Writer created -> registers in DomainState
//! 2. Reader created -> registers, finds matching writers, auto-binds
//! 3. Reader destroyed -> unbinds, unregisters
//! 4. Writer destroyed -> unregisters (its fanout dies with it)
//!
//! # Thread Safety
//!
//! - DomainRegistry: Mutex for domain map access
//! - DomainState.endpoints: RwLock (many readers, few writers)
//! - Registration/lookup lock; the data path itself never touches this map

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

use crate::fanout::{SampleQueue, TopicFanout};
use crate::qos::Reliability;

/// Domain ID type (0-232, RTPS range).
pub type DomainId = u32;

/// Type identifier for matching endpoints.
///
/// A hash of the type name is enough for intra-process matching; there is no
/// wire-level type object to interoperate with.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(u64);

impl TypeId {
    /// Create a TypeId from a type name.
    pub fn from_type_name(type_name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let mut hasher = DefaultHasher::new();
        type_name.hash(&mut hasher);
        Self(hasher.finish())
    }
}

impl std::fmt::Debug for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TypeId({:016x})", self.0)
    }
}

/// Match key for endpoint lookup.
///
/// Two endpoints match if they have the same (topic_name, type_id).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MatchKey {
    pub topic_name: Arc<str>,
    pub type_id: TypeId,
}

impl MatchKey {
    pub fn from_names(topic_name: &str, type_name: &str) -> Self {
        Self {
            topic_name: Arc::from(topic_name),
            type_id: TypeId::from_type_name(type_name),
        }
    }
}

impl std::fmt::Debug for MatchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchKey")
            .field("topic", &self.topic_name)
            .field("type_id", &self.type_id)
            .finish()
    }
}

/// Kind of local endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    Reader,
    Writer,
}

/// Process-unique endpoint identifier.
pub type EndpointId = u64;

/// Allocate the next endpoint id.
pub fn next_endpoint_id() -> EndpointId {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

/// Local endpoint entry in the registry.
pub struct LocalEndpointEntry {
    pub id: EndpointId,
    pub kind: EndpointKind,
    pub reliability: Reliability,
    /// Fanout (writers only) - readers attach their queue to it.
    pub fanout: Option<Arc<TopicFanout>>,
    /// Queue (readers only).
    pub queue: Option<Arc<SampleQueue>>,
    /// Callback binding this reader to a writer's fanout (readers only).
    pub bind_callback: Option<Box<dyn Fn(Arc<TopicFanout>) + Send + Sync>>,
}

/// Check QoS compatibility between writer and reader.
///
/// Per DDS: reliable writer -> any reader; best-effort writer only binds a
/// best-effort reader.
fn qos_compatible(writer_reliability: Reliability, reader_reliability: Reliability) -> bool {
    match (writer_reliability, reader_reliability) {
        (Reliability::Reliable, _) => true,
        (Reliability::BestEffort, Reliability::BestEffort) => true,
        (Reliability::BestEffort, Reliability::Reliable) => false,
    }
}

/// Token returned when registering an endpoint.
///
/// When dropped, automatically unregisters the endpoint from the domain.
/// This ensures cleanup even on panic/early return.
pub struct BindToken {
    domain: Weak<DomainState>,
    key: MatchKey,
    id: EndpointId,
}

impl BindToken {
    fn new(domain: &Arc<DomainState>, key: MatchKey, id: EndpointId) -> Self {
        Self {
            domain: Arc::downgrade(domain),
            key,
            id,
        }
    }
}

impl Drop for BindToken {
    fn drop(&mut self) {
        if let Some(domain) = self.domain.upgrade() {
            domain.unregister(&self.key, self.id);
        }
    }
}

/// Domain state - holds all endpoints for a single domain.
pub struct DomainState {
    pub domain_id: DomainId,
    endpoints: RwLock<HashMap<MatchKey, Vec<LocalEndpointEntry>>>,
}

impl DomainState {
    pub fn new(domain_id: DomainId) -> Self {
        Self {
            domain_id,
            endpoints: RwLock::new(HashMap::new()),
        }
    }

    /// Register a writer endpoint.
    ///
    /// Returns a BindToken that unregisters on drop. Existing QoS-compatible
    /// readers are bound to the writer's fanout immediately.
    pub fn register_writer(
        self: &Arc<Self>,
        key: MatchKey,
        id: EndpointId,
        fanout: Arc<TopicFanout>,
        reliability: Reliability,
    ) -> BindToken {
        let mut endpoints = self.endpoints.write().unwrap_or_else(|e| e.into_inner());

        let entries = endpoints.entry(key.clone()).or_default();

        for existing in entries.iter() {
            if existing.kind == EndpointKind::Reader {
                if !qos_compatible(reliability, existing.reliability) {
                    log::debug!(
                        "[DomainRegistry] skipping bind: writer {:?} incompatible with reader {:?}",
                        reliability,
                        existing.reliability
                    );
                    continue;
                }
                if let Some(ref callback) = existing.bind_callback {
                    log::debug!(
                        "[DomainRegistry] auto-binding reader {} to new writer {}",
                        existing.id,
                        id
                    );
                    callback(fanout.clone());
                }
            }
        }

        entries.push(LocalEndpointEntry {
            id,
            kind: EndpointKind::Writer,
            reliability,
            fanout: Some(fanout),
            queue: None,
            bind_callback: None,
        });

        BindToken::new(self, key, id)
    }

    /// Register a reader endpoint.
    ///
    /// Returns a BindToken that unregisters on drop. The bind callback is
    /// invoked once per existing QoS-compatible writer and again for every
    /// compatible writer registered later.
    pub fn register_reader<F>(
        self: &Arc<Self>,
        key: MatchKey,
        id: EndpointId,
        queue: Arc<SampleQueue>,
        reliability: Reliability,
        bind_callback: F,
    ) -> BindToken
    where
        F: Fn(Arc<TopicFanout>) + Send + Sync + 'static,
    {
        let mut endpoints = self.endpoints.write().unwrap_or_else(|e| e.into_inner());

        let entries = endpoints.entry(key.clone()).or_default();

        for existing in entries.iter() {
            if existing.kind == EndpointKind::Writer {
                if !qos_compatible(existing.reliability, reliability) {
                    log::debug!(
                        "[DomainRegistry] skipping bind: writer {:?} incompatible with reader {:?}",
                        existing.reliability,
                        reliability
                    );
                    continue;
                }
                if let Some(ref fanout) = existing.fanout {
                    log::debug!(
                        "[DomainRegistry] auto-binding new reader {} to writer {}",
                        id,
                        existing.id
                    );
                    bind_callback(fanout.clone());
                }
            }
        }

        entries.push(LocalEndpointEntry {
            id,
            kind: EndpointKind::Reader,
            reliability,
            fanout: None,
            queue: Some(queue),
            bind_callback: Some(Box::new(bind_callback)),
        });

        BindToken::new(self, key, id)
    }

    /// Unregister an endpoint (called by BindToken::drop).
    fn unregister(&self, key: &MatchKey, id: EndpointId) {
        let mut endpoints = self.endpoints.write().unwrap_or_else(|e| e.into_inner());

        if let Some(entries) = endpoints.get_mut(key) {
            entries.retain(|e| e.id != id);
            if entries.is_empty() {
                endpoints.remove(key);
            }
        }

        log::debug!(
            "[DomainRegistry] unregistered endpoint {} from topic '{}'",
            id,
            key.topic_name
        );
    }

    /// Find all writer fanouts matching a key.
    pub fn find_writers(&self, key: &MatchKey) -> Vec<Arc<TopicFanout>> {
        let endpoints = self.endpoints.read().unwrap_or_else(|e| e.into_inner());

        endpoints
            .get(key)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| e.kind == EndpointKind::Writer)
                    .filter_map(|e| e.fanout.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Find all reader queues matching a key.
    pub fn find_readers(&self, key: &MatchKey) -> Vec<Arc<SampleQueue>> {
        let endpoints = self.endpoints.read().unwrap_or_else(|e| e.into_inner());

        endpoints
            .get(key)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| e.kind == EndpointKind::Reader)
                    .filter_map(|e| e.queue.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Count of endpoints registered in this domain.
    pub fn endpoint_count(&self) -> usize {
        let endpoints = self.endpoints.read().unwrap_or_else(|e| e.into_inner());
        endpoints.values().map(|v| v.len()).sum()
    }

    /// Count of endpoints for a specific key.
    pub fn endpoint_count_for_key(&self, key: &MatchKey) -> usize {
        let endpoints = self.endpoints.read().unwrap_or_else(|e| e.into_inner());
        endpoints.get(key).map(|v| v.len()).unwrap_or(0)
    }
}

impl std::fmt::Debug for DomainState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainState")
            .field("domain_id", &self.domain_id)
            .field("endpoint_count", &self.endpoint_count())
            .finish()
    }
}

/// Global domain registry (singleton).
///
/// Domains are held weakly: a domain lives exactly as long as some
/// participant holds its strong reference.
pub struct DomainRegistry {
    domains: Mutex<HashMap<DomainId, Weak<DomainState>>>,
}

impl DomainRegistry {
    fn new() -> Self {
        Self {
            domains: Mutex::new(HashMap::new()),
        }
    }

    /// Get the global registry instance.
    pub fn global() -> &'static DomainRegistry {
        use std::sync::OnceLock;
        static REGISTRY: OnceLock<DomainRegistry> = OnceLock::new();
        REGISTRY.get_or_init(DomainRegistry::new)
    }

    /// Get or create domain state for a domain ID.
    ///
    /// The caller (Participant) holds the returned Arc to keep the domain
    /// alive.
    pub fn get_or_create(&self, domain_id: DomainId) -> Arc<DomainState> {
        let mut domains = self.domains.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(weak) = domains.get(&domain_id) {
            if let Some(strong) = weak.upgrade() {
                return strong;
            }
        }

        let state = Arc::new(DomainState::new(domain_id));
        domains.insert(domain_id, Arc::downgrade(&state));

        log::info!(
            "[DomainRegistry] created domain state for domain_id={}",
            domain_id
        );

        state
    }

    /// Clean up expired domain references (for testing).
    pub fn cleanup_expired(&self) {
        let mut domains = self.domains.lock().unwrap_or_else(|e| e.into_inner());
        domains.retain(|_, weak| weak.strong_count() > 0);
    }

    /// Count of live domains (for testing).
    pub fn active_domain_count(&self) -> usize {
        let domains = self.domains.lock().unwrap_or_else(|e| e.into_inner());
        domains.values().filter(|w| w.strong_count() > 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fanout::FanoutReader;
    use crate::sample::InstanceState;
    use crossbeam::queue::ArrayQueue;

    #[test]
    fn type_id_from_name() {
        let id1 = TypeId::from_type_name("Temperature");
        let id2 = TypeId::from_type_name("Temperature");
        let id3 = TypeId::from_type_name("Humidity");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
    }

    #[test]
    fn match_key_equality() {
        let key1 = MatchKey::from_names("sensor/temp", "Temperature");
        let key2 = MatchKey::from_names("sensor/temp", "Temperature");
        let key3 = MatchKey::from_names("sensor/temp", "Humidity");
        let key4 = MatchKey::from_names("sensor/humidity", "Temperature");

        assert_eq!(key1, key2);
        assert_ne!(key1, key3); // different type
        assert_ne!(key1, key4); // different topic
    }

    #[test]
    fn register_writer_and_unregister_on_drop() {
        let domain = Arc::new(DomainState::new(0));
        let key = MatchKey::from_names("test/topic", "TestType");
        let fanout = Arc::new(TopicFanout::new());

        let token = domain.register_writer(
            key.clone(),
            next_endpoint_id(),
            fanout,
            Reliability::BestEffort,
        );

        assert_eq!(domain.endpoint_count(), 1);
        assert_eq!(domain.endpoint_count_for_key(&key), 1);
        assert_eq!(domain.find_writers(&key).len(), 1);

        drop(token);
        assert_eq!(domain.endpoint_count(), 0);
    }

    #[test]
    fn register_reader_and_unregister_on_drop() {
        let domain = Arc::new(DomainState::new(0));
        let key = MatchKey::from_names("test/topic", "TestType");
        let queue: Arc<SampleQueue> = Arc::new(ArrayQueue::new(16));

        let token = domain.register_reader(
            key.clone(),
            next_endpoint_id(),
            queue,
            Reliability::BestEffort,
            |_fanout| {
                // no writers yet, callback not expected
            },
        );

        assert_eq!(domain.endpoint_count_for_key(&key), 1);
        assert!(domain.find_writers(&key).is_empty());
        assert_eq!(domain.find_readers(&key).len(), 1);

        drop(token);
        assert_eq!(domain.endpoint_count(), 0);
    }

    #[test]
    fn auto_bind_writer_first() {
        use std::sync::atomic::AtomicBool;

        let domain = Arc::new(DomainState::new(0));
        let key = MatchKey::from_names("test/topic", "TestType");

        let fanout = Arc::new(TopicFanout::new());
        let _writer_token = domain.register_writer(
            key.clone(),
            next_endpoint_id(),
            fanout,
            Reliability::Reliable,
        );

        let bound = Arc::new(AtomicBool::new(false));
        let bound_clone = bound.clone();
        let queue: Arc<SampleQueue> = Arc::new(ArrayQueue::new(16));

        let _reader_token = domain.register_reader(
            key,
            next_endpoint_id(),
            queue,
            Reliability::BestEffort,
            move |_| {
                bound_clone.store(true, Ordering::SeqCst);
            },
        );

        assert!(
            bound.load(Ordering::SeqCst),
            "reader should auto-bind to existing writer"
        );
    }

    #[test]
    fn auto_bind_reader_first() {
        use std::sync::atomic::AtomicBool;

        let domain = Arc::new(DomainState::new(0));
        let key = MatchKey::from_names("test/topic", "TestType");

        let bound = Arc::new(AtomicBool::new(false));
        let bound_clone = bound.clone();
        let queue: Arc<SampleQueue> = Arc::new(ArrayQueue::new(16));

        let _reader_token = domain.register_reader(
            key.clone(),
            next_endpoint_id(),
            queue,
            Reliability::BestEffort,
            move |_| {
                bound_clone.store(true, Ordering::SeqCst);
            },
        );

        assert!(!bound.load(Ordering::SeqCst), "no writer yet");

        let fanout = Arc::new(TopicFanout::new());
        let _writer_token = domain.register_writer(
            key,
            next_endpoint_id(),
            fanout,
            Reliability::BestEffort,
        );

        assert!(
            bound.load(Ordering::SeqCst),
            "reader should auto-bind when writer appears"
        );
    }

    #[test]
    fn best_effort_writer_never_binds_reliable_reader() {
        use std::sync::atomic::AtomicBool;

        let domain = Arc::new(DomainState::new(0));
        let key = MatchKey::from_names("test/topic", "TestType");

        let fanout = Arc::new(TopicFanout::new());
        let _writer_token = domain.register_writer(
            key.clone(),
            next_endpoint_id(),
            fanout,
            Reliability::BestEffort,
        );

        let bound = Arc::new(AtomicBool::new(false));
        let bound_clone = bound.clone();
        let queue: Arc<SampleQueue> = Arc::new(ArrayQueue::new(16));

        let _reader_token = domain.register_reader(
            key,
            next_endpoint_id(),
            queue,
            Reliability::Reliable,
            move |_| {
                bound_clone.store(true, Ordering::SeqCst);
            },
        );

        assert!(
            !bound.load(Ordering::SeqCst),
            "reliable reader must not bind a best-effort writer"
        );
    }

    #[test]
    fn multiple_writers_same_topic() {
        let domain = Arc::new(DomainState::new(0));
        let key = MatchKey::from_names("test/topic", "TestType");

        let _t1 = domain.register_writer(
            key.clone(),
            next_endpoint_id(),
            Arc::new(TopicFanout::new()),
            Reliability::BestEffort,
        );
        let _t2 = domain.register_writer(
            key.clone(),
            next_endpoint_id(),
            Arc::new(TopicFanout::new()),
            Reliability::Reliable,
        );

        assert_eq!(domain.endpoint_count_for_key(&key), 2);
        assert_eq!(domain.find_writers(&key).len(), 2);
    }

    #[test]
    fn registry_get_or_create_is_shared() {
        let registry = DomainRegistry::global();

        let domain1 = registry.get_or_create(42);
        let domain2 = registry.get_or_create(42);

        assert!(Arc::ptr_eq(&domain1, &domain2));
        assert_eq!(domain1.domain_id, 42);
    }

    #[test]
    fn registry_cleanup_drops_dead_domains() {
        // Local registry for an isolated test
        let registry = DomainRegistry::new();

        {
            let _domain = registry.get_or_create(99);
            assert_eq!(registry.active_domain_count(), 1);
        }

        registry.cleanup_expired();
        assert_eq!(registry.active_domain_count(), 0);
    }

    /// End-to-end intra-process flow: writer registered, reader auto-binds,
    /// data pushed through the fanout reaches the reader queue.
    #[test]
    fn intra_process_data_flow() {
        let domain = Arc::new(DomainState::new(7));
        let key = MatchKey::from_names("sensor/temp", "Temperature");

        let fanout = Arc::new(TopicFanout::new());
        let _writer_token = domain.register_writer(
            key.clone(),
            next_endpoint_id(),
            fanout.clone(),
            Reliability::Reliable,
        );

        let queue: Arc<SampleQueue> = Arc::new(ArrayQueue::new(16));
        let queue_for_callback = queue.clone();
        let _reader_token = domain.register_reader(
            key,
            next_endpoint_id(),
            queue.clone(),
            Reliability::BestEffort,
            move |writer_fanout| {
                writer_fanout.add_reader(FanoutReader::new(queue_for_callback.clone()));
            },
        );

        assert_eq!(fanout.reader_count(), 1);

        let payload: Arc<[u8]> = Arc::from(b"intra-process".to_vec());
        fanout.push(crate::fanout::SampleEnvelope {
            seq: 1,
            state: InstanceState::Alive,
            payload,
        });

        let received = queue.pop().expect("reader should receive data");
        assert_eq!(received.seq, 1);
        assert_eq!(&received.payload[..], b"intra-process");
    }
}
