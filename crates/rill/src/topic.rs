// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Topic - a named data channel with an associated type.

use std::sync::Arc;

use crate::registry::MatchKey;
use crate::{DdsType, Participant};

/// A typed topic: binds a topic name to a data type `T` and to the
/// participant that created it.
pub struct Topic<T: DdsType> {
    pub(crate) name: String,
    pub(crate) participant: Arc<Participant>,
    _phantom: core::marker::PhantomData<T>,
}

impl<T: DdsType> Topic<T> {
    pub(crate) fn new(name: String, participant: Arc<Participant>) -> Self {
        Self {
            name,
            participant,
            _phantom: core::marker::PhantomData,
        }
    }

    /// Topic name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn match_key(&self) -> MatchKey {
        MatchKey::from_names(&self.name, T::type_name())
    }
}
