//! Per-node value store

use serde::{Serialize, Serializer};
use tracing::instrument;

use crate::domain::observer::{Listeners, SubscriptionId};
use crate::domain::value::NodeValue;

/// Holds a single node's value and the listeners watching it.
///
/// The store only notifies. Propagation to the owning node's parent is done by
/// [`TreeArena`](crate::domain::TreeArena), which is the only writer.
#[derive(Debug, Default)]
pub struct ValueStore {
    value: NodeValue,
    listeners: Listeners<NodeValue>,
}

impl ValueStore {
    pub fn new(value: NodeValue) -> Self {
        Self {
            value,
            listeners: Listeners::new(),
        }
    }

    pub fn get(&self) -> NodeValue {
        self.value
    }

    /// Replace the value and notify every listener, even if nothing changed.
    #[instrument(level = "trace", skip(self))]
    pub fn replace(&mut self, value: NodeValue) {
        self.value = value;
        self.listeners.notify(&self.value);
    }

    /// Register `listener`; it is called immediately with the current value.
    pub fn subscribe(&mut self, listener: impl FnMut(&NodeValue) + 'static) -> SubscriptionId {
        let id = self.listeners.add(listener);
        self.listeners.notify_one(id, &self.value);
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

// serialized as the plain value, never the wrapper
impl Serialize for ValueStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}
