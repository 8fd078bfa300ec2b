//! Listener registry with synchronous delivery

use std::fmt;

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Ordered set of listeners for values of type `T`.
///
/// Listeners are called in registration order.
pub struct Listeners<T: ?Sized> {
    next_id: u64,
    entries: Vec<(SubscriptionId, Box<dyn FnMut(&T)>)>,
}

impl<T: ?Sized> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

impl<T: ?Sized> Listeners<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    pub fn add(&mut self, listener: impl FnMut(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the id was not registered (already removed).
    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub fn notify(&mut self, value: &T) {
        for (_, listener) in self.entries.iter_mut() {
            listener(value);
        }
    }

    /// Calls only the listener registered under `id`.
    pub fn notify_one(&mut self, id: SubscriptionId, value: &T) {
        if let Some((_, listener)) = self.entries.iter_mut().find(|(entry_id, _)| *entry_id == id) {
            listener(value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_notify_in_registration_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut listeners: Listeners<i32> = Listeners::new();

        let s1 = Rc::clone(&seen);
        listeners.add(move |v| s1.borrow_mut().push(("first", *v)));
        let s2 = Rc::clone(&seen);
        listeners.add(move |v| s2.borrow_mut().push(("second", *v)));

        listeners.notify(&7);
        assert_eq!(*seen.borrow(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn test_remove_stops_delivery() {
        let count = Rc::new(RefCell::new(0));
        let mut listeners: Listeners<i32> = Listeners::new();
        let c = Rc::clone(&count);
        let id = listeners.add(move |_| *c.borrow_mut() += 1);

        listeners.notify(&1);
        assert!(listeners.remove(id));
        assert!(!listeners.remove(id));
        listeners.notify(&2);

        assert_eq!(*count.borrow(), 1);
        assert!(listeners.is_empty());
    }
}
