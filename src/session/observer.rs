//! Publish/subscribe for reader state changes

use super::state::ReaderState;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

type Callback = Rc<dyn Fn(&ReaderState)>;

/// Handle returned by [`Observers::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: SmallVec<[(Subscription, Callback); 4]>,
}

/// Observer list shared between a session and its subscribers.
///
/// Cloning yields another handle to the same list, so an observer can hold
/// one and unsubscribe itself or others while being notified.
#[derive(Clone, Default)]
pub struct Observers {
    registry: Rc<RefCell<Registry>>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback`; observers run in registration order
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ReaderState) + 'static,
    {
        let callback: Callback = Rc::new(callback);
        let mut registry = self.registry.borrow_mut();
        let subscription = Subscription(registry.next_id);
        registry.next_id += 1;
        registry.entries.push((subscription, callback));
        subscription
    }

    /// Remove an observer. Returns false if it was not subscribed.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut registry = self.registry.borrow_mut();
        let before = registry.entries.len();
        registry.entries.retain(|(id, _)| *id != subscription);
        registry.entries.len() != before
    }

    /// Deliver `state` to every observer registered when the call starts.
    ///
    /// Subscribing or unsubscribing from inside a callback takes effect on
    /// the next notification.
    pub fn notify(&self, state: &ReaderState) {
        let snapshot: SmallVec<[Callback; 4]> = self
            .registry
            .borrow()
            .entries
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        for callback in snapshot {
            callback(state);
        }
    }

    pub fn clear(&self) {
        self.registry.borrow_mut().entries.clear();
    }

    pub fn len(&self) -> usize {
        self.registry.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers").field("len", &self.len()).finish()
    }
}
