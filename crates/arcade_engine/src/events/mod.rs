//! Observer lists for engine notifications
//!
//! Key principles:
//! - Multiple subscribers per topic
//! - Same-thread, synchronous delivery in subscription order
//! - Subscribing or unsubscribing from inside a handler is allowed; new
//!   handlers join from the next publish, removed ones stop at once
//!
//! A [`Topic`] is a cheap handle: clones share one subscriber list, so a
//! component can hand out its topic before the engine has wired it up.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Identifies a subscription so it can be removed later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<E> = Rc<RefCell<dyn FnMut(&E)>>;

struct TopicInner<E> {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Handler<E>)>,
}

/// Typed event topic with an ordered list of subscribers
pub struct Topic<E> {
    inner: Rc<RefCell<TopicInner<E>>>,
}

impl<E> Topic<E> {
    /// Create a topic with no subscribers
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(TopicInner {
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Register a handler; handlers run in the order they subscribed
    pub fn subscribe(&self, handler: impl FnMut(&E) + 'static) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        let handler: Handler<E> = Rc::new(RefCell::new(handler));
        inner.subscribers.push((id, handler));
        id
    }

    /// Remove a handler. Returns false if the id was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|(sid, _)| *sid != id);
        inner.subscribers.len() != before
    }

    /// Deliver an event to every subscriber
    ///
    /// Dispatch walks a snapshot of the list taken on entry. A handler
    /// removed mid-dispatch is skipped if it has not run yet. A handler that
    /// publishes to its own topic is not re-entered by the nested publish.
    pub fn publish(&self, event: &E) {
        let snapshot = self.inner.borrow().subscribers.clone();
        for (id, handler) in snapshot {
            if !self.is_subscribed(id) {
                continue;
            }
            if let Ok(mut handler) = handler.try_borrow_mut() {
                (&mut *handler)(event);
            }
        }
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.inner.borrow().subscribers.iter().any(|(sid, _)| *sid == id)
    }
}

impl<E> Clone for Topic<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> Default for Topic<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Topic<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Topic")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
