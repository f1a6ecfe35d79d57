//! Event emitters with owned subscription handles.
//!
//! Widgets expose their outputs (`filter_changed`, `page_changed`,
//! `row_activated`) as [`EventEmitter`]s. Subscribing returns a
//! [`Subscription`]; dropping it releases the listener.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, Weak};

type Listener<T> = Box<dyn FnMut(&T) + Send>;

struct EmitterInner<T> {
    next_id: u64,
    listeners: Vec<(u64, Listener<T>)>,
    /// Nesting depth of `emit` calls currently running.
    emitting: usize,
    /// Listeners released while they were taken out for an emission.
    released: HashSet<u64>,
}

/// A multicast event source.
///
/// Every listener is called once per [`emit`](Self::emit), in subscription
/// order. Cloning an emitter yields another handle to the same listener list.
///
/// Listeners may subscribe or release subscriptions from inside a callback.
/// A listener added during an emission first hears the next one; a listener
/// released during an emission still hears the one in progress.
pub struct EventEmitter<T> {
    inner: Arc<Mutex<EmitterInner<T>>>,
}

impl<T: 'static> EventEmitter<T> {
    /// Create an emitter with no listeners.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(EmitterInner {
                next_id: 0,
                listeners: Vec::new(),
                emitting: 0,
                released: HashSet::new(),
            })),
        }
    }

    /// Register a listener.
    ///
    /// The listener stays registered until the returned [`Subscription`] is
    /// dropped or [`unsubscribed`](Subscription::unsubscribe).
    pub fn subscribe(&self, listener: impl FnMut(&T) + Send + 'static) -> Subscription {
        let Ok(mut guard) = self.inner.lock() else {
            return Subscription::detached();
        };
        let id = guard.next_id;
        guard.next_id += 1;
        guard.listeners.push((id, Box::new(listener)));

        let weak: Weak<Mutex<EmitterInner<T>>> = Arc::downgrade(&self.inner);
        Subscription {
            release: Some(Box::new(move || {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let removed = match inner.lock() {
                    Ok(mut guard) => {
                        match guard.listeners.iter().position(|(i, _)| *i == id) {
                            Some(pos) => Some(guard.listeners.remove(pos)),
                            None => {
                                if guard.emitting > 0 {
                                    guard.released.insert(id);
                                }
                                None
                            }
                        }
                    }
                    Err(_) => None,
                };
                // The listener may own subscriptions to this emitter.
                drop(removed);
            })),
        }
    }

    /// Deliver `value` to every listener.
    pub fn emit(&self, value: &T) {
        let mut listeners = match self.inner.lock() {
            Ok(mut guard) => {
                guard.emitting += 1;
                std::mem::take(&mut guard.listeners)
            }
            Err(_) => return,
        };

        for (_, listener) in listeners.iter_mut() {
            listener(value);
        }

        let Ok(mut guard) = self.inner.lock() else {
            return;
        };
        guard.emitting -= 1;

        // Only ids of listeners this call took out are settled here; the rest
        // belong to an enclosing emission.
        let (dropped, mut kept): (Vec<_>, Vec<_>) = listeners
            .into_iter()
            .partition(|(id, _)| guard.released.contains(id));
        for (id, _) in &dropped {
            guard.released.remove(id);
        }
        kept.append(&mut guard.listeners);
        guard.listeners = kept;
        if guard.emitting == 0 {
            guard.released.clear();
        }
        drop(guard);
        drop(dropped);
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.lock().map(|g| g.listeners.len()).unwrap_or(0)
    }
}

impl<T: 'static> Default for EventEmitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for EventEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for EventEmitter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.inner.lock().map(|g| g.listeners.len()).unwrap_or(0);
        f.debug_struct("EventEmitter")
            .field("listeners", &count)
            .finish()
    }
}

/// An owned listener registration.
///
/// Dropping the handle releases the listener. Handles do not keep the
/// emitter alive.
#[must_use = "dropping a Subscription immediately releases the listener"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    fn detached() -> Self {
        Self { release: None }
    }

    /// Release the listener now.
    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}
