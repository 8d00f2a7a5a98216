//! Event subscription trait.

use std::fmt;
use std::sync::Arc;

use crate::events::{EventKind, PollEvent};

/// Callback invoked for every delivered event of one kind.
///
/// Handlers run to completion on the delivering thread.
pub type EventHandler = Arc<dyn Fn(&PollEvent) + Send + Sync>;

/// A source of live poll events.
pub trait EventSource: Send + Sync {
    /// Register `handler` for events of `kind`.
    ///
    /// The handler stays registered until the returned [`Subscription`] is
    /// unsubscribed or dropped.
    fn subscribe(&self, kind: EventKind, handler: EventHandler) -> Subscription;
}

impl<T> EventSource for Arc<T>
where
    T: EventSource + ?Sized,
{
    fn subscribe(&self, kind: EventKind, handler: EventHandler) -> Subscription {
        (**self).subscribe(kind, handler)
    }
}

/// Guard for one registered handler.
///
/// Releasing is idempotent: the release action runs at most once, whether
/// through [`Subscription::unsubscribe`] or on drop.
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Create a subscription that runs `release` when it ends.
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A subscription with nothing to release.
    pub fn noop() -> Self {
        Self { release: None }
    }

    /// Returns true until the subscription has been released.
    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    /// Release the handler. Calling this again does nothing.
    pub fn unsubscribe(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
