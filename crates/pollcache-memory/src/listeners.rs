//! Listener registry backing the in-memory event source.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::trace;

use pollcache_core::{EventHandler, EventKind, PollEvent, Subscription};

#[derive(Default)]
struct Listeners {
    next_token: u64,
    entries: Vec<Listener>,
}

struct Listener {
    token: u64,
    kind: EventKind,
    handler: EventHandler,
}

/// Registered handlers, keyed by a token per registration.
#[derive(Clone, Default)]
pub(crate) struct ListenerRegistry {
    inner: Arc<Mutex<Listeners>>,
}

fn lock(listeners: &Mutex<Listeners>) -> MutexGuard<'_, Listeners> {
    listeners.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ListenerRegistry {
    pub(crate) fn register(&self, kind: EventKind, handler: EventHandler) -> Subscription {
        let token = {
            let mut listeners = lock(&self.inner);
            let token = listeners.next_token;
            listeners.next_token += 1;
            listeners.entries.push(Listener {
                token,
                kind,
                handler,
            });
            token
        };
        trace!(event = %kind, token, "Registered listener");

        let registry = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                lock(&registry).entries.retain(|l| l.token != token);
                trace!(event = %kind, token, "Released listener");
            }
        })
    }

    /// Deliver `event` to every listener for its kind, in registration order.
    ///
    /// Handlers run after the registry lock is released, so they may
    /// register or release listeners themselves. A listener released by an
    /// earlier handler is skipped. Returns how many handlers ran.
    pub(crate) fn dispatch(&self, event: &PollEvent) -> usize {
        let targets: Vec<(u64, EventHandler)> = lock(&self.inner)
            .entries
            .iter()
            .filter(|l| l.kind == event.kind)
            .map(|l| (l.token, l.handler.clone()))
            .collect();

        let mut delivered = 0;
        for (token, handler) in targets {
            if !self.is_registered(token) {
                trace!(event = %event.kind, token, "Skipping released listener");
                continue;
            }
            handler(event);
            delivered += 1;
        }
        delivered
    }

    fn is_registered(&self, token: u64) -> bool {
        lock(&self.inner).entries.iter().any(|l| l.token == token)
    }

    pub(crate) fn len(&self) -> usize {
        lock(&self.inner).entries.len()
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}
