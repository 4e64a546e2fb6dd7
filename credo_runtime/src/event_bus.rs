//! Change notification bus.
//!
//! Synchronous, in-process publish/subscribe. `publish` returns only
//! after every matching subscriber has run, in registration order. A
//! panicking subscriber is logged and skipped; the remaining
//! subscribers still run and the publisher never sees the panic.

use std::cell::{Cell, RefCell};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use tracing::{debug, warn};

use credo_kernel::events::{ChangeEvent, EventKind};

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Rc<dyn Fn(&ChangeEvent)>;

struct Subscriber {
    id: SubscriptionId,
    filter: Option<EventKind>,
    handler: Handler,
}

#[derive(Default)]
pub struct EventBus {
    subscribers: RefCell<Vec<Subscriber>>,
    next_id: Cell<u64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive every event.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&ChangeEvent) + 'static,
    {
        self.register(None, Rc::new(handler))
    }

    /// Receive only events of `kind`.
    pub fn subscribe_to<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&ChangeEvent) + 'static,
    {
        self.register(Some(kind), Rc::new(handler))
    }

    /// Returns false when `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = self.subscribers.borrow_mut();
        let before = subs.len();
        subs.retain(|s| s.id != id);
        subs.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Deliver `event` to every matching subscriber. Handlers may
    /// subscribe or unsubscribe while running; changes apply from the
    /// next publish.
    pub fn publish(&self, event: &ChangeEvent) {
        let kind = event.kind();
        let targets: Vec<(SubscriptionId, Handler)> = self
            .subscribers
            .borrow()
            .iter()
            .filter(|s| s.filter.map_or(true, |k| k == kind))
            .map(|s| (s.id, Rc::clone(&s.handler)))
            .collect();

        debug!(event = event.name(), subscribers = targets.len(), "publish");

        for (id, handler) in targets {
            let outcome = catch_unwind(AssertUnwindSafe(|| handler(event)));
            if let Err(payload) = outcome {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "non-string panic payload".to_string());
                warn!(
                    event = event.name(),
                    subscriber = id.0,
                    panic = %message,
                    "subscriber panicked, continuing"
                );
            }
        }
    }

    fn register(&self, filter: Option<EventKind>, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscribers.borrow_mut().push(Subscriber {
            id,
            filter,
            handler,
        });
        id
    }
}
