//! Typed publish/subscribe event bus connecting independent panels.
//!
//! Delivery is synchronous, in-process fan-out to all current subscribers
//! of the exact event kind, in subscription order. The bus holds no
//! history: a subscriber attached after an emit never sees that event.
//!
//! A [`Subscription`] unsubscribes on drop, so the subscribe/unsubscribe
//! pairing every component owes the bus is enforced rather than left as a
//! convention.

use crate::error::PanelError;
use crate::services::panel_events::{BusEvent, EventKind, PanelEvent};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

/// Subscriber callback. A handler that returns `Err` or panics is logged
/// and isolated; it never prevents delivery to subsequent handlers.
pub type Handler = dyn Fn(&BusEvent) -> Result<(), PanelError> + Send + Sync;

struct Registration {
    id: u64,
    handler: Arc<Handler>,
}

#[derive(Default)]
struct BusInner {
    next_id: u64,
    subscribers: HashMap<EventKind, Vec<Registration>>,
}

/// The panel event bus. Cheap to clone; clones share the subscriber table.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<BusInner>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit an event to all current subscribers of its kind.
    ///
    /// The emitter assigns the wall-clock timestamp; no ordering is
    /// guaranteed across independent emit calls. The delivery list is
    /// snapshotted up front, so handlers may re-enter the bus (emit,
    /// subscribe, unsubscribe) without deadlocking.
    pub fn emit(&self, source: impl Into<String>, payload: PanelEvent) {
        let event = BusEvent {
            source: source.into(),
            timestamp_ms: Utc::now().timestamp_millis(),
            payload,
        };
        let kind = event.payload.kind();

        let handlers: Vec<Arc<Handler>> = {
            let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            inner
                .subscribers
                .get(&kind)
                .map(|regs| regs.iter().map(|r| r.handler.clone()).collect())
                .unwrap_or_default()
        };

        for handler in handlers {
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                handler(&event)
            }));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(err)) => log::warn!("handler for {} failed: {}", kind, err),
                Err(_) => log::error!("handler for {} panicked", kind),
            }
        }
    }

    /// Subscribe to one exact event kind. No wildcards.
    ///
    /// The returned [`Subscription`] must live as long as the subscriber
    /// wants deliveries; dropping it unsubscribes.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn on<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&BusEvent) -> Result<(), PanelError> + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.entry(kind).or_default().push(Registration {
            id,
            handler: Arc::new(handler),
        });
        Subscription {
            kind,
            id,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Number of live subscriptions for a kind.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.subscribers.get(&kind).map_or(0, |regs| regs.len())
    }

    fn remove(inner: &Mutex<BusInner>, kind: EventKind, id: u64) {
        let mut inner = inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(regs) = inner.subscribers.get_mut(&kind) {
            regs.retain(|r| r.id != id);
            if regs.is_empty() {
                inner.subscribers.remove(&kind);
            }
        }
    }
}

/// Handle for one subscription. Unsubscribes when dropped; calling
/// [`Subscription::unsubscribe`] earlier is idempotent and safe during
/// the owning component's teardown.
pub struct Subscription {
    kind: EventKind,
    id: u64,
    bus: Weak<Mutex<BusInner>>,
}

impl Subscription {
    /// Remove this subscription from the bus. Idempotent; a no-op when
    /// the bus itself is already gone.
    pub fn unsubscribe(&mut self) {
        if let Some(inner) = self.bus.upgrade() {
            EventBus::remove(&inner, self.kind, self.id);
        }
        self.bus = Weak::new();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::panel_events::IssueDeletePayload;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn delete_event() -> PanelEvent {
        PanelEvent::IssueDelete(IssueDeletePayload {
            owner: "acme".to_string(),
            repo: "panels".to_string(),
            number: 1,
        })
    }

    #[test]
    fn test_emit_reaches_subscriber() {
        let bus = EventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = seen.clone();

        let _sub = bus.on(EventKind::IssueDelete, move |event| {
            assert_eq!(event.source, "test");
            seen_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        bus.emit("test", delete_event());
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_delivery_in_subscription_order() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let order_a = order.clone();
        let _a = bus.on(EventKind::IssueDeselected, move |_| {
            order_a.lock().unwrap().push("a");
            Ok(())
        });
        let order_b = order.clone();
        let _b = bus.on(EventKind::IssueDeselected, move |_| {
            order_b.lock().unwrap().push("b");
            Ok(())
        });

        bus.emit("test", PanelEvent::IssueDeselected);
        assert_eq!(*order.lock().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_failing_handler_does_not_block_later_handlers() {
        let bus = EventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let _bad = bus.on(EventKind::IssueDeselected, |_| {
            Err(PanelError::internal("boom"))
        });
        let seen_clone = seen.clone();
        let _good = bus.on(EventKind::IssueDeselected, move |_| {
            seen_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        bus.emit("test", PanelEvent::IssueDeselected);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panicking_handler_does_not_block_later_handlers() {
        let bus = EventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let _bad = bus.on(EventKind::IssueDeselected, |_| panic!("handler bug"));
        let seen_clone = seen.clone();
        let _good = bus.on(EventKind::IssueDeselected, move |_| {
            seen_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        bus.emit("test", PanelEvent::IssueDeselected);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_no_delivery_to_other_kinds() {
        let bus = EventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = seen.clone();

        let _sub = bus.on(EventKind::IssueSelected, move |_| {
            seen_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        bus.emit("test", PanelEvent::IssueDeselected);
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_no_replay_for_late_subscriber() {
        let bus = EventBus::new();
        bus.emit("test", PanelEvent::IssueDeselected);

        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = seen.clone();
        let _sub = bus.on(EventKind::IssueDeselected, move |_| {
            seen_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = EventBus::new();
        {
            let _sub = bus.on(EventKind::IssueDeselected, |_| Ok(()));
            assert_eq!(bus.subscriber_count(EventKind::IssueDeselected), 1);
        }
        assert_eq!(bus.subscriber_count(EventKind::IssueDeselected), 0);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let bus = EventBus::new();
        let mut sub = bus.on(EventKind::IssueDeselected, |_| Ok(()));
        sub.unsubscribe();
        sub.unsubscribe();
        assert_eq!(bus.subscriber_count(EventKind::IssueDeselected), 0);
    }

    #[test]
    fn test_handler_may_emit_reentrantly() {
        let bus = EventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let seen_clone = seen.clone();
        let _inner = bus.on(EventKind::IssueDelete, move |_| {
            seen_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let bus_clone = bus.clone();
        let _outer = bus.on(EventKind::IssueDeselected, move |_| {
            bus_clone.emit("reentrant", delete_event());
            Ok(())
        });

        bus.emit("test", PanelEvent::IssueDeselected);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
