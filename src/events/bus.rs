//! # Named-channel event bus.
//!
//! [`EventBus`] keeps an ordered list of [`Listener`]s per channel name and
//! dispatches events to them in registration order.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                 Channel "core/object/modify":
//!   app code ─┐                        [id 1] BindingListener(rule A)
//!   storages ─┼── dispatch(ch, ev) ──► [id 2] BindingListener(rule B)
//!   actions  ─┘                        [id 7] custom Listener
//! ```
//!
//! ## Rules
//! - **Identity removal**: `remove_listener(channel, id)` removes exactly the
//!   subscription `add_listener` returned; removing twice is a no-op.
//! - **Snapshot dispatch**: listeners are copied out of the lock before the first
//!   one runs, so listeners may publish or (un)subscribe without deadlocking.
//! - **Fail loudly**: the first listener error aborts the dispatch and is returned.
//! - **Panic isolation**: a panicking listener becomes `DispatchError::ListenerPanicked`.
//! - **No persistence**: events published on a channel without listeners are dropped.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::error::DispatchError;

use super::{GenericEvent, Listener};

/// Handle identifying one subscription on the bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

type Slot = (ListenerId, Arc<dyn Listener>);

struct Inner {
    channels: RwLock<HashMap<String, Vec<Slot>>>,
    next_id: AtomicU64,
}

/// In-process publish/subscribe bus keyed by channel name.
///
/// ### Properties
/// - **Ordered**: listeners of a channel run in the order they were added.
/// - **Sequential**: one listener at a time; the dispatch awaits each.
/// - **Cloneable**: cheap to clone (internally holds an `Arc`).
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<Inner>,
}

impl EventBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                channels: RwLock::new(HashMap::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Appends a listener to `channel` and returns its handle.
    pub async fn add_listener(&self, channel: &str, listener: Arc<dyn Listener>) -> ListenerId {
        let id = ListenerId(self.inner.next_id.fetch_add(1, AtomicOrdering::Relaxed));
        let mut channels = self.inner.channels.write().await;
        channels
            .entry(channel.to_string())
            .or_default()
            .push((id, listener));
        debug!(channel, %id, "listener added");
        id
    }

    /// Removes the subscription `id` from `channel`.
    ///
    /// Returns `false` when there was nothing to remove.
    pub async fn remove_listener(&self, channel: &str, id: ListenerId) -> bool {
        let mut channels = self.inner.channels.write().await;
        let Some(slots) = channels.get_mut(channel) else {
            return false;
        };

        let before = slots.len();
        slots.retain(|(slot_id, _)| *slot_id != id);
        let removed = slots.len() != before;
        if slots.is_empty() {
            channels.remove(channel);
        }
        if removed {
            debug!(channel, %id, "listener removed");
        }
        removed
    }

    /// Dispatches `event` to every listener of `channel`, in order.
    ///
    /// Stops at the first error and returns it; later listeners do not run.
    pub async fn dispatch(&self, channel: &str, event: &GenericEvent) -> Result<(), DispatchError> {
        let listeners: Vec<Slot> = {
            let channels = self.inner.channels.read().await;
            match channels.get(channel) {
                Some(slots) => slots.clone(),
                None => {
                    trace!(channel, seq = event.seq, "no listeners");
                    return Ok(());
                }
            }
        };

        trace!(channel, seq = event.seq, listeners = listeners.len(), "dispatching");
        for (_, listener) in listeners {
            let fut = listener.handle(event);
            match std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                Ok(result) => result?,
                Err(panic) => {
                    return Err(DispatchError::ListenerPanicked {
                        channel: channel.to_string(),
                        listener: listener.name().to_string(),
                        reason: panic_reason(panic.as_ref()),
                    });
                }
            }
        }
        Ok(())
    }

    /// Number of listeners attached to `channel`.
    pub async fn listener_count(&self, channel: &str) -> usize {
        self.inner
            .channels
            .read()
            .await
            .get(channel)
            .map_or(0, Vec::len)
    }

    /// True if `channel` has at least one listener.
    pub async fn has_listeners(&self, channel: &str) -> bool {
        self.listener_count(channel).await > 0
    }

    /// Returns sorted list of channels with listeners.
    pub async fn channels(&self) -> Vec<String> {
        let channels = self.inner.channels.read().await;
        let mut names: Vec<String> = channels.keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus").finish_non_exhaustive()
    }
}

fn panic_reason(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Recorder {
        tag: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Listener for Recorder {
        async fn handle(&self, event: &GenericEvent) -> Result<(), DispatchError> {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.tag, event.subject().unwrap_or("-")));
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl Listener for Failing {
        async fn handle(&self, _event: &GenericEvent) -> Result<(), DispatchError> {
            Err(DispatchError::ServiceNotFound {
                service: "nope".into(),
            })
        }
    }

    struct Panicking;

    #[async_trait]
    impl Listener for Panicking {
        async fn handle(&self, _event: &GenericEvent) -> Result<(), DispatchError> {
            panic!("boom");
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    fn recorder(tag: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Arc<dyn Listener> {
        Arc::new(Recorder {
            tag,
            log: Arc::clone(log),
        })
    }

    #[tokio::test]
    async fn test_dispatch_in_registration_order() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.add_listener("ch", recorder("a", &log)).await;
        bus.add_listener("ch", recorder("b", &log)).await;
        bus.add_listener("other", recorder("c", &log)).await;

        bus.dispatch("ch", &GenericEvent::new().with_subject("x"))
            .await
            .unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["a:x", "b:x"]);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let id = bus.add_listener("ch", recorder("a", &log)).await;

        assert!(bus.remove_listener("ch", id).await);
        assert!(!bus.remove_listener("ch", id).await);
        assert!(!bus.has_listeners("ch").await);
        assert!(bus.channels().await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_by_identity_keeps_others() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = bus.add_listener("ch", recorder("a", &log)).await;
        let _b = bus.add_listener("ch", recorder("b", &log)).await;
        assert_ne!(a, _b);

        assert!(!bus.remove_listener("other", a).await);
        assert!(bus.remove_listener("ch", a).await);
        bus.dispatch("ch", &GenericEvent::new()).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["b:-"]);
    }

    #[tokio::test]
    async fn test_error_stops_remaining_listeners() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.add_listener("ch", Arc::new(Failing)).await;
        bus.add_listener("ch", recorder("late", &log)).await;

        let err = bus.dispatch("ch", &GenericEvent::new()).await.unwrap_err();
        assert_eq!(err.as_label(), "dispatch_service_not_found");
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_panic_is_reported() {
        let bus = EventBus::new();
        bus.add_listener("ch", Arc::new(Panicking)).await;

        match bus.dispatch("ch", &GenericEvent::new()).await {
            Err(DispatchError::ListenerPanicked {
                channel,
                listener,
                reason,
            }) => {
                assert_eq!(channel, "ch");
                assert_eq!(listener, "panicking");
                assert_eq!(reason, "boom");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_without_listeners_is_noop() {
        let bus = EventBus::new();
        bus.dispatch("nobody", &GenericEvent::new()).await.unwrap();
        assert_eq!(bus.listener_count("nobody").await, 0);
    }
}
