//! Observer registry for Lazy Query.
//!
//! This module provides [`Signal<E>`], an ordered registry of slots that are
//! invoked with a borrowed event whenever the signal is emitted. Containers
//! use one signal per notification kind.
//!
//! # Semantics
//!
//! - **Ordered**: slots run in registration order.
//! - **Multiset**: the same listener may be connected more than once and is
//!   then invoked once per connection.
//! - **Snapshot dispatch**: `emit` copies the slot list before invoking any
//!   slot. A slot connected during dispatch is not called for the current
//!   event; a slot disconnected during dispatch still receives it.
//! - **Synchronous**: slots run on the emitting thread before `emit` returns.
//!   A panicking slot stops the dispatch; earlier slots have already run.
//!
//! # Example
//!
//! ```
//! use lazyquery_core::Signal;
//!
//! let text_changed = Signal::<String>::new();
//!
//! let conn_id = text_changed.connect(|text| {
//!     println!("Text changed to: {}", text);
//! });
//!
//! text_changed.emit("Hello, World!".to_string());
//! text_changed.disconnect(conn_id);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Returned by [`Signal::connect`]; pass it to [`Signal::disconnect`] to
    /// remove exactly that connection.
    pub struct ConnectionId;
}

/// Identity of a shared listener, used to disconnect by value.
///
/// Two tags are equal when they were taken from clones of the same `Arc`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotTag(usize);

impl SlotTag {
    /// Take the tag of a shared listener.
    pub fn of<T: ?Sized>(listener: &Arc<T>) -> Self {
        Self(Arc::as_ptr(listener) as *const () as usize)
    }
}

type Slot<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Connection<E> {
    slot: Slot<E>,
    tag: Option<SlotTag>,
}

struct Connections<E> {
    slots: SlotMap<ConnectionId, Connection<E>>,
    /// Registration order; `SlotMap` iteration order is not stable across removals.
    order: Vec<ConnectionId>,
}

impl<E> Connections<E> {
    fn insert(&mut self, connection: Connection<E>) -> ConnectionId {
        let id = self.slots.insert(connection);
        self.order.push(id);
        id
    }

    fn remove(&mut self, id: ConnectionId) -> bool {
        if self.slots.remove(id).is_none() {
            return false;
        }
        self.order.retain(|&other| other != id);
        true
    }
}

/// An ordered, multiset registry of slots invoked with `&E` on emission.
///
/// # Type Parameter
///
/// - `E`: The event type. Slots receive it by reference; events are built
///   once per emission and shared by every slot.
///
/// # Related Types
///
/// - [`ConnectionId`] - Returned by [`connect`](Self::connect)
/// - [`SlotTag`] - Identity used by [`disconnect_tagged`](Self::disconnect_tagged)
pub struct Signal<E> {
    connections: Mutex<Connections<E>>,
    /// Whether emission is temporarily suppressed.
    blocked: AtomicBool,
}

impl<E: 'static> Default for Signal<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> Signal<E> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(Connections {
                slots: SlotMap::with_key(),
                order: Vec::new(),
            }),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot later.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Connection {
            slot: Arc::new(slot),
            tag: None,
        })
    }

    /// Connect a slot that belongs to a shared listener identified by `tag`.
    ///
    /// The connection can later be removed by value through
    /// [`disconnect_tagged`](Self::disconnect_tagged).
    pub fn connect_tagged<F>(&self, tag: SlotTag, slot: F) -> ConnectionId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Connection {
            slot: Arc::new(slot),
            tag: Some(tag),
        })
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed, `false` otherwise.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id)
    }

    /// Disconnect the earliest connection registered under `tag`.
    ///
    /// Mirrors removing one occurrence of a value from an ordered list: a
    /// listener registered twice stays connected once.
    pub fn disconnect_tagged(&self, tag: SlotTag) -> bool {
        let mut connections = self.connections.lock();
        let found = connections
            .order
            .iter()
            .copied()
            .find(|&id| connections.slots.get(id).is_some_and(|c| c.tag == Some(tag)));
        match found {
            Some(id) => connections.remove(id),
            None => false,
        }
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        let mut connections = self.connections.lock();
        connections.slots.clear();
        connections.order.clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().order.len()
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, calls to `emit()` do nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking every slot connected at this moment.
    ///
    /// The registry lock is released before the first slot runs, so slots may
    /// connect or disconnect on this signal without deadlocking.
    #[tracing::instrument(skip_all, target = "lazyquery_core::signal", level = "trace")]
    pub fn emit(&self, event: E) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return;
        }

        let snapshot: Vec<Slot<E>> = {
            let connections = self.connections.lock();
            connections
                .order
                .iter()
                .filter_map(|&id| connections.slots.get(id))
                .map(|c| c.slot.clone())
                .collect()
        };
        tracing::trace!(
            target: targets::SIGNAL,
            connection_count = snapshot.len(),
            "emitting signal"
        );

        for slot in snapshot {
            slot(&event);
        }
    }
}

static_assertions::assert_impl_all!(Signal<()>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_signal_connect_emit() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(42);
        signal.emit(100);

        assert_eq!(*received.lock(), vec![42, 100]);
    }

    #[test]
    fn test_signal_disconnect() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        let conn_id = signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(1);
        assert!(signal.disconnect(conn_id));
        assert!(!signal.disconnect(conn_id));
        signal.emit(2);

        assert_eq!(*received.lock(), vec![1]);
    }

    #[test]
    fn test_dispatch_in_registration_order() {
        let signal = Signal::<()>::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let ids: Vec<_> = (0..4)
            .map(|n| {
                let order = order.clone();
                signal.connect(move |_| order.lock().push(n))
            })
            .collect();

        // Freed slotmap keys get reused; order must still follow registration.
        signal.disconnect(ids[1]);
        let order_clone = order.clone();
        signal.connect(move |_| order_clone.lock().push(9));

        signal.emit(());
        assert_eq!(*order.lock(), vec![0, 2, 3, 9]);
    }

    #[test]
    fn test_signal_blocked() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(1);
        signal.set_blocked(true);
        signal.emit(2);
        signal.set_blocked(false);
        signal.emit(3);

        assert_eq!(*received.lock(), vec![1, 3]);
    }

    #[test]
    fn test_duplicate_tagged_connections() {
        let signal = Signal::<()>::new();
        let listener = Arc::new(AtomicUsize::new(0));
        let tag = SlotTag::of(&listener);

        for _ in 0..2 {
            let listener = listener.clone();
            signal.connect_tagged(tag, move |_| {
                listener.fetch_add(1, Ordering::SeqCst);
            });
        }

        signal.emit(());
        assert_eq!(listener.load(Ordering::SeqCst), 2);

        assert!(signal.disconnect_tagged(tag));
        signal.emit(());
        assert_eq!(listener.load(Ordering::SeqCst), 3);

        assert!(signal.disconnect_tagged(tag));
        assert!(!signal.disconnect_tagged(tag));
        signal.emit(());
        assert_eq!(listener.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_tag_identity_follows_arc() {
        let a = Arc::new(1);
        let b = Arc::new(1);
        assert_eq!(SlotTag::of(&a), SlotTag::of(&a.clone()));
        assert_ne!(SlotTag::of(&a), SlotTag::of(&b));
    }

    #[test]
    fn test_snapshot_dispatch_during_mutation() {
        let signal = Arc::new(Signal::<()>::new());
        let late_calls = Arc::new(AtomicUsize::new(0));
        let victim_calls = Arc::new(AtomicUsize::new(0));

        let victim_clone = victim_calls.clone();
        let victim_slot = Arc::new(Mutex::new(None));

        let signal_clone = signal.clone();
        let late_clone = late_calls.clone();
        let victim_slot_clone = victim_slot.clone();
        signal.connect(move |_| {
            // Remove the next slot and add a new one mid-dispatch.
            if let Some(id) = victim_slot_clone.lock().take() {
                signal_clone.disconnect(id);
            }
            let late_clone = late_clone.clone();
            signal_clone.connect(move |_| {
                late_clone.fetch_add(1, Ordering::SeqCst);
            });
        });
        let victim_id = signal.connect(move |_| {
            victim_clone.fetch_add(1, Ordering::SeqCst);
        });
        *victim_slot.lock() = Some(victim_id);

        signal.emit(());

        // The removed slot was in the snapshot; the added one was not.
        assert_eq!(victim_calls.load(Ordering::SeqCst), 1);
        assert_eq!(late_calls.load(Ordering::SeqCst), 0);

        signal.emit(());
        assert_eq!(victim_calls.load(Ordering::SeqCst), 1);
        assert_eq!(late_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_disconnect_all() {
        let signal = Signal::<()>::new();

        for _ in 0..5 {
            signal.connect(|_| {});
        }

        assert_eq!(signal.connection_count(), 5);
        signal.disconnect_all();
        assert_eq!(signal.connection_count(), 0);
    }

    #[test]
    fn test_emit_from_multiple_threads() {
        let signal = Arc::new(Signal::<usize>::new());
        let counter = Arc::new(AtomicUsize::new(0));

        let counter_clone = counter.clone();
        signal.connect(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let signal = signal.clone();
                std::thread::spawn(move || {
                    for i in 0..25 {
                        signal.emit(i);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counter.load(Ordering::SeqCst), 100);
    }
}
