// src/events/bus/event_bus.rs
//
// Core event bus implementation.
//
// DESIGN PRINCIPLES:
// 1. Synchronous - handlers execute immediately in subscription order
// 2. Observable - every emission is logged
// 3. Type-safe - events are strongly typed
// 4. Reentrant - a handler may emit or subscribe without deadlocking

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::events::types::DomainEvent;

/// Type-erased event handler function
type EventHandler = Arc<dyn Fn(&dyn Any) + Send + Sync>;

/// Handle returned by `subscribe`, used to remove the handler again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Oldest entries are dropped past this size
const EVENT_LOG_CAPACITY: usize = 512;

/// The Event Bus
///
/// Lets the session store, the catalog services and every mounted player
/// publish facts without knowing who listens.
pub struct EventBus {
    handlers: RwLock<HashMap<TypeId, Vec<(SubscriptionId, EventHandler)>>>,
    event_log: RwLock<Vec<EventLogEntry>>,
    next_id: AtomicU64,
}

/// A logged event for debugging and tracing
#[derive(Debug, Clone)]
pub struct EventLogEntry {
    pub event_type: String,
    pub event_id: String,
    pub occurred_at: String,
    pub handler_count: usize,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            event_log: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Subscribe to a specific event type.
    ///
    /// Handlers are executed in the order they are subscribed.
    ///
    /// ```ignore
    /// bus.subscribe::<ControlsHidden, _>(|event| {
    ///     log::debug!("controls hidden on {}", event.player_id);
    /// });
    /// ```
    pub fn subscribe<E, F>(&self, handler: F) -> SubscriptionId
    where
        E: DomainEvent + 'static,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let type_id = TypeId::of::<E>();
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));

        let wrapped: EventHandler = Arc::new(move |event_any: &dyn Any| {
            if let Some(event) = event_any.downcast_ref::<E>() {
                handler(event);
            } else {
                log::error!(
                    "failed to downcast event in handler for {}",
                    std::any::type_name::<E>()
                );
            }
        });

        let mut handlers = self.handlers.write().unwrap_or_else(|e| e.into_inner());
        handlers.entry(type_id).or_default().push((id, wrapped));
        id
    }

    /// Remove a handler. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.write().unwrap_or_else(|e| e.into_inner());
        for list in handlers.values_mut() {
            if let Some(pos) = list.iter().position(|(sub, _)| *sub == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    /// Emit an event.
    ///
    /// Handlers are cloned out of the registry before running, so a handler
    /// may itself emit or subscribe. A panicking handler is logged and the
    /// remaining handlers still run.
    pub fn emit<E>(&self, event: E)
    where
        E: DomainEvent + 'static,
    {
        let type_id = TypeId::of::<E>();

        let event_handlers: Vec<EventHandler> = {
            let handlers = self.handlers.read().unwrap_or_else(|e| e.into_inner());
            handlers
                .get(&type_id)
                .map(|list| list.iter().map(|(_, h)| Arc::clone(h)).collect())
                .unwrap_or_default()
        };

        let entry = EventLogEntry {
            event_type: event.event_type().to_string(),
            event_id: event.event_id().to_string(),
            occurred_at: event.occurred_at().to_rfc3339(),
            handler_count: event_handlers.len(),
        };

        log::debug!(
            "[EVENT] {} (id: {}) | {} handlers",
            entry.event_type,
            entry.event_id,
            entry.handler_count
        );

        {
            let mut log = self.event_log.write().unwrap_or_else(|e| e.into_inner());
            if log.len() >= EVENT_LOG_CAPACITY {
                log.remove(0);
            }
            log.push(entry);
        }

        for (idx, handler) in event_handlers.iter().enumerate() {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                handler(&event as &dyn Any);
            }));

            if let Err(e) = result {
                log::error!(
                    "handler {} for {} panicked: {:?}",
                    idx,
                    event.event_type(),
                    e
                );
            }
        }
    }

    /// Get the event log (for debugging)
    pub fn get_event_log(&self) -> Vec<EventLogEntry> {
        self.event_log
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn clear_event_log(&self) {
        self.event_log
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    /// Get the number of subscribers for a specific event type
    pub fn subscriber_count<E>(&self) -> usize
    where
        E: 'static,
    {
        let type_id = TypeId::of::<E>();
        let handlers = self.handlers.read().unwrap_or_else(|e| e.into_inner());
        handlers.get(&type_id).map(|h| h.len()).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
