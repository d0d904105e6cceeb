mod event_bus;

pub use event_bus::{EventBus, EventLogEntry, SubscriptionId};
