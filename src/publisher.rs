//! Best-effort domain event publishing.

use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::domain::events::DomainEvent;

#[derive(Clone, Debug, Default)]
enum Transport {
    #[default]
    Disabled,
    Nats(async_nats::Client),
    Recording(Arc<Mutex<Vec<DomainEvent>>>),
}

/// Publishes events after the state change they describe has been stored.
/// A failed publish is logged and never fails the request.
#[derive(Clone, Debug, Default)]
pub struct EventPublisher {
    transport: Transport,
}

impl EventPublisher {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn nats(client: async_nats::Client) -> Self {
        Self { transport: Transport::Nats(client) }
    }

    /// Keeps events in memory; the returned handle sees everything published.
    pub fn recording() -> (Self, Arc<Mutex<Vec<DomainEvent>>>) {
        let sink = Arc::new(Mutex::new(Vec::new()));
        (Self { transport: Transport::Recording(Arc::clone(&sink)) }, sink)
    }

    pub async fn publish(&self, event: impl Into<DomainEvent>) {
        let event = event.into();
        let subject = event.subject();
        match &self.transport {
            Transport::Disabled => debug!(subject, "event publishing disabled"),
            Transport::Nats(client) => {
                let payload = match serde_json::to_vec(&event) {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn!(subject, error = %e, "failed to encode event");
                        return;
                    }
                };
                if let Err(e) = client.publish(subject.to_string(), payload.into()).await {
                    warn!(subject, error = %e, "failed to publish event");
                }
            }
            Transport::Recording(sink) => match sink.lock() {
                Ok(mut events) => events.push(event),
                Err(_) => warn!(subject, "event recorder poisoned"),
            },
        }
    }
}
