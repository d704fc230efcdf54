use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{error::Error, resource::fully_qualified_identifier};

/// A notification raised by a transaction.
///
/// Events are transient: they are delivered to the subscribers registered
/// at commit time and never stored.
pub trait Event: Serialize + DeserializeOwned + Send + Sync + 'static {
    const NAMESPACE: &'static str;
    const TYPE: &'static str;

    fn fully_qualified_type() -> String {
        format!("{}.{}", Self::NAMESPACE, Self::TYPE)
    }

    /// Fully qualified identifier of the resource the event is about
    fn subject(&self) -> String;
}

/// An event as it travels over the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmittedEvent {
    pub event_id: Uuid,
    pub transaction_id: Uuid,
    /// `org.acme.mynetwork.TradeNotification`
    pub event_type: String,
    /// `org.acme.mynetwork.Commodity#EMA`
    pub subject: String,
    pub timestamp: DateTime<Utc>,
    pub data: serde_json::Value,
}

impl EmittedEvent {
    pub fn new<E: Event>(transaction_id: Uuid, event: &E) -> Result<Self, Error> {
        Ok(Self {
            event_id: Uuid::now_v7(),
            transaction_id,
            event_type: E::fully_qualified_type(),
            subject: event.subject(),
            timestamp: Utc::now(),
            data: serde_json::to_value(event).map_err(|e| Error::Serialize(e.to_string()))?,
        })
    }

    /// `org.acme.mynetwork.TradeNotification#<event id>`
    pub fn fully_qualified_identifier(&self) -> String {
        fully_qualified_identifier(&self.event_type, &self.event_id.to_string())
    }

    pub fn is<E: Event>(&self) -> bool {
        self.event_type == E::fully_qualified_type()
    }

    pub fn decode<E: Event>(&self) -> Result<E, Error> {
        if !self.is::<E>() {
            return Err(Error::TypeMismatch(format!(
                "event {} is not a {}",
                self.event_type,
                E::fully_qualified_type()
            )));
        }
        serde_json::from_value(self.data.clone()).map_err(|e| Error::Deserialize(e.to_string()))
    }
}

/// Fan-out of committed events to every current subscriber.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EmittedEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EmittedEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Fire-and-forget. Having no subscribers is not an error.
    pub fn publish(&self, event: EmittedEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("event published with no subscribers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Ping {
        target: String,
    }

    impl Event for Ping {
        const NAMESPACE: &'static str = "org.example";
        const TYPE: &'static str = "Ping";

        fn subject(&self) -> String {
            format!("org.example.Target#{}", self.target)
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct Pong {}

    impl Event for Pong {
        const NAMESPACE: &'static str = "org.example";
        const TYPE: &'static str = "Pong";

        fn subject(&self) -> String {
            String::new()
        }
    }

    #[test]
    fn test_emitted_event_decodes() {
        let tx = Uuid::now_v7();
        let event = EmittedEvent::new(
            tx,
            &Ping {
                target: "a".to_string(),
            },
        )
        .unwrap();

        assert_eq!(event.event_type, "org.example.Ping");
        assert_eq!(event.subject, "org.example.Target#a");
        assert_eq!(event.transaction_id, tx);
        assert!(
            event
                .fully_qualified_identifier()
                .starts_with("org.example.Ping#")
        );
        assert_eq!(
            event.decode::<Ping>().unwrap(),
            Ping {
                target: "a".to_string()
            }
        );
        assert!(matches!(
            event.decode::<Pong>(),
            Err(Error::TypeMismatch(_))
        ));
    }

    #[tokio::test]
    async fn test_bus_delivers_to_every_subscriber() {
        let bus = EventBus::new(8);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        let event = EmittedEvent::new(Uuid::now_v7(), &Pong {}).unwrap();
        bus.publish(event.clone());

        assert_eq!(first.recv().await.unwrap(), event);
        assert_eq!(second.recv().await.unwrap(), event);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new(1);
        bus.publish(EmittedEvent::new(Uuid::now_v7(), &Pong {}).unwrap());
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_slow_subscriber_lags_past_capacity() {
        let bus = EventBus::new(2);
        let mut slow = bus.subscribe();
        for target in ["a", "b", "c"] {
            let ping = Ping {
                target: target.to_string(),
            };
            bus.publish(EmittedEvent::new(Uuid::now_v7(), &ping).unwrap());
        }

        assert!(matches!(
            slow.recv().await,
            Err(tokio::sync::broadcast::error::RecvError::Lagged(1))
        ));
        let next = slow.recv().await.unwrap();
        assert_eq!(next.subject, "org.example.Target#b");
    }
}
