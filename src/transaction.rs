use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Network,
    error::Error,
    event::{EmittedEvent, Event},
};

/// Progress of a transaction through its handler.
///
/// `Received → ValidatingReferences → Mutating → Notifying → Persisting →
/// Completed`; any stage may end in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStage {
    Received,
    ValidatingReferences,
    Mutating,
    Notifying,
    Persisting,
    Completed,
    Failed,
}

impl fmt::Display for TransactionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionStage::Received => "received",
            TransactionStage::ValidatingReferences => "validating-references",
            TransactionStage::Mutating => "mutating",
            TransactionStage::Notifying => "notifying",
            TransactionStage::Persisting => "persisting",
            TransactionStage::Completed => "completed",
            TransactionStage::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// A transaction processor.
///
/// Payloads are transient: they are built by the caller, handed to
/// [`Network::submit`] and dropped afterwards. Handlers do not retry.
#[async_trait]
pub trait Transaction: Send + Sync {
    const NAMESPACE: &'static str;
    const TYPE: &'static str;

    fn fully_qualified_type() -> String {
        format!("{}.{}", Self::NAMESPACE, Self::TYPE)
    }

    async fn process(&self, ctx: &mut TransactionContext) -> Result<(), Error>;
}

/// Per-transaction state handed to a handler.
///
/// Events emitted through the context are staged and only reach
/// subscribers when the transaction commits, or when the handler flushes
/// them explicitly.
pub struct TransactionContext {
    network: Network,
    transaction_id: Uuid,
    transaction_type: String,
    stages: Vec<TransactionStage>,
    pending: Vec<EmittedEvent>,
    delivered: usize,
}

impl TransactionContext {
    pub(crate) fn new(network: Network, transaction_type: String) -> Self {
        Self {
            network,
            transaction_id: Uuid::now_v7(),
            transaction_type,
            stages: vec![TransactionStage::Received],
            pending: Vec::new(),
            delivered: 0,
        }
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn transaction_id(&self) -> Uuid {
        self.transaction_id
    }

    pub fn transaction_type(&self) -> &str {
        &self.transaction_type
    }

    pub fn stage(&self) -> TransactionStage {
        // never empty: starts at Received
        self.stages
            .last()
            .copied()
            .unwrap_or(TransactionStage::Received)
    }

    pub fn stages(&self) -> &[TransactionStage] {
        &self.stages
    }

    pub(crate) fn enter(&mut self, stage: TransactionStage) {
        if self.stage() == stage {
            return;
        }
        tracing::debug!(
            transaction = %self.transaction_id,
            r#type = %self.transaction_type,
            from = %self.stage(),
            to = %stage,
            "transaction stage"
        );
        self.stages.push(stage);
    }

    /// Stage an event for delivery.
    pub fn emit<E: Event>(&mut self, event: &E) -> Result<(), Error> {
        let emitted = EmittedEvent::new(self.transaction_id, event)?;
        tracing::debug!(
            transaction = %self.transaction_id,
            event = %emitted.event_type,
            subject = %emitted.subject,
            "event staged"
        );
        self.pending.push(emitted);
        Ok(())
    }

    pub fn pending_events(&self) -> &[EmittedEvent] {
        &self.pending
    }

    /// Events delivered so far by this transaction
    pub fn events_delivered(&self) -> usize {
        self.delivered
    }

    /// Deliver every staged event now. Returns how many were delivered.
    pub fn flush(&mut self) -> usize {
        let events = std::mem::take(&mut self.pending);
        let count = events.len();
        for event in events {
            counter!("tradenet.events.emitted", "type" => event.event_type.clone()).increment(1);
            self.network.events().publish(event);
        }
        self.delivered += count;
        count
    }

    /// Drop every staged event. Returns how many were dropped.
    pub(crate) fn discard(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    pub(crate) fn receipt(&self) -> TransactionReceipt {
        TransactionReceipt {
            transaction_id: self.transaction_id,
            transaction_type: self.transaction_type.clone(),
            timestamp: Utc::now(),
            events_delivered: self.delivered,
            stages: self.stages.clone(),
        }
    }
}

/// Outcome of a committed transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub transaction_id: Uuid,
    pub transaction_type: String,
    pub timestamp: DateTime<Utc>,
    pub events_delivered: usize,
    pub stages: Vec<TransactionStage>,
}
