//! A small business network: typed registries of assets and participants,
//! named queries over them, and transaction processors that move
//! ownership around and broadcast notifications when they commit.
//!
//! ```no_run
//! use tradenet::{Network, adapters::MemoryAdapter, model};
//!
//! # async fn run() -> Result<(), tradenet::Error> {
//! let network = Network::new(Box::new(MemoryAdapter::new()), model::definition());
//! let traders = network.participant_registry::<model::Trader>()?;
//! traders
//!     .add(&model::Trader::new("dan@email.com", "Dan", "Selman"))
//!     .await?;
//! # Ok(())
//! # }
//! ```
pub mod adapters;
pub mod catalog;
pub mod config;
pub mod definition;
pub mod error;
pub mod event;
pub mod model;
pub mod query;
pub mod registry;
pub mod resource;
pub mod transaction;

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tokio::sync::broadcast;

pub use crate::adapters::{Adapter, ResourceRecord};
pub use crate::catalog::{NamedQuery, QueryCatalog, QueryParams};
pub use crate::config::{NETWORK_CONFIG, NetworkConfig};
pub use crate::definition::NetworkDefinition;
pub use crate::error::Error;
pub use crate::event::{EmittedEvent, Event, EventBus};
pub use crate::query::{IndexField, IndexMeta, IndexValue, Query};
pub use crate::registry::Registry;
pub use crate::resource::*;
pub use crate::transaction::{
    Transaction, TransactionContext, TransactionReceipt, TransactionStage,
};

/// Entry point for registries, queries and transaction submission.
///
/// Cheap to clone; clones share the adapter and the event bus.
#[derive(Clone)]
pub struct Network {
    inner: Arc<NetworkState>,
}

struct NetworkState {
    adapter: Arc<dyn Adapter>,
    definition: NetworkDefinition,
    events: EventBus,
    config: NetworkConfig,
}

impl Network {
    /// Uses the process-wide [`NETWORK_CONFIG`].
    pub fn new(adapter: Box<dyn Adapter>, definition: NetworkDefinition) -> Self {
        Self::build(adapter, definition, NETWORK_CONFIG.clone())
    }

    pub fn with_config(
        adapter: Box<dyn Adapter>,
        definition: NetworkDefinition,
        config: NetworkConfig,
    ) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self::build(adapter, definition, config))
    }

    fn build(
        adapter: Box<dyn Adapter>,
        definition: NetworkDefinition,
        config: NetworkConfig,
    ) -> Self {
        tracing::debug!(
            network = %definition.identifier(),
            threshold = config.high_quantity_threshold,
            "network started"
        );
        Self {
            inner: Arc::new(NetworkState {
                adapter: Arc::from(adapter),
                events: EventBus::new(config.event_capacity),
                definition,
                config,
            }),
        }
    }

    pub fn definition(&self) -> &NetworkDefinition {
        &self.inner.definition
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.inner.config
    }

    pub(crate) fn events(&self) -> &EventBus {
        &self.inner.events
    }

    /// Receive every event committed from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<EmittedEvent> {
        self.inner.events.subscribe()
    }

    // ==================== Registries ====================

    pub fn registry<T: Resource>(&self) -> Result<Registry<T>, Error> {
        if !self.inner.definition.declares::<T>() {
            return Err(Error::NotFound(format!(
                "registry {}",
                T::fully_qualified_type()
            )));
        }
        Ok(Registry::new(Arc::clone(&self.inner.adapter)))
    }

    pub fn asset_registry<T: Resource>(&self) -> Result<Registry<T>, Error> {
        self.kind_registry(ResourceKind::Asset)
    }

    pub fn participant_registry<T: Resource>(&self) -> Result<Registry<T>, Error> {
        self.kind_registry(ResourceKind::Participant)
    }

    fn kind_registry<T: Resource>(&self, kind: ResourceKind) -> Result<Registry<T>, Error> {
        if T::KIND != kind {
            return Err(Error::TypeMismatch(format!(
                "{} is a {}, not a {}",
                T::fully_qualified_type(),
                T::KIND,
                kind
            )));
        }
        self.registry()
    }

    // ==================== Queries ====================

    /// Run a query from the network's catalog.
    pub async fn query<T: Resource>(
        &self,
        name: &str,
        params: &QueryParams,
    ) -> Result<Vec<T>, Error> {
        let named = self.inner.definition.catalog().get(name)?;
        if named.resource_type != T::TYPE {
            return Err(Error::QueryFailure(format!(
                "query `{}` returns {}, not {}",
                name,
                named.resource_type,
                T::TYPE
            )));
        }
        let query = named.build(params)?;
        let registry = self.registry::<T>()?;

        let start = Instant::now();
        let result = registry.query(&query).await;
        histogram!("tradenet.query.duration_ms",
            "query" => name.to_string()
        )
        .record(start.elapsed().as_millis() as f64);

        result.map_err(|err| match err {
            Error::Storage(msg) => Error::QueryFailure(format!("{}: {}", name, msg)),
            other => other,
        })
    }

    // ==================== Transactions ====================

    /// Run a transaction processor to completion.
    ///
    /// Events staged by the processor are delivered when it returns `Ok`
    /// and dropped when it fails. A processor may flush part of its events
    /// before failing, see [`TransactionContext::flush`].
    pub async fn submit<T: Transaction>(&self, transaction: &T) -> Result<TransactionReceipt, Error> {
        let transaction_type = T::fully_qualified_type();
        let mut ctx = TransactionContext::new(self.clone(), transaction_type.clone());
        tracing::debug!(
            transaction = %ctx.transaction_id(),
            r#type = %transaction_type,
            "transaction received"
        );

        let start = Instant::now();
        let result = transaction.process(&mut ctx).await;

        let status = match &result {
            Ok(()) => {
                ctx.enter(TransactionStage::Completed);
                ctx.flush();
                tracing::info!(
                    transaction = %ctx.transaction_id(),
                    r#type = %transaction_type,
                    events = ctx.events_delivered(),
                    "transaction committed"
                );
                "success"
            }
            Err(err) => {
                let failed_at = ctx.stage();
                ctx.enter(TransactionStage::Failed);
                let dropped = ctx.discard();
                tracing::warn!(
                    transaction = %ctx.transaction_id(),
                    r#type = %transaction_type,
                    stage = %failed_at,
                    dropped_events = dropped,
                    error = %err,
                    "transaction failed"
                );
                "failed"
            }
        };

        counter!("tradenet.transactions.total",
            "type" => transaction_type.clone(),
            "status" => status
        )
        .increment(1);
        histogram!("tradenet.transaction.duration_ms",
            "type" => transaction_type
        )
        .record(start.elapsed().as_millis() as f64);

        result.map(|()| ctx.receipt())
    }
}
