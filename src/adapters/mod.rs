pub mod memory;
pub mod record;

#[cfg(feature = "sqlite")]
pub mod sqlite;

use async_trait::async_trait;
pub use memory::MemoryAdapter;
pub use record::*;

use crate::{error::Error, query::Query};

/// -----------------------------
/// Adapter contract
/// -----------------------------
///
/// Storage behind every registry of a network. Records are keyed by
/// `(type_name, id)`; `type_name` is the unqualified resource type.
///
/// Implementors MUST serialize concurrent writers so that:
/// 1. `insert_records` is atomic: all records land or none do
/// 2. `update_record` is a compare-and-swap on `version`
/// 3. `query_records` returns records ordered by `id` ascending
#[async_trait]
pub trait Adapter: Send + Sync + 'static {
    /// Insert new records. Fails with `DuplicateKey` if any key exists.
    async fn insert_records(&self, records: Vec<ResourceRecord>) -> Result<(), Error>;

    async fn fetch_record(
        &self,
        type_name: &str,
        id: &str,
    ) -> Result<Option<ResourceRecord>, Error>;

    /// Replace a record whose stored version equals `record.version`.
    /// Returns the stored record with its bumped version, `None` if the
    /// record no longer exists, or `Conflict` if the version moved on.
    async fn update_record(&self, record: ResourceRecord) -> Result<Option<ResourceRecord>, Error>;

    /// Remove a record, returning it, or `None` if it was not there.
    async fn delete_record(&self, type_name: &str, id: &str)
    -> Result<Option<ResourceRecord>, Error>;

    async fn query_records(
        &self,
        type_name: &str,
        query: &Query,
    ) -> Result<Vec<ResourceRecord>, Error>;

    async fn count_records(&self, type_name: &str, query: Option<&Query>) -> Result<u64, Error>;
}
