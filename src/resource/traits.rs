use serde::{Serialize, de::DeserializeOwned};

use crate::{query::IndexMeta, resource::Meta};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Asset,
    Participant,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Asset => write!(f, "asset"),
            ResourceKind::Participant => write!(f, "participant"),
        }
    }
}

/// A record kept in a registry of the network.
///
/// Implementors carry a [`Meta`] and expose the fields that named queries
/// are allowed to filter on through [`Resource::index_meta`].
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Model namespace, e.g. `org.acme.mynetwork`
    const NAMESPACE: &'static str;

    /// Resource type name, e.g. `Commodity`
    const TYPE: &'static str;

    const KIND: ResourceKind;

    fn fully_qualified_type() -> String {
        format!("{}.{}", Self::NAMESPACE, Self::TYPE)
    }

    /// Resource metadata (id, version, created_at, updated_at)
    fn meta(&self) -> &Meta;

    /// Mutable resource metadata
    fn meta_mut(&mut self) -> &mut Meta;

    // Derived, non-meta indexes only
    fn index_meta(&self) -> IndexMeta;
}

pub trait ResourceMeta {
    fn id(&self) -> &str;
    fn version(&self) -> u64;
    fn created_at(&self) -> chrono::DateTime<chrono::Utc>;
    fn updated_at(&self) -> chrono::DateTime<chrono::Utc>;
    fn fully_qualified_identifier(&self) -> String;
}

impl<T> ResourceMeta for T
where
    T: Resource,
{
    fn id(&self) -> &str {
        self.meta().id()
    }

    fn version(&self) -> u64 {
        self.meta().version()
    }

    fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.meta().created_at()
    }

    fn updated_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.meta().updated_at()
    }

    fn fully_qualified_identifier(&self) -> String {
        super::fully_qualified_identifier(&T::fully_qualified_type(), self.id())
    }
}
