use std::{marker::PhantomData, sync::Arc};

use crate::{
    adapters::{Adapter, ResourceRecord},
    error::Error,
    query::Query,
    resource::{Relationship, Resource, ResourceMeta, fully_qualified_identifier},
};

/// Typed view over the records of one resource type.
///
/// Cheap to clone; every clone talks to the same adapter.
pub struct Registry<T: Resource> {
    adapter: Arc<dyn Adapter>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Resource> Clone for Registry<T> {
    fn clone(&self) -> Self {
        Self {
            adapter: Arc::clone(&self.adapter),
            _marker: PhantomData,
        }
    }
}

impl<T: Resource> Registry<T> {
    pub(crate) fn new(adapter: Arc<dyn Adapter>) -> Self {
        Self {
            adapter,
            _marker: PhantomData,
        }
    }

    /// `org.acme.mynetwork.Commodity`
    pub fn fully_qualified_type(&self) -> String {
        T::fully_qualified_type()
    }

    fn not_found(id: &str) -> Error {
        Error::NotFound(fully_qualified_identifier(&T::fully_qualified_type(), id))
    }

    // ==================== Reads ====================

    /// Fetch a resource by identifier
    pub async fn get(&self, id: &str) -> Result<T, Error> {
        match self.adapter.fetch_record(T::TYPE, id).await? {
            Some(record) => record.to_resource(),
            None => Err(Self::not_found(id)),
        }
    }

    /// Fetch the target of a relationship
    pub async fn resolve(&self, relationship: &Relationship<T>) -> Result<T, Error> {
        self.get(relationship.id()).await
    }

    pub async fn exists(&self, id: &str) -> Result<bool, Error> {
        Ok(self.adapter.fetch_record(T::TYPE, id).await?.is_some())
    }

    /// Every resource of this type, ordered by identifier
    pub async fn get_all(&self) -> Result<Vec<T>, Error> {
        self.query(&Query::default()).await
    }

    pub async fn query(&self, query: &Query) -> Result<Vec<T>, Error> {
        let records = self.adapter.query_records(T::TYPE, query).await?;
        records.into_iter().map(|r| r.to_resource()).collect()
    }

    pub async fn count(&self, query: Option<&Query>) -> Result<u64, Error> {
        self.adapter.count_records(T::TYPE, query).await
    }

    // ==================== Writes ====================

    pub async fn add(&self, resource: &T) -> Result<(), Error> {
        self.add_all(std::slice::from_ref(resource)).await
    }

    /// Insert all resources, or none of them if any identifier is taken
    pub async fn add_all(&self, resources: &[T]) -> Result<(), Error> {
        let records = resources
            .iter()
            .map(ResourceRecord::from_resource)
            .collect::<Result<Vec<_>, _>>()?;

        // adapters report `Commodity#EMA`; qualify it with the namespace
        self.adapter
            .insert_records(records)
            .await
            .map_err(|err| match err {
                Error::DuplicateKey(key) => {
                    Error::DuplicateKey(format!("{}.{}", T::NAMESPACE, key))
                }
                other => other,
            })
    }

    /// Persist a modified resource. On success the resource's version and
    /// `updated_at` are refreshed from storage.
    pub async fn update(&self, resource: &mut T) -> Result<(), Error> {
        let record = ResourceRecord::from_resource(resource)?;

        match self.adapter.update_record(record).await? {
            Some(stored) => {
                let meta = resource.meta_mut();
                meta.version = stored.version;
                meta.updated_at = stored.updated_at;
                Ok(())
            }
            None => Err(Self::not_found(resource.id())),
        }
    }

    pub async fn remove(&self, resource: &T) -> Result<(), Error> {
        self.remove_by_id(resource.id()).await
    }

    pub async fn remove_by_id(&self, id: &str) -> Result<(), Error> {
        match self.adapter.delete_record(T::TYPE, id).await? {
            Some(_) => Ok(()),
            None => Err(Self::not_found(id)),
        }
    }
}
