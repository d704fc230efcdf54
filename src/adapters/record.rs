use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    query::IndexMeta,
    resource::{Resource, fully_qualified_identifier},
};

/// Storage form of a resource: identity columns plus the JSON document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceRecord {
    pub id: String,
    pub type_name: String,
    pub version: u64,
    pub data: serde_json::Value,
    pub index_meta: IndexMeta,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResourceRecord {
    pub fn to_resource<T: Resource>(self) -> Result<T, Error> {
        if self.type_name != T::TYPE {
            return Err(Error::TypeMismatch(format!(
                "record {} is a {}, not a {}",
                self.id,
                self.type_name,
                T::TYPE
            )));
        }

        let mut val = serde_json::from_value::<T>(self.data)
            .map_err(|e| Error::Deserialize(e.to_string()))?;
        let meta = val.meta_mut();
        meta.id = self.id;
        meta.version = self.version;
        meta.created_at = self.created_at;
        meta.updated_at = self.updated_at;
        Ok(val)
    }

    pub fn from_resource<T: Resource>(resource: &T) -> Result<Self, Error> {
        let meta = resource.meta();
        Ok(Self {
            id: meta.id.clone(),
            type_name: T::TYPE.to_string(),
            version: meta.version,
            data: serde_json::to_value(resource).map_err(|e| Error::Serialize(e.to_string()))?,
            index_meta: resource.index_meta(),
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        })
    }

    /// `Commodity#EMA`; adapters don't know the namespace.
    pub fn key(&self) -> String {
        fully_qualified_identifier(&self.type_name, &self.id)
    }
}
