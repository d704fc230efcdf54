use serde::{Deserialize, Serialize};

use crate::{
    query::{IndexField, IndexMeta},
    resource::{Meta, Resource, ResourceKind},
};

use super::NAMESPACE;

/// A participant, identified by email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trader {
    _meta: Meta,
    pub first_name: String,
    pub last_name: String,
}

pub struct TraderIndexes {
    pub first_name: IndexField,
    pub last_name: IndexField,
}

impl Trader {
    pub const FIELDS: &'static TraderIndexes = &TraderIndexes {
        first_name: IndexField { name: "first_name" },
        last_name: IndexField { name: "last_name" },
    };

    pub fn new(email: &str, first_name: &str, last_name: &str) -> Self {
        Self {
            _meta: Meta::new(email),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        }
    }

    pub fn email(&self) -> &str {
        self._meta.id()
    }
}

impl Resource for Trader {
    const NAMESPACE: &'static str = NAMESPACE;
    const TYPE: &'static str = "Trader";
    const KIND: ResourceKind = ResourceKind::Participant;

    fn meta(&self) -> &Meta {
        &self._meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self._meta
    }

    fn index_meta(&self) -> IndexMeta {
        IndexMeta::default()
            .with(Self::FIELDS.first_name.name, self.first_name.as_str())
            .with(Self::FIELDS.last_name.name, self.last_name.as_str())
    }
}
