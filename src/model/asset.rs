use serde::{Deserialize, Serialize};

use crate::{
    query::{IndexField, IndexMeta},
    resource::{Meta, Relationship, Resource, ResourceKind},
};

use super::{NAMESPACE, Trader};

/// An asset held by a [`Trader`], traded whole and counted in units.
pub trait OwnedAsset: Resource {
    fn owner(&self) -> &Relationship<Trader>;
    fn set_owner(&mut self, owner: Relationship<Trader>);
    fn quantity(&self) -> i64;

    fn owner_field() -> &'static IndexField;
    fn quantity_field() -> &'static IndexField;
    /// Field naming where the asset is traded
    fn exchange_field() -> &'static IndexField;
}

// ==================== Commodity ====================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Commodity {
    _meta: Meta,
    pub description: String,
    pub main_exchange: String,
    pub quantity: i64,
    pub owner: Relationship<Trader>,
}

pub struct CommodityIndexes {
    pub main_exchange: IndexField,
    pub quantity: IndexField,
    pub owner: IndexField,
}

impl Commodity {
    pub const FIELDS: &'static CommodityIndexes = &CommodityIndexes {
        main_exchange: IndexField {
            name: "main_exchange",
        },
        quantity: IndexField { name: "quantity" },
        owner: IndexField { name: "owner" },
    };

    pub fn new(
        symbol: &str,
        description: &str,
        main_exchange: &str,
        quantity: i64,
        owner: Relationship<Trader>,
    ) -> Self {
        Self {
            _meta: Meta::new(symbol),
            description: description.to_string(),
            main_exchange: main_exchange.to_string(),
            quantity,
            owner,
        }
    }
}

impl Resource for Commodity {
    const NAMESPACE: &'static str = NAMESPACE;
    const TYPE: &'static str = "Commodity";
    const KIND: ResourceKind = ResourceKind::Asset;

    fn meta(&self) -> &Meta {
        &self._meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self._meta
    }

    fn index_meta(&self) -> IndexMeta {
        IndexMeta::default()
            .with(Self::FIELDS.main_exchange.name, self.main_exchange.as_str())
            .with(Self::FIELDS.quantity.name, self.quantity)
            .with(Self::FIELDS.owner.name, self.owner.id())
    }
}

impl OwnedAsset for Commodity {
    fn owner(&self) -> &Relationship<Trader> {
        &self.owner
    }

    fn set_owner(&mut self, owner: Relationship<Trader>) {
        self.owner = owner;
    }

    fn quantity(&self) -> i64 {
        self.quantity
    }

    fn owner_field() -> &'static IndexField {
        &Self::FIELDS.owner
    }

    fn quantity_field() -> &'static IndexField {
        &Self::FIELDS.quantity
    }

    fn exchange_field() -> &'static IndexField {
        &Self::FIELDS.main_exchange
    }
}

// ==================== MyAsset ====================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MyAsset {
    _meta: Meta,
    pub description: String,
    pub moto_of_exchange: String,
    pub quantity: i64,
    pub owner: Relationship<Trader>,
}

pub struct MyAssetIndexes {
    pub moto_of_exchange: IndexField,
    pub quantity: IndexField,
    pub owner: IndexField,
}

impl MyAsset {
    pub const FIELDS: &'static MyAssetIndexes = &MyAssetIndexes {
        moto_of_exchange: IndexField {
            name: "moto_of_exchange",
        },
        quantity: IndexField { name: "quantity" },
        owner: IndexField { name: "owner" },
    };

    pub fn new(
        id: &str,
        description: &str,
        moto_of_exchange: &str,
        quantity: i64,
        owner: Relationship<Trader>,
    ) -> Self {
        Self {
            _meta: Meta::new(id),
            description: description.to_string(),
            moto_of_exchange: moto_of_exchange.to_string(),
            quantity,
            owner,
        }
    }
}

impl Resource for MyAsset {
    const NAMESPACE: &'static str = NAMESPACE;
    const TYPE: &'static str = "MyAsset";
    const KIND: ResourceKind = ResourceKind::Asset;

    fn meta(&self) -> &Meta {
        &self._meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self._meta
    }

    fn index_meta(&self) -> IndexMeta {
        IndexMeta::default()
            .with(
                Self::FIELDS.moto_of_exchange.name,
                self.moto_of_exchange.as_str(),
            )
            .with(Self::FIELDS.quantity.name, self.quantity)
            .with(Self::FIELDS.owner.name, self.owner.id())
    }
}

impl OwnedAsset for MyAsset {
    fn owner(&self) -> &Relationship<Trader> {
        &self.owner
    }

    fn set_owner(&mut self, owner: Relationship<Trader>) {
        self.owner = owner;
    }

    fn quantity(&self) -> i64 {
        self.quantity
    }

    fn owner_field() -> &'static IndexField {
        &Self::FIELDS.owner
    }

    fn quantity_field() -> &'static IndexField {
        &Self::FIELDS.quantity
    }

    fn exchange_field() -> &'static IndexField {
        &Self::FIELDS.moto_of_exchange
    }
}
