use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    resource::Relationship,
    transaction::{Transaction, TransactionContext},
};

use super::{
    Commodity, MyAsset, NAMESPACE, RemoveNotification, RemoveNotificationMyAsset,
    SELECT_COMMODITIES_WITH_HIGH_QUANTITY, SELECT_MY_ASSETS_WITH_HIGH_QUANTITY,
    TradeMyAssetNotification, TradeNotification, Trader, handlers,
};

/// Move a commodity to a new owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub commodity: Relationship<Commodity>,
    pub new_owner: Relationship<Trader>,
}

impl Trade {
    pub fn new(commodity: Relationship<Commodity>, new_owner: Relationship<Trader>) -> Self {
        Self {
            commodity,
            new_owner,
        }
    }
}

#[async_trait]
impl Transaction for Trade {
    const NAMESPACE: &'static str = NAMESPACE;
    const TYPE: &'static str = "Trade";

    async fn process(&self, ctx: &mut TransactionContext) -> Result<(), Error> {
        let new_owner = self.new_owner.clone();
        handlers::transfer_ownership(ctx, &self.commodity, &self.new_owner, |commodity| {
            TradeNotification {
                commodity: Relationship::from(commodity),
                new_owner,
            }
        })
        .await
    }
}

/// Move a myAsset to a new owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TradeMyAsset {
    pub my_asset: Relationship<MyAsset>,
    pub new_owner: Relationship<Trader>,
}

impl TradeMyAsset {
    pub fn new(my_asset: Relationship<MyAsset>, new_owner: Relationship<Trader>) -> Self {
        Self {
            my_asset,
            new_owner,
        }
    }
}

#[async_trait]
impl Transaction for TradeMyAsset {
    const NAMESPACE: &'static str = NAMESPACE;
    const TYPE: &'static str = "TradeMyAsset";

    async fn process(&self, ctx: &mut TransactionContext) -> Result<(), Error> {
        let new_owner = self.new_owner.clone();
        handlers::transfer_ownership(ctx, &self.my_asset, &self.new_owner, |my_asset| {
            TradeMyAssetNotification {
                my_asset: Relationship::from(my_asset),
                new_owner,
            }
        })
        .await
    }
}

/// Remove every commodity selected by `selectCommoditiesWithHighQuantity`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RemoveHighQuantityCommodities {}

#[async_trait]
impl Transaction for RemoveHighQuantityCommodities {
    const NAMESPACE: &'static str = NAMESPACE;
    const TYPE: &'static str = "RemoveHighQuantityCommodities";

    async fn process(&self, ctx: &mut TransactionContext) -> Result<(), Error> {
        handlers::remove_high_quantity(ctx, SELECT_COMMODITIES_WITH_HIGH_QUANTITY, |commodity| {
            RemoveNotification {
                commodity: Relationship::from(commodity),
            }
        })
        .await
    }
}

/// Remove every myAsset selected by `selectMyAssetsWithHighQuantity`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RemoveHighQuantityMyAssets {}

#[async_trait]
impl Transaction for RemoveHighQuantityMyAssets {
    const NAMESPACE: &'static str = NAMESPACE;
    const TYPE: &'static str = "RemoveHighQuantityMyAssets";

    async fn process(&self, ctx: &mut TransactionContext) -> Result<(), Error> {
        handlers::remove_high_quantity(ctx, SELECT_MY_ASSETS_WITH_HIGH_QUANTITY, |my_asset| {
            RemoveNotificationMyAsset {
                my_asset: Relationship::from(my_asset),
            }
        })
        .await
    }
}
