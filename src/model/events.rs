use serde::{Deserialize, Serialize};

use crate::{event::Event, resource::Relationship};

use super::{Commodity, MyAsset, NAMESPACE, Trader};

/// A commodity changed hands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TradeNotification {
    pub commodity: Relationship<Commodity>,
    pub new_owner: Relationship<Trader>,
}

impl Event for TradeNotification {
    const NAMESPACE: &'static str = NAMESPACE;
    const TYPE: &'static str = "TradeNotification";

    fn subject(&self) -> String {
        self.commodity.fully_qualified_identifier()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TradeMyAssetNotification {
    pub my_asset: Relationship<MyAsset>,
    pub new_owner: Relationship<Trader>,
}

impl Event for TradeMyAssetNotification {
    const NAMESPACE: &'static str = NAMESPACE;
    const TYPE: &'static str = "TradeMyAssetNotification";

    fn subject(&self) -> String {
        self.my_asset.fully_qualified_identifier()
    }
}

/// A high-quantity commodity was removed from the registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoveNotification {
    pub commodity: Relationship<Commodity>,
}

impl Event for RemoveNotification {
    const NAMESPACE: &'static str = NAMESPACE;
    const TYPE: &'static str = "RemoveNotification";

    fn subject(&self) -> String {
        self.commodity.fully_qualified_identifier()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoveNotificationMyAsset {
    pub my_asset: Relationship<MyAsset>,
}

impl Event for RemoveNotificationMyAsset {
    const NAMESPACE: &'static str = NAMESPACE;
    const TYPE: &'static str = "RemoveNotificationMyAsset";

    fn subject(&self) -> String {
        self.my_asset.fully_qualified_identifier()
    }
}
