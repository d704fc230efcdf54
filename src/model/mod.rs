//! The `org.acme.mynetwork` business network: traders holding commodities
//! and myAssets, trading them, and clearing out high-quantity holdings.
mod asset;
mod events;
mod handlers;
mod queries;
mod trader;
mod transactions;

pub use asset::*;
pub use events::*;
pub use queries::*;
pub use trader::*;
pub use transactions::*;

use crate::{
    config::{NETWORK_CONFIG, NetworkConfig},
    definition::NetworkDefinition,
};

pub const NAMESPACE: &str = "org.acme.mynetwork";
pub const NETWORK_NAME: &str = "my-network";

/// The network with the process-wide configuration.
pub fn definition() -> NetworkDefinition {
    definition_for(&NETWORK_CONFIG)
}

/// The network with its high-quantity queries bound to
/// `config.high_quantity_threshold`.
pub fn definition_for(config: &NetworkConfig) -> NetworkDefinition {
    catalog(config.high_quantity_threshold).into_iter().fold(
        NetworkDefinition::new(NETWORK_NAME, env!("CARGO_PKG_VERSION"))
            .resource::<Trader>()
            .resource::<Commodity>()
            .resource::<MyAsset>(),
        NetworkDefinition::query,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::Error,
        event::EmittedEvent,
        resource::{Relationship, Resource, ResourceKind, ResourceMeta},
    };

    fn dan() -> Trader {
        Trader::new("dan@email.com", "Dan", "Selman")
    }

    #[test]
    fn test_definition_declares_model() {
        let definition = definition_for(&NetworkConfig::default());
        assert_eq!(
            definition.resource_types(ResourceKind::Asset),
            vec!["org.acme.mynetwork.Commodity", "org.acme.mynetwork.MyAsset"]
        );
        assert_eq!(
            definition.resource_types(ResourceKind::Participant),
            vec!["org.acme.mynetwork.Trader"]
        );
        assert_eq!(definition.catalog().names().len(), 8);
        assert!(definition.identifier().starts_with("my-network@"));
    }

    #[test]
    fn test_fully_qualified_identifiers() {
        let dan = dan();
        let corn = Commodity::new("EMA", "Corn", "Euronext", 100, Relationship::from(&dan));

        assert_eq!(Commodity::fully_qualified_type(), "org.acme.mynetwork.Commodity");
        assert_eq!(
            corn.fully_qualified_identifier(),
            "org.acme.mynetwork.Commodity#EMA"
        );
        assert_eq!(
            corn.owner.to_uri(),
            "resource:org.acme.mynetwork.Trader#dan@email.com"
        );
        assert_eq!(dan.email(), "dan@email.com");
    }

    #[test]
    fn test_owner_serializes_as_identifier() {
        let corn = Commodity::new("EMA", "Corn", "Euronext", 100, Relationship::new("dan@email.com"));
        let json = serde_json::to_value(&corn).unwrap();
        assert_eq!(json["owner"], "dan@email.com");
        assert_eq!(json["mainExchange"], "Euronext");

        let back: Commodity = serde_json::from_value(json).unwrap();
        assert_eq!(back, corn);
    }

    #[test]
    fn test_relationship_parse() {
        let uri = Relationship::<Trader>::parse("resource:org.acme.mynetwork.Trader#simon@email.com")
            .unwrap();
        assert_eq!(uri.id(), "simon@email.com");

        let bare = Relationship::<Trader>::parse("simon@email.com").unwrap();
        assert_eq!(bare, uri);

        assert!(matches!(
            Relationship::<Trader>::parse("org.acme.mynetwork.Commodity#EMA"),
            Err(Error::TypeMismatch(_))
        ));
        assert!(matches!(
            Relationship::<Trader>::parse("org.acme.mynetwork.Trader#"),
            Err(Error::TypeMismatch(_))
        ));
        assert!(matches!(
            Relationship::<Trader>::parse(""),
            Err(Error::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_notification_subject() {
        let event = EmittedEvent::new(
            uuid::Uuid::now_v7(),
            &RemoveNotificationMyAsset {
                my_asset: Relationship::new("XYZ"),
            },
        )
        .unwrap();
        assert_eq!(event.event_type, "org.acme.mynetwork.RemoveNotificationMyAsset");
        assert_eq!(event.subject, "org.acme.mynetwork.MyAsset#XYZ");
        assert_eq!(
            event.decode::<RemoveNotificationMyAsset>().unwrap().my_asset.id(),
            "XYZ"
        );
    }

    #[test]
    fn test_index_meta() {
        let asset = MyAsset::new("XYZ", "Soya", "Chicago", 50, Relationship::new("dan@email.com"));
        let index = asset.index_meta();
        assert_eq!(
            index.get("moto_of_exchange").and_then(|v| v.as_string()),
            Some("Chicago")
        );
        assert_eq!(index.get("quantity").and_then(|v| v.as_int()), Some(50));
        assert_eq!(
            index.get("owner").and_then(|v| v.as_string()),
            Some("dan@email.com")
        );
    }
}
