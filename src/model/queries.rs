use crate::{
    catalog::{NamedQuery, QueryParams},
    error::Error,
    query::Query,
    resource::Relationship,
};

use super::{Commodity, MyAsset, OwnedAsset, Trader};

pub const SELECT_COMMODITIES: &str = "selectCommodities";
pub const SELECT_COMMODITIES_BY_EXCHANGE: &str = "selectCommoditiesByExchange";
pub const SELECT_COMMODITIES_BY_OWNER: &str = "selectCommoditiesByOwner";
pub const SELECT_COMMODITIES_WITH_HIGH_QUANTITY: &str = "selectCommoditiesWithHighQuantity";

pub const SELECT_MY_ASSETS: &str = "selectMyAsset";
pub const SELECT_MY_ASSETS_BY_MOTO_OF_EXCHANGE: &str = "selectMyAssetsByMotoOfExchange";
pub const SELECT_MY_ASSETS_BY_OWNER: &str = "selectMyAssetsByOwner";
pub const SELECT_MY_ASSETS_WITH_HIGH_QUANTITY: &str = "selectMyAssetsWithHighQuantity";

/// Query parameter holding an exchange name
pub const PARAM_EXCHANGE: &str = "exchange";
/// Query parameter holding a trader reference
pub const PARAM_OWNER: &str = "owner";

/// Every query of the network. The high-quantity queries select assets
/// with `quantity >= threshold`.
pub fn catalog(threshold: i64) -> Vec<NamedQuery> {
    let mut queries = asset_queries::<Commodity>(
        [
            (SELECT_COMMODITIES, "Select all commodities"),
            (
                SELECT_COMMODITIES_BY_EXCHANGE,
                "Select all commodities based on their main exchange",
            ),
            (
                SELECT_COMMODITIES_BY_OWNER,
                "Select all commodities based on their owner",
            ),
            (
                SELECT_COMMODITIES_WITH_HIGH_QUANTITY,
                "Select commodities based on quantity",
            ),
        ],
        threshold,
    );
    queries.extend(asset_queries::<MyAsset>(
        [
            (SELECT_MY_ASSETS, "Select all myAssets"),
            (
                SELECT_MY_ASSETS_BY_MOTO_OF_EXCHANGE,
                "Select all myAssets based on their moto of exchange",
            ),
            (
                SELECT_MY_ASSETS_BY_OWNER,
                "Select all myAssets based on their owner",
            ),
            (
                SELECT_MY_ASSETS_WITH_HIGH_QUANTITY,
                "Select myAssets based on quantity",
            ),
        ],
        threshold,
    ));
    queries
}

// [all, by exchange, by owner, high quantity]
fn asset_queries<A: OwnedAsset>(names: [(&str, &str); 4], threshold: i64) -> Vec<NamedQuery> {
    let [all, by_exchange, by_owner, high_quantity] = names;
    vec![
        NamedQuery::new::<A, _>(all.0, all.1, |_| Ok(Query::new())),
        NamedQuery::new::<A, _>(by_exchange.0, by_exchange.1, |params| {
            let exchange = params.require_str(PARAM_EXCHANGE)?;
            Ok(Query::new().where_eq(A::exchange_field(), exchange))
        }),
        NamedQuery::new::<A, _>(by_owner.0, by_owner.1, |params| {
            let owner = owner_param(params)?;
            Ok(Query::new().where_eq(A::owner_field(), owner.id()))
        }),
        NamedQuery::new::<A, _>(high_quantity.0, high_quantity.1, move |_| {
            Ok(Query::new().where_gte(A::quantity_field(), threshold))
        }),
    ]
}

/// Accepts `dan@email.com`, `org.acme.mynetwork.Trader#dan@email.com` or
/// `resource:org.acme.mynetwork.Trader#dan@email.com`.
fn owner_param(params: &QueryParams) -> Result<Relationship<Trader>, Error> {
    let raw = params.require_str(PARAM_OWNER)?;
    Relationship::parse(raw).map_err(|err| Error::QueryFailure(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::IndexMeta;

    fn owned_by(owner: &str, quantity: i64) -> IndexMeta {
        IndexMeta::default()
            .with("owner", owner)
            .with("quantity", quantity)
            .with("main_exchange", "Euronext")
    }

    fn find(name: &str) -> NamedQuery {
        catalog(75)
            .into_iter()
            .find(|q| q.name == name)
            .unwrap()
    }

    #[test]
    fn test_catalog_names() {
        let mut names: Vec<String> = catalog(75).into_iter().map(|q| q.name).collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "selectCommodities",
                "selectCommoditiesByExchange",
                "selectCommoditiesByOwner",
                "selectCommoditiesWithHighQuantity",
                "selectMyAsset",
                "selectMyAssetsByMotoOfExchange",
                "selectMyAssetsByOwner",
                "selectMyAssetsWithHighQuantity",
            ]
        );
    }

    #[test]
    fn test_owner_param_forms() {
        let query = find(SELECT_COMMODITIES_BY_OWNER);
        for owner in [
            "simon@email.com",
            "org.acme.mynetwork.Trader#simon@email.com",
            "resource:org.acme.mynetwork.Trader#simon@email.com",
        ] {
            let built = query
                .build(&QueryParams::new().with(PARAM_OWNER, owner))
                .unwrap();
            assert!(built.matches(&owned_by("simon@email.com", 1)));
            assert!(!built.matches(&owned_by("dan@email.com", 1)));
        }
    }

    #[test]
    fn test_owner_param_rejects_other_types() {
        let query = find(SELECT_COMMODITIES_BY_OWNER);
        let result = query.build(
            &QueryParams::new().with(PARAM_OWNER, "resource:org.acme.mynetwork.Commodity#EMA"),
        );
        assert!(matches!(result, Err(Error::QueryFailure(_))));
        assert!(matches!(
            query.build(&QueryParams::new()),
            Err(Error::QueryFailure(_))
        ));
    }

    #[test]
    fn test_high_quantity_threshold() {
        let query = find(SELECT_COMMODITIES_WITH_HIGH_QUANTITY)
            .build(&QueryParams::new())
            .unwrap();
        assert!(query.matches(&owned_by("dan@email.com", 100)));
        assert!(query.matches(&owned_by("dan@email.com", 75)));
        assert!(!query.matches(&owned_by("dan@email.com", 50)));
    }
}
