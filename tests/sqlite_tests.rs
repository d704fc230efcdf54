// tests/sqlite_tests.rs
#![cfg(feature = "sqlite")]

use tradenet::{
    Adapter, Error, Network, NetworkConfig, Query, QueryParams, Relationship, ResourceMeta,
    adapters::sqlite::SqliteAdapter,
    model::{self, Commodity, PARAM_OWNER, RemoveHighQuantityCommodities, Trade, Trader},
};

const DAN: &str = "dan@email.com";
const SIMON: &str = "simon@email.com";

async fn memory_adapter() -> SqliteAdapter {
    let adapter = SqliteAdapter::new_memory().await.unwrap();
    adapter.init_schema().await.unwrap();
    adapter
}

fn network(adapter: SqliteAdapter) -> Network {
    let config = NetworkConfig::default().with_high_quantity_threshold(75);
    Network::with_config(Box::new(adapter), model::definition_for(&config), config).unwrap()
}

async fn seed(network: &Network) {
    network
        .participant_registry::<Trader>()
        .unwrap()
        .add_all(&[
            Trader::new(DAN, "Dan", "Selman"),
            Trader::new(SIMON, "Simon", "Stone"),
        ])
        .await
        .unwrap();
    network
        .asset_registry::<Commodity>()
        .unwrap()
        .add_all(&[
            Commodity::new("XYZ", "Soya", "Chicago", 50, Relationship::new(DAN)),
            Commodity::new("EMA", "Corn", "Euronext", 100, Relationship::new(DAN)),
        ])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_sqlite_scenario() {
    let network = network(memory_adapter().await);
    let mut events = network.subscribe();
    seed(&network).await;

    network
        .submit(&Trade::new(Relationship::new("EMA"), Relationship::new(SIMON)))
        .await
        .unwrap();

    let commodities = network.asset_registry::<Commodity>().unwrap();
    let ema = commodities.get("EMA").await.unwrap();
    assert_eq!(ema.owner.id(), SIMON);
    assert_eq!(ema.version(), 1);

    let by_owner = QueryParams::new().with(PARAM_OWNER, "org.acme.mynetwork.Trader#simon@email.com");
    let owned: Vec<Commodity> = network
        .query(model::SELECT_COMMODITIES_BY_OWNER, &by_owner)
        .await
        .unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].id(), "EMA");

    let receipt = network
        .submit(&RemoveHighQuantityCommodities::default())
        .await
        .unwrap();
    assert_eq!(receipt.events_delivered, 1);

    let all: Vec<Commodity> = network
        .query(model::SELECT_COMMODITIES, &QueryParams::new())
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id(), "XYZ");

    let owned: Vec<Commodity> = network
        .query(model::SELECT_COMMODITIES_BY_OWNER, &by_owner)
        .await
        .unwrap();
    assert!(owned.is_empty());

    let mut subjects = Vec::new();
    while let Ok(event) = events.try_recv() {
        subjects.push(event.subject);
    }
    assert_eq!(
        subjects,
        vec![
            "org.acme.mynetwork.Commodity#EMA",
            "org.acme.mynetwork.Commodity#EMA",
        ]
    );
}

#[tokio::test]
async fn test_sqlite_orders_by_id_and_filters() {
    let adapter = memory_adapter().await;
    let network = network(adapter);
    seed(&network).await;

    let commodities = network.asset_registry::<Commodity>().unwrap();
    let all = commodities.get_all().await.unwrap();
    assert_eq!(all[0].id(), "EMA");
    assert_eq!(all[1].id(), "XYZ");

    let euronext = Query::new().where_eq(&Commodity::FIELDS.main_exchange, "Euronext");
    assert_eq!(commodities.count(Some(&euronext)).await.unwrap(), 1);

    let boundary = Query::new().where_gte(&Commodity::FIELDS.quantity, 100_i64);
    assert_eq!(commodities.count(Some(&boundary)).await.unwrap(), 1);

    let prefix = Query::new()
        .where_begins_with(&Commodity::FIELDS.owner, "dan@")
        .with_limit(1);
    assert_eq!(commodities.query(&prefix).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_sqlite_conflict_and_duplicates() {
    let network = network(memory_adapter().await);
    seed(&network).await;
    let commodities = network.asset_registry::<Commodity>().unwrap();

    let mut first = commodities.get("XYZ").await.unwrap();
    let mut stale = first.clone();
    first.quantity = 60;
    commodities.update(&mut first).await.unwrap();

    stale.quantity = 1;
    assert!(matches!(
        commodities.update(&mut stale).await,
        Err(Error::Conflict(_))
    ));

    let result = commodities
        .add_all(&[
            Commodity::new("NEW", "Oats", "Chicago", 5, Relationship::new(DAN)),
            Commodity::new("XYZ", "Soya", "Chicago", 50, Relationship::new(DAN)),
        ])
        .await;
    assert_eq!(
        result.unwrap_err(),
        Error::DuplicateKey("org.acme.mynetwork.Commodity#XYZ".to_string())
    );
    assert!(!commodities.exists("NEW").await.unwrap());

    commodities.remove_by_id("XYZ").await.unwrap();
    let mut gone = first.clone();
    assert!(matches!(
        commodities.update(&mut gone).await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn test_sqlite_file_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("network.db");
    let path = path.to_str().unwrap();

    {
        let adapter = SqliteAdapter::new_file(path).await.unwrap();
        adapter.init_schema().await.unwrap();
        seed(&network(adapter)).await;
    }

    let adapter = SqliteAdapter::new_file(path).await.unwrap();
    adapter.init_schema().await.unwrap();
    let record = adapter.fetch_record("Trader", DAN).await.unwrap().unwrap();
    assert_eq!(record.key(), "Trader#dan@email.com");

    let network = network(adapter);
    let traders = network.participant_registry::<Trader>().unwrap();
    assert_eq!(traders.get(SIMON).await.unwrap().last_name, "Stone");
    assert_eq!(
        network
            .asset_registry::<Commodity>()
            .unwrap()
            .count(None)
            .await
            .unwrap(),
        2
    );
}
