use std::collections::HashMap;

use tokio::task::JoinSet;

use crate::{
    catalog::QueryParams,
    error::Error,
    event::Event,
    resource::{Relationship, ResourceMeta, fully_qualified_identifier},
    transaction::{TransactionContext, TransactionStage},
};

use super::{OwnedAsset, Trader};

/// Hand `asset` over to `new_owner`.
///
/// Both references must resolve. The notification built by `notify` is
/// staged before the update and only delivered once the transaction
/// commits, so a failed update leaves no event behind.
pub(crate) async fn transfer_ownership<A, E, F>(
    ctx: &mut TransactionContext,
    asset: &Relationship<A>,
    new_owner: &Relationship<Trader>,
    notify: F,
) -> Result<(), Error>
where
    A: OwnedAsset,
    E: Event,
    F: FnOnce(&A) -> E,
{
    ctx.enter(TransactionStage::ValidatingReferences);
    let assets = ctx.network().asset_registry::<A>()?;
    let traders = ctx.network().participant_registry::<Trader>()?;

    let mut target = assets
        .resolve(asset)
        .await
        .map_err(Error::into_reference)?;
    traders
        .resolve(new_owner)
        .await
        .map_err(Error::into_reference)?;

    ctx.enter(TransactionStage::Mutating);
    let previous_owner = target.owner().clone();
    target.set_owner(new_owner.clone());

    ctx.enter(TransactionStage::Notifying);
    ctx.emit(&notify(&target))?;

    ctx.enter(TransactionStage::Persisting);
    assets.update(&mut target).await?;

    tracing::debug!(
        asset = %target.fully_qualified_identifier(),
        from = %previous_owner.id(),
        to = %new_owner.id(),
        "ownership transferred"
    );
    Ok(())
}

/// Remove every asset returned by the named high-quantity query.
///
/// One notification per match is delivered, in query order, before any
/// removal starts; then all removals run concurrently and are joined.
/// Items are independent: when some removals fail the others stay removed
/// and the error lists both sides. When every removal fails the first
/// item's error is returned as is.
pub(crate) async fn remove_high_quantity<A, E, F>(
    ctx: &mut TransactionContext,
    query_name: &str,
    notify: F,
) -> Result<(), Error>
where
    A: OwnedAsset,
    E: Event,
    F: Fn(&A) -> E,
{
    ctx.enter(TransactionStage::ValidatingReferences);
    let assets = ctx.network().asset_registry::<A>()?;
    let matches: Vec<A> = ctx.network().query(query_name, &QueryParams::new()).await?;

    ctx.enter(TransactionStage::Mutating);
    let ids: Vec<String> = matches.iter().map(|a| a.id().to_string()).collect();
    if ids.is_empty() {
        tracing::debug!(query = query_name, "no assets to remove");
    }

    // subscribers must hold the event before the asset disappears
    ctx.enter(TransactionStage::Notifying);
    for asset in &matches {
        ctx.emit(&notify(asset))?;
    }
    ctx.flush();

    ctx.enter(TransactionStage::Persisting);
    let mut removals = JoinSet::new();
    for id in &ids {
        let registry = assets.clone();
        let id = id.clone();
        removals.spawn(async move {
            let result = registry.remove_by_id(&id).await;
            (id, result)
        });
    }

    let mut outcomes: HashMap<String, Result<(), Error>> = HashMap::with_capacity(ids.len());
    while let Some(joined) = removals.join_next().await {
        match joined {
            Ok((id, result)) => {
                outcomes.insert(id, result);
            }
            Err(err) => {
                tracing::warn!(error = %err, "removal task did not complete");
            }
        }
    }

    let mut removed = Vec::with_capacity(ids.len());
    let mut failed: Vec<(String, Error)> = Vec::new();
    for id in ids {
        match outcomes.remove(&id) {
            Some(Ok(())) => removed.push(id),
            Some(Err(err)) => failed.push((id, err)),
            None => failed.push((
                id,
                Error::Storage("removal task did not complete".to_string()),
            )),
        }
    }

    if failed.is_empty() {
        return Ok(());
    }

    for (id, err) in &failed {
        tracing::warn!(
            asset = %fully_qualified_identifier(&A::fully_qualified_type(), id),
            error = %err,
            "removal failed"
        );
    }

    if removed.is_empty() {
        let (_, first) = failed.swap_remove(0);
        return Err(first);
    }

    Err(Error::PartialBulkFailure {
        removed,
        failed: failed
            .into_iter()
            .map(|(id, err)| (id, err.to_string()))
            .collect(),
    })
}
