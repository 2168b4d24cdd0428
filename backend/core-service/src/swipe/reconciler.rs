//! Background match reconciler (§11 supplemented feature). Two requests
//! racing to write the second half of a mutual like can both commit their
//! own `Like` row before either sees the other's — the in-request match
//! probe in [`super::coordinator::like`] only ever reads a committed
//! snapshot, so a pair can momentarily have likes in both directions with
//! no `Match` row yet. This sweep closes that window without requiring a
//! stricter (and slower) isolation level on every swipe.

use crate::db::Store;
use crate::notifications::NotificationDispatcher;
use crate::realtime::{Envelope, RealtimeHub};
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// How often the sweep runs; unresolved pairs are rare (a race, not the
/// common path) so this can be lazy.
pub const RECONCILE_INTERVAL: Duration = Duration::from_secs(30);

/// Unresolved pairs handled per sweep, bounding worst-case query cost.
const BATCH_LIMIT: i64 = 200;

/// Runs until the process exits; intended to be spawned once at startup
/// with `tokio::spawn`.
pub async fn run_reconciler(store: Store, hub: RealtimeHub, notifications: NotificationDispatcher) {
    let mut ticker = tokio::time::interval(RECONCILE_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if let Err(err) = reconcile_once(&store, &hub, &notifications).await {
            tracing::warn!(error = %err, "match reconciler sweep failed");
        }
    }
}

async fn reconcile_once(
    store: &Store,
    hub: &RealtimeHub,
    notifications: &NotificationDispatcher,
) -> crate::error::CoreResult<()> {
    let pairs = store.likes.find_unresolved_mutual_pairs(BATCH_LIMIT).await?;
    if pairs.is_empty() {
        return Ok(());
    }

    tracing::info!(count = pairs.len(), "reconciling unresolved mutual likes");

    for (user_a, user_b) in pairs {
        let mut tx = store.pool.begin().await?;
        let created = crate::db::matches::MatchRepository::insert(&mut *tx, user_a, user_b).await?;
        crate::db::likes::LikeRepository::delete(&mut *tx, user_a, user_b).await?;
        crate::db::likes::LikeRepository::delete(&mut *tx, user_b, user_a).await?;
        crate::db::blocks::BlockRepository::delete_either_direction(&mut *tx, user_a, user_b)
            .await?;
        tx.commit().await?;

        hub.send_to_user(
            user_a,
            Envelope::MatchCreated {
                match_id: created.id,
                other_user_id: user_b,
            },
        )
        .await;
        hub.send_to_user(
            user_b,
            Envelope::MatchCreated {
                match_id: created.id,
                other_user_id: user_a,
            },
        )
        .await;
        notifications.dispatch_match(created.id, user_a, user_b);
    }

    Ok(())
}
