use crate::db::Store;
use crate::domain::{Profile, LIKE_COST, SUPERLIKE_COST};
use crate::error::{CoreError, CoreResult};
use crate::notifications::NotificationDispatcher;
use crate::realtime::{Envelope, RealtimeHub};
use chrono::Utc;
use uuid::Uuid;

#[derive(Debug, Clone, serde::Serialize)]
pub struct LikeOutcome {
    pub matched: bool,
    pub match_id: Option<Uuid>,
}

/// Thin handle bundling the collaborators a swipe needs: storage, the
/// realtime hub for `match_created`, and the notification dispatcher for
/// the push/email side effect. Constructed once at startup and cloned into
/// `http` handler state (all three fields are themselves cheap `Clone`s).
#[derive(Clone)]
pub struct SwipeCoordinator {
    store: Store,
    hub: RealtimeHub,
    notifications: NotificationDispatcher,
}

impl SwipeCoordinator {
    pub fn new(store: Store, hub: RealtimeHub, notifications: NotificationDispatcher) -> Self {
        Self {
            store,
            hub,
            notifications,
        }
    }

    pub async fn like(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
        is_superlike: bool,
        attached_message: Option<&str>,
    ) -> CoreResult<LikeOutcome> {
        like(
            &self.store,
            &self.hub,
            &self.notifications,
            actor_id,
            target_id,
            is_superlike,
            attached_message,
        )
        .await
    }

    pub async fn pass(&self, actor_id: Uuid, target_id: Uuid) -> CoreResult<()> {
        pass(&self.store, actor_id, target_id).await
    }

    pub async fn rewind(&self, actor_id: Uuid) -> CoreResult<Profile> {
        rewind(&self.store, actor_id).await
    }
}

/// Like/Superlike (§4.2). Rejections, in order: `SelfTarget`, stealth
/// shadowban, `NoCredit`, `DuplicateLike` (from the unique-constraint
/// insert). Per §8's worked example (shadowbanned user S likes N), a
/// shadowbanned actor's Like is "never persisted" at all — nothing is
/// written, no credit is touched, and the response is indistinguishable
/// from an ordinary non-match (`{matched: false}`). §4.2's literal
/// rejection clause also names "target shadowbanned"; covering both
/// directions keeps a normal user's like on a (globally feed-excluded)
/// shadowbanned profile from ever producing a match either.
pub async fn like(
    store: &Store,
    hub: &RealtimeHub,
    notifications: &NotificationDispatcher,
    actor_id: Uuid,
    target_id: Uuid,
    is_superlike: bool,
    attached_message: Option<&str>,
) -> CoreResult<LikeOutcome> {
    if actor_id == target_id {
        return Err(CoreError::SelfTarget);
    }

    let actor = store.users.find_by_id(actor_id).await?;
    let target = store.users.find_by_id(target_id).await?;
    if actor.is_shadowbanned() || target.is_shadowbanned() {
        return Ok(LikeOutcome {
            matched: false,
            match_id: None,
        });
    }

    let cost = if is_superlike {
        SUPERLIKE_COST
    } else {
        LIKE_COST
    };

    let mut tx = store.pool.begin().await?;

    let debited = crate::db::credits::CreditRepository::debit(&mut *tx, actor_id, cost).await?;
    let Some(_) = debited else {
        tx.rollback().await?;
        let available = store.credits.peek(actor_id).await?;
        return Err(CoreError::NoCredit {
            required: cost,
            available: available.balance + available.bonus_likes,
        });
    };

    crate::db::likes::LikeRepository::insert(
        &mut *tx,
        actor_id,
        target_id,
        is_superlike,
        attached_message,
    )
    .await?;

    let reverse =
        crate::db::likes::LikeRepository::find_reverse(&mut *tx, actor_id, target_id).await?;

    let outcome = if let Some(_reverse_like) = reverse {
        let created = crate::db::matches::MatchRepository::insert(&mut *tx, actor_id, target_id)
            .await?;
        crate::db::likes::LikeRepository::delete(&mut *tx, actor_id, target_id).await?;
        crate::db::likes::LikeRepository::delete(&mut *tx, target_id, actor_id).await?;
        crate::db::blocks::BlockRepository::delete_either_direction(
            &mut *tx, actor_id, target_id,
        )
        .await?;

        LikeOutcome {
            matched: true,
            match_id: Some(created.id),
        }
    } else {
        LikeOutcome {
            matched: false,
            match_id: None,
        }
    };

    tx.commit().await?;

    if let Some(match_id) = outcome.match_id {
        emit_match_created(hub, notifications, match_id, actor_id, target_id).await;
    } else {
        notifications.dispatch_like(target_id);
    }

    Ok(outcome)
}

/// Fires the `match_created` realtime event to both sides and hands the
/// push/email side effect to the dispatcher. Runs after commit so a slow
/// or failed notification never threatens the transaction (§4.2 "commit;
/// emit match event asynchronously").
async fn emit_match_created(
    hub: &RealtimeHub,
    notifications: &NotificationDispatcher,
    match_id: Uuid,
    user_a: Uuid,
    user_b: Uuid,
) {
    hub.send_to_user(
        user_a,
        Envelope::MatchCreated {
            match_id,
            other_user_id: user_b,
        },
    )
    .await;
    hub.send_to_user(
        user_b,
        Envelope::MatchCreated {
            match_id,
            other_user_id: user_a,
        },
    )
    .await;

    notifications.dispatch_match(match_id, user_a, user_b);
}

/// Pass (§4.2): idempotent upsert, no transaction needed since there is no
/// credit cost and no match to detect.
pub async fn pass(store: &Store, actor_id: Uuid, target_id: Uuid) -> CoreResult<()> {
    if actor_id == target_id {
        return Err(CoreError::SelfTarget);
    }
    store.passes.insert(actor_id, target_id).await?;
    Ok(())
}

/// Rewind (§4.2): undoes the caller's own most recent Pass within the
/// 30-second window, returning the previously-passed profile to the top of
/// the feed. Expired windows and passes that already turned into a Match
/// in the meantime (via the other side's reciprocal like, unlikely but
/// possible) are rejected distinctly so the client can render either case.
pub async fn rewind(store: &Store, actor_id: Uuid) -> CoreResult<Profile> {
    let last_pass = store
        .passes
        .last_pass_by(actor_id)
        .await?
        .ok_or(CoreError::RewindExpired)?;

    let elapsed = Utc::now().signed_duration_since(last_pass.created_at);
    if elapsed.num_seconds() > crate::domain::REWIND_WINDOW_SECONDS {
        return Err(CoreError::RewindExpired);
    }

    if store
        .matches
        .find_by_pair(actor_id, last_pass.passed_id)
        .await?
        .is_some()
    {
        return Err(CoreError::AlreadyMatched);
    }

    store
        .passes
        .delete(actor_id, last_pass.passed_id)
        .await?;

    store.profiles.find(last_pass.passed_id).await
}
