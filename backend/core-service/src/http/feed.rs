//! Feed routes (§6): ranked feed and daily picks.

use super::AppState;
use crate::error::CoreResult;
use crate::feed::{self, MAX_FEED_LIMIT, MIN_FEED_LIMIT};
use actix_middleware::UserId;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<i32>,
}

/// Clamps `limit` to `[MIN_FEED_LIMIT, MAX_FEED_LIMIT]` before calling the
/// engine, which documents that responsibility as belonging to the caller.
async fn get_feed(
    state: web::Data<AppState>,
    user: UserId,
    query: web::Query<FeedQuery>,
) -> CoreResult<HttpResponse> {
    let limit = query
        .limit
        .unwrap_or(MAX_FEED_LIMIT)
        .clamp(MIN_FEED_LIMIT, MAX_FEED_LIMIT);
    let result = feed::get_feed(&state.store, user.0, limit, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(result))
}

async fn daily_picks(state: web::Data<AppState>, user: UserId) -> CoreResult<HttpResponse> {
    let picks = feed::get_daily_picks(&state.store, user.0, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(picks))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/feed")
            .route("", web::get().to(get_feed))
            .route("/daily-picks", web::get().to(daily_picks)),
    );
}
