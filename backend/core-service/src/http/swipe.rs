//! Swipe routes (§6): like, superlike, pass, rewind.

use super::AppState;
use crate::error::CoreResult;
use actix_middleware::UserId;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

async fn like(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> CoreResult<HttpResponse> {
    let outcome = state.swipe.like(user.0, path.into_inner(), false, None).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

#[derive(Debug, Deserialize)]
pub struct SuperlikeMessageRequest {
    pub message: String,
}

async fn superlike(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> CoreResult<HttpResponse> {
    let outcome = state.swipe.like(user.0, path.into_inner(), true, None).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

async fn superlike_with_message(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
    body: web::Json<SuperlikeMessageRequest>,
) -> CoreResult<HttpResponse> {
    let outcome = state
        .swipe
        .like(user.0, path.into_inner(), true, Some(body.message.as_str()))
        .await?;
    Ok(HttpResponse::Ok().json(outcome))
}

async fn pass(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> CoreResult<HttpResponse> {
    state.swipe.pass(user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().finish())
}

async fn rewind(state: web::Data<AppState>, user: UserId) -> CoreResult<HttpResponse> {
    let profile = state.swipe.rewind(user.0).await?;
    Ok(HttpResponse::Ok().json(profile))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/feed")
            .route("/like/{id}", web::post().to(like))
            .route("/superlike/{id}", web::post().to(superlike))
            .route(
                "/superlike/{id}/message",
                web::post().to(superlike_with_message),
            )
            .route("/pass/{id}", web::post().to(pass))
            .route("/rewind", web::post().to(rewind)),
    );
}
