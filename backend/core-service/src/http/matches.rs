//! Match and conversation routes (§6): match listing, messages, the image
//! unlock gate, and typing indicators.

use super::AppState;
use crate::error::{CoreError, CoreResult};
use actix_middleware::UserId;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

async fn list_matches(state: web::Data<AppState>, user: UserId) -> CoreResult<HttpResponse> {
    let matches = state.store.matches.list_for_user(user.0).await?;
    Ok(HttpResponse::Ok().json(matches))
}

async fn get_match(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> CoreResult<HttpResponse> {
    let match_row = state.store.matches.find_by_id(path.into_inner()).await?;
    if !match_row.contains(user.0) {
        return Err(CoreError::Forbidden);
    }
    Ok(HttpResponse::Ok().json(match_row))
}

async fn delete_match(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> CoreResult<HttpResponse> {
    let match_id = path.into_inner();
    let match_row = state.store.matches.find_by_id(match_id).await?;
    if !match_row.contains(user.0) {
        return Err(CoreError::Forbidden);
    }
    state.store.matches.delete(&state.store.pool, match_id).await?;
    Ok(HttpResponse::Ok().finish())
}

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    pub before: Option<Uuid>,
    pub limit: Option<i64>,
}

const DEFAULT_MESSAGE_PAGE: i64 = 50;

async fn get_messages(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
    query: web::Query<MessagesQuery>,
) -> CoreResult<HttpResponse> {
    let messages = state
        .conversation
        .get_messages(
            user.0,
            path.into_inner(),
            query.before,
            query.limit.unwrap_or(DEFAULT_MESSAGE_PAGE),
        )
        .await?;
    Ok(HttpResponse::Ok().json(messages))
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: Option<String>,
    pub encrypted_content: Option<String>,
    pub image_url: Option<String>,
}

async fn send_message(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
    body: web::Json<SendMessageRequest>,
) -> CoreResult<HttpResponse> {
    let message = state
        .conversation
        .send_message(
            user.0,
            path.into_inner(),
            body.content.as_deref(),
            body.encrypted_content.as_deref(),
            body.image_url.as_deref(),
        )
        .await?;
    Ok(HttpResponse::Ok().json(message))
}

async fn images_enable(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> CoreResult<HttpResponse> {
    state
        .conversation
        .set_images_enabled(user.0, path.into_inner(), true)
        .await?;
    Ok(HttpResponse::Ok().finish())
}

async fn images_disable(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> CoreResult<HttpResponse> {
    state
        .conversation
        .set_images_enabled(user.0, path.into_inner(), false)
        .await?;
    Ok(HttpResponse::Ok().finish())
}

/// Thin config-only upload: the core never touches object-storage bytes, it
/// just records a URL the client already uploaded to (presigned elsewhere)
/// and folds it into the message the same way a text send would be.
#[derive(Debug, Deserialize)]
pub struct UploadImageRequest {
    pub image_url: String,
}

async fn images_upload(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
    body: web::Json<UploadImageRequest>,
) -> CoreResult<HttpResponse> {
    let message = state
        .conversation
        .send_message(user.0, path.into_inner(), None, None, Some(&body.image_url))
        .await?;
    Ok(HttpResponse::Ok().json(message))
}

#[derive(Debug, Deserialize)]
pub struct TypingRequest {
    pub is_typing: bool,
}

async fn typing(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
    body: web::Json<TypingRequest>,
) -> CoreResult<HttpResponse> {
    state
        .conversation
        .typing(user.0, path.into_inner(), body.is_typing)
        .await?;
    Ok(HttpResponse::Ok().finish())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/matches")
            .route("", web::get().to(list_matches))
            .route("/{id}", web::get().to(get_match))
            .route("/{id}", web::delete().to(delete_match))
            .route("/{id}/messages", web::get().to(get_messages))
            .route("/{id}/messages", web::post().to(send_message))
            .route("/{id}/images/enable", web::post().to(images_enable))
            .route("/{id}/images/disable", web::post().to(images_disable))
            .route("/{id}/images/upload", web::post().to(images_upload))
            .route("/{id}/typing", web::post().to(typing)),
    );
}
