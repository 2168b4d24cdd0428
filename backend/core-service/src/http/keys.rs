//! E2E public key routes (§6): the core stores and returns an opaque
//! base64-encoded public key per user, nothing more.

use super::AppState;
use crate::error::{CoreError, CoreResult};
use actix_middleware::UserId;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SetPublicKeyRequest {
    pub public_key: String,
}

async fn set_public_key(
    state: web::Data<AppState>,
    user: UserId,
    body: web::Json<SetPublicKeyRequest>,
) -> CoreResult<HttpResponse> {
    state
        .store
        .public_keys
        .upsert(user.0, &body.public_key)
        .await?;
    Ok(HttpResponse::Ok().finish())
}

#[derive(Debug, Serialize)]
struct PublicKeyResponse {
    public_key: String,
}

async fn get_public_key(state: web::Data<AppState>, user: UserId) -> CoreResult<HttpResponse> {
    let public_key = state
        .store
        .public_keys
        .find(user.0)
        .await?
        .ok_or(CoreError::NotFound("public key"))?;
    Ok(HttpResponse::Ok().json(PublicKeyResponse { public_key }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/keys/public")
            .route(web::post().to(set_public_key))
            .route(web::get().to(get_public_key)),
    );
}
