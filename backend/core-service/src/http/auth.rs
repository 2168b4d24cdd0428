//! Auth routes (§4.4, §6): register/login/refresh/logout plus the
//! passwordless magic-link pair.

use super::AppState;
use crate::error::{CoreError, CoreResult};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
struct RegisteredResponse {
    user_id: uuid::Uuid,
    email: String,
}

async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> CoreResult<HttpResponse> {
    let user = state.session.register(&body.email, &body.password).await?;
    Ok(HttpResponse::Ok().json(RegisteredResponse {
        user_id: user.id,
        email: user.email,
    }))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> CoreResult<HttpResponse> {
    let pair = state.session.login(&body.email, &body.password).await?;
    Ok(HttpResponse::Ok().json(pair))
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

async fn refresh(
    state: web::Data<AppState>,
    body: web::Json<RefreshRequest>,
) -> CoreResult<HttpResponse> {
    let pair = state.session.refresh(&body.refresh_token).await?;
    Ok(HttpResponse::Ok().json(pair))
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

/// The access token itself is read from the `Authorization` header the
/// `JwtAuthMiddleware` already parsed — logout revokes *this* bearer token,
/// not whatever the client happens to put in the body.
async fn logout(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<LogoutRequest>,
) -> CoreResult<HttpResponse> {
    let access_token = bearer_token(&req)?;
    state
        .session
        .logout(access_token, body.refresh_token.as_deref())
        .await?;
    Ok(HttpResponse::Ok().finish())
}

fn bearer_token(req: &HttpRequest) -> CoreResult<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(CoreError::Unauthenticated)
}

#[derive(Debug, Deserialize)]
pub struct MagicSendRequest {
    pub email: String,
}

async fn magic_send(
    state: web::Data<AppState>,
    body: web::Json<MagicSendRequest>,
) -> CoreResult<HttpResponse> {
    state.magic.issue(&body.email).await?;
    Ok(HttpResponse::Ok().finish())
}

#[derive(Debug, Deserialize)]
pub struct MagicVerifyRequest {
    pub token: String,
}

async fn magic_verify(
    state: web::Data<AppState>,
    body: web::Json<MagicVerifyRequest>,
) -> CoreResult<HttpResponse> {
    let pair = state.magic.redeem(&body.token).await?;
    Ok(HttpResponse::Ok().json(pair))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/refresh", web::post().to(refresh))
            .route("/logout", web::post().to(logout))
            .route("/magic/send", web::post().to(magic_send))
            .route("/magic/verify", web::post().to(magic_verify)),
    );
}
