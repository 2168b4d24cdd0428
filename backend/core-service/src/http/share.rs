//! Public share-link route (§6): `GET /p/{share_code}` renders a sanitized,
//! unauthenticated view of a profile. Unlike the rest of the HTTP surface
//! this sits outside `/api/v1` and the auth/rate-limit middleware stack —
//! it's meant to be opened from a browser with no session at all.

use super::AppState;
use crate::domain::{Gender, LookingFor};
use crate::error::CoreResult;
use actix_web::{web, HttpResponse};
use serde::Serialize;
use uuid::Uuid;

/// Deliberately narrower than `Profile`: no `lat`/`lng`, no `share_code`
/// itself, nothing that isn't meant for an anonymous viewer.
#[derive(Debug, Serialize)]
struct PublicProfile {
    user_id: Uuid,
    display_name: String,
    bio: String,
    prompts: Vec<String>,
    gender: Gender,
    looking_for: Vec<LookingFor>,
    is_verified: bool,
}

async fn view_shared_profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> CoreResult<HttpResponse> {
    let profile = state
        .store
        .profiles
        .find_by_share_code(&path)
        .await?
        .ok_or(crate::error::CoreError::NotFound("profile"))?;
    Ok(HttpResponse::Ok().json(PublicProfile {
        user_id: profile.user_id,
        display_name: profile.display_name,
        bio: profile.bio,
        prompts: profile.prompts,
        gender: profile.gender,
        looking_for: profile.looking_for,
        is_verified: profile.is_verified,
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/p/{share_code}", web::get().to(view_shared_profile));
}
