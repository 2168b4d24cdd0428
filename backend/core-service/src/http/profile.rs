//! Profile routes (§6): own-profile read/create/update, preferences, photos.

use super::AppState;
use crate::domain::{age_from_dob, Gender, LookingFor, MAX_AGE, MIN_AGE};
use crate::error::{CoreError, CoreResult};
use actix_middleware::UserId;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

async fn get_profile(state: web::Data<AppState>, user: UserId) -> CoreResult<HttpResponse> {
    let profile = state.store.profiles.find(user.0).await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub display_name: String,
    pub dob: chrono::NaiveDate,
    pub gender: Gender,
    pub zip: String,
    pub bio: String,
    pub looking_for: Vec<LookingFor>,
}

async fn create_profile(
    state: web::Data<AppState>,
    user: UserId,
    body: web::Json<CreateProfileRequest>,
) -> CoreResult<HttpResponse> {
    if age_from_dob(body.dob, Utc::now()) < MIN_AGE {
        return Err(CoreError::Validation(format!(
            "must be at least {MIN_AGE} years old"
        )));
    }
    let profile = state
        .store
        .profiles
        .create(
            user.0,
            &body.display_name,
            body.dob,
            body.gender,
            &body.zip,
            &body.bio,
            &body.looking_for,
        )
        .await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: String,
    pub neighborhood: Option<String>,
    pub bio: String,
    pub prompts: Vec<String>,
    pub looking_for: Vec<LookingFor>,
}

async fn update_profile(
    state: web::Data<AppState>,
    user: UserId,
    body: web::Json<UpdateProfileRequest>,
) -> CoreResult<HttpResponse> {
    let profile = state
        .store
        .profiles
        .update(
            user.0,
            &body.display_name,
            body.neighborhood.as_deref(),
            &body.bio,
            &body.prompts,
            &body.looking_for,
        )
        .await?;
    Ok(HttpResponse::Ok().json(profile))
}

async fn get_preferences(state: web::Data<AppState>, user: UserId) -> CoreResult<HttpResponse> {
    let prefs = state.store.preferences.find_or_default(user.0).await?;
    Ok(HttpResponse::Ok().json(prefs))
}

#[derive(Debug, Deserialize)]
pub struct UpdatePreferencesRequest {
    pub genders_seeking: Vec<Gender>,
    pub age_min: i32,
    pub age_max: i32,
    pub distance_miles: i32,
    pub visible_to_genders: Vec<Gender>,
    pub hard_block_genders: Vec<Gender>,
    pub hard_block_age_min: Option<i32>,
    pub hard_block_age_max: Option<i32>,
}

async fn update_preferences(
    state: web::Data<AppState>,
    user: UserId,
    body: web::Json<UpdatePreferencesRequest>,
) -> CoreResult<HttpResponse> {
    if body.age_min < MIN_AGE || body.age_max > MAX_AGE || body.age_min > body.age_max {
        return Err(CoreError::Validation(format!(
            "age range must satisfy {MIN_AGE} <= age_min <= age_max <= {MAX_AGE}"
        )));
    }
    let prefs = state
        .store
        .preferences
        .upsert(
            user.0,
            &body.genders_seeking,
            body.age_min,
            body.age_max,
            body.distance_miles,
            &body.visible_to_genders,
            &body.hard_block_genders,
            body.hard_block_age_min,
            body.hard_block_age_max,
        )
        .await?;
    Ok(HttpResponse::Ok().json(prefs))
}

async fn list_photos(state: web::Data<AppState>, user: UserId) -> CoreResult<HttpResponse> {
    let photos = state.store.photos.list_for_user(user.0).await?;
    Ok(HttpResponse::Ok().json(photos))
}

#[derive(Debug, Deserialize)]
pub struct AddPhotoRequest {
    pub url: String,
}

async fn add_photo(
    state: web::Data<AppState>,
    user: UserId,
    body: web::Json<AddPhotoRequest>,
) -> CoreResult<HttpResponse> {
    let photo = state.store.photos.add(user.0, &body.url).await?;
    Ok(HttpResponse::Ok().json(photo))
}

async fn remove_photo(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> CoreResult<HttpResponse> {
    state.store.photos.remove(user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().finish())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/profile")
            .route("", web::get().to(get_profile))
            .route("", web::post().to(create_profile))
            .route("", web::put().to(update_profile))
            .route("/preferences", web::get().to(get_preferences))
            .route("/preferences", web::put().to(update_preferences))
            .route("/photos", web::get().to(list_photos))
            .route("/photos", web::post().to(add_photo))
            .route("/photos/{id}", web::delete().to(remove_photo)),
    );
}
