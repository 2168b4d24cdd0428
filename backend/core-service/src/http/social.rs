//! Block and report routes (§6).

use super::AppState;
use crate::error::{CoreError, CoreResult};
use actix_middleware::UserId;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

async fn block(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> CoreResult<HttpResponse> {
    let blocked = path.into_inner();
    if blocked == user.0 {
        return Err(CoreError::SelfTarget);
    }
    let block = state.store.blocks.insert(user.0, blocked).await?;
    Ok(HttpResponse::Ok().json(block))
}

async fn unblock(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> CoreResult<HttpResponse> {
    state.store.blocks.remove(user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().finish())
}

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub reason: String,
}

async fn report(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
    body: web::Json<ReportRequest>,
) -> CoreResult<HttpResponse> {
    let reported = path.into_inner();
    if reported == user.0 {
        return Err(CoreError::SelfTarget);
    }
    let report = state
        .store
        .reports
        .insert(user.0, reported, &body.reason)
        .await?;
    Ok(HttpResponse::Ok().json(report))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/block/{id}").route(web::post().to(block)).route(web::delete().to(unblock)));
    cfg.service(web::resource("/report/{id}").route(web::post().to(report)));
}
