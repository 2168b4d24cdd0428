//! Health routes (§6): unauthenticated liveness/readiness, mounted outside
//! `/api/v1` and the auth/rate-limit middleware stack.

use super::AppState;
use actix_web::{web, HttpResponse};

async fn health() -> HttpResponse {
    HttpResponse::Ok().finish()
}

async fn live() -> HttpResponse {
    HttpResponse::Ok().finish()
}

/// Readiness also checks the database is actually reachable, unlike
/// liveness which just confirms the process is up.
async fn ready(state: web::Data<AppState>) -> HttpResponse {
    match sqlx::query("SELECT 1").execute(&state.store.pool).await {
        Ok(_) => HttpResponse::Ok().finish(),
        Err(err) => {
            tracing::warn!(error = %err, "readiness check failed");
            HttpResponse::ServiceUnavailable().finish()
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/ready", web::get().to(ready))
        .route("/live", web::get().to(live));
}
