use actix_cors::Cors;
use actix_middleware::{
    CorrelationIdMiddleware, JwtAuthMiddleware, Logging, MetricsMiddleware, TokenRevocationMiddleware,
};
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use core_service::auth::{MagicAuthService, SessionService};
use core_service::conversation::{ConversationService, ModerationClient};
use core_service::db::Store;
use core_service::http::{self, AppState};
use core_service::notifications::{EmailClient, NotificationDispatcher, PushClient};
use core_service::realtime::RealtimeHub;
use core_service::swipe::{run_reconciler, SwipeCoordinator};
use core_service::Config;
use redis::aio::ConnectionManager;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = Config::from_env()?;
    tracing::info!(env = %config.app.env, "starting core-service");

    crypto_core::jwt::initialize_jwt_secret(&config.auth.jwt_hmac_secret)
        .map_err(|e| anyhow::anyhow!("failed to initialize jwt secret: {e}"))?;

    let pool = db_pool::create_pool(config.database.clone()).await?;
    db_pool::migrate(&pool, "./migrations").await?;
    let store = Store::new(pool);

    // Token revocation and cached JWT validation both key off this handle
    // (§9 "any concurrency" — cache correctness degrades gracefully but
    // revocation correctness doesn't, so the connection is required at boot).
    let redis_url = config
        .redis
        .url
        .clone()
        .context("REDIS_URL must be set (required for token revocation)")?;
    let redis_client = redis::Client::open(redis_url)?;
    let redis_conn = Arc::new(Mutex::new(ConnectionManager::new(redis_client).await?));

    let hub = RealtimeHub::new();
    let push = PushClient::new(config.push.clone());
    let email = EmailClient::new(config.email.clone());
    let moderation = ModerationClient::new(config.moderation.clone());
    let notifications = NotificationDispatcher::spawn(store.clone(), push, email);

    let session = SessionService::new(store.clone(), Some(redis_conn.clone()), &config.auth);
    let magic = MagicAuthService::new(store.clone(), session.clone(), notifications.clone());
    let swipe = SwipeCoordinator::new(store.clone(), hub.clone(), notifications.clone());
    let conversation =
        ConversationService::new(store.clone(), hub.clone(), notifications.clone(), moderation);

    tokio::spawn(run_reconciler(store.clone(), hub.clone(), notifications.clone()));

    let app_state = web::Data::new(AppState {
        store,
        hub,
        notifications,
        session,
        magic,
        swipe,
        conversation,
    });

    let bind_addr = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!(%bind_addr, "binding http server");
    let allowed_origins = config.cors.allowed_origins.clone();

    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in &allowed_origins {
            cors = if origin == "*" {
                cors.allow_any_origin()
            } else {
                cors.allowed_origin(origin)
            };
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(app_state.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(Logging)
            .configure(http::health::configure)
            .configure(http::share::configure)
            .service(
                // `.wrap()` nests outward: the last call here runs first,
                // so correlation ids and metrics wrap every request,
                // revocation and JWT validation gate the handler.
                http::api_scope()
                    .wrap(JwtAuthMiddleware::with_cache(redis_conn.clone(), 60))
                    .wrap(TokenRevocationMiddleware::new(redis_conn.clone()))
                    .wrap(MetricsMiddleware)
                    .wrap(CorrelationIdMiddleware),
            )
    })
    .bind(&bind_addr)?
    .run();

    tokio::select! {
        result = server => result.context("http server error")?,
        _ = shutdown_signal() => tracing::info!("shutdown signal received, stopping"),
    }

    Ok(())
}
