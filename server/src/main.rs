use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use linkup_server::clients::{
    HttpTaskScheduler, RemoteAuthVerifier, RemoteMediaUploader, SmtpEmailSender,
};
use linkup_server::handlers;
use linkup_server::realtime::ConnectionManager;
use linkup_server::{AppState, Config};

async fn health(state: web::Data<AppState>) -> HttpResponse {
    match sqlx::query("SELECT 1").fetch_one(&state.pool).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "linkup-server",
            "version": env!("CARGO_PKG_VERSION"),
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("database connection failed: {}", e),
            "service": "linkup-server",
        })),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().map_err(anyhow::Error::msg)?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .context("failed to connect to postgres")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    let email = SmtpEmailSender::new(&config.email)?;

    let state = web::Data::new(AppState {
        pool,
        config: config.clone(),
        auth: Arc::new(RemoteAuthVerifier::new(config.auth.verify_url.clone())),
        media: Arc::new(RemoteMediaUploader::new(
            config.media.upload_url.clone(),
            config.media.clone(),
        )),
        email: Arc::new(email),
        scheduler: Arc::new(HttpTaskScheduler::new(config.scheduler.url.clone())),
        live: ConnectionManager::new(),
    });

    let bind_addr = (config.app.host.clone(), config.app.port);
    tracing::info!(host = %config.app.host, port = config.app.port, "starting linkup-server");

    let cors_origins = config.allowed_origins();
    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);
        for origin in &cors_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(state.clone())
            .route("/health", web::get().to(health))
            .configure(handlers::configure)
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}
