use actix_web::{web, App, HttpResponse, HttpServer};
use anyhow::{Context, Result};
use social_api::config::Config;
use social_api::metrics::{self, MetricsMiddleware};
use social_api::middleware::JwtAuthMiddleware;
use social_api::repository::Repositories;
use social_api::security::JwtKeys;
use social_api::{db, AppServices};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.logging.json);

    info!(
        env = %config.app.env,
        http_port = config.app.http_port,
        "starting social-api"
    );

    let repos = match &config.database {
        Some(database) => {
            let pool = db::init_pool(database).await?;
            Repositories::postgres(pool)
        }
        None => {
            warn!("DATABASE_URL not set; using in-memory storage, data is lost on restart");
            Repositories::in_memory()
        }
    };

    let keys = Arc::new(
        JwtKeys::new(&config.auth.jwt_secret, config.auth.jwt_ttl_secs)
            .context("Failed to initialize JWT keys")?,
    );
    let services = AppServices::new(&repos, keys.clone());
    let users = repos.users.clone();

    let addr = format!("{}:{}", config.app.host, config.app.http_port);
    info!("HTTP server listening on {}", addr);

    HttpServer::new(move || {
        let services = services.clone();
        App::new()
            .wrap(JwtAuthMiddleware::new(keys.clone(), users.clone()))
            .wrap(MetricsMiddleware)
            .wrap(TracingLogger::default())
            .route("/health", web::get().to(health))
            .route("/metrics", web::get().to(metrics::serve_metrics))
            .configure(|cfg| services.configure(cfg))
    })
    .bind(&addr)
    .with_context(|| format!("Failed to bind {}", addr))?
    .run()
    .await
    .context("HTTP server failed")?;

    info!("social-api stopped");
    Ok(())
}
