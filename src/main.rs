use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use photo_contest_backend::config::AppConfig;
use photo_contest_backend::db::SeaOrmStore;
use photo_contest_backend::handlers;
use photo_contest_backend::repository::Repositories;
use photo_contest_backend::state::AppState;
use photo_contest_backend::create_pool;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    let db = create_pool(&config.database_url)
        .await
        .expect("Failed to connect to the database");

    if config.run_migrations {
        Migrator::up(&db, None)
            .await
            .expect("Failed to run database migrations");
        tracing::info!("Database migrations applied");
    }

    let repos = Repositories::from_store(Arc::new(SeaOrmStore::new(db)));
    let state = web::Data::new(AppState::new(repos, &config));

    spawn_phase_scheduler(state.clone(), config.phase_tick);

    let bind_addr = config.bind_addr();
    let max_upload_bytes = config.max_upload_bytes;
    tracing::info!("Server running at http://{bind_addr}");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .app_data(handlers::payload_config(max_upload_bytes))
            .service(web::scope("/api").configure(handlers::init_routes))
    })
    .bind(&bind_addr)?
    .run()
    .await
}

/// Advance contest phases on a fixed tick. Failures are logged and retried on
/// the next tick.
fn spawn_phase_scheduler(state: web::Data<AppState>, period: std::time::Duration) {
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(period.max(std::time::Duration::from_secs(1)));
        loop {
            interval.tick().await;
            match state.contests.advance_phases(Utc::now()).await {
                Ok(transitions) if !transitions.is_empty() => {
                    tracing::info!(count = transitions.len(), "Scheduled phase advance");
                    state.cache.invalidate_contests();
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Scheduled phase advance failed"),
            }
        }
    });
}
