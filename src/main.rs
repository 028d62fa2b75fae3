use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod model;
mod models;
mod notify;
mod routes;
mod store;
mod workflow;

use config::Config;
use db::{ensure_schema, init_db};
use notify::LogNotifier;
use store::LeaveStore;
use store::memory::MemoryLeaveStore;
use store::mysql::MySqlLeaveStore;
use workflow::machine::ApprovalPolicy;
use workflow::orchestrator::LeaveService;

use crate::docs::ApiDoc;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Leave approval workflow service"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let store: Arc<dyn LeaveStore> = match config.database_url.as_deref() {
        Some(url) => {
            let pool = init_db(url).await;
            ensure_schema(&pool)
                .await
                .expect("Failed to create leave_requests table");
            Arc::new(MySqlLeaveStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, using the in-memory store (state is not persisted)");
            Arc::new(MemoryLeaveStore::new())
        }
    };

    let service = LeaveService::new(
        store,
        Arc::new(LogNotifier),
        ApprovalPolicy {
            approve_comments_required: config.approve_comments_required,
        },
        Duration::from_millis(config.op_timeout_ms),
    );
    let service_data = Data::new(service);

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(service_data.clone())
            .app_data(Data::new(config.clone()))
            .service(index)
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
