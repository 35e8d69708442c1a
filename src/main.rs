use std::sync::Arc;
use std::time::Duration;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;

mod api;
mod auth;
mod clients;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod routes;
mod saga;

use config::Config;
use db::init_db;

use crate::clients::directory::{Directory, HttpDirectory};
use crate::clients::engine::{DurableEngine, HttpEngineClient};
use crate::clients::mailer::{HttpMailer, Mailer};
use crate::clients::mysql_store::MySqlRecordStore;
use crate::docs::ApiDoc;
use crate::saga::SagaContext;
use crate::saga::notify::NotifierSettings;
use crate::saga::store::RecordStore;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Hello World!"
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

    let pool = init_db(&config.database_url).await;

    // Composition root: every collaborator is constructed once here and
    // injected; components only ever see the trait handles.
    let store: Arc<dyn RecordStore> = Arc::new(MySqlRecordStore::new(pool));
    let engine: Arc<dyn DurableEngine> =
        Arc::new(HttpEngineClient::new(config.engine_base_url.clone()));
    let directory = Arc::new(HttpDirectory::new(
        config.directory_base_url.clone(),
        Duration::from_secs(config.directory_cache_ttl_secs),
    ));
    let mailer: Arc<dyn Mailer> = Arc::new(HttpMailer::new(
        config.mail_base_url.clone(),
        config.mail_api_key.clone(),
    ));

    let directory_handle: Arc<dyn Directory> = directory.clone();
    let saga_context = Data::new(SagaContext::new(
        store,
        engine,
        directory_handle,
        mailer,
        NotifierSettings {
            sender: config.mail_sender.clone(),
            admin_role: config.admin_role.clone(),
            public_base_url: config.public_base_url.clone(),
            api_prefix: config.api_prefix.clone(),
        },
    ));

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    let directory_for_warmup = directory.clone();
    let admin_role = config.admin_role.clone();
    actix_web::rt::spawn(async move {
        // Prefetch the reviewer audience so the first request event is cheap
        directory_for_warmup.warmup(&admin_role).await;
    });

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(saga_context.clone())
            .app_data(Data::new(config.clone()))
            .service(index)
            // Configure callback + protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
