use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpResponse, HttpServer, Responder, get};
use anyhow::Context;
use dotenvy::dotenv;
use std::sync::Arc;

mod api;
mod config;
mod docs;
mod engine;
mod error;
mod extract;
mod gateway;
mod model;
mod models;
mod nlu;
mod routes;
mod store;

use api::Assistant;
use config::Config;
use gateway::HrGateway;
use nlu::{HttpTranscriber, RasaClassifier, Transcriber};
use store::MokaDraftStore;

use crate::docs::ApiDoc;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env().context("loading configuration")?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "assistant.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(addr = %config.server_addr, "Server starting...");

    let backend = Arc::new(
        HrGateway::new(config.backend_timeout, config.submit_timeout).context("building HR backend client")?,
    );
    let classifier =
        Arc::new(RasaClassifier::new(&config.nlu_url, config.nlu_timeout).context("building NLU client")?);
    let transcriber: Option<Arc<dyn Transcriber>> = match &config.stt_url {
        Some(url) => Some(Arc::new(
            HttpTranscriber::new(url, config.stt_timeout).context("building transcription client")?,
        )),
        None => {
            warn!("STT_URL not set, voice input disabled");
            None
        }
    };
    let drafts = Arc::new(MokaDraftStore::new(config.draft_max_capacity, config.draft_idle_ttl));

    let assistant = Data::new(Assistant::new(
        drafts,
        backend,
        classifier,
        transcriber,
        &config.hr_api_path,
        config.allow_anonymous_drafts,
    ));

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(assistant.clone())
            .service(health)
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(&server_addr)
    .with_context(|| format!("binding {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
