use crate::{api::assistant, config::Config, error::AppError};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;

/// Upper bound on an uploaded audio clip.
const MAX_AUDIO_BYTES: usize = 16 * 1024 * 1024;

// Helper to build per-scope limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(build_limiter(config.rate_assistant_per_min))
            .app_data(
                web::JsonConfig::default()
                    .error_handler(|err, _| AppError::BadPayload(err.to_string()).into()),
            )
            .app_data(
                web::QueryConfig::default()
                    .error_handler(|err, _| AppError::BadPayload(err.to_string()).into()),
            )
            .service(web::resource("/analyze").route(web::post().to(assistant::analyze)))
            .service(
                web::resource("/analyze_audio")
                    .app_data(web::PayloadConfig::new(MAX_AUDIO_BYTES))
                    .route(web::post().to(assistant::analyze_audio)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Assistant;
    use crate::gateway::testing::FakeBackend;
    use crate::nlu::classifier::testing::FixedClassifier;
    use crate::store::MokaDraftStore;
    use actix_web::http::StatusCode;
    use actix_web::App;
    use actix_web::test as actix_test;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::time::Duration;

    fn assistant() -> web::Data<Assistant> {
        web::Data::new(Assistant::new(
            Arc::new(MokaDraftStore::new(100, Duration::from_secs(60))),
            Arc::new(FakeBackend::default()),
            Arc::new(FixedClassifier("greet")),
            None,
            "/api/AjaxAPI",
            false,
        ))
    }

    fn config(rate: u32) -> Config {
        let mut config = Config::from_source(|_| None).unwrap();
        config.rate_assistant_per_min = rate;
        config
    }

    #[actix_web::test]
    async fn analyze_is_mounted_under_prefix() {
        let config = config(120);
        let app = actix_test::init_service(
            App::new()
                .app_data(assistant())
                .configure(|cfg| configure(cfg, config.clone())),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/analyze")
            .peer_addr("127.0.0.1:40000".parse().unwrap())
            .set_json(json!({"text": "hi", "callerIdentity": {"uid": "u1"}}))
            .to_request();
        let envelope: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(envelope["responseData"], "Greeting");
    }

    #[actix_web::test]
    async fn malformed_json_is_a_bad_payload_envelope() {
        let config = config(120);
        let app = actix_test::init_service(
            App::new()
                .app_data(assistant())
                .configure(|cfg| configure(cfg, config.clone())),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/analyze")
            .peer_addr("127.0.0.1:40000".parse().unwrap())
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"text\": ")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let envelope: Value = actix_test::read_body_json(resp).await;
        assert_eq!(envelope["responseCode"], crate::models::codes::BAD_PAYLOAD);
    }
}
