use actix_web::http::header::CONTENT_TYPE;
use actix_web::{HttpRequest, HttpResponse, web};
use chrono::{Local, NaiveDate};
use futures::FutureExt;
use serde_json::{Map, Value};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tracing::{Instrument, error, info_span};
use uuid::Uuid;

use crate::api::dispatch::Assistant;
use crate::error::AppError;
use crate::models::{AnalyzeRequest, AudioQuery, Envelope};

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Runs the request body; a panic becomes the generic fallback envelope.
async fn guarded<F>(work: F) -> Result<Envelope, AppError>
where
    F: Future<Output = Result<Envelope, AppError>>,
{
    match AssertUnwindSafe(work).catch_unwind().await {
        Ok(result) => result,
        Err(_) => {
            error!("Request handler panicked");
            Err(AppError::Internal("handler panicked".into()))
        }
    }
}

/// Query-string blobs arrive JSON-encoded; absent means empty.
fn decode_blob(raw: Option<&str>, name: &str) -> Result<Map<String, Value>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(Map::new()),
        Some(raw) => serde_json::from_str(raw).map_err(|e| AppError::BadPayload(format!("{name}: {e}"))),
    }
}

/* =========================
Text utterance
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/analyze",
    request_body(
        content = AnalyzeRequest,
        description = "Utterance plus the caller's identity and call parameters",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Reply envelope", body = Object, example = json!({
            "responseCode": "0000",
            "responseData": "Awaiting leave dates",
            "message": "For which dates? You can say something like 20/08/2025 to 22/08/2025, or today / tomorrow.",
            "state": "awaiting_dates",
            "draft": {"leaveTypeId": 2, "leaveTypeName": "Sick Leave", "fromDate": null, "toDate": null, "reason": null},
            "intent": "apply_leave",
            "confidence": 0.97
        })),
        (status = 400, description = "Missing uid or Domain, or empty text", body = Object, example = json!({
            "responseCode": "4002",
            "responseData": "callParams.Domain is required",
            "message": "The HR system address is not configured for this request."
        })),
        (status = 502, description = "Intent classifier unavailable")
    ),
    tag = "Assistant"
)]
pub async fn analyze(
    assistant: web::Data<Assistant>,
    payload: web::Json<AnalyzeRequest>,
) -> Result<HttpResponse, AppError> {
    let request_id = Uuid::new_v4();
    let AnalyzeRequest {
        text,
        caller_identity,
        call_params,
    } = payload.into_inner();

    let envelope = guarded(assistant.respond(&text, caller_identity, call_params, today()))
        .instrument(info_span!("analyze", %request_id))
        .await?;

    Ok(HttpResponse::Ok().json(envelope))
}

/* =========================
Voice utterance
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/analyze_audio",
    params(AudioQuery),
    request_body(
        content = Vec<u8>,
        description = "Raw audio; the Content-Type header is forwarded to the transcriber",
        content_type = "application/octet-stream"
    ),
    responses(
        (status = 200, description = "Reply envelope with the transcription", body = Object, example = json!({
            "responseCode": "0000",
            "responseData": "Awaiting leave reason",
            "message": "What is the reason for your leave?",
            "state": "awaiting_reason",
            "transcription": "sick leave today",
            "intent": "apply_leave",
            "confidence": 0.91
        })),
        (status = 400, description = "Malformed query blobs, missing uid or Domain"),
        (status = 502, description = "Transcription or classification failed"),
        (status = 503, description = "Voice input not configured")
    ),
    tag = "Assistant"
)]
pub async fn analyze_audio(
    assistant: web::Data<Assistant>,
    query: web::Query<AudioQuery>,
    req: HttpRequest,
    audio: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let request_id = Uuid::new_v4();
    let AudioQuery {
        caller_identity,
        call_params,
    } = query.into_inner();
    let identity = decode_blob(caller_identity.as_deref(), "callerIdentity")?;
    let params = decode_blob(call_params.as_deref(), "callParams")?;
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let work = async {
        let text = assistant.transcribe(audio, &content_type).await?;
        let envelope = assistant.respond(&text, identity, params, today()).await?;
        Ok(envelope.with("transcription", text))
    };
    let envelope = guarded(work)
        .instrument(info_span!("analyze_audio", %request_id))
        .await?;

    Ok(HttpResponse::Ok().json(envelope))
}
