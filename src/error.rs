use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::{Display, Error};

use crate::models::{Envelope, codes};

pub const FALLBACK_MESSAGE: &str =
    "Sorry, something went wrong while processing your request. Please try again.";

/// Request-level failures. Each renders itself as an envelope.
#[derive(Debug, Display, Error)]
pub enum AppError {
    #[display(fmt = "callerIdentity.uid is required")]
    MissingIdentity,
    #[display(fmt = "callParams.Domain is required")]
    MissingDomain,
    #[display(fmt = "invalid Domain: {}", _0)]
    InvalidDomain(#[error(not(source))] String),
    #[display(fmt = "text must not be empty")]
    EmptyUtterance,
    #[display(fmt = "intent classifier unavailable: {}", _0)]
    Classifier(#[error(not(source))] String),
    #[display(fmt = "transcription failed: {}", _0)]
    Transcription(#[error(not(source))] String),
    #[display(fmt = "audio transcription is not configured")]
    AudioDisabled,
    #[display(fmt = "bad payload: {}", _0)]
    BadPayload(#[error(not(source))] String),
    #[display(fmt = "internal error: {}", _0)]
    Internal(#[error(not(source))] String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::MissingIdentity => codes::MISSING_IDENTITY,
            AppError::MissingDomain => codes::MISSING_DOMAIN,
            AppError::InvalidDomain(_) => codes::INVALID_DOMAIN,
            AppError::EmptyUtterance => codes::EMPTY_UTTERANCE,
            AppError::BadPayload(_) => codes::BAD_PAYLOAD,
            AppError::Classifier(_) => codes::CLASSIFIER_UNAVAILABLE,
            AppError::Transcription(_) => codes::TRANSCRIPTION_FAILED,
            AppError::AudioDisabled => codes::AUDIO_DISABLED,
            AppError::Internal(_) => codes::INTERNAL,
        }
    }

    fn user_message(&self) -> &'static str {
        match self {
            AppError::MissingIdentity => "I couldn't tell who you are. Please sign in again.",
            AppError::MissingDomain | AppError::InvalidDomain(_) => {
                "The HR system address is not configured for this request."
            }
            AppError::EmptyUtterance => "Please type or say something.",
            AppError::BadPayload(_) => "The request could not be read.",
            AppError::Transcription(_) => "Sorry, I couldn't understand the audio.",
            AppError::AudioDisabled => "Voice input is not available right now.",
            AppError::Classifier(_) | AppError::Internal(_) => FALLBACK_MESSAGE,
        }
    }

    pub fn envelope(&self) -> Envelope {
        Envelope::failure(self.code(), self.to_string()).with_message(self.user_message())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingIdentity
            | AppError::MissingDomain
            | AppError::InvalidDomain(_)
            | AppError::EmptyUtterance
            | AppError::BadPayload(_) => StatusCode::BAD_REQUEST,
            AppError::Classifier(_) | AppError::Transcription(_) => StatusCode::BAD_GATEWAY,
            AppError::AudioDisabled => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        tracing::warn!(code = self.code(), error = %self, "Request failed");
        HttpResponse::build(self.status_code()).json(self.envelope())
    }
}
