use actix_web::web::Bytes;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::field::Empty;
use tracing::{Span, info, instrument, warn};

use crate::engine::{SlotFillingEngine, Turn};
use crate::error::AppError;
use crate::extract::extract_month;
use crate::gateway::{CallContext, HrBackend, queries};
use crate::model::intent::Intent;
use crate::model::leave_type::LeaveType;
use crate::models::Envelope;
use crate::nlu::{IntentClassifier, Transcriber};
use crate::store::DraftStore;

/// Draft key used when anonymous callers are allowed.
pub const ANONYMOUS_USER: &str = "default";

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Reply {
    Greeting,
    Goodbye,
    NotUnderstood,
}

impl Reply {
    pub fn envelope(self) -> Envelope {
        let (data, message) = match self {
            Reply::Greeting => (
                "Greeting",
                "Hello! I can help you apply for leave, check your leave balance, \
                 see upcoming holidays and fetch your payslip. What would you like to do?",
            ),
            Reply::Goodbye => ("Goodbye", "Goodbye! Have a great day."),
            Reply::NotUnderstood => (
                "Intent not recognised",
                "Sorry, I didn't understand that. You can ask me to apply for leave, \
                 check your leave balance, list holidays or show your payslip.",
            ),
        };
        Envelope::success(data).with_message(message)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ReadQuery {
    LeaveBalance(Option<LeaveType>),
    Holidays,
    Payslip,
    PayslipForMonth,
    LeavePolicy,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Route {
    Reply(Reply),
    CancelDraft,
    SlotFilling,
    ReadOnly(ReadQuery),
}

/// Pure intent → handler lookup. `cancel_leave` is checked first; after that
/// an open draft captures every intent.
pub fn route(intent: &Intent, has_draft: bool) -> Route {
    match intent {
        Intent::CancelLeave => Route::CancelDraft,
        _ if has_draft => Route::SlotFilling,
        Intent::ApplyLeave => Route::SlotFilling,
        Intent::Greet => Route::Reply(Reply::Greeting),
        Intent::Goodbye => Route::Reply(Reply::Goodbye),
        Intent::LeaveBalance
        | Intent::CasualLeaveBalance
        | Intent::SickLeaveBalance
        | Intent::EarnedLeaveBalance
        | Intent::CompensatoryLeaveBalance => Route::ReadOnly(ReadQuery::LeaveBalance(intent.balance_filter())),
        Intent::HolidayList => Route::ReadOnly(ReadQuery::Holidays),
        Intent::Payslip => Route::ReadOnly(ReadQuery::Payslip),
        Intent::PayslipForMonth => Route::ReadOnly(ReadQuery::PayslipForMonth),
        Intent::LeavePolicy => Route::ReadOnly(ReadQuery::LeavePolicy),
        Intent::Unrecognized(_) => Route::Reply(Reply::NotUnderstood),
    }
}

/// The draft key: `uid` from the caller identity.
pub fn caller_uid(identity: &Map<String, Value>, allow_anonymous: bool) -> Result<String, AppError> {
    let uid = match identity.get("uid") {
        Some(Value::String(s)) => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
    .filter(|uid| !uid.is_empty());

    match uid {
        Some(uid) => Ok(uid),
        None if allow_anonymous => {
            warn!("Caller has no uid, using the shared anonymous draft");
            Ok(ANONYMOUS_USER.to_string())
        }
        None => Err(AppError::MissingIdentity),
    }
}

/// Classifies an utterance and answers it: canned reply, backend read,
/// or a turn of the leave flow.
pub struct Assistant {
    engine: SlotFillingEngine,
    backend: Arc<dyn HrBackend>,
    classifier: Arc<dyn IntentClassifier>,
    transcriber: Option<Arc<dyn Transcriber>>,
    api_path: String,
    allow_anonymous: bool,
}

impl Assistant {
    pub fn new(
        store: Arc<dyn DraftStore>,
        backend: Arc<dyn HrBackend>,
        classifier: Arc<dyn IntentClassifier>,
        transcriber: Option<Arc<dyn Transcriber>>,
        api_path: &str,
        allow_anonymous: bool,
    ) -> Self {
        Self {
            engine: SlotFillingEngine::new(store, backend.clone()),
            backend,
            classifier,
            transcriber,
            api_path: api_path.to_string(),
            allow_anonymous,
        }
    }

    pub async fn transcribe(&self, audio: Bytes, content_type: &str) -> Result<String, AppError> {
        let transcriber = self.transcriber.as_ref().ok_or(AppError::AudioDisabled)?;
        transcriber.transcribe(audio, content_type).await
    }

    #[instrument(name = "respond", skip_all, fields(user_id = Empty, intent = Empty))]
    pub async fn respond(
        &self,
        text: &str,
        identity: Map<String, Value>,
        params: Map<String, Value>,
        today: NaiveDate,
    ) -> Result<Envelope, AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::EmptyUtterance);
        }

        let user_id = caller_uid(&identity, self.allow_anonymous)?;
        Span::current().record("user_id", user_id.as_str());

        let classified = self.classifier.classify(text).await?;
        Span::current().record("intent", classified.name.as_str());
        let intent = classified.intent();

        let target = route(&intent, self.engine.has_draft(&user_id).await);
        info!(route = ?target, confidence = classified.confidence, "Intent routed");

        let envelope = match target {
            Route::Reply(reply) => reply.envelope(),
            Route::CancelDraft => self.engine.cancel(&user_id).await,
            Route::SlotFilling => {
                let ctx = self.context(identity, params)?;
                let turn = Turn {
                    intent: &intent,
                    user_id: &user_id,
                    text,
                    today,
                    ctx: &ctx,
                };
                match self.engine.handle(turn).await {
                    Some(envelope) => envelope,
                    // the draft vanished before the lock was taken
                    None => match route(&intent, false) {
                        Route::ReadOnly(query) => self.read(query, &ctx, text, today).await,
                        Route::Reply(reply) => reply.envelope(),
                        _ => Reply::NotUnderstood.envelope(),
                    },
                }
            }
            Route::ReadOnly(query) => {
                let ctx = self.context(identity, params)?;
                self.read(query, &ctx, text, today).await
            }
        };

        Ok(envelope
            .with("intent", classified.name)
            .with("confidence", classified.confidence))
    }

    fn context(&self, identity: Map<String, Value>, params: Map<String, Value>) -> Result<CallContext, AppError> {
        CallContext::resolve(identity, params, &self.api_path)
    }

    async fn read(&self, query: ReadQuery, ctx: &CallContext, text: &str, today: NaiveDate) -> Envelope {
        let backend = self.backend.as_ref();
        match query {
            ReadQuery::LeaveBalance(only) => queries::leave_balance(backend, ctx, only).await,
            ReadQuery::Holidays => queries::holidays(backend, ctx, today).await,
            ReadQuery::Payslip => queries::latest_payslip(backend, ctx).await,
            ReadQuery::PayslipForMonth => queries::payslip_for_month(backend, ctx, extract_month(text)).await,
            ReadQuery::LeavePolicy => queries::leave_policy(backend, ctx).await,
        }
    }
}
