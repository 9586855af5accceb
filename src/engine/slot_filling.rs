use chrono::NaiveDate;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::engine::prompts;
use crate::extract::{DateScan, extract_dates, extract_leave_type, extract_reason};
use crate::gateway::submission::{backend_date, submit_leave};
use crate::gateway::{CallContext, HrBackend};
use crate::model::intent::Intent;
use crate::model::leave_application::{DraftRejection, LeaveApplication};
use crate::model::leave_draft::{DraftState, LeaveDraft};
use crate::models::Envelope;
use crate::store::{DraftStore, UserLocks};

/// One incoming utterance, already classified.
pub struct Turn<'a> {
    pub intent: &'a Intent,
    pub user_id: &'a str,
    pub text: &'a str,
    pub today: NaiveDate,
    pub ctx: &'a CallContext,
}

/// Fills empty slots from `text`, in type → dates → reason order. Never
/// overwrites a filled slot. `asked` is the state before this utterance:
/// when the reason was the pending question, an anchor-less reply is
/// taken whole as the reason.
pub fn fill_slots(draft: &mut LeaveDraft, text: &str, today: NaiveDate, asked: DraftState) -> DateScan {
    if draft.leave_type.is_none() {
        draft.leave_type = extract_leave_type(text);
    }

    let mut scan = DateScan::default();
    if !draft.has_dates() {
        scan = extract_dates(text, today);
        if scan.unreadable.is_empty() {
            let (from, to) = scan.range();
            if draft.from_date.is_none() {
                draft.from_date = from;
            }
            if draft.to_date.is_none() {
                draft.to_date = to;
            }
        } else {
            // one bad token spoils the whole range
            draft.clear_dates();
        }
    }

    if draft.reason.is_none() {
        draft.reason = extract_reason(text).or_else(|| {
            let whole = text.trim();
            (asked == DraftState::AwaitingReason && !whole.is_empty()).then(|| whole.to_string())
        });
    }

    scan
}

pub struct SlotFillingEngine {
    store: Arc<dyn DraftStore>,
    locks: UserLocks,
    backend: Arc<dyn HrBackend>,
}

impl SlotFillingEngine {
    pub fn new(store: Arc<dyn DraftStore>, backend: Arc<dyn HrBackend>) -> Self {
        Self {
            store,
            locks: UserLocks::new(),
            backend,
        }
    }

    pub async fn has_draft(&self, user_id: &str) -> bool {
        self.store.has(user_id).await
    }

    /// Drives one utterance through the leave flow. Returns `None` when the
    /// entry guard declines: the intent is not `apply_leave` and the user has
    /// no draft. The user's lock is held from the guard through submission.
    #[instrument(name = "slot_filling", skip(self, turn), fields(user_id = turn.user_id))]
    pub async fn handle(&self, turn: Turn<'_>) -> Option<Envelope> {
        let _guard = self.locks.lock(turn.user_id).await;

        if *turn.intent != Intent::ApplyLeave && !self.store.has(turn.user_id).await {
            return None;
        }

        let mut draft = self.store.get_or_create(turn.user_id).await;
        let asked = draft.state();
        let scan = fill_slots(&mut draft, turn.text, turn.today, asked);
        self.store.save(turn.user_id, draft.clone()).await;

        let state = draft.state();
        info!(from = %asked, to = %state, "Leave draft updated");

        if state == DraftState::Ready {
            return Some(self.complete(draft, turn.ctx).await);
        }
        Some(prompt(state, &draft, &scan))
    }

    async fn complete(&self, mut draft: LeaveDraft, ctx: &CallContext) -> Envelope {
        let application = match LeaveApplication::from_draft(&draft) {
            Ok(application) => application,
            Err(DraftRejection::InvertedRange { from, to }) => {
                warn!(%from, %to, "Leave dates out of order, asking again");
                draft.clear_dates();
                self.store.save(&draft.user_id, draft.clone()).await;
                return Envelope::success("Invalid leave dates")
                    .with_message(prompts::inverted_range(from, to))
                    .with("state", DraftState::AwaitingDates.to_string())
                    .with("draft", draft.view());
            }
            Err(DraftRejection::Incomplete) => {
                return prompt(draft.state(), &draft, &DateScan::default());
            }
        };

        info!(
            leave_type = %application.leave_type,
            days = application.days,
            "Submitting leave application"
        );
        let result = submit_leave(self.backend.as_ref(), ctx, &application).await;

        // never resubmitted: success or failure, the draft is gone
        self.store.remove(&draft.user_id).await;

        match result {
            Ok(reply) => {
                info!("Leave application submitted");
                Envelope::success("Leave application submitted")
                    .with_message(prompts::submitted(&application))
                    .with("state", "submitted")
                    .with("application", application_view(&application))
                    .with("data", reply)
            }
            Err(failure) => {
                warn!(code = failure.code, details = %failure.details, "Leave submission failed");
                Envelope::from(failure)
                    .with_message(prompts::SUBMIT_FAILED)
                    .with("state", "submit_failed")
                    .with("application", application_view(&application))
            }
        }
    }

    /// Discards the user's draft, if any.
    pub async fn cancel(&self, user_id: &str) -> Envelope {
        let _guard = self.locks.lock(user_id).await;
        if !self.store.has(user_id).await {
            return Envelope::success("No leave application in progress")
                .with_message(prompts::NOTHING_TO_CANCEL);
        }
        self.store.remove(user_id).await;
        info!(user_id, "Leave draft discarded");
        Envelope::success("Leave application cancelled")
            .with_message(prompts::CANCELLED)
            .with("state", "cancelled")
    }
}

fn prompt(state: DraftState, draft: &LeaveDraft, scan: &DateScan) -> Envelope {
    let question = prompts::question(state).unwrap_or(prompts::ASK_LEAVE_TYPE);
    let message = if state == DraftState::AwaitingDates && !scan.unreadable.is_empty() {
        prompts::unreadable_dates(&scan.unreadable)
    } else {
        question.to_string()
    };

    Envelope::success(prompts::status(state))
        .with_message(message)
        .with("state", state.to_string())
        .with("draft", draft.view())
}

fn application_view(application: &LeaveApplication) -> Value {
    json!({
        "leaveTypeId": application.leave_type.id(),
        "leaveTypeName": application.leave_type.display_name(),
        "fromDate": backend_date(application.from_date),
        "toDate": backend_date(application.to_date),
        "noOfDays": application.days,
        "returnDate": backend_date(application.return_date),
        "reason": application.reason,
        "status": "Pending Approval"
    })
}
