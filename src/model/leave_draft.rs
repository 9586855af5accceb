use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Value, json};
use strum_macros::{AsRefStr, Display};

use crate::model::leave_type::LeaveType;

/// In-progress leave application for one user, accumulated across messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaveDraft {
    pub user_id: String,
    pub leave_type: Option<LeaveType>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub reason: Option<String>,
}

/// Where a draft stands, derived from which fields are filled.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DraftState {
    Empty,
    AwaitingType,
    AwaitingDates,
    AwaitingReason,
    Ready,
}

/// Type first, then dates, then reason. Never reordered.
pub fn derive_state(draft: &LeaveDraft) -> DraftState {
    if draft.is_empty() {
        DraftState::Empty
    } else if draft.leave_type.is_none() {
        DraftState::AwaitingType
    } else if !draft.has_dates() {
        DraftState::AwaitingDates
    } else if draft.reason.is_none() {
        DraftState::AwaitingReason
    } else {
        DraftState::Ready
    }
}

impl LeaveDraft {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            ..Default::default()
        }
    }

    pub fn state(&self) -> DraftState {
        derive_state(self)
    }

    pub fn is_empty(&self) -> bool {
        self.leave_type.is_none()
            && self.from_date.is_none()
            && self.to_date.is_none()
            && self.reason.is_none()
    }

    pub fn has_dates(&self) -> bool {
        self.from_date.is_some() && self.to_date.is_some()
    }

    pub fn clear_dates(&mut self) {
        self.from_date = None;
        self.to_date = None;
    }

    pub fn leave_type_id(&self) -> Option<u8> {
        self.leave_type.map(LeaveType::id)
    }

    pub fn leave_type_name(&self) -> Option<String> {
        self.leave_type.map(LeaveType::display_name)
    }

    /// JSON shape echoed back to callers alongside prompts.
    pub fn view(&self) -> Value {
        json!({
            "leaveTypeId": self.leave_type_id(),
            "leaveTypeName": self.leave_type_name(),
            "fromDate": self.from_date.map(|d| d.format("%d/%m/%Y").to_string()),
            "toDate": self.to_date.map(|d| d.format("%d/%m/%Y").to_string()),
            "reason": self.reason,
        })
    }
}
