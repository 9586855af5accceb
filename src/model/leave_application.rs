use chrono::NaiveDate;
use serde::Serialize;

use crate::model::leave_draft::LeaveDraft;
use crate::model::leave_type::LeaveType;

/// A validated, complete draft ready to be sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveApplication {
    pub leave_type: LeaveType,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub reason: String,
    /// Calendar-inclusive; weekends and holidays are not excluded.
    pub days: i64,
    pub return_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftRejection {
    Incomplete,
    InvertedRange { from: NaiveDate, to: NaiveDate },
}

impl LeaveApplication {
    pub fn from_draft(draft: &LeaveDraft) -> Result<Self, DraftRejection> {
        let (Some(leave_type), Some(from_date), Some(to_date), Some(reason)) = (
            draft.leave_type,
            draft.from_date,
            draft.to_date,
            draft.reason.as_ref(),
        ) else {
            return Err(DraftRejection::Incomplete);
        };

        if from_date > to_date {
            return Err(DraftRejection::InvertedRange {
                from: from_date,
                to: to_date,
            });
        }

        Ok(Self {
            leave_type,
            from_date,
            to_date,
            reason: reason.clone(),
            days: (to_date - from_date).num_days() + 1,
            return_date: to_date.succ_opt().unwrap_or(to_date),
        })
    }
}
