use chrono::NaiveDate;

use crate::model::leave_application::LeaveApplication;
use crate::model::leave_draft::DraftState;

pub const ASK_LEAVE_TYPE: &str =
    "Which type of leave would you like to apply for? Casual, Sick, Compensatory, Loss of Pay or Earned?";
pub const ASK_DATES: &str =
    "For which dates? You can say something like 20/08/2025 to 22/08/2025, or today / tomorrow.";
pub const ASK_REASON: &str = "What is the reason for your leave?";

pub fn question(state: DraftState) -> Option<&'static str> {
    match state {
        DraftState::Empty | DraftState::AwaitingType => Some(ASK_LEAVE_TYPE),
        DraftState::AwaitingDates => Some(ASK_DATES),
        DraftState::AwaitingReason => Some(ASK_REASON),
        DraftState::Ready => None,
    }
}

/// Short status text carried in `responseData`.
pub fn status(state: DraftState) -> &'static str {
    match state {
        DraftState::Empty | DraftState::AwaitingType => "Awaiting leave type",
        DraftState::AwaitingDates => "Awaiting leave dates",
        DraftState::AwaitingReason => "Awaiting leave reason",
        DraftState::Ready => "Ready to submit",
    }
}

pub fn inverted_range(from: NaiveDate, to: NaiveDate) -> String {
    format!(
        "The start date {} is after the end date {}. {ASK_DATES}",
        from.format("%d/%m/%Y"),
        to.format("%d/%m/%Y")
    )
}

pub fn unreadable_dates(tokens: &[String]) -> String {
    format!("I couldn't read {} as a date. {ASK_DATES}", tokens.join(", "))
}

pub fn submitted(application: &LeaveApplication) -> String {
    format!(
        "Your {} application from {} to {} ({} day(s)) has been submitted for approval. \
         Reason: {}. You are expected back on {}.",
        application.leave_type,
        application.from_date.format("%d/%m/%Y"),
        application.to_date.format("%d/%m/%Y"),
        application.days,
        application.reason,
        application.return_date.format("%d/%m/%Y"),
    )
}

pub const SUBMIT_FAILED: &str =
    "Sorry, I couldn't submit your leave application. Please try again later by starting a new application.";
pub const CANCELLED: &str = "Okay, I've discarded your leave application.";
pub const NOTHING_TO_CANCEL: &str = "There is no leave application in progress.";
