use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::EnumString;

use crate::model::leave_type::LeaveType;

/// Classifier output. Only `name` drives routing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentResult {
    pub name: String,
    #[serde(default)]
    pub confidence: f64,
}

impl IntentResult {
    pub fn intent(&self) -> Intent {
        Intent::parse(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Intent {
    Greet,
    Goodbye,
    ApplyLeave,
    CancelLeave,
    #[strum(
        serialize = "check_leave_balance",
        serialize = "available_leaves",
        serialize = "leave_balance"
    )]
    LeaveBalance,
    CasualLeaveBalance,
    SickLeaveBalance,
    EarnedLeaveBalance,
    CompensatoryLeaveBalance,
    HolidayList,
    Payslip,
    PayslipForMonth,
    LeavePolicy,
    #[strum(default)]
    Unrecognized(String),
}

impl Intent {
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        Intent::from_str(name).unwrap_or_else(|_| Intent::Unrecognized(name.to_string()))
    }

    /// Leave type a balance query is narrowed to, if any.
    pub fn balance_filter(&self) -> Option<LeaveType> {
        match self {
            Intent::CasualLeaveBalance => Some(LeaveType::Casual),
            Intent::SickLeaveBalance => Some(LeaveType::Sick),
            Intent::EarnedLeaveBalance => Some(LeaveType::Earned),
            Intent::CompensatoryLeaveBalance => Some(LeaveType::Compensatory),
            _ => None,
        }
    }
}
