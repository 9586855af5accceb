use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// Leave categories understood by the HR backend, numbered by `LeaveID`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum LeaveType {
    #[strum(to_string = "Casual Leave")]
    Casual = 1,
    #[strum(to_string = "Sick Leave")]
    Sick = 2,
    #[strum(to_string = "Compensatory Leave")]
    Compensatory = 3,
    #[strum(to_string = "Loss of Pay")]
    LossOfPay = 4,
    #[strum(to_string = "Earned Leave")]
    Earned = 5,
}

impl LeaveType {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(LeaveType::Casual),
            2 => Some(LeaveType::Sick),
            3 => Some(LeaveType::Compensatory),
            4 => Some(LeaveType::LossOfPay),
            5 => Some(LeaveType::Earned),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    /// Display label, e.g. "Casual Leave"
    pub fn display_name(self) -> String {
        self.to_string()
    }
}
