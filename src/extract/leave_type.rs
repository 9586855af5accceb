use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::leave_type::LeaveType;

/// Checked top to bottom; the first row with any keyword present wins.
static LEAVE_TYPE_KEYWORDS: Lazy<Vec<(Regex, LeaveType)>> = Lazy::new(|| {
    [
        (r"(?i)\b(?:casual|cl)\b", LeaveType::Casual),
        (r"(?i)\b(?:sick|sl|medical)\b", LeaveType::Sick),
        (r"(?i)\b(?:compensatory|com|comp\s*off)\b", LeaveType::Compensatory),
        (r"(?i)\b(?:lop|loss\s+of\s+pay)\b", LeaveType::LossOfPay),
        (r"(?i)\b(?:earned|el)\b", LeaveType::Earned),
    ]
    .into_iter()
    .map(|(pattern, leave_type)| (Regex::new(pattern).expect("leave type regex"), leave_type))
    .collect()
});

pub fn extract_leave_type(text: &str) -> Option<LeaveType> {
    LEAVE_TYPE_KEYWORDS
        .iter()
        .find(|(pattern, _)| pattern.is_match(text))
        .map(|(_, leave_type)| *leave_type)
}
