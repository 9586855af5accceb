//! Pure, total extractors over raw utterances. None of them ever fails:
//! a miss is reported as `None` / an empty scan.

pub mod date;
pub mod leave_type;
pub mod month;
pub mod reason;

pub use date::{DateScan, extract_dates};
pub use leave_type::extract_leave_type;
pub use month::extract_month;
pub use reason::extract_reason;
