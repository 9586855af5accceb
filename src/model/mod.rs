pub mod intent;
pub mod leave_application;
pub mod leave_draft;
pub mod leave_type;
