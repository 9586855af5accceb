pub mod draft_store;
pub mod user_locks;

pub use draft_store::{DraftStore, MokaDraftStore};
pub use user_locks::UserLocks;
