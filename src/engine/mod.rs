//! Multi-turn leave application: collects type, dates and reason across
//! messages and submits once all three are known.

pub mod prompts;
pub mod slot_filling;

pub use slot_filling::{SlotFillingEngine, Turn};
