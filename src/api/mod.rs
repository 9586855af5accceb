pub mod assistant;
pub mod dispatch;

pub use dispatch::Assistant;
