//! Linear edit history.

mod manager;
mod model;

pub use manager::EditHistory;
pub use model::{HistoryEntry, ORIGINAL_PROMPT};
