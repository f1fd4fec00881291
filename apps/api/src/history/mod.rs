// Local recommendation history: the 20 most recent product recommendations,
// kept in a JSON file next to the service.

pub mod handlers;
pub mod store;

pub use store::{HistoryEntry, HistoryError, HistoryStore};
