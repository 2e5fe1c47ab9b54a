pub mod record;
pub mod store;

pub use record::HistoryEntry;
pub use store::DEFAULT_HISTORY_LIMIT;
