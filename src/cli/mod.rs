pub mod args;
pub mod exit;

pub use args::{Cli, Command, HistoryAction};
pub use exit::Outcome;
