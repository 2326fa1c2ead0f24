//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod clean;
mod completions;
mod config;
mod ops;
mod rules;
mod translate;
mod unicode;
mod utils;

pub use clean::handle_clean;
pub use completions::handle_completions;
pub use config::handle_config;
pub use ops::{handle_join_teams, handle_merge_actions, handle_split_teams};
pub use rules::handle_rules;
pub use translate::handle_translate;
pub use unicode::handle_unicode;
