//! Whole-file reshaping operations on a language directory

pub mod actions;
pub mod teams;

pub use actions::{merge_actions, MergeReport, ACTIONS_FILE, MISSION_ACTIONS, UNIVERSAL_ACTIONS};
pub use teams::{join_teams, split_teams, team_file_name, JoinReport, SplitReport};
