pub mod competitions;
pub mod entries;
pub mod entry_progress;
pub mod scoring;
pub mod state_sweep;
pub mod votes;
