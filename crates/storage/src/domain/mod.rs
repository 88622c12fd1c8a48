pub mod lifecycle;
pub mod policy;
pub mod scoring;
pub mod validation;

pub use lifecycle::{Boundaries, CompetitionState, compute_next_state, compute_state, is_locked};
pub use scoring::{VoteTally, votesum};
