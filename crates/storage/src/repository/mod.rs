pub mod competition;
pub mod contributor;
pub mod entry;
pub mod genre;
pub mod user;
pub mod vote;
