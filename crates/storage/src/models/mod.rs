pub mod competition;
pub mod contributor;
pub mod entry;
pub mod genre;
pub mod user;
pub mod vote;

pub use competition::{Competition, Visibility};
pub use contributor::Contributor;
pub use entry::{Entry, EntryStatus};
pub use genre::{Genre, GenreCategory};
pub use user::{User, UserRole};
pub use vote::Vote;
