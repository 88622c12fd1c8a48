pub mod competitions;
pub mod contributors;
pub mod entries;
pub mod genres;
pub mod health;
pub mod results;
pub mod users;
pub mod votes;
