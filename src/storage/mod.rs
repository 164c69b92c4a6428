pub mod db;
mod landmarks;
mod members;
pub mod models;
mod sessions;
mod spots;
mod tables;

pub use db::{Database, DatabaseError};
pub use landmarks::ClaimOutcome;
pub use spots::{SpotDelete, ToggleState};
