pub mod blocks;
pub mod health;
pub mod likes;
pub mod matches;
pub mod reports;
pub mod suggestions;
pub mod visits;
