pub mod compatibility;
pub mod fame;
pub mod geo;
pub mod interactions;
pub mod matches;
pub mod notify;
pub mod profiles;
pub mod reports;
pub mod suggestions;
pub mod visits;
