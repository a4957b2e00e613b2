//! Shared foundation for Amora services: error taxonomy, API envelopes, auth
//! claims and extraction, the event bus envelope, and infrastructure clients.

pub mod types;
pub mod errors;
pub mod middleware;
pub mod clients;

pub use types::*;
pub use errors::{AppError, ErrorCode, AppResult};
