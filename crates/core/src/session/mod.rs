//! Session management
//!
//! Tracks the current authentication token and persists it in a single
//! durable slot so a restart resumes the session.

mod model;
mod store;

pub use model::*;
pub use store::*;
