//! Task list management
//!
//! This module holds the task list the client mirrors from the server
//! and the state transitions the view commits after each response.

mod model;
mod store;

pub use model::*;
pub use store::*;
