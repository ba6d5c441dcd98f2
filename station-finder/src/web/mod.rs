//! HTTP boundary for nearby station discovery.
//!
//! Accepts location updates and serves the published station board as
//! JSON. Rendering stays with the client.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
