// src/application/mod.rs
//
// Application Layer
//
// ARCHITECTURE:
// - Sits above services; the shell only talks to this layer
// - Views hold per-page presentation state
// - Commands translate between DTOs and domain records
// - Routes map paths to pages

pub mod commands;
pub mod dto;
pub mod error_handling;
pub mod routes;
pub mod state;
pub mod views;

pub use dto::*;
pub use error_handling::{ErrorResponse, ErrorType, ToErrorResponse};
pub use routes::Route;
pub use state::AppState;
