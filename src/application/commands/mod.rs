// src/application/commands/mod.rs
//
// Command Handlers
//
// ARCHITECTURE:
// - Commands are thin adapters between the shell and services
// - Commands return DTOs
// - Errors leave as serialized ErrorResponse strings
// - Commands NEVER contain business logic

pub mod player_commands;
pub mod session_commands;
pub mod video_commands;

pub use player_commands::*;
pub use session_commands::*;
pub use video_commands::*;
