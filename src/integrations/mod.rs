// src/integrations/mod.rs
//
// External Integrations Module
//
// - supabase: hosted backend (REST tables, RPC, GoTrue auth)
// - mpv: local media player driven over JSON IPC

pub mod auth;
pub mod supabase;

#[cfg(unix)]
pub mod mpv;

pub use auth::AuthBackend;
pub use supabase::{GoTrueAuth, SupabaseClient, TableQuery};

#[cfg(unix)]
pub use mpv::{MpvClient, MpvConfig};
