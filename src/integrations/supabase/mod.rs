pub mod auth;
pub mod client;

pub use auth::GoTrueAuth;
pub use client::{SupabaseClient, TableQuery};
