pub mod client;

pub use client::{MpvClient, MpvConfig};
