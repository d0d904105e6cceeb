// src/config.rs
//
// Startup configuration read from the environment.
//
// CRITICAL RULES:
// - Missing backend URL or key is fatal
// - Everything else has a default

use std::time::Duration;

use reqwest::Url;

use crate::error::{AppError, AppResult};

pub const DEFAULT_PAGE_SIZE: usize = 12;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MPV_BINARY: &str = "mpv";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Backend project URL, always ending with `/`
    pub supabase_url: Url,
    pub supabase_anon_key: String,
    pub page_size: usize,
    pub request_timeout: Duration,
    pub mpv_binary: String,
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests need not touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> AppResult<String> {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| AppError::Config(format!("{} is not set", key)))
        };

        let raw_url = required("SUPABASE_URL")?;
        let supabase_anon_key = required("SUPABASE_ANON_KEY")?;
        let supabase_url = parse_base_url(&raw_url)?;

        let page_size = match lookup("STREAMHUB_PAGE_SIZE") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|size| *size > 0)
                .ok_or_else(|| {
                    AppError::Config(format!("STREAMHUB_PAGE_SIZE must be a positive number, got {}", raw))
                })?,
            None => DEFAULT_PAGE_SIZE,
        };

        let request_timeout = match lookup("STREAMHUB_REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| {
                    AppError::Config(format!(
                        "STREAMHUB_REQUEST_TIMEOUT_SECS must be whole seconds, got {}",
                        raw
                    ))
                })?,
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let mpv_binary = lookup("STREAMHUB_MPV_BINARY")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MPV_BINARY.to_string());

        Ok(Self {
            supabase_url,
            supabase_anon_key,
            page_size,
            request_timeout,
            mpv_binary,
        })
    }
}

fn parse_base_url(raw: &str) -> AppResult<Url> {
    let mut url = Url::parse(raw)
        .map_err(|e| AppError::Config(format!("SUPABASE_URL is not a valid URL: {}", e)))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
