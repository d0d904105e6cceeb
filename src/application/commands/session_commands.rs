// src/application/commands/session_commands.rs

use crate::application::dto::{ProfileDto, SessionDto};
use crate::application::error_handling::ToErrorResponse;
use crate::application::state::AppState;
use crate::domain::{Credentials, ProfileChanges};

pub fn get_session(state: &AppState) -> SessionDto {
    SessionDto::from(&state.session_store.snapshot())
}

pub async fn sign_in(
    state: &AppState,
    email: String,
    password: String,
) -> Result<SessionDto, String> {
    state
        .session_store
        .sign_in(&Credentials::new(email, password))
        .await
        .to_error_response()?;
    Ok(get_session(state))
}

pub async fn sign_up(state: &AppState, email: String, password: String) -> Result<(), String> {
    state
        .session_store
        .sign_up(&Credentials::new(email, password))
        .await
        .map(|_| ())
        .to_error_response()
}

pub async fn sign_out(state: &AppState) -> Result<(), String> {
    state.session_store.sign_out().await.to_error_response()
}

pub async fn update_profile(
    state: &AppState,
    username: Option<String>,
    avatar_url: Option<String>,
) -> Result<ProfileDto, String> {
    state
        .session_store
        .update_profile(ProfileChanges {
            username,
            avatar_url,
        })
        .await
        .map(|profile| ProfileDto::from(&profile))
        .to_error_response()
}
