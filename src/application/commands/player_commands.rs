// src/application/commands/player_commands.rs
//
// Player commands act on the controller owned by the open video page.

use crate::application::dto::PlayerStatusDto;
use crate::application::error_handling::ToErrorResponse;
use crate::domain::PlaybackRate;
use crate::error::AppError;
use crate::services::PlaybackController;

pub fn player_status(player: &PlaybackController) -> PlayerStatusDto {
    PlayerStatusDto::from(&player.snapshot())
}

pub async fn toggle_play(player: &PlaybackController) -> PlayerStatusDto {
    player.toggle_play().await;
    player_status(player)
}

pub async fn set_volume(player: &PlaybackController, volume: f64) -> Result<PlayerStatusDto, String> {
    player.set_volume(volume).await.to_error_response()?;
    Ok(player_status(player))
}

/// `percent` of the duration, 0-100
pub async fn seek(player: &PlaybackController, percent: f64) -> PlayerStatusDto {
    player.seek_to(percent / 100.0).await;
    player_status(player)
}

pub async fn set_playback_rate(
    player: &PlaybackController,
    rate: f64,
) -> Result<PlayerStatusDto, String> {
    let rate = PlaybackRate::try_from(rate)
        .map_err(AppError::from)
        .to_error_response()?;
    player.set_playback_rate(rate).await;
    Ok(player_status(player))
}
