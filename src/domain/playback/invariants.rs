use super::entity::PlaybackSession;
use crate::domain::{DomainError, DomainResult};

/// Validates all PlaybackSession invariants
pub fn validate_playback_session(session: &PlaybackSession) -> DomainResult<()> {
    validate_volume(session.volume())?;
    validate_position(session)?;
    Ok(())
}

/// Volume lives in [0, 1]
fn validate_volume(volume: f64) -> DomainResult<()> {
    if !(0.0..=1.0).contains(&volume) {
        return Err(DomainError::VolumeOutOfRange(volume));
    }
    Ok(())
}

/// Once the duration is known, 0 <= current_time <= duration
fn validate_position(session: &PlaybackSession) -> DomainResult<()> {
    let time = session.current_time();
    if time < 0.0 {
        return Err(DomainError::InvariantViolation(format!(
            "Current time {} is negative",
            time
        )));
    }
    if let Some(duration) = session.duration() {
        if time > duration {
            return Err(DomainError::InvariantViolation(format!(
                "Current time {} exceeds duration {}",
                time, duration
            )));
        }
    }
    Ok(())
}

/// Invariants that must hold true for a PlaybackSession:
///
/// 1. One session per mounted player, dropped with it
/// 2. Duration is unknown until metadata loads
/// 3. 0 <= current_time <= duration once duration is known
/// 4. 0 <= volume <= 1
/// 5. Volume set to exactly 0 forces muted
/// 6. Muting never changes the stored volume
/// 7. Playback rate is one of the eight listed speeds
