pub mod entity;
pub mod invariants;

pub use entity::{
    AuthMode, AuthSession, AuthStateChange, AuthUser, Credentials, SignUpOutcome,
};
pub use invariants::{validate_credentials, MIN_PASSWORD_LENGTH};
