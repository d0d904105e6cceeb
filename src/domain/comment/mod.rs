pub mod entity;
pub mod invariants;

pub use entity::{Comment, NewComment};
pub use invariants::validate_comment_content;
