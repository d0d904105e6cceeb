pub mod entity;

pub use entity::{Video, PLACEHOLDER_THUMBNAIL};
