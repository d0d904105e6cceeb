// src/repositories/mod.rs
//
// Repository layer
//
// CRITICAL RULES:
// - Repositories are DUMB data mappers
// - NO business logic
// - NO invariant enforcement
// - NO event emission
// - NO cross-repository calls

pub mod comment_repository;
pub mod profile_repository;
pub mod rows;
pub mod video_repository;

pub use comment_repository::{CommentRepository, SupabaseCommentRepository};
pub use profile_repository::{ProfileRepository, SupabaseProfileRepository};
pub use video_repository::{SupabaseVideoRepository, VideoRepository};

#[cfg(test)]
pub use comment_repository::MockCommentRepository;
#[cfg(test)]
pub use profile_repository::MockProfileRepository;
#[cfg(test)]
pub use video_repository::MockVideoRepository;
