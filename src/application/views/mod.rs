// src/application/views/mod.rs
//
// Presentation state for each page. Views hold what a page renders and
// delegate every backend call to services.

pub mod auth_form;
pub mod catalog;
pub mod comment_thread;
pub mod profile_editor;
pub mod video_page;

pub use auth_form::{AuthForm, SubmitOutcome};
pub use catalog::{CatalogView, LoadOutcome};
pub use comment_thread::CommentThread;
pub use profile_editor::ProfileEditor;
pub use video_page::VideoPageView;
