//! # Yatube Shared
//!
//! Serializable view models handed to the template renderer.
//! Domain rows go in, flat display-ready values come out.

pub mod response;
pub mod views;

pub use response::{ErrorPage, HealthResponse};
pub use views::{AuthorCard, CommentView, GroupView, PageView, PostView};
