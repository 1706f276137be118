//! # Yatube Core
//!
//! The domain layer of Yatube.
//! Entities, the pagination contract, form validation and the ports that
//! infrastructure implements. No infrastructure dependencies live here.

pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;

pub use error::{DomainError, RepoError};
pub use pagination::{PAGE_SIZE, Page, PageRequest};
