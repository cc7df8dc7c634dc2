//! Data models for the user directory.
//!
//! - `User`: a directory record (`id`, `name`, `email`)
//! - `UserId`: server-assigned id or client placeholder
//! - `UserDraft`: the fields supplied when creating a user

pub mod user;

pub use user::{User, UserDraft, UserId};
