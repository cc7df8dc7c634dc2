//! Core library for userdir.
//!
//! Lists users from a remote REST collection and edits them through an
//! in-memory cache that applies every change optimistically and rolls it back
//! if the directory rejects it.
//!
//! - `api`: `DirectoryClient` contract and its HTTP implementation
//! - `cache`: `UserCache`, the optimistic query cache
//! - `models`: `User`, `UserId`, `UserDraft`
//! - `config`: on-disk and environment configuration

pub mod api;
pub mod cache;
pub mod config;
pub mod models;

pub use api::{DirectoryClient, HttpDirectoryClient, TransportError};
pub use cache::{CacheEvent, CacheOptions, MutationKind, MutationStatus, QueryStatus, Ticket, UserCache};
pub use config::Config;
pub use models::{User, UserDraft, UserId};
