//! In-memory query cache with optimistic mutations.
//!
//! - `query`: the `UserCache` controller (reads, mutations, rollback)
//! - `transform`: pure speculative transforms over the user list
//! - `age`: human-readable age of the last successful read

pub mod age;
pub mod query;
pub mod transform;

pub use query::{CacheEvent, CacheOptions, MutationStatus, QueryStatus, Snapshot, Ticket, UserCache};
pub use transform::{Edit, Mutation, MutationKind};
