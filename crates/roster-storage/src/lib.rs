//! # roster-storage
//!
//! Repository abstraction for Roster.
//!
//! This crate defines the storage interface that every backend implements,
//! the paging types shared with the HTTP layer, and an in-memory engine
//! used by tests and by the server's `memory` mode.
//!
//! ## Modules
//!
//! - [`repository`] - the [`Repository`] trait
//! - [`page`] - [`PageRequest`], [`Page`] and sort keys
//! - [`criteria`] - search predicates
//! - [`memory`] - [`MemoryRepository`]
//! - [`error`] - [`StorageError`]

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod criteria;
pub mod error;
pub mod memory;
pub mod page;
pub mod repository;

pub use criteria::Criterion;
pub use error::{StorageError, StorageResult};
pub use memory::MemoryRepository;
pub use page::{Direction, Page, PageRequest, SortKey};
pub use repository::{RelationChange, Repository, check_sort, resolve_relation};
