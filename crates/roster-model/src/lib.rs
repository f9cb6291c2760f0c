//! # roster-model
//!
//! Domain model for Roster: accounts, groups and roles, plus the static
//! descriptors that let generic code work over every entity kind.
//!
//! ## Modules
//!
//! - [`account`], [`group`], [`role`] - the concrete entities
//! - [`descriptor`] - entity, field and relation descriptors
//! - [`record`] - [`Record`], a value of any entity kind
//! - [`error`] - field access errors

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod account;
pub mod descriptor;
pub mod error;
pub mod group;
pub mod record;
pub mod role;

pub use account::Account;
pub use descriptor::{EntityDescriptor, EntityKind, FieldDescriptor, RelationDescriptor};
pub use error::{ModelError, ModelResult};
pub use group::Group;
pub use record::{Entity, Record};
pub use role::Role;
