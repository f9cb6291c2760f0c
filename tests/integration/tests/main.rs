//! End-to-End Integration Tests
//!
//! These tests drive a running Roster server over HTTP, backed by the
//! in-memory storage engine. The `postgres` module repeats the storage
//! sensitive scenarios against a `PostgreSQL` container.

mod health;
mod pagination;
mod postgres;
mod projections;
mod relations;
mod resources;
mod search;
