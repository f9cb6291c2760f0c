//! # roster-rest
//!
//! Resource exposure layer for Roster.
//!
//! Serves every entity kind through one generic set of handlers, renders
//! entities through the projection catalog and answers in HAL-style JSON
//! with absolute links.
//!
//! ## Modules
//!
//! - [`body`] - request body decoding
//! - [`error`] - error types and HTTP error responses
//! - [`links`] - absolute link construction
//! - [`params`] - paging, sort and projection parameters
//! - [`render`] - projection renderer and collection documents
//! - [`router`] - Axum router and HTTP handlers
//! - [`state`] - application state
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use roster_catalog::Catalog;
//! use roster_core::PagingConfig;
//! use roster_rest::{ApiState, LinkBuilder, resource_router};
//! use roster_storage::MemoryRepository;
//!
//! let state = ApiState::new(
//!     Arc::new(MemoryRepository::new()),
//!     Arc::new(Catalog::standard()?),
//!     LinkBuilder::new("http://localhost:8080", ""),
//!     PagingConfig::default(),
//! );
//! let app = resource_router().with_state(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! ```
//!
//! ## API Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Collection links |
//! | GET | `/{collection}` | List entities |
//! | POST | `/{collection}` | Create an entity |
//! | GET | `/{collection}/search` | List searches |
//! | GET | `/{collection}/search/{name}` | Run a search |
//! | GET | `/{collection}/{id}` | Get an entity |
//! | PUT | `/{collection}/{id}` | Replace an entity |
//! | PATCH | `/{collection}/{id}` | Merge fields into an entity |
//! | DELETE | `/{collection}/{id}` | Delete an entity |
//! | GET | `/{collection}/{id}/{relation}` | List related entities |
//! | POST | `/{collection}/{id}/{relation}` | Attach an entity |
//! | GET | `/{collection}/{id}/{relation}/{related_id}` | Get a related entity |
//! | DELETE | `/{collection}/{id}/{relation}/{related_id}` | Detach an entity |

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod body;
pub mod error;
pub mod links;
pub mod params;
pub mod render;
pub mod router;
pub mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use links::LinkBuilder;
pub use params::ListParams;
pub use render::{Renderer, collection_document};
pub use router::resource_router;
pub use state::ApiState;
