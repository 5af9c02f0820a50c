//! Jobtrack Client State
//!
//! Optimistic client-side state for a job-application tracker. Each entity
//! kind has a [`MutationController`] that applies edits locally under a
//! temporary id, sends them through a [`RequestGateway`], then commits the
//! server's copy or rolls back.
//!
//! ```text
//! Tracker ── MutationController<E> ── EntityStore<E>
//!                    │
//!                    └── RequestGateway (HttpGateway) ── SessionCredentials
//! ```

pub mod config;
pub mod controller;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod normalize;
pub mod resource;
pub mod store;
pub mod tracker;
pub mod views;

#[cfg(test)]
mod testing;

pub use config::ClientConfig;
pub use controller::{MutationController, MutationKind, MutationPhase, TempIdAllocator};
pub use error::{ConfigError, GatewayError, MutationError, StoreError, ValidationError};
pub use gateway::{HttpGateway, RequestGateway, SessionCredentials, SessionState};
pub use resource::Resource;
pub use store::EntityStore;
pub use tracker::{init_logging, Tracker};
