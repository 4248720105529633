//! Nimbus lifecycle core - addon-profile reconciliation for the Nimbus
//! cluster-management platform
//!
//! This crate implements the lifecycle callbacks a declarative provider
//! plugin invokes to attach, replace, and detach cluster add-on profiles on
//! a running cluster. Cluster and profile state is owned by the remote
//! platform; every operation re-reads what it needs and persists nothing.
//!
//! # Architecture
//!
//! Three mechanisms compose into the coordinator:
//! - scope-aware routing: every mutating call is issued under the target
//!   resource's recorded authorization scope ("project" or "tenant")
//! - attachment resolution: a profile already attached under the same name
//!   is replaced in place rather than added twice
//! - bounded retry: patches that race a concurrent mutation against the same
//!   cluster fail with a transient lock error and are retried a bounded
//!   number of times; everything else surfaces immediately
//!
//! # Modules
//!
//! - [`addon`] - Attachment resolution and the deployment coordinator
//! - [`client`] - Platform client trait and its HTTP implementation
//! - [`config`] - Environment-backed connection settings
//! - [`error`] - Error types for lifecycle operations
//! - [`model`] - Platform payload types
//! - [`retry`] - Bounded retry for transient platform failures
//! - [`scope`] - Authorization-scope routing

#![deny(missing_docs)]

pub mod addon;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod retry;
pub mod scope;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Default Configuration Constants
// =============================================================================
// Centralizing these here keeps config defaults, retry policies, and test
// fixtures consistent.

/// Default number of transient failures tolerated per mutation
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Default wait between mutation attempts
///
/// The expected transient condition is a lock held by a short-lived
/// concurrent patch, so short fixed waits are adequate.
pub const DEFAULT_RETRY_WAIT: std::time::Duration = std::time::Duration::from_secs(2);
