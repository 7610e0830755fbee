//! Transfer API Library
//!
//! This crate provides the HTTP handlers, middleware, session registry and
//! application setup of the transfer portal.

pub mod constants;
mod handlers;
mod middleware;
mod services;
pub mod session;
pub mod setup;
pub mod telemetry;

// Public modules
pub mod error;
pub mod state;

// Re-exports
pub use error::ErrorResponse;
pub use services::submission::{SubmissionOutcome, SubmissionWarning};
