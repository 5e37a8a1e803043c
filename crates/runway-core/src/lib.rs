//! Core types shared across the Runway content-delivery backend.
//!
//! This crate defines the request-scoped context (tenant identity, locale,
//! correlation id) and the configuration defaults used by the crates that
//! talk to the extension runner.

pub mod config;
pub mod context;

pub use context::{ProjectId, RequestContext, RequestId};
