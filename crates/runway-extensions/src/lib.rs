//! Extension discovery and invocation for the Runway backend.
//!
//! Extensions are independently deployed remote handlers hosted by the
//! extension runner and addressed by hook name over plain HTTP. This crate
//! provides:
//! - [`ExtensionRegistry`]: per-project discovery of the deployed extension
//!   list, cached with single-flight population
//! - [`ExtensionGateway`]: the RPC call itself, with per-call-class timeout
//!   ceilings and graceful degradation of remote failures into
//!   [`InvocationResult`] values

pub mod error;
pub mod gateway;
pub mod registry;

pub use error::DiscoveryError;
pub use gateway::{
    action_hook_name, CallClass, ExtensionGateway, ExtensionInvoker, InvocationResult,
    DYNAMIC_PAGE_EXTENSION_NAME, REQUEST_ID_HEADER,
};
pub use registry::{ExtensionMap, ExtensionRegistry};
