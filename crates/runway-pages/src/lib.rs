//! Page resolution for the Runway backend.
//!
//! For one inbound request, the resolver runs a fixed ordered sequence of
//! strategies and stops at the first decisive result:
//!
//! 1. static site-builder page match
//! 2. dynamic page match via the `dynamic-page-handler` extension
//! 3. redirect rule match
//!
//! Static pages strictly dominate dynamic pages, which dominate redirects.
//! Only the dynamic step talks to independently deployed remote code, so it
//! alone degrades to "no match" on failure; the local collaborators (page
//! matcher, node store, redirect service) are trusted and their errors
//! abort the request.

pub mod collaborators;
pub mod error;
pub mod resolver;
pub mod types;

pub use collaborators::{NodeStore, RedirectService, SiteBuilderPageMatcher};
pub use error::ResolutionError;
pub use resolver::{
    DynamicPageStrategy, PageResolver, RedirectStrategy, ResolutionStrategy, StaticPageStrategy,
};
pub use types::{
    DynamicPageRedirectResult, DynamicPageResult, DynamicPageSuccessResult, Node, NodeId, Page,
    PageRequest, RedirectReason, RedirectResponse, RedirectTarget, ResolutionOutcome,
};
