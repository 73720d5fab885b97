//! Confluence publishing for wikiup.
//!
//! Two layers live here. [`ConfluenceClient`] is a thin synchronous
//! wrapper over the Confluence REST API: page lookup, create, update,
//! labels and attachments, with a dry-run mode that logs mutating calls
//! instead of performing them. [`Publisher`] drives the per-document
//! workflow on top of it, through the [`ConfluenceApi`] trait so tests
//! can substitute the `MockApi` behind the `mock` feature.

mod api;
mod client;
mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod publisher;
mod types;

pub use api::ConfluenceApi;
pub use client::{Auth, ClientConfig, ConfluenceClient};
pub use error::ConfluenceError;
#[cfg(any(test, feature = "mock"))]
pub use mock::{ApiCall, MockApi};
pub use publisher::{
    DocumentOutcome, DocumentReport, PublishConfig, PublishError, Publisher, RunSummary,
};
pub use types::{Attachment, AttachmentResults, Page, SearchResults, Version};
