//! Markdown to Confluence storage format rendering.
//!
//! [`ConfluenceRenderer`] turns a Markdown body into Confluence storage
//! format XML. Relative links to Markdown files become page links, local
//! images become attachment references (collected for upload), and alert
//! spans like `~: watch out :~` become admonition macros in a post-pass.

mod alerts;
mod confluence;

pub use confluence::{ConfluenceRenderer, RenderResult};
