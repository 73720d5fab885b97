//! Publishing workflow.
//!
//! [`Publisher`] drives the create-or-update sequence for each selected
//! file, strictly in order:
//!
//! 1. Read the file and parse front-matter; documents without
//!    `wiki.share: true` are skipped.
//! 2. Resolve the effective space and ancestor. Front-matter overrides
//!    the run-level configuration; neither present fails the document.
//! 3. Render the Markdown body to storage format.
//! 4. Look up the page by title. Found pages are updated in place with
//!    the version just read; otherwise the ancestor is validated and the
//!    page created under it.
//! 5. Upload collected image attachments and apply labels.
//!
//! A failing document is recorded and the batch continues; nothing ever
//! aborts the run early.

mod error;
mod executor;
mod result;

pub use error::PublishError;
pub use executor::Publisher;
pub use result::{DocumentOutcome, DocumentReport, RunSummary};

/// Run-level publishing configuration.
#[derive(Clone, Debug, Default)]
pub struct PublishConfig {
    /// Space key for documents that do not name their own.
    pub space: Option<String>,
    /// Ancestor page id for documents that do not name their own.
    pub ancestor_id: Option<String>,
    /// Label applied to every published page.
    pub global_label: Option<String>,
}
