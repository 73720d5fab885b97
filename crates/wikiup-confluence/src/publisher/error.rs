//! Per-document publishing errors.

use wikiup_source::FrontMatterError;

use crate::error::ConfluenceError;

/// Error publishing a single document.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Reading the source file failed.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Front-matter was present but malformed.
    #[error("{0}")]
    FrontMatter(#[from] FrontMatterError),

    /// Neither the document nor the run configuration names a space.
    #[error("no space key: set wiki.space or --space")]
    MissingSpace,

    /// Neither the document nor the run configuration names an ancestor.
    #[error("no ancestor id: set wiki.ancestor_id or --ancestor_id")]
    MissingAncestorId,

    /// The resolved ancestor does not exist on the server.
    #[error("ancestor page {0} does not exist")]
    AncestorNotFound(String),

    /// A remote call failed.
    #[error("{0}")]
    Api(#[from] ConfluenceError),
}
