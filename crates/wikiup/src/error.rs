//! CLI error types.

use wikiup_source::SelectError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Select(#[from] SelectError),

    #[error("{0}")]
    Validation(String),
}
