//! Client error types.

/// Error from a Confluence API operation.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    /// The HTTP exchange failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    Request(#[from] ureq::Error),

    /// The server answered with an error status.
    #[error("HTTP error: {status} - {body}")]
    Response { status: u16, body: String },

    /// An update was rejected because the supplied version is stale.
    #[error("version conflict updating page {page_id} from version {version}: {body}")]
    VersionConflict {
        page_id: String,
        version: u32,
        body: String,
    },

    /// A request payload failed to serialize.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
