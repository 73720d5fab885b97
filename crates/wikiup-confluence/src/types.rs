//! Confluence wire types.

use serde::{Deserialize, Serialize};

/// A Confluence page as returned by the content API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Page {
    /// Page ID
    pub id: String,
    /// Content type, normally "page"
    #[serde(rename = "type")]
    pub content_type: String,
    /// Page title
    pub title: String,
    /// Version information
    pub version: Version,
}

/// Page version counter.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Version {
    /// Version number, starting at 1
    pub number: u32,
}

/// Response envelope for content searches.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResults {
    /// Matching pages
    pub results: Vec<Page>,
}

/// Attachment metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    /// Attachment ID
    pub id: String,
    /// Attachment file name
    pub title: String,
}

/// Response envelope for attachment listings.
#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentResults {
    /// Matching attachments
    pub results: Vec<Attachment>,
}

impl Page {
    /// Placeholder returned by mutating calls in dry-run mode.
    pub(crate) fn synthetic(title: &str) -> Self {
        Self {
            id: "0".to_owned(),
            content_type: "page".to_owned(),
            title: title.to_owned(),
            version: Version { number: 1 },
        }
    }
}
