//! Backend abstraction for the publishing workflow.

use crate::client::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::Page;

/// The operations the publisher needs from a Confluence backend.
///
/// [`ConfluenceClient`] implements this against the REST API; the
/// `MockApi` behind the `mock` feature provides an in-memory stand-in
/// for tests.
pub trait ConfluenceApi {
    /// Find a page by exact title within a space.
    fn find_page_by_title(&self, space: &str, title: &str) -> Result<Option<Page>, ConfluenceError>;

    /// Create a page under an ancestor.
    fn create_page(
        &self,
        space: &str,
        ancestor_id: &str,
        title: &str,
        body: &str,
    ) -> Result<Page, ConfluenceError>;

    /// Update a page in place. `version` must be the number from the
    /// latest read of the page; a stale value fails the update.
    fn update_page(
        &self,
        page_id: &str,
        version: u32,
        title: &str,
        body: &str,
    ) -> Result<Page, ConfluenceError>;

    /// Add labels to a page.
    fn set_labels(&self, page_id: &str, labels: &[String]) -> Result<(), ConfluenceError>;

    /// Whether a page exists that can serve as an ancestor.
    fn validate_ancestor(&self, ancestor_id: &str) -> Result<bool, ConfluenceError>;

    /// Attach a file to a page, replacing an existing attachment of the
    /// same name.
    fn upload_attachment(
        &self,
        page_id: &str,
        filename: &str,
        data: &[u8],
    ) -> Result<(), ConfluenceError>;
}

impl ConfluenceApi for ConfluenceClient {
    fn find_page_by_title(&self, space: &str, title: &str) -> Result<Option<Page>, ConfluenceError> {
        ConfluenceClient::find_page_by_title(self, space, title)
    }

    fn create_page(
        &self,
        space: &str,
        ancestor_id: &str,
        title: &str,
        body: &str,
    ) -> Result<Page, ConfluenceError> {
        ConfluenceClient::create_page(self, space, ancestor_id, title, body)
    }

    fn update_page(
        &self,
        page_id: &str,
        version: u32,
        title: &str,
        body: &str,
    ) -> Result<Page, ConfluenceError> {
        ConfluenceClient::update_page(self, page_id, version, title, body)
    }

    fn set_labels(&self, page_id: &str, labels: &[String]) -> Result<(), ConfluenceError> {
        ConfluenceClient::set_labels(self, page_id, labels)
    }

    fn validate_ancestor(&self, ancestor_id: &str) -> Result<bool, ConfluenceError> {
        ConfluenceClient::validate_ancestor(self, ancestor_id)
    }

    fn upload_attachment(
        &self,
        page_id: &str,
        filename: &str,
        data: &[u8],
    ) -> Result<(), ConfluenceError> {
        ConfluenceClient::upload_attachment(self, page_id, filename, data)
    }
}
