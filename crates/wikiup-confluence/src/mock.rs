//! Mock Confluence backend for tests.
//!
//! `MockApi` keeps pages in memory and records every call in order, so
//! tests can assert both outcomes and the exact call sequence. Created
//! pages become findable, which makes a second publish of the same
//! document exercise the update path. Enable the `mock` feature to use
//! it from other crates' tests.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::api::ConfluenceApi;
use crate::error::ConfluenceError;
use crate::types::{Page, Version};

/// One recorded API call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiCall {
    FindPage {
        space: String,
        title: String,
    },
    CreatePage {
        space: String,
        ancestor_id: String,
        title: String,
        body: String,
    },
    UpdatePage {
        page_id: String,
        version: u32,
        title: String,
        body: String,
    },
    SetLabels {
        page_id: String,
        labels: Vec<String>,
    },
    ValidateAncestor {
        ancestor_id: String,
    },
    UploadAttachment {
        page_id: String,
        filename: String,
    },
}

/// In-memory Confluence backend.
#[derive(Debug)]
pub struct MockApi {
    /// Pages keyed by (space, title).
    pages: RwLock<HashMap<(String, String), Page>>,
    /// Every call, in order.
    calls: RwLock<Vec<ApiCall>>,
    /// Ancestor ids reported as unknown.
    invalid_ancestors: RwLock<Vec<String>>,
    next_id: RwLock<u64>,
}

impl Default for MockApi {
    fn default() -> Self {
        Self {
            pages: RwLock::new(HashMap::new()),
            calls: RwLock::new(Vec::new()),
            invalid_ancestors: RwLock::new(Vec::new()),
            next_id: RwLock::new(1000),
        }
    }
}

impl MockApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing remote page.
    ///
    /// # Panics
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_page(self, space: &str, title: &str, id: &str, version: u32) -> Self {
        self.pages.write().unwrap().insert(
            (space.to_owned(), title.to_owned()),
            Page {
                id: id.to_owned(),
                content_type: "page".to_owned(),
                title: title.to_owned(),
                version: Version { number: version },
            },
        );
        self
    }

    /// Mark an ancestor id as unknown to the backend.
    ///
    /// # Panics
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_invalid_ancestor(self, ancestor_id: &str) -> Self {
        self.invalid_ancestors.write().unwrap().push(ancestor_id.to_owned());
        self
    }

    /// Recorded calls in order.
    ///
    /// # Panics
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.read().unwrap().clone()
    }

    fn record(&self, call: ApiCall) {
        self.calls.write().unwrap().push(call);
    }
}

impl ConfluenceApi for MockApi {
    fn find_page_by_title(&self, space: &str, title: &str) -> Result<Option<Page>, ConfluenceError> {
        self.record(ApiCall::FindPage {
            space: space.to_owned(),
            title: title.to_owned(),
        });
        let pages = self.pages.read().unwrap();
        Ok(pages.get(&(space.to_owned(), title.to_owned())).cloned())
    }

    fn create_page(
        &self,
        space: &str,
        ancestor_id: &str,
        title: &str,
        body: &str,
    ) -> Result<Page, ConfluenceError> {
        self.record(ApiCall::CreatePage {
            space: space.to_owned(),
            ancestor_id: ancestor_id.to_owned(),
            title: title.to_owned(),
            body: body.to_owned(),
        });

        let mut next_id = self.next_id.write().unwrap();
        *next_id += 1;
        let page = Page {
            id: next_id.to_string(),
            content_type: "page".to_owned(),
            title: title.to_owned(),
            version: Version { number: 1 },
        };
        self.pages
            .write()
            .unwrap()
            .insert((space.to_owned(), title.to_owned()), page.clone());
        Ok(page)
    }

    fn update_page(
        &self,
        page_id: &str,
        version: u32,
        title: &str,
        body: &str,
    ) -> Result<Page, ConfluenceError> {
        self.record(ApiCall::UpdatePage {
            page_id: page_id.to_owned(),
            version,
            title: title.to_owned(),
            body: body.to_owned(),
        });

        let mut pages = self.pages.write().unwrap();
        let Some(page) = pages.values_mut().find(|page| page.id == page_id) else {
            return Err(ConfluenceError::Response {
                status: 404,
                body: format!("no content with id {page_id}"),
            });
        };
        if page.version.number != version {
            return Err(ConfluenceError::VersionConflict {
                page_id: page_id.to_owned(),
                version,
                body: format!("page is at version {}", page.version.number),
            });
        }
        page.version.number = version + 1;
        page.title = title.to_owned();
        Ok(page.clone())
    }

    fn set_labels(&self, page_id: &str, labels: &[String]) -> Result<(), ConfluenceError> {
        self.record(ApiCall::SetLabels {
            page_id: page_id.to_owned(),
            labels: labels.to_vec(),
        });
        Ok(())
    }

    fn validate_ancestor(&self, ancestor_id: &str) -> Result<bool, ConfluenceError> {
        self.record(ApiCall::ValidateAncestor {
            ancestor_id: ancestor_id.to_owned(),
        });
        let invalid = self.invalid_ancestors.read().unwrap();
        Ok(!invalid.iter().any(|id| id == ancestor_id))
    }

    fn upload_attachment(&self, page_id: &str, filename: &str, _data: &[u8]) -> Result<(), ConfluenceError> {
        self.record(ApiCall::UploadAttachment {
            page_id: page_id.to_owned(),
            filename: filename.to_owned(),
        });
        Ok(())
    }
}
