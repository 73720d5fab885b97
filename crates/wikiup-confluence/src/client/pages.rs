//! Page operations.

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::json;
use tracing::info;

use super::{ConfluenceClient, USER_AGENT};
use crate::error::ConfluenceError;
use crate::types::{Page, SearchResults};

impl ConfluenceClient {
    /// Find a page by exact title within a space.
    ///
    /// Lookups are read-only and run even in dry-run mode.
    pub fn find_page_by_title(&self, space: &str, title: &str) -> Result<Option<Page>, ConfluenceError> {
        let url = format!(
            "{}/content?spaceKey={}&title={}&expand=version",
            self.api_url(),
            utf8_percent_encode(space, NON_ALPHANUMERIC),
            utf8_percent_encode(title, NON_ALPHANUMERIC),
        );

        info!("Looking up page \"{title}\" in space {space}");

        let auth_header = self.auth.header_value();
        let mut request = self
            .agent
            .get(&url)
            .header("Authorization", &auth_header)
            .header("Accept", "application/json")
            .header("X-Atlassian-Token", "no-check")
            .header("User-Agent", USER_AGENT);
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request.call()?;

        let status = response.status().as_u16();
        let mut body_reader = response.into_body();

        if status >= 400 {
            let error_body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(ConfluenceError::Response {
                status,
                body: error_body,
            });
        }

        let results: SearchResults = body_reader.read_json()?;
        Ok(results.results.into_iter().next())
    }

    /// Create a page under an ancestor.
    pub fn create_page(
        &self,
        space: &str,
        ancestor_id: &str,
        title: &str,
        body: &str,
    ) -> Result<Page, ConfluenceError> {
        if self.dry_run {
            info!("Dry run: would create page \"{title}\" in space {space} under ancestor {ancestor_id}");
            return Ok(Page::synthetic(title));
        }

        let url = format!("{}/content", self.api_url());
        let payload = json!({
            "type": "page",
            "title": title,
            "space": {"key": space},
            "ancestors": [{"id": ancestor_id}],
            "body": {
                "storage": {
                    "value": body,
                    "representation": "storage"
                }
            }
        });

        info!("Creating page \"{title}\" in space {space} under ancestor {ancestor_id}");

        let payload_bytes = serde_json::to_vec(&payload)?;
        let auth_header = self.auth.header_value();
        let mut request = self
            .agent
            .post(&url)
            .header("Authorization", &auth_header)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .header("X-Atlassian-Token", "no-check")
            .header("User-Agent", USER_AGENT);
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request.send(&payload_bytes[..])?;

        let status = response.status().as_u16();
        let mut body_reader = response.into_body();

        if status >= 400 {
            let error_body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(ConfluenceError::Response {
                status,
                body: error_body,
            });
        }

        let page: Page = body_reader.read_json()?;
        info!("Created page \"{}\" with id {}", page.title, page.id);
        Ok(page)
    }

    /// Update a page in place.
    ///
    /// `version` must come from the latest read of the page; the server
    /// stores `version + 1`. A 409 from the server means someone else
    /// got there first and surfaces as
    /// [`ConfluenceError::VersionConflict`].
    pub fn update_page(
        &self,
        page_id: &str,
        version: u32,
        title: &str,
        body: &str,
    ) -> Result<Page, ConfluenceError> {
        if self.dry_run {
            info!("Dry run: would update page {page_id} from version {version}");
            return Ok(Page::synthetic(title));
        }

        let url = format!("{}/content/{page_id}", self.api_url());
        let payload = json!({
            "type": "page",
            "title": title,
            "body": {
                "storage": {
                    "value": body,
                    "representation": "storage"
                }
            },
            "version": {"number": version + 1}
        });

        info!("Updating page {page_id} from version {version}");

        let payload_bytes = serde_json::to_vec(&payload)?;
        let auth_header = self.auth.header_value();
        let mut request = self
            .agent
            .put(&url)
            .header("Authorization", &auth_header)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .header("X-Atlassian-Token", "no-check")
            .header("User-Agent", USER_AGENT);
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request.send(&payload_bytes[..])?;

        let status = response.status().as_u16();
        let mut body_reader = response.into_body();

        if status == 409 {
            let error_body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(ConfluenceError::VersionConflict {
                page_id: page_id.to_owned(),
                version,
                body: error_body,
            });
        }
        if status >= 400 {
            let error_body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(ConfluenceError::Response {
                status,
                body: error_body,
            });
        }

        let page: Page = body_reader.read_json()?;
        info!("Updated page {} to version {}", page.id, page.version.number);
        Ok(page)
    }

    /// Whether a page exists that can serve as an ancestor.
    pub fn validate_ancestor(&self, ancestor_id: &str) -> Result<bool, ConfluenceError> {
        if self.dry_run {
            info!("Dry run: would validate ancestor {ancestor_id}");
            return Ok(true);
        }

        let url = format!("{}/content/{ancestor_id}", self.api_url());

        info!("Validating ancestor {ancestor_id}");

        let auth_header = self.auth.header_value();
        let mut request = self
            .agent
            .get(&url)
            .header("Authorization", &auth_header)
            .header("Accept", "application/json")
            .header("X-Atlassian-Token", "no-check")
            .header("User-Agent", USER_AGENT);
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request.call()?;

        let status = response.status().as_u16();
        if status == 404 {
            return Ok(false);
        }
        if status >= 400 {
            let mut body_reader = response.into_body();
            let error_body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(ConfluenceError::Response {
                status,
                body: error_body,
            });
        }
        Ok(true)
    }
}
