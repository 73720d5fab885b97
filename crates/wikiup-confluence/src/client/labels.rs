//! Label operations.

use serde_json::json;
use tracing::info;

use super::{ConfluenceClient, USER_AGENT};
use crate::error::ConfluenceError;

/// Label namespace used for all labels.
const LABEL_PREFIX: &str = "global";

impl ConfluenceClient {
    /// Add labels to a page.
    ///
    /// Labels already on the page are kept; the API treats this as a
    /// union, not a replacement.
    pub fn set_labels(&self, page_id: &str, labels: &[String]) -> Result<(), ConfluenceError> {
        if self.dry_run {
            info!("Dry run: would set labels {labels:?} on page {page_id}");
            return Ok(());
        }

        let url = format!("{}/content/{page_id}/label", self.api_url());
        let payload: Vec<_> = labels
            .iter()
            .map(|name| json!({"prefix": LABEL_PREFIX, "name": name}))
            .collect();

        info!("Setting labels {labels:?} on page {page_id}");

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
        Ok(())
    }
}
