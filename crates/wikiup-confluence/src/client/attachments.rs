//! Attachment operations.

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use rand::RngExt;
use tracing::info;

use super::{ConfluenceClient, USER_AGENT};
use crate::error::ConfluenceError;
use crate::types::{Attachment, AttachmentResults};

impl ConfluenceClient {
    /// Attach a file to a page.
    ///
    /// Posting a filename that already exists on the page is an API
    /// error, so an existing attachment is updated through its data
    /// endpoint instead.
    pub fn upload_attachment(
        &self,
        page_id: &str,
        filename: &str,
        data: &[u8],
    ) -> Result<(), ConfluenceError> {
        if self.dry_run {
            info!(
                "Dry run: would upload attachment \"{filename}\" ({} bytes) to page {page_id}",
                data.len()
            );
            return Ok(());
        }

        let url = match self.find_attachment_by_name(page_id, filename)? {
            Some(existing) => format!(
                "{}/content/{page_id}/child/attachment/{}/data",
                self.api_url(),
                existing.id
            ),
            None => format!("{}/content/{page_id}/child/attachment", self.api_url()),
        };

        let boundary = format!("----WikiupFormBoundary{:016x}", rand::rng().random::<u64>());
        let content_type = content_type_for(filename);

        let mut body = Vec::with_capacity(data.len() + 256);
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n").as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        info!("Uploading attachment \"{filename}\" ({} bytes) to page {page_id}", data.len());

        let auth_header = self.auth.header_value();
        let mut request = self
            .agent
            .post(&url)
            .header("Authorization", &auth_header)
            .header("Accept", "application/json")
            .header(
                "Content-Type",
                &format!("multipart/form-data; boundary={boundary}"),
            )
            .header("X-Atlassian-Token", "no-check")
            .header("User-Agent", USER_AGENT);
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request.send(&body[..])?;

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

    /// Look up an attachment on a page by file name.
    fn find_attachment_by_name(
        &self,
        page_id: &str,
        filename: &str,
    ) -> Result<Option<Attachment>, ConfluenceError> {
        let url = format!(
            "{}/content/{page_id}/child/attachment?filename={}",
            self.api_url(),
            utf8_percent_encode(filename, NON_ALPHANUMERIC),
        );

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

        let results: AttachmentResults = body_reader.read_json()?;
        Ok(results.results.into_iter().next())
    }
}

/// Content type for an attachment, from its file extension.
fn content_type_for(filename: &str) -> &'static str {
    let extension = filename.rsplit('.').next().map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}
