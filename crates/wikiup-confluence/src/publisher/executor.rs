//! Publisher implementation.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use wikiup_renderer::ConfluenceRenderer;
use wikiup_source::Document;

use crate::api::ConfluenceApi;

use super::PublishConfig;
use super::error::PublishError;
use super::result::{DocumentOutcome, DocumentReport, RunSummary};

/// Drives the create-or-update workflow against a Confluence backend.
pub struct Publisher<'a> {
    api: &'a dyn ConfluenceApi,
    config: PublishConfig,
}

impl<'a> Publisher<'a> {
    /// Create a publisher over an API backend.
    #[must_use]
    pub fn new(api: &'a dyn ConfluenceApi, config: PublishConfig) -> Self {
        Self { api, config }
    }

    /// Publish every file, one document at a time, in the given order.
    ///
    /// A failing document is recorded in the summary and the batch moves
    /// on to the next file.
    #[must_use]
    pub fn publish_all(&self, files: &[PathBuf]) -> RunSummary {
        let mut reports = Vec::with_capacity(files.len());
        for path in files {
            let result = self.publish_file(path);
            match &result {
                Ok(DocumentOutcome::Created(page)) => {
                    info!("{}: created page {}", path.display(), page.id);
                }
                Ok(DocumentOutcome::Updated(page)) => {
                    info!("{}: updated page {}", path.display(), page.id);
                }
                Ok(DocumentOutcome::Skipped) => {
                    info!("{}: skipped, not shared", path.display());
                }
                Err(err) => warn!("{}: {err}", path.display()),
            }
            reports.push(DocumentReport {
                path: path.clone(),
                result,
            });
        }
        RunSummary { reports }
    }

    /// Publish a single file.
    pub fn publish_file(&self, path: &Path) -> Result<DocumentOutcome, PublishError> {
        let text = fs::read_to_string(path)?;
        let Some(document) = Document::parse(path, &text)? else {
            return Ok(DocumentOutcome::Skipped);
        };
        if !document.is_shared() {
            return Ok(DocumentOutcome::Skipped);
        }
        self.publish_document(&document)
    }

    fn publish_document(&self, document: &Document) -> Result<DocumentOutcome, PublishError> {
        let space = document
            .space()
            .or(self.config.space.as_deref())
            .ok_or(PublishError::MissingSpace)?;
        let ancestor_id = document
            .ancestor_id()
            .or(self.config.ancestor_id.as_deref())
            .ok_or(PublishError::MissingAncestorId)?;
        let title = document.title();

        let rendered = ConfluenceRenderer::new().with_toc_macro().render(&document.body);

        if let Some(current) = self.api.find_page_by_title(space, &title)? {
            self.upload_attachments(&current.id, document, &rendered.attachments)?;
            let page = self
                .api
                .update_page(&current.id, current.version.number, &title, &rendered.html)?;
            self.apply_labels(&page.id, document)?;
            return Ok(DocumentOutcome::Updated(page));
        }

        if !self.api.validate_ancestor(ancestor_id)? {
            return Err(PublishError::AncestorNotFound(ancestor_id.to_owned()));
        }
        let page = self.api.create_page(space, ancestor_id, &title, &rendered.html)?;
        self.upload_attachments(&page.id, document, &rendered.attachments)?;
        self.apply_labels(&page.id, document)?;
        Ok(DocumentOutcome::Created(page))
    }

    /// Upload the document's local images.
    ///
    /// A source that cannot be read is logged and skipped; a failing
    /// upload fails the document.
    fn upload_attachments(
        &self,
        page_id: &str,
        document: &Document,
        attachments: &[String],
    ) -> Result<(), PublishError> {
        for source in attachments {
            let path = document.dir().join(source);
            let data = match fs::read(&path) {
                Ok(data) => data,
                Err(err) => {
                    warn!("Skipping attachment {}: {err}", path.display());
                    continue;
                }
            };
            let filename = source.rsplit('/').next().unwrap_or(source);
            self.api.upload_attachment(page_id, filename, &data)?;
        }
        Ok(())
    }

    /// Apply the union of the run label and the document's labels.
    fn apply_labels(&self, page_id: &str, document: &Document) -> Result<(), PublishError> {
        let mut labels: Vec<String> = Vec::new();
        if let Some(global) = &self.config.global_label {
            labels.push(global.clone());
        }
        for label in document.labels() {
            if !labels.contains(label) {
                labels.push(label.clone());
            }
        }
        if labels.is_empty() {
            return Ok(());
        }
        self.api.set_labels(page_id, &labels)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{ApiCall, MockApi};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const SHARED_DOC: &str = "---\ntitle: Greeting\nwiki:\n  share: true\n---\n~: hi :~\n";

    fn write_doc(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn config() -> PublishConfig {
        PublishConfig {
            space: Some("DOCS".to_owned()),
            ancestor_id: Some("99".to_owned()),
            global_label: Some("docs".to_owned()),
        }
    }

    #[test]
    fn test_document_without_front_matter_is_skipped() {
        let dir = TempDir::new().unwrap();
        let path = write_doc(&dir, "plain.md", "# No front matter\n");
        let api = MockApi::new();

        let outcome = Publisher::new(&api, config()).publish_file(&path).unwrap();
        assert!(matches!(outcome, DocumentOutcome::Skipped));
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_unshared_document_is_skipped_without_api_calls() {
        let dir = TempDir::new().unwrap();
        let path = write_doc(&dir, "local.md", "---\ntitle: Local\nwiki:\n  share: false\n---\nbody\n");
        let api = MockApi::new();

        let outcome = Publisher::new(&api, config()).publish_file(&path).unwrap();
        assert!(matches!(outcome, DocumentOutcome::Skipped));
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_create_flow_calls_in_order() {
        let dir = TempDir::new().unwrap();
        let path = write_doc(&dir, "greeting.md", SHARED_DOC);
        let api = MockApi::new();

        let outcome = Publisher::new(&api, config()).publish_file(&path).unwrap();
        assert!(matches!(outcome, DocumentOutcome::Created(_)));

        let calls = api.calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(
            calls[0],
            ApiCall::FindPage {
                space: "DOCS".to_owned(),
                title: "Greeting".to_owned(),
            }
        );
        assert_eq!(
            calls[1],
            ApiCall::ValidateAncestor {
                ancestor_id: "99".to_owned(),
            }
        );
        match &calls[2] {
            ApiCall::CreatePage {
                space,
                ancestor_id,
                title,
                body,
            } => {
                assert_eq!(space, "DOCS");
                assert_eq!(ancestor_id, "99");
                assert_eq!(title, "Greeting");
                assert!(body.contains(r#"ac:name="info""#), "{body}");
                assert!(body.contains("hi"), "{body}");
            }
            other => panic!("expected CreatePage, got {other:?}"),
        }
        assert_eq!(
            calls[3],
            ApiCall::SetLabels {
                page_id: "1001".to_owned(),
                labels: vec!["docs".to_owned()],
            }
        );
    }

    #[test]
    fn test_update_flow_uses_the_read_version() {
        let dir = TempDir::new().unwrap();
        let path = write_doc(&dir, "greeting.md", SHARED_DOC);
        let api = MockApi::new().with_page("DOCS", "Greeting", "123", 7);

        let outcome = Publisher::new(&api, config()).publish_file(&path).unwrap();
        match outcome {
            DocumentOutcome::Updated(page) => assert_eq!(page.version.number, 8),
            other => panic!("expected Updated, got {other:?}"),
        }

        let calls = api.calls();
        assert!(
            calls.iter().any(|call| matches!(
                call,
                ApiCall::UpdatePage { page_id, version: 7, .. } if page_id == "123"
            )),
            "{calls:?}"
        );
        assert!(!calls.iter().any(|call| matches!(call, ApiCall::CreatePage { .. })));
        assert!(!calls.iter().any(|call| matches!(call, ApiCall::ValidateAncestor { .. })));
    }

    #[test]
    fn test_republish_updates_instead_of_creating() {
        let dir = TempDir::new().unwrap();
        let path = write_doc(&dir, "greeting.md", SHARED_DOC);
        let api = MockApi::new();
        let publisher = Publisher::new(&api, config());

        assert!(matches!(
            publisher.publish_file(&path).unwrap(),
            DocumentOutcome::Created(_)
        ));
        assert!(matches!(
            publisher.publish_file(&path).unwrap(),
            DocumentOutcome::Updated(_)
        ));

        let creates = api
            .calls()
            .iter()
            .filter(|call| matches!(call, ApiCall::CreatePage { .. }))
            .count();
        assert_eq!(creates, 1);
    }

    #[test]
    fn test_document_ancestor_overrides_run_ancestor() {
        let dir = TempDir::new().unwrap();
        let path = write_doc(
            &dir,
            "pinned.md",
            "---\nwiki:\n  share: true\n  ancestor_id: 555\n---\nbody\n",
        );
        let api = MockApi::new();

        Publisher::new(&api, config()).publish_file(&path).unwrap();
        assert!(
            api.calls().contains(&ApiCall::ValidateAncestor {
                ancestor_id: "555".to_owned(),
            }),
            "{:?}",
            api.calls()
        );
    }

    #[test]
    fn test_document_space_overrides_run_space() {
        let dir = TempDir::new().unwrap();
        let path = write_doc(
            &dir,
            "team.md",
            "---\nwiki:\n  share: true\n  space: TEAM\n---\nbody\n",
        );
        let api = MockApi::new();

        Publisher::new(&api, config()).publish_file(&path).unwrap();
        assert_eq!(
            api.calls()[0],
            ApiCall::FindPage {
                space: "TEAM".to_owned(),
                title: "team".to_owned(),
            }
        );
    }

    #[test]
    fn test_missing_ancestor_fails_before_any_call() {
        let dir = TempDir::new().unwrap();
        let path = write_doc(&dir, "doc.md", SHARED_DOC);
        let api = MockApi::new();
        let publisher = Publisher::new(
            &api,
            PublishConfig {
                space: Some("DOCS".to_owned()),
                ancestor_id: None,
                global_label: None,
            },
        );

        let result = publisher.publish_file(&path);
        assert!(matches!(result, Err(PublishError::MissingAncestorId)));
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_missing_space_fails_before_any_call() {
        let dir = TempDir::new().unwrap();
        let path = write_doc(&dir, "doc.md", SHARED_DOC);
        let api = MockApi::new();
        let publisher = Publisher::new(
            &api,
            PublishConfig {
                space: None,
                ancestor_id: Some("99".to_owned()),
                global_label: None,
            },
        );

        let result = publisher.publish_file(&path);
        assert!(matches!(result, Err(PublishError::MissingSpace)));
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_unknown_ancestor_fails_the_document() {
        let dir = TempDir::new().unwrap();
        let path = write_doc(&dir, "doc.md", SHARED_DOC);
        let api = MockApi::new().with_invalid_ancestor("99");

        let result = Publisher::new(&api, config()).publish_file(&path);
        match result {
            Err(PublishError::AncestorNotFound(id)) => assert_eq!(id, "99"),
            other => panic!("expected AncestorNotFound, got {other:?}"),
        }
        assert!(!api.calls().iter().any(|call| matches!(call, ApiCall::CreatePage { .. })));
    }

    #[test]
    fn test_failure_does_not_stop_the_batch() {
        let dir = TempDir::new().unwrap();
        let bad = write_doc(&dir, "bad.md", "---\nwiki: [unterminated\n---\nbody\n");
        let good = write_doc(&dir, "good.md", SHARED_DOC);
        let api = MockApi::new();

        let summary = Publisher::new(&api, config()).publish_all(&[bad, good]);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.created(), 1);
        assert!(summary.has_failures());
        assert!(summary.reports[0].result.is_err());
        assert!(matches!(
            summary.reports[1].result,
            Ok(DocumentOutcome::Created(_))
        ));
    }

    #[test]
    fn test_labels_are_union_of_run_and_document() {
        let dir = TempDir::new().unwrap();
        let path = write_doc(
            &dir,
            "labelled.md",
            "---\nwiki:\n  share: true\n  labels: [guide, docs]\n---\nbody\n",
        );
        let api = MockApi::new();

        Publisher::new(&api, config()).publish_file(&path).unwrap();
        let labels = api.calls().iter().find_map(|call| match call {
            ApiCall::SetLabels { labels, .. } => Some(labels.clone()),
            _ => None,
        });
        assert_eq!(
            labels.unwrap(),
            vec!["docs".to_owned(), "guide".to_owned()]
        );
    }

    #[test]
    fn test_no_labels_means_no_set_labels_call() {
        let dir = TempDir::new().unwrap();
        let path = write_doc(&dir, "bare.md", "---\nwiki:\n  share: true\n---\nbody\n");
        let api = MockApi::new();
        let publisher = Publisher::new(
            &api,
            PublishConfig {
                space: Some("DOCS".to_owned()),
                ancestor_id: Some("99".to_owned()),
                global_label: None,
            },
        );

        publisher.publish_file(&path).unwrap();
        assert!(!api.calls().iter().any(|call| matches!(call, ApiCall::SetLabels { .. })));
    }

    #[test]
    fn test_attachments_upload_after_create() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("img")).unwrap();
        fs::write(dir.path().join("img/flow.png"), b"png-bytes").unwrap();
        let path = write_doc(
            &dir,
            "illustrated.md",
            "---\nwiki:\n  share: true\n---\n![diagram](img/flow.png)\n",
        );
        let api = MockApi::new();

        Publisher::new(&api, config()).publish_file(&path).unwrap();
        let calls = api.calls();
        let create_pos = calls
            .iter()
            .position(|call| matches!(call, ApiCall::CreatePage { .. }))
            .unwrap();
        let upload_pos = calls
            .iter()
            .position(|call| matches!(call, ApiCall::UploadAttachment { .. }))
            .unwrap();
        assert!(create_pos < upload_pos, "{calls:?}");
        assert!(
            calls.contains(&ApiCall::UploadAttachment {
                page_id: "1001".to_owned(),
                filename: "flow.png".to_owned(),
            }),
            "{calls:?}"
        );
    }

    #[test]
    fn test_attachments_upload_before_update() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("pic.png"), b"png-bytes").unwrap();
        let path = write_doc(
            &dir,
            "illustrated.md",
            "---\ntitle: Pics\nwiki:\n  share: true\n---\n![p](pic.png)\n",
        );
        let api = MockApi::new().with_page("DOCS", "Pics", "77", 2);

        Publisher::new(&api, config()).publish_file(&path).unwrap();
        let calls = api.calls();
        let upload_pos = calls
            .iter()
            .position(|call| matches!(call, ApiCall::UploadAttachment { .. }))
            .unwrap();
        let update_pos = calls
            .iter()
            .position(|call| matches!(call, ApiCall::UpdatePage { .. }))
            .unwrap();
        assert!(upload_pos < update_pos, "{calls:?}");
    }

    #[test]
    fn test_missing_attachment_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        let path = write_doc(
            &dir,
            "broken.md",
            "---\nwiki:\n  share: true\n---\n![gone](img/missing.png)\n",
        );
        let api = MockApi::new();

        let outcome = Publisher::new(&api, config()).publish_file(&path).unwrap();
        assert!(matches!(outcome, DocumentOutcome::Created(_)));
        assert!(!api.calls().iter().any(|call| matches!(call, ApiCall::UploadAttachment { .. })));
    }

    #[test]
    fn test_title_from_file_stem_drives_lookup() {
        let dir = TempDir::new().unwrap();
        let path = write_doc(&dir, "release-notes.md", "---\nwiki:\n  share: true\n---\nbody\n");
        let api = MockApi::new();

        Publisher::new(&api, config()).publish_file(&path).unwrap();
        assert_eq!(
            api.calls()[0],
            ApiCall::FindPage {
                space: "DOCS".to_owned(),
                title: "release-notes".to_owned(),
            }
        );
    }

    #[test]
    fn test_toc_macro_included_for_documents_with_headings() {
        let dir = TempDir::new().unwrap();
        let path = write_doc(
            &dir,
            "structured.md",
            "---\nwiki:\n  share: true\n---\n# Overview\n\ntext\n",
        );
        let api = MockApi::new();

        Publisher::new(&api, config()).publish_file(&path).unwrap();
        let body = api.calls().iter().find_map(|call| match call {
            ApiCall::CreatePage { body, .. } => Some(body.clone()),
            _ => None,
        });
        assert!(body.unwrap().starts_with(r#"<p><ac:structured-macro ac:name="toc""#));
    }
}
