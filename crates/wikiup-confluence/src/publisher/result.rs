//! Run results.

use std::path::PathBuf;

use crate::types::Page;

use super::error::PublishError;

/// What publishing one document did.
#[derive(Clone, Debug)]
pub enum DocumentOutcome {
    /// A new page was created.
    Created(Page),
    /// An existing page was updated in place.
    Updated(Page),
    /// The document is not opted in to publishing.
    Skipped,
}

/// Result of one document, in processing order.
#[derive(Debug)]
pub struct DocumentReport {
    /// Source path as selected.
    pub path: PathBuf,
    /// Outcome or the error that stopped this document.
    pub result: Result<DocumentOutcome, PublishError>,
}

/// Aggregated results of a run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Per-document reports, one per selected file.
    pub reports: Vec<DocumentReport>,
}

impl RunSummary {
    /// Number of pages created.
    #[must_use]
    pub fn created(&self) -> usize {
        self.count(|outcome| matches!(outcome, DocumentOutcome::Created(_)))
    }

    /// Number of pages updated.
    #[must_use]
    pub fn updated(&self) -> usize {
        self.count(|outcome| matches!(outcome, DocumentOutcome::Updated(_)))
    }

    /// Number of documents skipped.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, DocumentOutcome::Skipped))
    }

    /// Number of documents that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.reports.iter().filter(|report| report.result.is_err()).count()
    }

    /// Whether any document failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.reports.iter().any(|report| report.result.is_err())
    }

    fn count(&self, matches: impl Fn(&DocumentOutcome) -> bool) -> usize {
        self.reports
            .iter()
            .filter_map(|report| report.result.as_ref().ok())
            .filter(|outcome| matches(outcome))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Page, Version};
    use pretty_assertions::assert_eq;

    fn page(id: &str) -> Page {
        Page {
            id: id.to_owned(),
            content_type: "page".to_owned(),
            title: "T".to_owned(),
            version: Version { number: 1 },
        }
    }

    #[test]
    fn test_counts_by_outcome() {
        let summary = RunSummary {
            reports: vec![
                DocumentReport {
                    path: "a.md".into(),
                    result: Ok(DocumentOutcome::Created(page("1"))),
                },
                DocumentReport {
                    path: "b.md".into(),
                    result: Ok(DocumentOutcome::Updated(page("2"))),
                },
                DocumentReport {
                    path: "c.md".into(),
                    result: Ok(DocumentOutcome::Skipped),
                },
                DocumentReport {
                    path: "d.md".into(),
                    result: Err(PublishError::MissingSpace),
                },
            ],
        };
        assert_eq!(summary.created(), 1);
        assert_eq!(summary.updated(), 1);
        assert_eq!(summary.skipped(), 1);
        assert_eq!(summary.failed(), 1);
        assert!(summary.has_failures());
    }

    #[test]
    fn test_empty_summary_has_no_failures() {
        let summary = RunSummary::default();
        assert_eq!(summary.created(), 0);
        assert!(!summary.has_failures());
    }
}
