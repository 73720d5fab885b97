//! YAML front-matter extraction and parsing.
//!
//! A front-matter block is delimited by `---` lines and must start on the
//! first line of the file:
//!
//! ```text
//! ---
//! title: Release process
//! wiki:
//!   share: true
//!   labels: [process]
//! ---
//! ```
//!
//! Files that do not begin with a delimiter line carry no front-matter at
//! all, which is different from an empty block: the former is not a
//! publishing candidate, the latter is a parsed (default) record.

use serde::{Deserialize, Deserializer};

/// Line that opens and closes a front-matter block.
const DELIMITER: &str = "---";

/// Front-matter parsing error.
#[derive(Debug, thiserror::Error)]
pub enum FrontMatterError {
    /// The YAML block did not parse.
    #[error("{0}")]
    Parse(String),

    /// An opening delimiter without a closing one.
    #[error("front-matter block opened with '---' but never closed")]
    Unterminated,
}

/// Parsed front-matter record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct FrontMatter {
    /// Page title; the file stem is used when absent.
    #[serde(default)]
    pub title: Option<String>,
    /// Publishing settings; absent means the document stays local.
    #[serde(default)]
    pub wiki: Option<WikiSettings>,
}

/// The `wiki:` mapping of a front-matter block.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct WikiSettings {
    /// Opt-in flag; only `share: true` documents are published.
    #[serde(default)]
    pub share: bool,
    /// Parent page for this document, overriding the run-level ancestor.
    #[serde(default, deserialize_with = "string_or_number")]
    pub ancestor_id: Option<String>,
    /// Space key for this document, overriding the run-level space.
    #[serde(default)]
    pub space: Option<String>,
    /// Labels to attach to the page.
    #[serde(default)]
    pub labels: Vec<String>,
}

impl FrontMatter {
    /// Parse a YAML block into a front-matter record.
    ///
    /// An empty or whitespace-only block yields the default record.
    pub fn from_yaml(content: &str) -> Result<Self, FrontMatterError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(trimmed).map_err(|e| FrontMatterError::Parse(format!("invalid YAML: {e}")))
    }

    /// Whether the document is opted in to publishing.
    #[must_use]
    pub fn is_shared(&self) -> bool {
        self.wiki.as_ref().is_some_and(|wiki| wiki.share)
    }
}

/// Split raw document text into its front-matter block and body.
///
/// Returns `Ok(None)` when the text does not start with a delimiter line,
/// and [`FrontMatterError::Unterminated`] when the closing delimiter is
/// missing. Both halves are slices of the input; the body starts right
/// after the closing delimiter line.
pub fn split_front_matter(text: &str) -> Result<Option<(&str, &str)>, FrontMatterError> {
    let mut lines = text.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok(None);
    };
    if !is_delimiter(first) {
        return Ok(None);
    }

    let rest = &text[first.len()..];
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if is_delimiter(line) {
            let body = &rest[offset + line.len()..];
            return Ok(Some((&rest[..offset], body)));
        }
        offset += line.len();
    }
    Err(FrontMatterError::Unterminated)
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end_matches(['\r', '\n']) == DELIMITER
}

/// Accepts `ancestor_id: 12345` as well as `ancestor_id: "12345"`.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(serde_yaml::Value::String(s)) => Ok(Some(s)),
        Some(serde_yaml::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or number, found {other:?}"
        ))),
    }
}
