//! A Markdown document and its page settings.

use std::path::{Path, PathBuf};

use crate::frontmatter::{FrontMatter, FrontMatterError, split_front_matter};

/// A Markdown document with parsed front-matter.
#[derive(Clone, Debug)]
pub struct Document {
    /// Source path as it was selected.
    pub path: PathBuf,
    /// Parsed front-matter record.
    pub front_matter: FrontMatter,
    /// Markdown content after the front-matter block.
    pub body: String,
}

impl Document {
    /// Parse raw file content into a document.
    ///
    /// Returns `Ok(None)` when the text carries no front-matter block at
    /// all; such files are never publishing candidates.
    pub fn parse(path: impl Into<PathBuf>, text: &str) -> Result<Option<Self>, FrontMatterError> {
        let Some((yaml, body)) = split_front_matter(text)? else {
            return Ok(None);
        };
        let front_matter = FrontMatter::from_yaml(yaml)?;
        Ok(Some(Self {
            path: path.into(),
            front_matter,
            body: body.to_owned(),
        }))
    }

    /// Whether the document is opted in to publishing.
    #[must_use]
    pub fn is_shared(&self) -> bool {
        self.front_matter.is_shared()
    }

    /// Page title: the front-matter title, or the file stem when absent.
    #[must_use]
    pub fn title(&self) -> String {
        if let Some(title) = &self.front_matter.title {
            return title.clone();
        }
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Document-level ancestor page id.
    #[must_use]
    pub fn ancestor_id(&self) -> Option<&str> {
        self.front_matter.wiki.as_ref().and_then(|wiki| wiki.ancestor_id.as_deref())
    }

    /// Document-level space key.
    #[must_use]
    pub fn space(&self) -> Option<&str> {
        self.front_matter.wiki.as_ref().and_then(|wiki| wiki.space.as_deref())
    }

    /// Labels declared by the document.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        match &self.front_matter.wiki {
            Some(wiki) => &wiki.labels,
            None => &[],
        }
    }

    /// Directory that relative attachment paths resolve against.
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }
}
