//! Document sources for wikiup.
//!
//! This crate decides which files a run looks at and what each file says
//! about itself. Candidate files come either from explicit paths given on
//! the command line or from the files touched by the most recent commit of
//! a git repository. Each candidate is then parsed for a YAML front-matter
//! block that opts the document in to publishing and carries its page
//! settings.

mod document;
mod frontmatter;
mod git;
mod selector;

pub use document::Document;
pub use frontmatter::{FrontMatter, FrontMatterError, WikiSettings, split_front_matter};
pub use selector::{InputSet, SelectError, resolve_inputs, select_files};
