//! Event-driven Markdown renderer targeting Confluence storage format.

use std::fmt::Write;
use std::ops::Range;
use std::path::Path;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::alerts::rewrite_alerts;

/// Emitted ahead of the body when the document has headings.
const TOC_MACRO: &str = r#"<p><ac:structured-macro ac:name="toc" ac:schema-version="1" /></p>"#;

/// A rendered document.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Storage format XML.
    pub html: String,
    /// Local image sources referenced by the document, in order of first
    /// appearance. These need to be uploaded as attachments.
    pub attachments: Vec<String>,
}

/// Renders a Markdown body to Confluence storage format.
///
/// Block and inline structure map to XHTML; code blocks become `code`
/// macros, blockquotes become `info` macros. Links to local Markdown
/// files become page links by title, local images become attachment
/// references, and alert spans are rewritten in a post-pass. Only double
/// tildes render as strikethrough; a single-tilde span comes out as
/// literal tildes so alert delimiters survive to the post-pass.
pub struct ConfluenceRenderer {
    toc_macro: bool,
    output: String,
    in_code_block: bool,
    in_table_head: bool,
    saw_heading: bool,
    /// Whether each open strikethrough span used a double-tilde run.
    strikethrough_doubles: Vec<bool>,
    /// Local image sources seen so far.
    attachments: Vec<String>,
    /// Source of the image being rendered; its alt text is dropped.
    pending_image: Option<String>,
    /// Target page title while rendering a link to a local Markdown file;
    /// the link text is captured instead of emitted.
    pending_page_link: Option<String>,
    link_text: String,
}

impl ConfluenceRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            toc_macro: false,
            output: String::with_capacity(4096),
            in_code_block: false,
            in_table_head: false,
            saw_heading: false,
            strikethrough_doubles: Vec::new(),
            attachments: Vec::new(),
            pending_image: None,
            pending_page_link: None,
            link_text: String::new(),
        }
    }

    /// Prepend a table-of-contents macro when the document has headings.
    #[must_use]
    pub fn with_toc_macro(mut self) -> Self {
        self.toc_macro = true;
        self
    }

    /// Render a Markdown body.
    #[must_use]
    pub fn render(mut self, markdown: &str) -> RenderResult {
        let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
        for (event, range) in Parser::new_ext(markdown, options).into_offset_iter() {
            self.process_event(event, range, markdown);
        }

        let mut html = rewrite_alerts(&self.output);
        if self.toc_macro && self.saw_heading {
            html.insert_str(0, TOC_MACRO);
        }
        RenderResult {
            html,
            attachments: self.attachments,
        }
    }

    fn process_event(&mut self, event: Event<'_>, range: Range<usize>, source: &str) {
        match event {
            // The events for ~x~ and ~~x~~ look the same; only the source
            // tells the spans apart.
            Event::Start(Tag::Strikethrough) => {
                let double = source[range].starts_with("~~");
                self.strikethrough_doubles.push(double);
                self.push_inline(if double { "<s>" } else { "~" });
            }
            Event::End(TagEnd::Strikethrough) => {
                let double = self.strikethrough_doubles.pop().unwrap_or(true);
                self.push_inline(if double { "</s>" } else { "~" });
            }
            Event::Start(tag) => self.start_tag(&tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.push_inline(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.push_inline("<br />"),
            Event::Rule => self.output.push_str("<hr />"),
            Event::TaskListMarker(checked) => self.output.push_str(if checked { "[x] " } else { "[ ] " }),
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {}
        }
    }

    fn start_tag(&mut self, tag: &Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, .. } => {
                self.saw_heading = true;
                write!(self.output, "<h{}>", heading_level(*level)).unwrap();
            }
            Tag::BlockQuote(_) => self.output.push_str(
                r#"<ac:structured-macro ac:name="info" ac:schema-version="1"><ac:rich-text-body>"#,
            ),
            Tag::CodeBlock(kind) => {
                self.in_code_block = true;
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info.split_whitespace().next().unwrap_or(""),
                    CodeBlockKind::Indented => "",
                };
                self.output
                    .push_str(r#"<ac:structured-macro ac:name="code" ac:schema-version="1">"#);
                if !language.is_empty() {
                    write!(
                        self.output,
                        r#"<ac:parameter ac:name="language">{}</ac:parameter>"#,
                        escape_xml(language)
                    )
                    .unwrap();
                }
                self.output
                    .push_str(r#"<ac:parameter ac:name="linenumbers">true</ac:parameter>"#);
                self.output.push_str("<ac:plain-text-body><![CDATA[");
            }
            Tag::List(Some(1)) => self.output.push_str("<ol>"),
            Tag::List(Some(start)) => {
                write!(self.output, r#"<ol start="{start}">"#).unwrap();
            }
            Tag::List(None) => self.output.push_str("<ul>"),
            Tag::Item => self.output.push_str("<li>"),
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::Table(_) => self.output.push_str("<table><tbody>"),
            Tag::TableHead => {
                self.in_table_head = true;
                self.output.push_str("<tr>");
            }
            Tag::TableRow => self.output.push_str("<tr>"),
            Tag::TableCell => self
                .output
                .push_str(if self.in_table_head { "<th>" } else { "<td>" }),
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            // dispatched in process_event, needs the source text
            Tag::Strikethrough => {}
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
            Tag::Link { dest_url, .. } => self.start_link(dest_url),
            Tag::Image { dest_url, .. } => {
                self.pending_image = Some(dest_url.to_string());
            }
            Tag::HtmlBlock | Tag::FootnoteDefinition(_) | Tag::MetadataBlock(_) => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>"),
            TagEnd::Heading(level) => {
                write!(self.output, "</h{}>", heading_level(level)).unwrap();
            }
            TagEnd::BlockQuote(_) => self
                .output
                .push_str("</ac:rich-text-body></ac:structured-macro>"),
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.output.push_str("]]></ac:plain-text-body></ac:structured-macro>");
            }
            TagEnd::List(true) => self.output.push_str("</ol>"),
            TagEnd::List(false) => self.output.push_str("</ul>"),
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.in_table_head = false;
                self.output.push_str("</tr>");
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => self
                .output
                .push_str(if self.in_table_head { "</th>" } else { "</td>" }),
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            // dispatched in process_event, needs the source text
            TagEnd::Strikethrough => {}
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
            TagEnd::Link => self.end_link(),
            TagEnd::Image => self.end_image(),
            TagEnd::HtmlBlock | TagEnd::FootnoteDefinition | TagEnd::MetadataBlock(_) => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_code_block {
            // CDATA body takes the code verbatim
            self.output.push_str(text);
        } else if self.pending_image.is_some() {
            // alt text is dropped; the reference carries the filename
        } else if self.pending_page_link.is_some() {
            self.link_text.push_str(text);
        } else {
            self.output.push_str(&escape_xml(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.pending_image.is_some() {
            return;
        }
        if self.pending_page_link.is_some() {
            self.link_text.push_str(code);
            return;
        }
        write!(self.output, "<code>{}</code>", escape_xml(code)).unwrap();
    }

    fn soft_break(&mut self) {
        if self.pending_image.is_some() {
            return;
        }
        if self.pending_page_link.is_some() {
            self.link_text.push(' ');
            return;
        }
        self.output.push('\n');
    }

    /// Push inline markup unless a plain-text capture is active.
    fn push_inline(&mut self, content: &str) {
        if self.pending_image.is_none() && self.pending_page_link.is_none() {
            self.output.push_str(content);
        }
    }

    fn start_link(&mut self, dest: &str) {
        if let Some(title) = page_link_target(dest) {
            self.pending_page_link = Some(title);
            self.link_text.clear();
        } else {
            self.push_inline(&format!(r#"<a href="{}">"#, escape_xml(dest)));
        }
    }

    fn end_link(&mut self) {
        if let Some(title) = self.pending_page_link.take() {
            let text = std::mem::take(&mut self.link_text);
            let text = if text.trim().is_empty() { title.clone() } else { text };
            write!(
                self.output,
                r#"<ac:link><ri:page ri:content-title="{}" /><ac:plain-text-link-body><![CDATA[{text}]]></ac:plain-text-link-body></ac:link>"#,
                escape_xml(&title),
            )
            .unwrap();
        } else {
            self.push_inline("</a>");
        }
    }

    fn end_image(&mut self) {
        let Some(src) = self.pending_image.take() else {
            return;
        };
        if src.is_empty() {
            return;
        }
        if src.starts_with("http://") || src.starts_with("https://") {
            write!(
                self.output,
                r#"<ac:image><ri:url ri:value="{}" /></ac:image>"#,
                escape_xml(&src)
            )
            .unwrap();
            return;
        }

        let filename = src.rsplit('/').next().unwrap_or(&src);
        write!(
            self.output,
            r#"<ac:image><ri:attachment ri:filename="{}" /></ac:image>"#,
            escape_xml(filename)
        )
        .unwrap();
        if !self.attachments.contains(&src) {
            self.attachments.push(src);
        }
    }
}

impl Default for ConfluenceRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Page title for a link that points at a local Markdown file.
///
/// External URLs, anchors and mail links are left to the regular anchor
/// path; a relative path ending in `.md` (fragment and query stripped)
/// maps to the page named after its file stem.
fn page_link_target(dest: &str) -> Option<String> {
    if dest.contains("://") || dest.starts_with('#') || dest.starts_with("mailto:") {
        return None;
    }
    let path = dest.split(['#', '?']).next().unwrap_or(dest);
    let path = Path::new(path);
    if !path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("md")) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    Some(stem.to_owned())
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
