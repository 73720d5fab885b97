//! Alert span rewriting.
//!
//! Runs over rendered storage format and replaces delimited spans with
//! admonition macros:
//!
//! | Span            | Macro     |
//! |-----------------|-----------|
//! | `~: text :~`    | `info`    |
//! | `~% text %~`    | `tip`     |
//! | `~? text ?~`    | `note`    |
//! | `~! text !~`    | `warning` |
//!
//! Matching is non-greedy. A span that would cross paragraph markup is
//! left as written, as is an opener with no closer. Delimiters inside
//! code content never participate: the pass runs against a masked copy
//! of the input in which code bodies are blanked out, so a span may wrap
//! a code fragment but can never begin or end inside one.

use std::sync::LazyLock;

use regex::Regex;

/// Byte length of each opening and closing delimiter.
const DELIMITER_LEN: usize = 2;

static INFO_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)~:.*?:~").unwrap());
static TIP_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)~%.*?%~").unwrap());
static NOTE_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)~\?.*?\?~").unwrap());
static WARNING_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)~!.*?!~").unwrap());

/// Regions whose content is opaque to alert matching.
static PROTECTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<ac:plain-text-body><!\[CDATA\[.*?\]\]></ac:plain-text-body>|<code>.*?</code>")
        .unwrap()
});

/// Replace alert spans in rendered storage format with admonition macros.
pub(crate) fn rewrite_alerts(html: &str) -> String {
    let mut text = html.to_owned();
    let mut shadow = mask_protected(html);
    for (re, name) in [
        (&*INFO_SPAN, "info"),
        (&*TIP_SPAN, "tip"),
        (&*NOTE_SPAN, "note"),
        (&*WARNING_SPAN, "warning"),
    ] {
        (text, shadow) = rewrite_kind(&text, &shadow, re, name);
    }
    text
}

/// Rewrite one delimiter kind.
///
/// The regex runs against the shadow copy; slices of the real text are
/// taken at the matched positions, so masked content comes out intact.
/// Both strings are rewritten in step to keep positions aligned for the
/// next kind.
fn rewrite_kind(text: &str, shadow: &str, re: &Regex, name: &str) -> (String, String) {
    let mut out_text = String::with_capacity(text.len());
    let mut out_shadow = String::with_capacity(shadow.len());
    let mut pos = 0;
    while let Some(found) = re.find_at(shadow, pos) {
        let raw_start = found.start() + DELIMITER_LEN;
        let raw_end = found.end() - DELIMITER_LEN;
        let (inner_start, inner_end) = trim_span(shadow, raw_start, raw_end);
        let inner = &shadow[inner_start..inner_end];

        if inner.contains("</p>") || inner.contains("<p>") {
            // crosses paragraph markup: keep the opener as written and rescan
            let resume = found.start() + DELIMITER_LEN;
            out_text.push_str(&text[pos..resume]);
            out_shadow.push_str(&shadow[pos..resume]);
            pos = resume;
            continue;
        }

        out_text.push_str(&text[pos..found.start()]);
        out_shadow.push_str(&shadow[pos..found.start()]);
        out_text.push_str(&alert_macro(name, &text[inner_start..inner_end]));
        out_shadow.push_str(&alert_macro(name, inner));
        pos = found.end();
    }
    out_text.push_str(&text[pos..]);
    out_shadow.push_str(&shadow[pos..]);
    (out_text, out_shadow)
}

/// Narrow `[start, end)` past leading and trailing whitespace.
fn trim_span(text: &str, start: usize, end: usize) -> (usize, usize) {
    let raw = &text[start..end];
    if raw.trim().is_empty() {
        return (start, start);
    }
    let lead = raw.len() - raw.trim_start().len();
    let trail = raw.len() - raw.trim_end().len();
    (start + lead, end - trail)
}

fn alert_macro(name: &str, body: &str) -> String {
    format!(
        r#"<ac:structured-macro ac:name="{name}" ac:schema-version="1"><ac:rich-text-body>{body}</ac:rich-text-body></ac:structured-macro>"#
    )
}

/// Copy of the input with protected regions blanked out.
///
/// ASCII characters become `x` so no delimiter (and no paragraph tag)
/// survives inside a protected region; non-ASCII characters are kept to
/// preserve byte positions.
fn mask_protected(html: &str) -> String {
    let mut masked = String::with_capacity(html.len());
    let mut pos = 0;
    for found in PROTECTED.find_iter(html) {
        masked.push_str(&html[pos..found.start()]);
        for c in html[found.start()..found.end()].chars() {
            masked.push(if c.is_ascii() { 'x' } else { c });
        }
        pos = found.end();
    }
    masked.push_str(&html[pos..]);
    debug_assert_eq!(masked.len(), html.len());
    masked
}
