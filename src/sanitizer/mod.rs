//! Snapshot sanitization: reduce a raw page snapshot to the markup an agent
//! actually needs.
//!
//! The raw markup reported by the browser is dominated by scripts, styling
//! and tracking attributes. `sanitize` parses the snapshot with a tolerant
//! HTML5 parser, drops every subtree rooted at a stripped tag, keeps only
//! allow-listed attributes on the surviving elements and re-serializes the
//! document element as indented markup.
//!
//! The operation is pure and synchronous: no I/O, no logging, no shared
//! mutable state. A [`Sanitizer`] can be shared freely between tasks.

mod printer;

use std::collections::HashSet;

use html5ever::tendril::{StrTendril, TendrilSink};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use printer::TreePrinter;

/// Attribute names that survive sanitization.
///
/// Everything else (event handlers, inline styles, `data-*` tracking
/// attributes, framework internals) is dropped.
pub const DEFAULT_ALLOWED_ATTRIBUTES: &[&str] = &[
    "name",
    "type",
    "id",
    "class",
    "href",
    "src",
    "title",
    "placeholder",
    "value",
    "checked",
    "selected",
    "disabled",
    "readonly",
    "multiple",
    "required",
    "min",
    "max",
    "step",
    "pattern",
    "accept",
    "accept-charset",
    "autocomplete",
    "autofocus",
    "form",
    "formaction",
    "formenctype",
    "formmethod",
    "formnovalidate",
    "formtarget",
    "height",
    "width",
    "alt",
    "download",
    "media",
    "target",
    "tabindex",
    "accesskey",
    "contenteditable",
    "draggable",
    "dropzone",
    "hidden",
];

/// Tag names whose element and entire descendant subtree are removed.
pub const DEFAULT_STRIPPED_TAGS: &[&str] =
    &["script", "style", "noscript", "img", "svg", "link", "meta"];

/// Spaces per nesting level in the pretty-printed output.
pub const DEFAULT_INDENT_SIZE: usize = 2;

/// Error raised when a snapshot cannot be interpreted as markup.
///
/// Tolerant parsing repairs unclosed tags, missing wrappers and most other
/// damage, so this only fires for input that is not markup-like at all.
/// It is surfaced to the caller as-is; the sanitizer never retries.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SanitizeError {
    /// The input could not be parsed into any document tree.
    #[error("snapshot is not parseable markup: {0}")]
    Parse(String),
}

/// Reduces raw page snapshots to clean, deterministic markup.
///
/// Holds the attribute allow-set, the tag deny-set and the indent width.
/// The defaults match [`DEFAULT_ALLOWED_ATTRIBUTES`],
/// [`DEFAULT_STRIPPED_TAGS`] and [`DEFAULT_INDENT_SIZE`].
#[derive(Debug, Clone)]
pub struct Sanitizer {
    allowed_attributes: HashSet<String>,
    stripped_tags: HashSet<String>,
    indent_size: usize,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sanitizer {
    /// Create a sanitizer with the default rule sets.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rules(
            DEFAULT_ALLOWED_ATTRIBUTES.iter().map(ToString::to_string),
            DEFAULT_STRIPPED_TAGS.iter().map(ToString::to_string),
            DEFAULT_INDENT_SIZE,
        )
    }

    /// Create a sanitizer with custom rule sets.
    ///
    /// Names are matched case-insensitively against what the parser reports,
    /// so both lists are normalized to lowercase here.
    #[must_use]
    pub fn with_rules(
        allowed_attributes: impl IntoIterator<Item = String>,
        stripped_tags: impl IntoIterator<Item = String>,
        indent_size: usize,
    ) -> Self {
        Self {
            allowed_attributes: allowed_attributes
                .into_iter()
                .map(|name| name.to_ascii_lowercase())
                .collect(),
            stripped_tags: stripped_tags
                .into_iter()
                .map(|name| name.to_ascii_lowercase())
                .collect(),
            indent_size,
        }
    }

    /// Sanitize a raw snapshot into clean, pretty-printed markup.
    ///
    /// Parses the input tolerantly (unclosed tags and missing `html`/`body`
    /// wrappers are repaired, not rejected), removes every stripped-tag
    /// subtree, filters attributes on all surviving elements including the
    /// document element itself, and serializes the result with one indent
    /// unit per nesting level.
    ///
    /// Text and comment nodes outside removed subtrees are carried through;
    /// only whitespace between markup tokens is normalized. The output is
    /// byte-identical across calls with the same input, and re-sanitizing
    /// the output reproduces it exactly.
    ///
    /// The caller's input string is never mutated; the tree built here is
    /// private to this call.
    ///
    /// # Errors
    ///
    /// [`SanitizeError::Parse`] if the input is empty or yields no document
    /// element.
    pub fn sanitize(&self, raw: &str) -> Result<String, SanitizeError> {
        if raw.trim().is_empty() {
            return Err(SanitizeError::Parse(
                "empty input has no document element".into(),
            ));
        }

        let dom: RcDom = html5ever::parse_document(RcDom::default(), html5ever::ParseOpts::default())
            .one(StrTendril::from_slice(raw));

        let root = document_element(&dom.document).ok_or_else(|| {
            SanitizeError::Parse("no document element could be constructed".into())
        })?;

        let printer = TreePrinter::new(
            &self.allowed_attributes,
            &self.stripped_tags,
            self.indent_size,
        );

        let mut out = String::with_capacity(raw.len() / 2);
        printer.write_node(&root, 0, &mut out);
        out.truncate(out.trim_end().len());
        Ok(out)
    }

    /// Indent width used by the pretty-printer.
    #[must_use]
    pub fn indent_size(&self) -> usize {
        self.indent_size
    }

    /// True if the attribute name survives sanitization.
    #[must_use]
    pub fn is_allowed_attribute(&self, name: &str) -> bool {
        self.allowed_attributes.contains(&name.to_ascii_lowercase())
    }

    /// True if elements with this tag name are removed outright.
    #[must_use]
    pub fn is_stripped_tag(&self, name: &str) -> bool {
        self.stripped_tags.contains(&name.to_ascii_lowercase())
    }
}

/// First element child of the document node, normally `<html>`.
fn document_element(document: &Handle) -> Option<Handle> {
    document
        .children
        .borrow()
        .iter()
        .find(|child| matches!(child.data, NodeData::Element { .. }))
        .cloned()
}
