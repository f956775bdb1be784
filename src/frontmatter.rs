//! Frontmatter extraction.
//!
//! Splits a raw document into its delimited metadata block and the body.
//! The block opens with a line consisting solely of `---` at the very start
//! of the document and closes at the next such line. A document without the
//! markers, or with an empty block, passes through unchanged; that is not an
//! error.
//!
//! Pure over the input text; both halves borrow from it.

/// Result of splitting a document, borrowing from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extracted<'a> {
    /// Raw metadata block text, without the marker lines. `None` when the
    /// document has no frontmatter.
    pub matter: Option<&'a str>,

    /// Document body. When `matter` is `None` this is the input unchanged;
    /// otherwise it is the remainder with boundary whitespace trimmed.
    pub body: &'a str,
}

impl<'a> Extracted<'a> {
    fn unchanged(raw: &'a str) -> Self {
        Self { matter: None, body: raw }
    }
}

/// Split a document into frontmatter and body.
///
/// The opening marker must sit at byte 0. A block with no closing marker,
/// or whose content is blank, yields the document unchanged.
pub fn extract(raw: &str) -> Extracted<'_> {
    let Some(after_open) = strip_opening_marker(raw) else {
        return Extracted::unchanged(raw);
    };

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if is_marker_line(line) {
            let matter = &after_open[..offset];
            if matter.trim().is_empty() {
                return Extracted::unchanged(raw);
            }
            let body = after_open[offset + line.len()..].trim();
            return Extracted {
                matter: Some(matter),
                body,
            };
        }
        offset += line.len();
    }

    // No closing marker: the block never ends, so there is no block.
    Extracted::unchanged(raw)
}

/// Strip a `---` line at byte 0, returning the text after it.
fn strip_opening_marker(raw: &str) -> Option<&str> {
    let rest = raw.strip_prefix("---")?;
    rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))
}

/// True for a line consisting solely of `---` (LF or CRLF).
fn is_marker_line(line: &str) -> bool {
    line.trim_end_matches(['\r', '\n']) == "---"
}
