//! Metadata parsing and sigil canonicalization.
//!
//! Frontmatter metadata uses two interchangeable linked-data key sigils,
//! `@` and `$`. Exactly one is canonical per configuration; normalization
//! rewrites every sigil-prefixed key at every nesting depth to the canonical
//! one and leaves everything else alone.
//!
//! # Grammar
//!
//! The block text is YAML. `@` is a reserved YAML indicator and cannot open
//! a plain scalar, so sigil-prefixed keys are quoted in a pre-pass before
//! handing the text to the parser (`@type: x` becomes `"@type": x`). Any
//! grammar failure maps to the fixed [`LoadError::Syntax`] message; a
//! malformed block never degrades into an empty mapping.

use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::value::TaggedValue;
use serde_yaml::{Mapping, Value};

use crate::error::LoadError;

/// Matches a line-leading (optionally list-item) `@`-prefixed key, so it can
/// be quoted before the YAML parser sees it. `$` keys are plain-scalar safe
/// and need no treatment. Applied per line by [`quote_at_keys`], which skips
/// the lines belonging to block scalar values.
static AT_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*(?:-\s+)?)@([^\s:]+)(\s*):").unwrap()
});

/// The canonical linked-data key sigil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sigil {
    /// JSON-LD style: `@type`, `@context`.
    At,
    /// Template-safe style: `$type`, `$context`.
    Dollar,
}

impl Sigil {
    /// The sigil character itself.
    pub const fn as_char(self) -> char {
        match self {
            Sigil::At => '@',
            Sigil::Dollar => '$',
        }
    }

    /// Strip either recognized sigil from a key, if present.
    fn strip(key: &str) -> Option<&str> {
        key.strip_prefix('@').or_else(|| key.strip_prefix('$'))
    }

    /// Rewrite a key to carry this sigil, if it carries either one.
    /// Returns `None` for keys without a sigil.
    pub fn canonicalize(self, key: &str) -> Option<String> {
        Self::strip(key).map(|rest| format!("{}{rest}", self.as_char()))
    }
}

/// Parse metadata block text into a YAML value.
///
/// Grammar failures (bad indentation, unterminated structures, duplicate
/// keys) short-circuit with [`LoadError::Syntax`]; the parser's own message
/// is logged at debug level only.
pub fn parse(text: &str) -> Result<Value, LoadError> {
    let quoted = quote_at_keys(text);
    serde_yaml::from_str(&quoted).map_err(|err| {
        tracing::debug!(%err, "metadata block failed to parse");
        LoadError::Syntax
    })
}

/// Quote line-leading `@` keys so the parser accepts them.
///
/// Lines belonging to a block scalar value (`|` or `>`) are value text, not
/// keys, and are copied through untouched: quoting must never rewrite data.
fn quote_at_keys(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    // Indentation of the line that opened the active block scalar.
    let mut scalar_indent: Option<usize> = None;

    for line in text.split_inclusive('\n') {
        let indent = line.len() - line.trim_start_matches(' ').len();
        let content = line.trim_start_matches(' ').trim_end_matches(['\r', '\n']);

        if let Some(open) = scalar_indent {
            // Blank lines and anything indented past the opener are still
            // scalar content.
            if content.is_empty() || indent > open {
                out.push_str(line);
                continue;
            }
            scalar_indent = None;
        }

        if opens_block_scalar(content) {
            scalar_indent = Some(indent);
        }
        out.push_str(&AT_KEY.replace(line, "$1\"@$2\"$3:"));
    }

    out
}

/// True for a line whose value is a block scalar header (`|`, `>`, with
/// optional chomping/indentation modifiers).
fn opens_block_scalar(content: &str) -> bool {
    content.split_whitespace().last().is_some_and(|token| {
        let mut chars = token.chars();
        matches!(chars.next(), Some('|' | '>'))
            && chars.all(|c| matches!(c, '+' | '-' | '0'..='9'))
    })
}

/// Rewrite every sigil-prefixed key, at every depth, to the canonical sigil.
///
/// Sequences are mapped element-wise preserving order; scalars pass through
/// untouched, keeping numeric precision exactly. Idempotent: normalizing an
/// already-canonical value is a no-op.
///
/// When both sigil spellings of one key appear in the same mapping they are
/// canonicalized independently; because they then collide on the same key,
/// the later entry wins on insert. No merge is attempted.
pub fn normalize(value: Value, sigil: Sigil) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut out = Mapping::with_capacity(map.len());
            for (key, val) in map {
                let key = match key {
                    Value::String(name) => match sigil.canonicalize(&name) {
                        Some(canonical) => Value::String(canonical),
                        None => Value::String(name),
                    },
                    other => other,
                };
                out.insert(key, normalize(val, sigil));
            }
            Value::Mapping(out)
        }
        Value::Sequence(items) => Value::Sequence(
            items.into_iter().map(|item| normalize(item, sigil)).collect(),
        ),
        Value::Tagged(tagged) => {
            let TaggedValue { tag, value } = *tagged;
            Value::Tagged(Box::new(TaggedValue {
                tag,
                value: normalize(value, sigil),
            }))
        }
        scalar => scalar,
    }
}

/// Serialize a metadata value back to YAML text.
pub fn to_yaml(value: &Value) -> Result<String, LoadError> {
    serde_yaml::to_string(value).map_err(|err| {
        tracing::debug!(%err, "metadata re-serialization failed");
        LoadError::Syntax
    })
}
