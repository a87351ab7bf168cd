//! Template merge engine — validate, parse, merge and serialize fragments.
//!
//! A template is a mapping of sections (`Parameters`, `Resources`, ...) to
//! mappings of entries. Fragments are merged section by section: the union
//! of entries is kept and, when two fragments define the same entry, the
//! later fragment's value wins. Key order is first-seen order; an override
//! replaces the value in place.
//!
//! ## Quote preservation
//!
//! Every `"` in a fragment is escaped to `\"` before parsing, which turns
//! double-quoted scalars into plain scalars that keep their quotes as text.
//! Serialization reverses the escape, so quoted values are written back
//! byte-for-byte as they were authored.
//!
//! When the emitter has to fall back to a double-quoted scalar (a block
//! scalar with trailing spaces, say) the escape is reversed inside YAML's own
//! escape syntax instead. [`merge_fragments`] also checks every entry: what
//! it writes must read back, with a plain YAML parser, to the value the
//! fragment's author wrote. Entries that cannot survive the escape (a
//! double-quoted value holding ` #`, for one) fail with
//! [`TemplateError::Inexact`] instead of producing a broken template.

use serde_yaml::{Mapping, Value};

use crate::error::TemplateError;
use crate::reader::Fragment;

/// Shorthand intrinsic function tags rejected by [`validate`].
const SHORTHAND_TAGS: &[&str] = &[
    "Base64",
    "FindInMap",
    "GetAtt",
    "GetAZs",
    "ImportValue",
    "Join",
    "Select",
    "Split",
    "Sub",
    "Ref",
];

const ROOT_KEY: &str = "<root>";

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A two-level template: section name → (entry name → value).
///
/// Every key is a string and every section value is a mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateDocument {
    sections: Mapping,
}

impl TemplateDocument {
    fn from_value(value: Value) -> Result<Self, TemplateError> {
        let top = match value {
            Value::Null => return Ok(Self::default()),
            Value::Mapping(top) => top,
            other => {
                return Err(TemplateError::Shape {
                    key: ROOT_KEY.to_string(),
                    message: format!("expected a mapping of sections, found {}", kind(&other)),
                })
            }
        };

        let mut sections = Mapping::with_capacity(top.len());
        for (key, section) in top {
            let key = key_string(key, ROOT_KEY)?;
            let section = match section {
                Value::Null => Mapping::new(),
                Value::Mapping(entries) => {
                    for entry_key in entries.keys() {
                        if !entry_key.is_string() {
                            return Err(TemplateError::Shape {
                                key,
                                message: format!("entry keys must be strings, found {}", kind(entry_key)),
                            });
                        }
                    }
                    entries
                }
                other => {
                    return Err(TemplateError::Shape {
                        message: format!("expected a mapping, found {}", kind(&other)),
                        key,
                    })
                }
            };
            sections.insert(Value::String(key), Value::Mapping(section));
        }
        Ok(Self { sections })
    }

    /// Fold `other` into `self` under the section-union, last-write-wins rule.
    fn absorb(&mut self, other: TemplateDocument) {
        for (key, section) in other.sections {
            let Value::Mapping(entries) = section else {
                continue;
            };
            match self.sections.get_mut(&key) {
                Some(Value::Mapping(existing)) => {
                    for (entry_key, value) in entries {
                        existing.insert(entry_key, value);
                    }
                }
                _ => {
                    self.sections.insert(key, Value::Mapping(entries));
                }
            }
        }
    }

    /// Entries of the named section.
    pub fn section(&self, name: &str) -> Option<&Mapping> {
        match self.sections.get(name) {
            Some(Value::Mapping(entries)) => Some(entries),
            _ => None,
        }
    }

    /// Section names in document order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().filter_map(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Reject a fragment that uses shorthand intrinsic function tags.
///
/// The error lists every occurrence in the order found, not only the first.
pub fn validate(fragment: &[u8]) -> Result<(), TemplateError> {
    let text = String::from_utf8_lossy(fragment);
    let mut tokens = Vec::new();
    let mut rest = text.as_ref();
    while let Some(bang) = rest.find('!') {
        let after = &rest[bang + 1..];
        match SHORTHAND_TAGS.iter().find(|tag| after.starts_with(*tag)) {
            Some(tag) => {
                tokens.push(format!("!{tag}"));
                rest = &after[tag.len()..];
            }
            None => rest = after,
        }
    }

    if tokens.is_empty() {
        Ok(())
    } else {
        Err(TemplateError::Shorthand { tokens })
    }
}

/// Parse one fragment into a [`TemplateDocument`], escaping quotes first.
///
/// A fragment holding only comments or whitespace parses to an empty document.
pub fn parse(fragment: &[u8]) -> Result<TemplateDocument, TemplateError> {
    let text = String::from_utf8_lossy(fragment);
    if is_blank_document(&text) {
        return Ok(TemplateDocument::default());
    }
    let escaped = text.replace('"', "\\\"");
    let value: Value = serde_yaml::from_str(&escaped).map_err(TemplateError::Parse)?;
    TemplateDocument::from_value(value)
}

/// Merge documents in the order given.
pub fn merge<I>(documents: I) -> TemplateDocument
where
    I: IntoIterator<Item = TemplateDocument>,
{
    let mut merged = TemplateDocument::default();
    for document in documents {
        merged.absorb(document);
    }
    merged
}

/// Render a document and undo the quote escaping applied by [`parse`].
pub fn serialize(document: &TemplateDocument) -> Result<String, TemplateError> {
    render(&document.sections)
}

/// Check that every entry of `document`, once serialized, reads back with a
/// plain YAML parser to the same key and value as in `fragment`.
pub fn verify_round_trip(fragment: &[u8], document: &TemplateDocument) -> Result<(), TemplateError> {
    let text = String::from_utf8_lossy(fragment);
    let authored = if is_blank_document(&text) {
        TemplateDocument::default()
    } else {
        let value: Value = serde_yaml::from_str(&text).map_err(TemplateError::Parse)?;
        TemplateDocument::from_value(value)?
    };
    if authored.len() != document.len() {
        return Err(TemplateError::Inexact {
            key: ROOT_KEY.to_string(),
            message: format!("{} sections written, {} authored", document.len(), authored.len()),
        });
    }

    for ((name, section), (authored_name, authored_section)) in
        document.sections.iter().zip(authored.sections.iter())
    {
        let label = authored_name.as_str().unwrap_or(ROOT_KEY);
        let (Value::Mapping(entries), Value::Mapping(authored_entries)) = (section, authored_section)
        else {
            continue;
        };
        if entries.len() != authored_entries.len() {
            return Err(TemplateError::Inexact {
                key: label.to_string(),
                message: format!(
                    "{} entries written, {} authored",
                    entries.len(),
                    authored_entries.len()
                ),
            });
        }

        for ((key, value), (authored_key, authored_value)) in
            entries.iter().zip(authored_entries.iter())
        {
            let path = format!("{label}.{}", authored_key.as_str().unwrap_or("?"));
            let written = render(&single_entry(name, key, value))?;
            let read_back: Value =
                serde_yaml::from_str(&written).map_err(|e| TemplateError::Inexact {
                    key: path.clone(),
                    message: format!("written form is not valid YAML: {e}"),
                })?;
            let expected = Value::Mapping(single_entry(authored_name, authored_key, authored_value));
            if read_back != expected {
                return Err(TemplateError::Inexact {
                    key: path,
                    message: "value changes when written back".to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Validate, parse and merge every fragment, then serialize the result.
///
/// Stops at the first failing fragment; its path is attached to the error.
pub fn merge_fragments<I>(fragments: I) -> Result<String, TemplateError>
where
    I: IntoIterator<Item = Result<Fragment, TemplateError>>,
{
    let mut merged = TemplateDocument::default();
    for fragment in fragments {
        let fragment = fragment?;
        let document = validate(&fragment.contents)
            .and_then(|()| parse(&fragment.contents))
            .and_then(|document| {
                verify_round_trip(&fragment.contents, &document).map(|()| document)
            })
            .map_err(|e| TemplateError::Fragment {
                path: fragment.path.clone(),
                source: Box::new(e),
            })?;
        tracing::debug!(
            path = %fragment.path.display(),
            sections = document.len(),
            "merging fragment"
        );
        merged.absorb(document);
    }
    serialize(&merged)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn render(sections: &Mapping) -> Result<String, TemplateError> {
    let yaml = serde_yaml::to_string(sections).map_err(TemplateError::Serialize)?;
    Ok(unescape_quotes(&yaml))
}

fn single_entry(section: &Value, key: &Value, value: &Value) -> Mapping {
    let mut entry = Mapping::new();
    entry.insert(key.clone(), value.clone());
    let mut wrapper = Mapping::new();
    wrapper.insert(section.clone(), Value::Mapping(entry));
    wrapper
}

/// Reverse the `"` -> `\"` escape in emitted YAML.
///
/// Outside double-quoted scalars the escape appears verbatim and `\"` becomes
/// `"`. Inside one the emitter has escaped both characters, giving `\\\"`,
/// which becomes `\"`: YAML's own escape for a quote.
fn unescape_quotes(yaml: &str) -> String {
    let mut out = String::with_capacity(yaml.len());
    let mut chars = yaml.chars().peekable();
    let mut in_double = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' if in_double => match chars.next() {
                Some('\\') => {
                    let mut ahead = chars.clone();
                    if ahead.next() == Some('\\') && ahead.next() == Some('"') {
                        chars.next();
                        chars.next();
                        out.push_str("\\\"");
                    } else {
                        out.push_str("\\\\");
                    }
                }
                Some(escaped) => {
                    out.push('\\');
                    out.push(escaped);
                }
                None => out.push('\\'),
            },
            '\\' if chars.peek() == Some(&'"') => {
                chars.next();
                out.push('"');
            }
            '"' => {
                in_double = !in_double;
                out.push('"');
            }
            other => out.push(other),
        }
    }
    out
}

fn is_blank_document(text: &str) -> bool {
    text.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

fn key_string(key: Value, parent: &str) -> Result<String, TemplateError> {
    match key {
        Value::String(key) => Ok(key),
        other => Err(TemplateError::Shape {
            key: parent.to_string(),
            message: format!("keys must be strings, found {}", kind(&other)),
        }),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
