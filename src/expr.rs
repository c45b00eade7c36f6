//! Template expression detection and scanning.
//!
//! Any field can hold a templated value of the form `literal {{ placeholder }}
//! literal` instead of a concrete typed value. This module decides whether a
//! piece of text looks like such a template and splits it into segments for
//! inline validation.

use crate::error::TemplateError;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// One piece of a scanned template string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    /// The trimmed content between `{{` and `}}`.
    Placeholder(String),
}

/// Whether the text contains at least one `{{ ... }}` pair after trimming.
///
/// This is the cheap check used to pick the initial editor for a seeded
/// value; it does not reject unbalanced markers. Use [`scan`] for that.
pub fn is_expression_shaped(text: &str) -> bool {
    let trimmed = text.trim();
    match trimmed.find(OPEN) {
        Some(open_at) => trimmed[open_at + OPEN.len()..].contains(CLOSE),
        None => false,
    }
}

/// Splits a template string into literal and placeholder segments.
///
/// Rejects an opener without a matching closer and a closer without an
/// opener, reporting the byte offset of the offending marker.
pub fn scan(text: &str) -> Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();
    let mut rest = text;
    let mut offset = 0;

    loop {
        let open_at = rest.find(OPEN);
        let close_at = rest.find(CLOSE);

        match (open_at, close_at) {
            (None, None) => {
                if !rest.is_empty() {
                    segments.push(Segment::Literal(rest.to_string()));
                }
                return Ok(segments);
            }
            (None, Some(at)) => return Err(TemplateError::StrayClose { at: offset + at }),
            (Some(at), Some(close)) if close < at => {
                return Err(TemplateError::StrayClose { at: offset + close });
            }
            (Some(at), _) => {
                let after_open = &rest[at + OPEN.len()..];
                let close = after_open
                    .find(CLOSE)
                    .ok_or(TemplateError::Unclosed { at: offset + at })?;

                if at > 0 {
                    segments.push(Segment::Literal(rest[..at].to_string()));
                }
                segments.push(Segment::Placeholder(after_open[..close].trim().to_string()));

                let consumed = at + OPEN.len() + close + CLOSE.len();
                offset += consumed;
                rest = &rest[consumed..];
            }
        }
    }
}
