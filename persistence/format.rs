/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Token-level pieces of the document text format.
//!
//! A document is a sequence of `--Name--` section markers, each followed by
//! records, one per line. Record fields are separated by `|`. Free text is
//! escaped so that neither `|`, `~` nor line breaks ever appear raw.

use crate::graph::FieldValue;

pub const DELIMITER: char = '|';
/// Closes one component's field block inside a node record.
pub const END_OF_COMPONENT: &str = "~";

pub const SECTION_EDITOR: &str = "EditorData";
pub const SECTION_NODES: &str = "Nodes";
pub const SECTION_CONNECTIONS: &str = "Connections";
pub const SECTION_GROUPS: &str = "Groups";

pub fn section_marker(name: &str) -> String {
    format!("--{name}--")
}

/// Section name if `line` is a marker.
pub fn parse_section_marker(line: &str) -> Option<&str> {
    let name = line.trim().strip_prefix("--")?.strip_suffix("--")?;
    (!name.is_empty() && !name.contains(DELIMITER)).then_some(name)
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '|' => out.push_str("\\|"),
            '~' => out.push_str("\\~"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out
}

/// Inverse of [`escape`]. `None` on an unknown or dangling escape.
pub fn unescape(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next()? {
            '\\' => out.push('\\'),
            '|' => out.push('|'),
            '~' => out.push('~'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            _ => return None,
        }
    }
    Some(out)
}

/// Split a record on unescaped delimiters. Tokens keep their escapes.
pub fn split_record(line: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (at, ch) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == DELIMITER {
            tokens.push(&line[start..at]);
            start = at + ch.len_utf8();
        }
    }
    tokens.push(&line[start..]);
    tokens
}

pub fn encode_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Bool(flag) => format!("b:{flag}"),
        FieldValue::Integer(number) => format!("i:{number}"),
        FieldValue::Float(number) => format!("f:{number}"),
        FieldValue::Text(text) => format!("s:{}", escape(text)),
    }
}

pub fn decode_value(token: &str) -> Option<FieldValue> {
    let (tag, payload) = token.split_once(':')?;
    match tag {
        "b" => payload.parse().ok().map(FieldValue::Bool),
        "i" => payload.parse().ok().map(FieldValue::Integer),
        "f" => payload.parse().ok().map(FieldValue::Float),
        "s" => unescape(payload).map(FieldValue::Text),
        _ => None,
    }
}

/// Component index as written on disk; `-1` marks a node-owned pin.
pub fn encode_component_index(component: Option<usize>) -> String {
    match component {
        Some(index) => index.to_string(),
        None => "-1".to_string(),
    }
}

/// `Some(None)` for `-1`, `Some(Some(c))` for a non-negative index.
pub fn decode_component_index(token: &str) -> Option<Option<usize>> {
    match token.parse::<i64>().ok()? {
        -1 => Some(None),
        index => usize::try_from(index).ok().map(Some),
    }
}
