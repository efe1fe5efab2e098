use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use serde_json::{Map, Value};

use crate::dom::{HtmlNode, HtmlNodeKind};
use crate::encode::{decode, encode_meta};

// TODO: CJK text has no spaces between words and is undercounted.
pub fn count_words(node: &HtmlNode) -> u64 {
    match node.kind {
        HtmlNodeKind::Comment | HtmlNodeKind::StrayEndTag => 0,
        HtmlNodeKind::Text => count_words_in_text(&decode(&node.raw_open)),
        HtmlNodeKind::Document | HtmlNodeKind::Element { .. } => {
            node.children.iter().map(count_words).sum()
        }
    }
}

fn count_words_in_text(text: &str) -> u64 {
    let mut total = 0;
    let mut in_word = false;
    for ch in text.chars() {
        if matches!(ch, ' ' | '\t' | '\n' | '\r') {
            if in_word {
                in_word = false;
                total += 1;
            }
        } else if !matches!(ch, '.' | '?' | '!' | ';' | ':' | ',' | '(' | ')' | '[' | ']') {
            in_word = true;
        }
    }
    if in_word {
        total += 1;
    }
    total
}

/// Every non-empty `id` and `name` in the tree, the valid in-page anchor targets.
pub fn get_bookmarks(node: &HtmlNode) -> HashSet<String> {
    let mut bookmarks = HashSet::new();
    node.visit(&mut |node| {
        for key in ["id", "name"] {
            if let Some(value) = node.attribute(key).filter(|value| !value.is_empty()) {
                bookmarks.insert(value.to_string());
            }
        }
    });
    bookmarks
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExtractedTitle {
    /// Decoded heading text; `None` when the heading is empty.
    pub title: Option<String>,
    /// Original heading markup, present only when the heading was detached.
    pub raw_title: Option<String>,
}

/// Finds the first `h1`-`h3` among the direct children of `node`.
///
/// When nothing visible comes before it, the heading is removed from the tree and
/// its markup is returned as the raw title.
pub fn try_extract_title(node: &mut HtmlNode) -> Option<ExtractedTitle> {
    let mut seen_visible = false;
    for index in 0..node.children.len() {
        let child = &node.children[index];
        if is_invisible(child) {
            continue;
        }
        if ["h1", "h2", "h3"].iter().any(|name| child.is_element(name)) {
            let text = child.inner_text();
            let title = (!text.is_empty()).then(|| decode(&text).into_owned());
            let raw_title = if seen_visible {
                None
            } else {
                Some(node.remove_child(index).outer_html())
            };
            return Some(ExtractedTitle { title, raw_title });
        }
        seen_visible = true;
    }
    None
}

fn is_invisible(node: &HtmlNode) -> bool {
    match node.kind {
        HtmlNodeKind::Comment | HtmlNodeKind::StrayEndTag => true,
        HtmlNodeKind::Text => node.raw_open.trim().is_empty(),
        _ => false,
    }
}

/// Renders metadata as `<meta>` lines, one per scalar and one per array item.
pub fn create_html_meta_tags(
    metadata: &Map<String, Value>,
    hidden: &HashSet<String>,
    display_names: &HashMap<String, String>,
) -> String {
    let mut out = String::new();
    for (key, value) in metadata {
        if hidden.contains(key) {
            continue;
        }
        let name = display_names.get(key).unwrap_or(key);
        match value {
            Value::Array(items) => {
                for content in items.iter().filter_map(array_item_content) {
                    push_meta(&mut out, name, &content);
                }
            }
            _ => {
                if let Some(content) = meta_content(value) {
                    push_meta(&mut out, name, &content);
                }
            }
        }
    }
    out
}

fn meta_content(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Bool(true) => Some("true".to_string()),
        Value::Bool(false) => Some("false".to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// A null inside an array still takes a line, with empty content.
fn array_item_content(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        _ => meta_content(value),
    }
}

fn push_meta(out: &mut String, name: &str, content: &str) {
    let _ = writeln!(
        out,
        "<meta name=\"{}\" content=\"{}\" />",
        encode_meta(name),
        encode_meta(content)
    );
}
