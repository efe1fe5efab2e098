use std::borrow::Cow;

use crate::allow_list::is_void_element;
use crate::encode::decode;
use crate::span::Span;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HtmlTokenKind {
    StartTag,
    EndTag,
    SelfClosingTag,
    Text,
    Comment,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QuoteStyle {
    Double,
    Single,
    Unquoted,
    /// Bare attribute such as `<input disabled>`.
    Missing,
}

#[derive(Clone, Debug)]
pub struct HtmlAttribute<'a> {
    source: &'a str,
    pub name: Span,
    /// Raw, still entity-encoded value between the quotes.
    pub value: Option<Span>,
    pub quote: QuoteStyle,
    /// Whole attribute including the closing quote.
    pub span: Span,
}

impl<'a> HtmlAttribute<'a> {
    pub fn name(&self) -> &'a str {
        self.name.slice(self.source)
    }

    pub fn name_is(&self, name: &str) -> bool {
        self.name().eq_ignore_ascii_case(name)
    }

    pub fn raw_value(&self) -> &'a str {
        self.value.map(|span| span.slice(self.source)).unwrap_or("")
    }

    /// Entity-decoded value. Decoding happens on every call.
    pub fn value(&self) -> Cow<'a, str> {
        decode(self.raw_value())
    }
}

#[derive(Clone, Debug)]
pub struct HtmlToken<'a> {
    source: &'a str,
    pub kind: HtmlTokenKind,
    /// Tag name; empty for text and comments.
    pub name: Span,
    pub span: Span,
    pub attributes: Vec<HtmlAttribute<'a>>,
    /// Offset right after the last attribute (or the name), before `>` or `/>`.
    pub attributes_end: usize,
}

impl<'a> HtmlToken<'a> {
    pub fn name(&self) -> &'a str {
        self.name.slice(self.source)
    }

    pub fn name_is(&self, name: &str) -> bool {
        self.is_tag() && self.name().eq_ignore_ascii_case(name)
    }

    pub fn raw(&self) -> &'a str {
        self.span.slice(self.source)
    }

    pub fn is_tag(&self) -> bool {
        matches!(
            self.kind,
            HtmlTokenKind::StartTag | HtmlTokenKind::EndTag | HtmlTokenKind::SelfClosingTag
        )
    }

    /// Start tags and self-closing tags; the tokens that carry attributes.
    pub fn is_opening(&self) -> bool {
        matches!(
            self.kind,
            HtmlTokenKind::StartTag | HtmlTokenKind::SelfClosingTag
        )
    }

    pub fn attribute(&self, name: &str) -> Option<&HtmlAttribute<'a>> {
        self.attributes.iter().find(|attr| attr.name_is(name))
    }
}

/// Forward-only tokenizer over a raw fragment. Every byte of the input ends up
/// in exactly one token, and tokens come out in document order.
#[derive(Clone, Debug)]
pub struct HtmlReader<'a> {
    source: &'a str,
    pos: usize,
    raw_text_element: Option<&'a str>,
}

impl<'a> HtmlReader<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            raw_text_element: None,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the extent of the element opened by `start`, consuming everything
    /// up to its matching end tag. Falls back to the tag alone when the end tag is
    /// not part of this fragment, except for raw text elements, whose body runs to
    /// the end of the fragment.
    pub fn skip_element(&mut self, start: &HtmlToken<'a>) -> Span {
        if start.kind != HtmlTokenKind::StartTag || is_void_element(start.name()) {
            return start.span;
        }
        let name = start.name();
        let mut lookahead = self.clone();
        let mut depth = 0usize;
        while let Some(token) = lookahead.next() {
            if !token.name_is(name) {
                continue;
            }
            match token.kind {
                HtmlTokenKind::StartTag => depth += 1,
                HtmlTokenKind::EndTag if depth == 0 => {
                    *self = lookahead;
                    return Span {
                        start: start.span.start,
                        end: token.span.end,
                    };
                }
                HtmlTokenKind::EndTag => depth -= 1,
                _ => {}
            }
        }
        if is_raw_text_element(name) {
            self.pos = self.source.len();
            self.raw_text_element = None;
            return Span {
                start: start.span.start,
                end: self.source.len(),
            };
        }
        start.span
    }

    fn text_until_next_tag(&mut self, start: usize, search_from: usize) -> HtmlToken<'a> {
        let end = self.source[search_from..]
            .find('<')
            .map(|idx| search_from + idx)
            .unwrap_or(self.source.len());
        self.pos = end;
        self.text_token(start, end)
    }

    fn text_token(&self, start: usize, end: usize) -> HtmlToken<'a> {
        HtmlToken {
            source: self.source,
            kind: HtmlTokenKind::Text,
            name: Span::empty_at(start),
            span: Span { start, end },
            attributes: Vec::new(),
            attributes_end: start,
        }
    }

    fn read_raw_text(&mut self, element: &'a str) -> Option<HtmlToken<'a>> {
        let start = self.pos;
        let bytes = self.source.as_bytes();
        let mut search = start;
        let end = loop {
            match find_ignore_ascii_case(bytes, search, b"</") {
                Some(idx) => {
                    let name_end = idx + 2 + element.len();
                    if name_end <= bytes.len()
                        && bytes[idx + 2..name_end].eq_ignore_ascii_case(element.as_bytes())
                    {
                        break idx;
                    }
                    search = idx + 2;
                }
                None => break bytes.len(),
            }
        };
        if end == start {
            return None;
        }
        self.pos = end;
        Some(self.text_token(start, end))
    }

    fn read_markup(&self, start: usize) -> Option<HtmlToken<'a>> {
        let bytes = self.source.as_bytes();
        let next = *bytes.get(start + 1)?;
        if next == b'!' {
            if bytes[start..].starts_with(b"<!--") {
                let close = find_ignore_ascii_case(bytes, start + 4, b"-->")?;
                return Some(self.comment_token(start, close + 3));
            }
            let close = find_byte(bytes, start + 2, b'>')?;
            return Some(self.comment_token(start, close + 1));
        }
        if next == b'?' {
            let close = find_byte(bytes, start + 2, b'>')?;
            return Some(self.comment_token(start, close + 1));
        }
        if next == b'/' {
            return self.read_end_tag(start);
        }
        if next.is_ascii_alphabetic() {
            return self.read_start_tag(start);
        }
        None
    }

    fn comment_token(&self, start: usize, end: usize) -> HtmlToken<'a> {
        HtmlToken {
            source: self.source,
            kind: HtmlTokenKind::Comment,
            name: Span::empty_at(start),
            span: Span { start, end },
            attributes: Vec::new(),
            attributes_end: start,
        }
    }

    fn read_end_tag(&self, start: usize) -> Option<HtmlToken<'a>> {
        let bytes = self.source.as_bytes();
        let name_start = start + 2;
        if !bytes.get(name_start)?.is_ascii_alphabetic() {
            return None;
        }
        let name_end = scan_name(bytes, name_start);
        let close = find_byte(bytes, name_end, b'>')?;
        Some(HtmlToken {
            source: self.source,
            kind: HtmlTokenKind::EndTag,
            name: Span {
                start: name_start,
                end: name_end,
            },
            span: Span {
                start,
                end: close + 1,
            },
            attributes: Vec::new(),
            attributes_end: name_end,
        })
    }

    fn read_start_tag(&self, start: usize) -> Option<HtmlToken<'a>> {
        let bytes = self.source.as_bytes();
        let name_start = start + 1;
        let name_end = scan_name(bytes, name_start);
        let mut attributes = Vec::new();
        let mut attributes_end = name_end;
        let mut i = name_end;

        let (kind, end) = loop {
            i = skip_whitespace(bytes, i);
            match *bytes.get(i)? {
                b'>' => break (HtmlTokenKind::StartTag, i + 1),
                b'/' if bytes.get(i + 1) == Some(&b'>') => {
                    break (HtmlTokenKind::SelfClosingTag, i + 2);
                }
                b'/' => {
                    i += 1;
                    continue;
                }
                b'<' => return None,
                _ => {}
            }
            let attribute = self.read_attribute(i)?;
            i = attribute.span.end;
            attributes_end = attribute.span.end;
            attributes.push(attribute);
        };

        Some(HtmlToken {
            source: self.source,
            kind,
            name: Span {
                start: name_start,
                end: name_end,
            },
            span: Span { start, end },
            attributes,
            attributes_end,
        })
    }

    fn read_attribute(&self, start: usize) -> Option<HtmlAttribute<'a>> {
        let bytes = self.source.as_bytes();
        // A leading `=` is part of the name, as in browsers.
        let mut i = start + 1;
        while i < bytes.len() && !is_attribute_name_end(bytes[i]) {
            i += 1;
        }
        let name = Span { start, end: i };

        let after_name = skip_whitespace(bytes, i);
        if bytes.get(after_name) != Some(&b'=') {
            return Some(HtmlAttribute {
                source: self.source,
                name,
                value: None,
                quote: QuoteStyle::Missing,
                span: name,
            });
        }

        let value_start = skip_whitespace(bytes, after_name + 1);
        let (value, quote, end) = match *bytes.get(value_start)? {
            quote @ (b'"' | b'\'') => {
                let close = find_byte(bytes, value_start + 1, quote)?;
                let style = if quote == b'"' {
                    QuoteStyle::Double
                } else {
                    QuoteStyle::Single
                };
                (
                    Span {
                        start: value_start + 1,
                        end: close,
                    },
                    style,
                    close + 1,
                )
            }
            _ => {
                let mut j = value_start;
                while j < bytes.len() && !is_whitespace(bytes[j]) && bytes[j] != b'>' {
                    j += 1;
                }
                (
                    Span {
                        start: value_start,
                        end: j,
                    },
                    QuoteStyle::Unquoted,
                    j,
                )
            }
        };

        Some(HtmlAttribute {
            source: self.source,
            name,
            value: Some(value),
            quote,
            span: Span { start, end },
        })
    }
}

impl<'a> Iterator for HtmlReader<'a> {
    type Item = HtmlToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(element) = self.raw_text_element.take() {
            if let Some(token) = self.read_raw_text(element) {
                return Some(token);
            }
        }
        let start = self.pos;
        if start >= self.source.len() {
            return None;
        }
        if self.source.as_bytes()[start] != b'<' {
            return Some(self.text_until_next_tag(start, start));
        }
        match self.read_markup(start) {
            Some(token) => {
                self.pos = token.span.end;
                if token.kind == HtmlTokenKind::StartTag && is_raw_text_element(token.name()) {
                    self.raw_text_element = Some(token.name());
                }
                Some(token)
            }
            // Unmatched `<` degrades to text.
            None => Some(self.text_until_next_tag(start, start + 1)),
        }
    }
}

pub(crate) fn is_raw_text_element(name: &str) -> bool {
    ["script", "style", "textarea", "title"]
        .iter()
        .any(|raw| name.eq_ignore_ascii_case(raw))
}

fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | 0x0C)
}

fn is_attribute_name_end(byte: u8) -> bool {
    is_whitespace(byte) || matches!(byte, b'/' | b'>' | b'=' | b'<')
}

fn scan_name(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < bytes.len() && !is_whitespace(bytes[i]) && !matches!(bytes[i], b'/' | b'>' | b'<') {
        i += 1;
    }
    i
}

fn skip_whitespace(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < bytes.len() && is_whitespace(bytes[i]) {
        i += 1;
    }
    i
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|&b| b == needle)
        .map(|idx| from + idx)
}

fn find_ignore_ascii_case(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || from > bytes.len() || bytes.len() - from < needle.len() {
        return None;
    }
    (from..=bytes.len() - needle.len())
        .find(|&idx| bytes[idx..idx + needle.len()].eq_ignore_ascii_case(needle))
}

pub(crate) fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    find_ignore_ascii_case(haystack.as_bytes(), 0, needle.as_bytes()).is_some()
}
