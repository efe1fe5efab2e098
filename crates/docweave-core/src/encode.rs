use std::borrow::Cow;

use crate::reader::QuoteStyle;

pub fn decode(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }
    html_escape::decode_html_entities(raw)
}

/// General-purpose encoding for text and double-quoted attribute content.
pub fn encode(text: &str) -> Cow<'_, str> {
    html_escape::encode_quoted_attribute(text)
}

pub fn encode_text(text: &str) -> Cow<'_, str> {
    html_escape::encode_text(text)
}

/// Encodes a value for splicing back between the quotes it was read from.
pub fn encode_attribute(value: &str, quote: QuoteStyle) -> Cow<'_, str> {
    match quote {
        QuoteStyle::Double | QuoteStyle::Missing => {
            html_escape::encode_double_quoted_attribute(value)
        }
        QuoteStyle::Single => html_escape::encode_single_quoted_attribute(value),
        QuoteStyle::Unquoted => html_escape::encode_unquoted_attribute(value),
    }
}

/// Strict escaping for generated `<meta>` attributes, which get re-parsed downstream.
pub fn encode_meta(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{decode, encode_meta};

    #[test]
    fn meta_escaping_covers_both_quotes() {
        assert_eq!(
            encode_meta(r#"a & <b> "c" 'd'"#),
            "a &amp; &lt;b&gt; &quot;c&quot; &#39;d&#39;"
        );
    }

    #[test]
    fn decodes_named_and_numeric_entities() {
        assert_eq!(decode("a&amp;b&#x3C;&lt;"), "a&b<<");
        assert_eq!(decode("plain"), "plain");
    }
}
