use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Element that carries a cross-reference to be resolved at build time.
pub const XREF_ELEMENT: &str = "xref";

static ALLOWED_ELEMENTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a",
        "abbr",
        "address",
        "article",
        "aside",
        "audio",
        "b",
        "bdi",
        "bdo",
        "blockquote",
        "br",
        "button",
        "caption",
        "cite",
        "code",
        "col",
        "colgroup",
        "dd",
        "del",
        "details",
        "dfn",
        "div",
        "dl",
        "dt",
        "em",
        "figcaption",
        "figure",
        "footer",
        "h1",
        "h2",
        "h3",
        "h4",
        "h5",
        "h6",
        "header",
        "hr",
        "i",
        "iframe",
        "img",
        "input",
        "ins",
        "kbd",
        "label",
        "li",
        "main",
        "mark",
        "meter",
        "nav",
        "nobr",
        "ol",
        "p",
        "picture",
        "pre",
        "progress",
        "q",
        "rp",
        "rt",
        "ruby",
        "s",
        "samp",
        "section",
        "small",
        "source",
        "span",
        "strong",
        "sub",
        "summary",
        "sup",
        "table",
        "tbody",
        "td",
        "tfoot",
        "th",
        "thead",
        "time",
        "tr",
        "track",
        "u",
        "ul",
        "var",
        "video",
        "wbr",
        // Placeholders are consumed by the xref pass, never by sanitizing.
        XREF_ELEMENT,
    ]
    .into_iter()
    .collect()
});

static ALLOWED_ATTRIBUTES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "abbr",
        "align",
        "allow",
        "allowfullscreen",
        "alt",
        "autoplay",
        "border",
        "cellpadding",
        "cellspacing",
        "checked",
        "cite",
        "class",
        "colspan",
        "controls",
        "datetime",
        "dir",
        "disabled",
        "download",
        "frameborder",
        "headers",
        "height",
        "hidden",
        "high",
        "href",
        "hreflang",
        "id",
        "kind",
        "label",
        "lang",
        "loading",
        "loop",
        "low",
        "max",
        "min",
        "muted",
        "name",
        "open",
        "optimum",
        "poster",
        "preload",
        "rel",
        "reversed",
        "role",
        "rowspan",
        "scope",
        "sizes",
        "span",
        "src",
        "srclang",
        "srcset",
        "start",
        "summary",
        "tabindex",
        "target",
        "title",
        "type",
        "uid",
        "valign",
        "value",
        "width",
    ]
    .into_iter()
    .collect()
});

/// Attribute prefixes that always pass through, regardless of the allow-list.
pub const RESERVED_ATTRIBUTE_PREFIXES: &[&str] = &["data-", "aria-"];

pub const TABLE_CELL_ELEMENTS: &[&str] = &["td", "th"];

/// The only inline styles a table cell may keep.
pub const ALLOWED_CELL_STYLES: &[&str] = &[
    "text-align: right;",
    "text-align: left;",
    "text-align: center;",
];

/// Embedded-content elements reported in report mode.
pub const EMBEDDED_CONTENT_ELEMENTS: &[&str] = &["script", "link", "style"];

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

pub fn is_allowed_element(name: &str) -> bool {
    ALLOWED_ELEMENTS.contains(name.to_ascii_lowercase().as_str())
}

pub fn is_allowed_attribute(name: &str) -> bool {
    let lowered = name.to_ascii_lowercase();
    RESERVED_ATTRIBUTE_PREFIXES
        .iter()
        .any(|prefix| lowered.starts_with(prefix))
        || ALLOWED_ATTRIBUTES.contains(lowered.as_str())
}

pub fn is_table_cell(name: &str) -> bool {
    contains_ignore_case(TABLE_CELL_ELEMENTS, name)
}

pub fn is_allowed_cell_style(value: &str) -> bool {
    ALLOWED_CELL_STYLES.contains(&value)
}

pub fn is_embedded_content(name: &str) -> bool {
    contains_ignore_case(EMBEDDED_CONTENT_ELEMENTS, name)
}

pub fn is_void_element(name: &str) -> bool {
    contains_ignore_case(VOID_ELEMENTS, name)
}

fn contains_ignore_case(list: &[&str], name: &str) -> bool {
    list.iter().any(|item| item.eq_ignore_ascii_case(name))
}
