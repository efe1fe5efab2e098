use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Language subtags that open a culture name: ISO 639-1 codes plus the
/// three-letter languages that have no two-letter code.
static LANGUAGES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "aa", "ab", "ae", "af", "ak", "am", "an", "ar", "as", "av", "ay", "az", "ba", "be",
        "bg", "bh", "bi", "bm", "bn", "bo", "br", "bs", "ca", "ce", "ch", "co", "cr", "cs",
        "cu", "cv", "cy", "da", "de", "dv", "dz", "ee", "el", "en", "eo", "es", "et", "eu",
        "fa", "ff", "fi", "fj", "fo", "fr", "fy", "ga", "gd", "gl", "gn", "gu", "gv", "ha",
        "he", "hi", "ho", "hr", "ht", "hu", "hy", "hz", "ia", "id", "ie", "ig", "ii", "ik",
        "io", "is", "it", "iu", "ja", "jv", "ka", "kg", "ki", "kj", "kk", "kl", "km", "kn",
        "ko", "kr", "ks", "ku", "kv", "kw", "ky", "la", "lb", "lg", "li", "ln", "lo", "lt",
        "lu", "lv", "mg", "mh", "mi", "mk", "ml", "mn", "mr", "ms", "mt", "my", "na", "nb",
        "nd", "ne", "ng", "nl", "nn", "no", "nr", "nv", "ny", "oc", "oj", "om", "or", "os",
        "pa", "pi", "pl", "ps", "pt", "qu", "rm", "rn", "ro", "ru", "rw", "sa", "sc", "sd",
        "se", "sg", "si", "sk", "sl", "sm", "sn", "so", "sq", "sr", "ss", "st", "su", "sv",
        "sw", "ta", "te", "tg", "th", "ti", "tk", "tl", "tn", "to", "tr", "ts", "tt", "tw",
        "ty", "ug", "uk", "ur", "uz", "ve", "vi", "vo", "wa", "wo", "xh", "yi", "yo", "za",
        "zh", "zu",
        // three-letter
        "arn", "bas", "brx", "ceb", "chr", "dsb", "ewo", "fil", "fur", "gsw", "haw", "hsb",
        "kab", "kok", "ksh", "lkt", "moh", "nds", "nqo", "prs", "quc", "quz", "sah", "sma",
        "smj", "smn", "sms", "syr", "tzm", "wae", "yue", "zgh",
    ]
    .into_iter()
    .collect()
});

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LinkType {
    SelfBookmark,
    AbsolutePath,
    RelativePath,
    External,
}

impl LinkType {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkType::SelfBookmark => "self-bookmark",
            LinkType::AbsolutePath => "absolute-path",
            LinkType::RelativePath => "relative-path",
            LinkType::External => "external",
        }
    }
}

/// Pieces of a url. `query` keeps its leading `?` and `fragment` its leading `#`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UrlParts<'a> {
    pub path: &'a str,
    pub query: &'a str,
    pub fragment: &'a str,
}

pub fn split_url(url: &str) -> UrlParts<'_> {
    let (rest, fragment) = match url.find('#') {
        Some(idx) => (&url[..idx], &url[idx..]),
        None => (url, ""),
    };
    let (path, query) = match rest.find('?') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    };
    UrlParts {
        path,
        query,
        fragment,
    }
}

pub fn link_type(link: &str) -> LinkType {
    if link.starts_with('#') {
        LinkType::SelfBookmark
    } else if link.starts_with("//") || link.starts_with("\\\\") || has_scheme(link) {
        LinkType::External
    } else if link.starts_with('/') || link.starts_with('\\') {
        LinkType::AbsolutePath
    } else {
        LinkType::RelativePath
    }
}

fn has_scheme(link: &str) -> bool {
    let Some(colon) = link.find(':') else {
        return false;
    };
    let scheme = &link[..colon];
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.'))
}

/// Accepts `en`, `en-us`, `zh-hans-cn` shaped tags whose language is a known one,
/// so path segments such as `api` or `doc` are not mistaken for a locale.
pub fn is_valid_locale(locale: &str) -> bool {
    let mut segments = locale.split('-');
    let Some(language) = segments.next() else {
        return false;
    };
    if !LANGUAGES.contains(language.to_ascii_lowercase().as_str()) {
        return false;
    }
    let mut count = 1;
    for segment in segments {
        count += 1;
        if count > 3
            || !(2..=8).contains(&segment.len())
            || !segment.chars().all(|ch| ch.is_ascii_alphanumeric())
        {
            return false;
        }
    }
    true
}

/// Prefixes `/{locale}` to an absolute path unless its first segment already is a locale.
pub fn add_locale_if_missing(href: &str, locale: &str) -> String {
    if let Some(end) = href
        .char_indices()
        .skip(1)
        .find(|(_, ch)| *ch == '/' || *ch == '\\')
        .map(|(idx, _)| idx)
    {
        if is_valid_locale(&href[1..end]) {
            return href.to_string();
        }
    }
    format!("/{}{}", locale, href)
}

#[cfg(test)]
mod tests {
    use super::{LinkType, add_locale_if_missing, is_valid_locale, link_type, split_url};

    #[test]
    fn split_keeps_delimiters() {
        let parts = split_url("a/b?c=1#d");
        assert_eq!(parts.path, "a/b");
        assert_eq!(parts.query, "?c=1");
        assert_eq!(parts.fragment, "#d");
        assert_eq!(split_url("x#y?z").query, "");
    }

    #[test]
    fn classifies_links() {
        assert_eq!(link_type("#top"), LinkType::SelfBookmark);
        assert_eq!(link_type("/docs/a"), LinkType::AbsolutePath);
        assert_eq!(link_type("//cdn.example.com/a.js"), LinkType::External);
        assert_eq!(link_type("https://example.com"), LinkType::External);
        assert_eq!(link_type("mailto:someone@example.com"), LinkType::External);
        assert_eq!(link_type("../a.md"), LinkType::RelativePath);
    }

    #[test]
    fn locale_prefix_is_added_once() {
        assert!(is_valid_locale("en-us"));
        assert!(!is_valid_locale("docs"));
        assert_eq!(add_locale_if_missing("/docs/a", "en-us"), "/en-us/docs/a");
        assert_eq!(add_locale_if_missing("/de-de/docs/a", "en-us"), "/de-de/docs/a");
        assert_eq!(add_locale_if_missing("/a", "en-us"), "/en-us/a");
    }

    #[test]
    fn short_path_segments_are_not_locales() {
        assert!(!is_valid_locale("api"));
        assert!(!is_valid_locale("doc"));
        assert!(is_valid_locale("FIL-ph"));
        assert!(is_valid_locale("zh-hans-cn"));
        assert!(!is_valid_locale("en-us-x-y"));
        assert_eq!(add_locale_if_missing("/api/x", "en-us"), "/en-us/api/x");
        assert_eq!(add_locale_if_missing("/doc/x", "en-us"), "/en-us/doc/x");
        assert_eq!(add_locale_if_missing("/fr/doc/x", "en-us"), "/fr/doc/x");
    }
}
