use std::collections::HashMap;

use crate::allow_list::XREF_ELEMENT;
use crate::encode::{encode, encode_text};
use crate::reader::{HtmlReader, HtmlToken, HtmlTokenKind, contains_ignore_ascii_case};
use crate::source_info::{Located, SourceInfo};
use crate::url::split_url;
use crate::writer::RewriteWriter;
use crate::xref_spec::XrefSpec;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ResolvedXref {
    /// `None` or empty when the reference could not be resolved.
    pub href: Option<String>,
    pub display: String,
}

impl ResolvedXref {
    pub fn resolved(href: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            display: display.into(),
        }
    }

    pub fn unresolved(display: impl Into<String>) -> Self {
        Self {
            href: None,
            display: display.into(),
        }
    }

    fn resolved_href(&self) -> Option<&str> {
        self.href.as_deref().filter(|href| !href.is_empty())
    }
}

pub trait XrefResolver {
    fn resolve_xref(
        &mut self,
        href: Option<&Located<String>>,
        uid: Option<&Located<String>>,
        is_shorthand: bool,
    ) -> ResolvedXref;
}

impl<F> XrefResolver for F
where
    F: FnMut(Option<&Located<String>>, Option<&Located<String>>, bool) -> ResolvedXref,
{
    fn resolve_xref(
        &mut self,
        href: Option<&Located<String>>,
        uid: Option<&Located<String>>,
        is_shorthand: bool,
    ) -> ResolvedXref {
        self(href, uid, is_shorthand)
    }
}

/// Resolves uids against a prebuilt map of specs.
#[derive(Debug)]
pub struct XrefMap<S> {
    specs: HashMap<String, S>,
}

impl<S: XrefSpec> XrefMap<S> {
    pub fn new(specs: impl IntoIterator<Item = S>) -> Self {
        Self {
            specs: specs
                .into_iter()
                .map(|spec| (spec.uid().to_string(), spec))
                .collect(),
        }
    }

    pub fn get(&self, uid: &str) -> Option<&S> {
        self.specs.get(uid)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl<S: XrefSpec> XrefResolver for XrefMap<S> {
    fn resolve_xref(
        &mut self,
        href: Option<&Located<String>>,
        uid: Option<&Located<String>>,
        _is_shorthand: bool,
    ) -> ResolvedXref {
        let (key, query, fragment) = match (uid, href) {
            (Some(uid), _) => (uid.as_str(), "", ""),
            (None, Some(href)) => {
                let parts = split_url(href.as_str());
                (parts.path, parts.query, parts.fragment)
            }
            (None, None) => return ResolvedXref::default(),
        };
        let Some(spec) = self.specs.get(key) else {
            return ResolvedXref::default();
        };
        let target = split_url(spec.href());
        let fragment = if fragment.is_empty() {
            target.fragment
        } else {
            fragment
        };
        let query = match (target.query.is_empty(), query.is_empty()) {
            (_, true) => target.query.to_string(),
            (true, false) => query.to_string(),
            (false, false) => format!("{}&{}", target.query, &query[1..]),
        };
        let display = spec.get_name().unwrap_or(spec.uid()).to_string();
        ResolvedXref::resolved(format!("{}{}{}", target.path, query, fragment), display)
    }
}

pub fn has_xref_markers(html: &str) -> bool {
    contains_ignore_ascii_case(html, "<xref")
        && (contains_ignore_ascii_case(html, "href") || contains_ignore_ascii_case(html, "uid"))
}

/// Attributes of an `<xref>` placeholder, entity-decoded.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct XrefPlaceholder {
    href: Option<String>,
    uid: Option<String>,
    raw_html: Option<String>,
    raw_source: Option<String>,
}

impl XrefPlaceholder {
    pub(crate) fn from_token(token: &HtmlToken<'_>) -> Self {
        let mut placeholder = Self::default();
        for attribute in &token.attributes {
            let value = Some(attribute.value().into_owned());
            if attribute.name_is("data-raw-html") {
                placeholder.raw_html = value;
            } else if attribute.name_is("data-raw-source") {
                placeholder.raw_source = value;
            } else if attribute.name_is("href") {
                placeholder.href = value;
            } else if attribute.name_is("uid") {
                placeholder.uid = value;
            }
        }
        placeholder
    }

    fn fallback_markup(&self) -> Option<&str> {
        self.raw_html.as_deref().or(self.raw_source.as_deref())
    }

    pub(crate) fn is_shorthand(&self) -> bool {
        self.fallback_markup()
            .is_some_and(|markup| markup.starts_with('@'))
    }

    pub(crate) fn resolve(
        &self,
        source: Option<&SourceInfo>,
        column_offset: usize,
        resolver: &mut dyn XrefResolver,
    ) -> String {
        let located = |value: &Option<String>| {
            value.as_ref().map(|value| {
                Located::new(
                    value.clone(),
                    source.map(|source| source.with_column_offset(column_offset)),
                )
            })
        };
        let href = located(&self.href);
        let uid = located(&self.uid);
        let resolved = resolver.resolve_xref(href.as_ref(), uid.as_ref(), self.is_shorthand());
        self.render(&resolved)
    }

    fn render(&self, resolved: &ResolvedXref) -> String {
        if let Some(href) = resolved.resolved_href() {
            return format!(
                "<a href=\"{}\">{}</a>",
                encode(href),
                encode(&resolved.display)
            );
        }
        if let Some(markup) = self.fallback_markup() {
            return markup.to_string();
        }
        let text = if !resolved.display.is_empty() {
            resolved.display.as_str()
        } else if let Some(href) = &self.href {
            split_url(href).path
        } else {
            self.uid.as_deref().unwrap_or("")
        };
        format!("<span class=\"xref\">{}</span>", encode_text(text))
    }
}

/// Replaces each `<xref>` placeholder element with a link, or a visible fallback.
pub fn transform_xref(
    html: &str,
    source: Option<&SourceInfo>,
    resolver: &mut dyn XrefResolver,
) -> String {
    if !has_xref_markers(html) {
        log::trace!("no xref markers, fragment passed through");
        return html.to_string();
    }

    let mut writer = RewriteWriter::new(html);
    let mut reader = HtmlReader::new(html);
    let mut column_offset = 0;
    while let Some(token) = reader.next() {
        if !token.name_is(XREF_ELEMENT) {
            continue;
        }
        if token.kind == HtmlTokenKind::EndTag {
            writer.remove(token.span);
            continue;
        }
        let span = reader.skip_element(&token);
        let replacement =
            XrefPlaceholder::from_token(&token).resolve(source, column_offset, resolver);
        writer.replace(span, &replacement);
        column_offset += 1;
    }
    writer.finish()
}
