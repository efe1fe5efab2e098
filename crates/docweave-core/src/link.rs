use crate::encode::encode_attribute;
use crate::reader::{HtmlAttribute, HtmlReader, HtmlToken, QuoteStyle, contains_ignore_ascii_case};
use crate::url::{LinkType, add_locale_if_missing, link_type};
use crate::writer::{RewritePoint, RewriteWriter};

/// Maps a decoded link target to its published form. An empty result keeps the original.
pub trait LinkResolver {
    fn resolve_link(&mut self, href: &str, column_offset: usize) -> String;
}

impl<F> LinkResolver for F
where
    F: FnMut(&str, usize) -> String,
{
    fn resolve_link(&mut self, href: &str, column_offset: usize) -> String {
        self(href, column_offset)
    }
}

pub fn has_link_markers(html: &str) -> bool {
    (contains_ignore_ascii_case(html, "<a") && contains_ignore_ascii_case(html, "href"))
        || (contains_ignore_ascii_case(html, "<img") && contains_ignore_ascii_case(html, "src"))
}

/// Name of the attribute holding the link target, for elements that have one.
pub fn link_attribute_name(token: &HtmlToken<'_>) -> Option<&'static str> {
    if !token.is_opening() {
        return None;
    }
    if token.name_is("a") {
        Some("href")
    } else if token.name_is("img") {
        Some("src")
    } else {
        None
    }
}

pub(crate) fn rewrite_link_attribute(
    attribute: &HtmlAttribute<'_>,
    resolver: &mut dyn LinkResolver,
    column_offset: usize,
) -> Option<RewritePoint> {
    let original = attribute.value();
    let resolved = resolver.resolve_link(&original, column_offset);
    if resolved.is_empty() || resolved == original {
        return None;
    }
    match attribute.value {
        Some(span) => Some(RewritePoint::replace(
            span,
            encode_attribute(&resolved, attribute.quote),
        )),
        None => Some(RewritePoint::insert(
            attribute.name.end,
            format!("=\"{}\"", encode_attribute(&resolved, QuoteStyle::Double)),
        )),
    }
}

/// Resolves every `<a href>` and `<img src>` target, touching only the value bytes.
pub fn transform_links(html: &str, resolver: &mut dyn LinkResolver) -> String {
    if !has_link_markers(html) {
        log::trace!("no link markers, fragment passed through");
        return html.to_string();
    }

    let mut writer = RewriteWriter::new(html);
    let mut column_offset = 0;
    for token in HtmlReader::new(html) {
        let Some(attribute_name) = link_attribute_name(&token) else {
            continue;
        };
        for attribute in token
            .attributes
            .iter()
            .filter(|attr| attr.name_is(attribute_name))
        {
            if let Some(point) = rewrite_link_attribute(attribute, resolver, column_offset) {
                writer.apply(&point);
            }
            column_offset += 1;
        }
    }
    writer.finish()
}

/// Tags links with `data-linktype` and pins absolute paths to `locale`.
pub fn add_link_type(html: &str, locale: &str) -> String {
    if !has_link_markers(html) {
        return html.to_string();
    }

    let mut writer = RewriteWriter::new(html);
    for token in HtmlReader::new(html) {
        let Some(attribute_name) = link_attribute_name(&token) else {
            continue;
        };
        let Some(target) = token.attribute(attribute_name) else {
            continue;
        };
        let href = target.value();
        if href.is_empty() {
            continue;
        }

        let kind = link_type(&href);
        let mut points = Vec::new();
        if kind == LinkType::AbsolutePath {
            let localized = add_locale_if_missing(&href, locale);
            if localized != href {
                if let Some(span) = target.value {
                    points.push(RewritePoint::replace(
                        span,
                        encode_attribute(&localized, target.quote),
                    ));
                }
            }
        }
        match token.attribute("data-linktype") {
            Some(existing) if existing.value() == kind.as_str() => {}
            Some(existing) => match existing.value {
                Some(span) => points.push(RewritePoint::replace(span, kind.as_str())),
                None => points.push(RewritePoint::insert(
                    existing.name.end,
                    format!("=\"{}\"", kind.as_str()),
                )),
            },
            None => points.push(RewritePoint::insert(
                token.attributes_end,
                format!(" data-linktype=\"{}\"", kind.as_str()),
            )),
        }
        points.sort_by_key(|point| (point.span.start, point.span.end));
        writer.apply_all(&points);
    }
    writer.finish()
}
