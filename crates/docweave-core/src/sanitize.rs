use crate::allow_list::{
    is_allowed_attribute, is_allowed_cell_style, is_allowed_element, is_embedded_content,
    is_table_cell,
};
use crate::diagnostic::{Diagnostic, DiagnosticSink, HTML_EMBED};
use crate::reader::{
    HtmlAttribute, HtmlReader, HtmlToken, HtmlTokenKind, contains_ignore_ascii_case,
    is_raw_text_element,
};
use crate::rewrite::HtmlRewriteOptions;
use crate::source_info::SourceInfo;
use crate::span::Span;
use crate::writer::{RewritePoint, RewriteWriter};

const PLAYGROUND_HOST: &str = "codepen.io";
const RERUN_HIDDEN: &str = "rerun-position=hidden";

pub(crate) fn keeps_attribute(element: &HtmlToken<'_>, attribute: &HtmlAttribute<'_>) -> bool {
    if attribute.name_is("style") {
        return is_table_cell(element.name()) && is_allowed_cell_style(&attribute.value());
    }
    is_allowed_attribute(attribute.name())
}

/// Warns about `<script>`, `<link>` and `<style>` without removing anything.
pub(crate) fn report_embedded(
    token: &HtmlToken<'_>,
    source: Option<&SourceInfo>,
    diagnostics: &mut dyn DiagnosticSink,
) {
    if token.is_opening() && is_embedded_content(token.name()) {
        diagnostics.add(Diagnostic::warning(
            HTML_EMBED,
            format!(
                "HTML contains embedded <{}>.",
                token.name().to_ascii_lowercase()
            ),
            source.cloned(),
        ));
    }
}

/// Reports embedded content inside an element that is dropped whole. `start` has
/// already been reported; the body of a raw text element is not markup.
pub(crate) fn report_nested_embedded(
    html: &str,
    start: &HtmlToken<'_>,
    element: Span,
    source: Option<&SourceInfo>,
    diagnostics: &mut dyn DiagnosticSink,
) {
    if element.end <= start.span.end || is_raw_text_element(start.name()) {
        return;
    }
    for token in HtmlReader::new(&html[start.span.end..element.end]) {
        report_embedded(&token, source, diagnostics);
    }
}

/// Hides the inaccessible rerun button on embedded playground iframes.
pub(crate) fn rerun_suffix(
    token: &HtmlToken<'_>,
    attribute: &HtmlAttribute<'_>,
) -> Option<RewritePoint> {
    if !token.name_is("iframe") || !attribute.name_is("src") {
        return None;
    }
    let src = attribute.value();
    if !contains_ignore_ascii_case(&src, PLAYGROUND_HOST) || src.contains(RERUN_HIDDEN) {
        return None;
    }
    let span = attribute.value?;
    Some(RewritePoint::insert(
        span.end,
        format!("&amp;{}&amp;", RERUN_HIDDEN),
    ))
}

/// Removes `attribute` together with the whitespace before it, which starts at
/// `start`. A following attribute glued to this one keeps a separating space.
pub(crate) fn strip_attribute(
    token: &HtmlToken<'_>,
    start: usize,
    attribute: &HtmlAttribute<'_>,
) -> RewritePoint {
    let span = Span {
        start,
        end: attribute.span.end,
    };
    let next = token
        .raw()
        .as_bytes()
        .get(attribute.span.end - token.span.start)
        .copied();
    match next {
        Some(b' ' | b'\t' | b'\n' | b'\r' | 0x0C | b'/' | b'>') | None => {
            RewritePoint::remove(span)
        }
        Some(_) => RewritePoint::replace(span, " "),
    }
}

/// Rewrite points that strip disallowed attributes from an allowed element.
pub(crate) fn strip_attributes(token: &HtmlToken<'_>) -> Vec<RewritePoint> {
    let mut points = Vec::new();
    let mut previous_end = token.name.end;
    for attribute in &token.attributes {
        if !keeps_attribute(token, attribute) {
            points.push(strip_attribute(token, previous_end, attribute));
        }
        previous_end = attribute.span.end;
    }
    points
}

/// Escapes the `<` of markup that failed to lex, so removals around it can never
/// turn it into a tag.
pub(crate) fn escape_stray_markup(token: &HtmlToken<'_>) -> Option<RewritePoint> {
    if token.kind != HtmlTokenKind::Text || !token.raw().starts_with('<') {
        return None;
    }
    Some(RewritePoint::replace(
        Span {
            start: token.span.start,
            end: token.span.start + 1,
        },
        "&lt;",
    ))
}

/// Applies the allow-lists to a fragment. Link and xref targets are left as they are.
///
/// Running it on its own output changes nothing.
pub fn sanitize_html(
    html: &str,
    options: &HtmlRewriteOptions,
    source: Option<&SourceInfo>,
    diagnostics: &mut dyn DiagnosticSink,
) -> String {
    if !html.contains('<') {
        return html.to_string();
    }

    let mut writer = RewriteWriter::new(html);
    let mut reader = HtmlReader::new(html);
    while let Some(token) = reader.next() {
        if !token.is_tag() {
            if let Some(point) = escape_stray_markup(&token) {
                writer.apply(&point);
            }
            continue;
        }
        if options.report_embedded {
            report_embedded(&token, source, diagnostics);
        }
        if !is_allowed_element(token.name()) {
            let span = if token.is_opening() {
                reader.skip_element(&token)
            } else {
                token.span
            };
            if options.report_embedded {
                report_nested_embedded(html, &token, span, source, diagnostics);
            }
            log::debug!("dropping disallowed <{}>", token.name());
            writer.remove(span);
            continue;
        }
        if !token.is_opening() {
            continue;
        }
        let mut points = strip_attributes(&token);
        if !options.dry_run {
            points.extend(
                token
                    .attributes
                    .iter()
                    .filter(|attribute| keeps_attribute(&token, attribute))
                    .filter_map(|attribute| rerun_suffix(&token, attribute)),
            );
        }
        points.sort_by_key(|point| (point.span.start, point.span.end));
        writer.apply_all(&points);
    }
    writer.finish()
}
