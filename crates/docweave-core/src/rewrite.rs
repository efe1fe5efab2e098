use serde::{Deserialize, Serialize};

use crate::allow_list::{XREF_ELEMENT, is_allowed_element};
use crate::diagnostic::{DiagnosticSink, NullSink};
use crate::link::{
    LinkResolver, add_link_type, has_link_markers, link_attribute_name, rewrite_link_attribute,
};
use crate::reader::{HtmlReader, HtmlTokenKind};
use crate::sanitize::{
    escape_stray_markup, keeps_attribute, report_embedded, report_nested_embedded, rerun_suffix,
    sanitize_html, strip_attribute,
};
use crate::source_info::SourceInfo;
use crate::writer::{RewritePoint, RewriteWriter};
use crate::xref::{XrefPlaceholder, XrefResolver, has_xref_markers};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HtmlRewriteOptions {
    /// Skip output-only adjustments such as the playground iframe suffix.
    pub dry_run: bool,
    /// Report embedded `<script>`, `<link>` and `<style>` to the diagnostics sink.
    pub report_embedded: bool,
    /// Apply the element and attribute allow-lists.
    pub sanitize: bool,
    /// When set, links are tagged with `data-linktype` and absolute paths localized.
    pub locale: Option<String>,
}

impl Default for HtmlRewriteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            report_embedded: false,
            sanitize: true,
            locale: None,
        }
    }
}

/// Everything one rewrite call talks to outside the fragment itself.
pub struct HtmlContext<'r> {
    /// Location of the markdown block the fragment came from.
    pub source: Option<SourceInfo>,
    pub links: &'r mut dyn LinkResolver,
    pub xrefs: &'r mut dyn XrefResolver,
    pub diagnostics: &'r mut dyn DiagnosticSink,
}

fn needs_rewrite(html: &str, options: &HtmlRewriteOptions) -> bool {
    if options.sanitize || options.report_embedded {
        return html.contains('<');
    }
    has_link_markers(html) || has_xref_markers(html)
}

/// Rewrites one inline or block HTML fragment in a single pass.
///
/// Each tag is offered to the xref, link and sanitize concerns in turn; bytes no
/// concern claims are copied through unchanged, so the result can be stitched back
/// into the surrounding document.
pub fn transform_html(
    html: &str,
    options: &HtmlRewriteOptions,
    context: &mut HtmlContext<'_>,
) -> String {
    if !needs_rewrite(html, options) {
        log::trace!("fragment has nothing to rewrite");
        return html.to_string();
    }

    let source = context.source.as_ref();
    let mut writer = RewriteWriter::new(html);
    let mut reader = HtmlReader::new(html);
    let mut column_offset = 0;

    while let Some(token) = reader.next() {
        if !token.is_tag() {
            if options.sanitize {
                if let Some(point) = escape_stray_markup(&token) {
                    writer.apply(&point);
                }
            }
            continue;
        }
        if options.report_embedded {
            report_embedded(&token, source, context.diagnostics);
        }

        if token.name_is(XREF_ELEMENT) {
            if token.kind == HtmlTokenKind::EndTag {
                writer.remove(token.span);
                continue;
            }
            let span = reader.skip_element(&token);
            let mut replacement =
                XrefPlaceholder::from_token(&token).resolve(source, column_offset, context.xrefs);
            if options.sanitize {
                // Fallback markup comes from attribute values and never went through the
                // allow-lists.
                let fallback_options = HtmlRewriteOptions {
                    report_embedded: false,
                    ..options.clone()
                };
                replacement = sanitize_html(&replacement, &fallback_options, None, &mut NullSink);
            }
            writer.replace(span, &replacement);
            column_offset += 1;
            continue;
        }

        if options.sanitize && !is_allowed_element(token.name()) {
            let span = if token.is_opening() {
                reader.skip_element(&token)
            } else {
                token.span
            };
            if options.report_embedded {
                report_nested_embedded(html, &token, span, source, context.diagnostics);
            }
            log::debug!("dropping disallowed <{}>", token.name());
            writer.remove(span);
            continue;
        }

        if !token.is_opening() {
            continue;
        }

        let link_attribute = link_attribute_name(&token);
        let mut points: Vec<RewritePoint> = Vec::new();
        let mut previous_end = token.name.end;
        for attribute in &token.attributes {
            let attribute_start = previous_end;
            previous_end = attribute.span.end;

            if options.sanitize && !keeps_attribute(&token, attribute) {
                points.push(strip_attribute(&token, attribute_start, attribute));
                continue;
            }
            if link_attribute.is_some_and(|name| attribute.name_is(name)) {
                if let Some(point) =
                    rewrite_link_attribute(attribute, context.links, column_offset)
                {
                    points.push(point);
                }
                column_offset += 1;
                continue;
            }
            if !options.dry_run {
                if let Some(point) = rerun_suffix(&token, attribute) {
                    points.push(point);
                }
            }
        }
        writer.apply_all(&points);
    }

    let output = writer.finish();
    match options.locale.as_deref() {
        Some(locale) => add_link_type(&output, locale),
        None => output,
    }
}
