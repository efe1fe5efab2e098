use std::collections::{BTreeSet, HashMap, HashSet};

use docweave_core::{
    Diagnostic, ExternalXrefSpec, HtmlContext, HtmlNode, HtmlRewriteOptions, SourceInfo, XrefMap,
    count_words, create_html_meta_tags, get_bookmarks, transform_html, try_extract_title,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use wasm_bindgen::prelude::*;

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RewriteRequest {
    dry_run: Option<bool>,
    report_embedded: Option<bool>,
    sanitize: Option<bool>,
    locale: Option<String>,
    file: Option<String>,
    links: HashMap<String, String>,
    xrefs: Vec<ExternalXrefSpec>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RewriteResult {
    html: String,
    diagnostics: Vec<Diagnostic>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScanResult {
    word_count: u64,
    bookmarks: Vec<String>,
    title: Option<String>,
    raw_title: Option<String>,
}

#[wasm_bindgen]
pub fn rewrite_html(fragment: &str) -> Result<JsValue, JsValue> {
    rewrite_html_with_options(fragment, JsValue::UNDEFINED)
}

#[wasm_bindgen]
pub fn rewrite_html_with_options(fragment: &str, options: JsValue) -> Result<JsValue, JsValue> {
    let request = request_from_js(options)?;
    to_js(&rewrite(fragment, request))
}

#[wasm_bindgen]
pub fn scan_html(fragment: &str) -> Result<JsValue, JsValue> {
    to_js(&scan(fragment))
}

/// Renders a metadata object as `<meta>` lines, skipping the names in `hidden`.
#[wasm_bindgen]
pub fn html_meta_tags(metadata: JsValue, hidden: Vec<String>) -> Result<String, JsValue> {
    let metadata: Map<String, Value> = serde_wasm_bindgen::from_value(metadata)
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    let hidden: HashSet<String> = hidden.into_iter().collect();
    Ok(create_html_meta_tags(&metadata, &hidden, &HashMap::new()))
}

fn request_from_js(value: JsValue) -> Result<RewriteRequest, JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(RewriteRequest::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|err| JsValue::from_str(&err.to_string()))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|err| JsValue::from_str(&err.to_string()))
}

fn rewrite_options(request: &RewriteRequest) -> HtmlRewriteOptions {
    let mut out = HtmlRewriteOptions::default();
    if let Some(dry_run) = request.dry_run {
        out.dry_run = dry_run;
    }
    if let Some(report_embedded) = request.report_embedded {
        out.report_embedded = report_embedded;
    }
    if let Some(sanitize) = request.sanitize {
        out.sanitize = sanitize;
    }
    out.locale = request.locale.clone();
    out
}

fn rewrite(fragment: &str, request: RewriteRequest) -> RewriteResult {
    let options = rewrite_options(&request);
    let RewriteRequest {
        file, links, xrefs, ..
    } = request;

    let mut resolve_link =
        |href: &str, _column: usize| links.get(href).cloned().unwrap_or_default();
    let mut xrefs = XrefMap::new(xrefs);
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let mut context = HtmlContext {
        source: file.map(|file| SourceInfo::new(file, 1, 1)),
        links: &mut resolve_link,
        xrefs: &mut xrefs,
        diagnostics: &mut diagnostics,
    };
    let html = transform_html(fragment, &options, &mut context);
    RewriteResult { html, diagnostics }
}

fn scan(fragment: &str) -> ScanResult {
    let mut root = HtmlNode::parse(fragment);
    let bookmarks: BTreeSet<String> = get_bookmarks(&root).into_iter().collect();
    let word_count = count_words(&root);
    let title = try_extract_title(&mut root).unwrap_or_default();
    ScanResult {
        word_count,
        bookmarks: bookmarks.into_iter().collect(),
        title: title.title,
        raw_title: title.raw_title,
    }
}

#[cfg(test)]
mod tests {
    use super::{RewriteRequest, rewrite, scan};

    #[test]
    fn rewrite_applies_request_overrides() {
        let request = RewriteRequest {
            sanitize: Some(false),
            links: [("a.md".to_string(), "a.html".to_string())]
                .into_iter()
                .collect(),
            ..Default::default()
        };
        let result = rewrite("<a href=\"a.md\" onclick=\"x\">a</a>", request);
        assert_eq!(result.html, "<a href=\"a.html\" onclick=\"x\">a</a>");
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn report_mode_carries_the_file() {
        let request = RewriteRequest {
            report_embedded: Some(true),
            file: Some("docs/a.md".to_string()),
            ..Default::default()
        };
        let result = rewrite("<script>x</script>", request);
        assert_eq!(result.html, "");
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(
            result.diagnostics[0].source.as_ref().map(|source| source.file.as_str()),
            Some("docs/a.md")
        );
    }

    #[test]
    fn scan_sorts_bookmarks() {
        let result = scan("<h2 id=\"b\">B</h2><p id=\"a\">one two</p>");
        assert_eq!(result.bookmarks, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(result.word_count, 3);
        assert_eq!(result.title.as_deref(), Some("B"));
    }
}
