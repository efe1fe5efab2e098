use std::fs;
use std::path::{Path, PathBuf};

use docweave_core::{
    Diagnostic, ExternalXrefSpec, HtmlContext, HtmlRewriteOptions, LinkType, SourceInfo, XrefMap,
    link_type, split_url, transform_html,
};
use serde_json::json;

#[test]
fn golden_fixtures() -> Result<(), Box<dyn std::error::Error>> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
    let fixtures_dir = root.join("tests/fixtures");
    let expect_dir = root.join("tests/expect");

    let mut fixtures = collect_fixtures(&fixtures_dir)?;
    fixtures.sort_by(|a, b| file_name(a).cmp(&file_name(b)));

    for fixture in fixtures {
        let name = file_stem(&fixture)?;
        let source = fs::read_to_string(&fixture)?;
        let options_path = fixture.with_extension("json");
        let options: HtmlRewriteOptions = if options_path.exists() {
            serde_json::from_str(&fs::read_to_string(&options_path)?)?
        } else {
            HtmlRewriteOptions::default()
        };

        let mut links = markdown_links;
        let mut xrefs = xref_map();
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let mut context = HtmlContext {
            source: Some(SourceInfo::new(format!("{}.md", name), 1, 1)),
            links: &mut links,
            xrefs: &mut xrefs,
            diagnostics: &mut diagnostics,
        };
        let html = transform_html(&source, &options, &mut context);

        let html_path = expect_dir.join(format!("{}.html", name));
        let expected = fs::read_to_string(&html_path)?;
        assert_eq!(
            html.trim_end(),
            expected.trim_end(),
            "HTML mismatch for fixture {}",
            name
        );

        let diag_path = expect_dir.join(format!("{}.diag.json", name));
        if diag_path.exists() {
            let expected = fs::read_to_string(&diag_path)?;
            let actual = serde_json::to_string_pretty(&diagnostics)?;
            assert_eq!(
                actual.trim_end(),
                expected.trim_end(),
                "Diagnostics mismatch for fixture {}",
                name
            );
        } else if !diagnostics.is_empty() {
            panic!(
                "Unexpected diagnostics for fixture {}: {}",
                name,
                serde_json::to_string_pretty(&diagnostics)?
            );
        }
    }

    Ok(())
}

fn markdown_links(href: &str, _column: usize) -> String {
    if link_type(href) != LinkType::RelativePath {
        return String::new();
    }
    let parts = split_url(href);
    match parts.path.strip_suffix(".md") {
        Some(stem) => format!("{}.html{}{}", stem, parts.query, parts.fragment),
        None => String::new(),
    }
}

fn xref_map() -> XrefMap<ExternalXrefSpec> {
    XrefMap::new([
        ExternalXrefSpec {
            uid: "System.String".to_string(),
            href: "api/system.string.html".to_string(),
            extension_data: json!({ "name": "String" })
                .as_object()
                .cloned()
                .unwrap_or_default(),
            ..Default::default()
        },
        ExternalXrefSpec {
            uid: "Docs.Guide".to_string(),
            href: "guide/index.html#intro".to_string(),
            ..Default::default()
        },
    ])
}

fn collect_fixtures(dir: &Path) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut fixtures = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("html") {
            fixtures.push(path);
        }
    }
    Ok(fixtures)
}

fn file_name(path: &Path) -> &str {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("")
}

fn file_stem(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(|value| value.to_string())
        .ok_or_else(|| "fixture name is not valid UTF-8".into())
}
