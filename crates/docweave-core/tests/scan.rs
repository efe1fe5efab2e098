use std::collections::{HashMap, HashSet};

use docweave_core::{
    ExtractedTitle, HtmlNode, count_words, create_html_meta_tags, get_bookmarks,
    try_extract_title,
};
use serde_json::{Map, Value, json};

fn words(html: &str) -> u64 {
    count_words(&HtmlNode::parse(html))
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[test]
fn counts_words_between_whitespace_and_punctuation() {
    assert_eq!(words("<p>Hello, world! Visit (here).</p>"), 4);
    assert_eq!(words("<p>One <b>two</b> three</p><!-- four five -->"), 3);
    assert_eq!(words("<p> ... , ; ( ) </p>"), 0);
    assert_eq!(words("a&amp;b c"), 2);
    assert_eq!(words(""), 0);
}

#[test]
fn stray_end_tags_do_not_count() {
    assert_eq!(words("one</div> two"), 2);
}

#[test]
fn bookmarks_collect_ids_and_names() {
    let root = HtmlNode::parse(
        "<h2 id=\"intro\">Intro</h2><a name=\"top\"></a><p id=\"\">x</p><div ID=\"Mixed\"><span id=a&amp;b></span></div>",
    );
    let expected: HashSet<String> = ["intro", "top", "Mixed", "a&b"]
        .into_iter()
        .map(str::to_string)
        .collect();
    assert_eq!(get_bookmarks(&root), expected);
}

#[test]
fn leading_heading_is_detached_as_title() {
    let mut root = HtmlNode::parse(
        "<!-- c -->\n<h1 id=\"t\">Hello &amp; <em>bye</em></h1><p>Body</p>",
    );
    let title = try_extract_title(&mut root);
    assert_eq!(
        title,
        Some(ExtractedTitle {
            title: Some("Hello & bye".to_string()),
            raw_title: Some("<h1 id=\"t\">Hello &amp; <em>bye</em></h1>".to_string()),
        })
    );
    assert_eq!(root.outer_html(), "<!-- c -->\n<p>Body</p>");
}

#[test]
fn later_heading_is_reported_but_kept() {
    let html = "<p>Intro</p><h2>Later</h2>";
    let mut root = HtmlNode::parse(html);
    assert_eq!(
        try_extract_title(&mut root),
        Some(ExtractedTitle {
            title: Some("Later".to_string()),
            raw_title: None,
        })
    );
    assert_eq!(root.outer_html(), html);
}

#[test]
fn title_edge_cases() {
    let mut empty = HtmlNode::parse("<h1></h1>");
    assert_eq!(
        try_extract_title(&mut empty),
        Some(ExtractedTitle {
            title: None,
            raw_title: Some("<h1></h1>".to_string()),
        })
    );
    assert_eq!(try_extract_title(&mut HtmlNode::parse("<p>no heading</p>")), None);
    let mut late = HtmlNode::parse("<h4>x</h4><h1>y</h1>");
    let title = try_extract_title(&mut late);
    assert_eq!(title.and_then(|title| title.raw_title), None);
}

#[test]
fn meta_tags_skip_hidden_and_expand_arrays() {
    let metadata = object(json!({
        "title": "A \"quoted\" <title>",
        "ms.topic": "article",
        "tags": ["a", "b", null, 3],
        "internal": "secret",
        "draft": false,
        "nested": { "a": 1 },
        "nothing": null
    }));
    let hidden: HashSet<String> = ["internal".to_string()].into_iter().collect();
    let display_names: HashMap<String, String> =
        [("ms.topic".to_string(), "topic".to_string())].into_iter().collect();

    assert_eq!(
        create_html_meta_tags(&metadata, &hidden, &display_names),
        concat!(
            "<meta name=\"title\" content=\"A &quot;quoted&quot; &lt;title&gt;\" />\n",
            "<meta name=\"topic\" content=\"article\" />\n",
            "<meta name=\"tags\" content=\"a\" />\n",
            "<meta name=\"tags\" content=\"b\" />\n",
            "<meta name=\"tags\" content=\"\" />\n",
            "<meta name=\"tags\" content=\"3\" />\n",
            "<meta name=\"draft\" content=\"false\" />\n",
        )
    );
}

#[test]
fn meta_tags_reparse_to_the_original_values() -> Result<(), Box<dyn std::error::Error>> {
    let values = ["it's \"fine\"", "a & b < c > d", "plain"];
    let metadata = object(json!({ "k": values }));
    let tags = create_html_meta_tags(&metadata, &HashSet::new(), &HashMap::new());

    let wrapped = format!("<root>{}</root>", tags);
    let document = roxmltree::Document::parse(&wrapped)?;
    let parsed: Vec<(&str, &str)> = document
        .root_element()
        .children()
        .filter(|node| node.is_element())
        .map(|node| {
            (
                node.attribute("name").unwrap_or(""),
                node.attribute("content").unwrap_or(""),
            )
        })
        .collect();
    assert_eq!(
        parsed,
        values.iter().map(|value| ("k", *value)).collect::<Vec<_>>()
    );
    Ok(())
}
