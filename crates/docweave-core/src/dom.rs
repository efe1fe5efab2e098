use crate::allow_list::is_void_element;
use crate::reader::{HtmlReader, HtmlTokenKind};

#[derive(Clone, Debug, PartialEq)]
pub enum HtmlNodeKind {
    Document,
    Element {
        /// Lowercased tag name.
        name: String,
        /// Lowercased names with entity-decoded values, in source order.
        attributes: Vec<(String, String)>,
    },
    Text,
    Comment,
    /// An end tag with no open element to close.
    StrayEndTag,
}

/// A node of a parsed fragment that remembers the exact markup it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct HtmlNode {
    pub kind: HtmlNodeKind,
    /// Start tag for elements; the whole raw text for every other node.
    pub raw_open: String,
    /// End tag for elements closed explicitly in the source.
    pub raw_close: String,
    pub children: Vec<HtmlNode>,
}

impl HtmlNode {
    fn leaf(kind: HtmlNodeKind, raw: &str) -> Self {
        Self {
            kind,
            raw_open: raw.to_string(),
            raw_close: String::new(),
            children: Vec::new(),
        }
    }

    /// Builds a tree from tag soup. Unclosed elements end with the fragment and
    /// end tags close the nearest open element of the same name.
    pub fn parse(html: &str) -> Self {
        let mut stack = vec![HtmlNode::leaf(HtmlNodeKind::Document, "")];

        for token in HtmlReader::new(html) {
            match token.kind {
                HtmlTokenKind::Text => {
                    push_child(&mut stack, HtmlNode::leaf(HtmlNodeKind::Text, token.raw()));
                }
                HtmlTokenKind::Comment => {
                    push_child(&mut stack, HtmlNode::leaf(HtmlNodeKind::Comment, token.raw()));
                }
                HtmlTokenKind::StartTag | HtmlTokenKind::SelfClosingTag => {
                    let element = HtmlNode::leaf(
                        HtmlNodeKind::Element {
                            name: token.name().to_ascii_lowercase(),
                            attributes: token
                                .attributes
                                .iter()
                                .map(|attr| {
                                    (attr.name().to_ascii_lowercase(), attr.value().into_owned())
                                })
                                .collect(),
                        },
                        token.raw(),
                    );
                    if token.kind == HtmlTokenKind::SelfClosingTag
                        || is_void_element(token.name())
                    {
                        push_child(&mut stack, element);
                    } else {
                        stack.push(element);
                    }
                }
                HtmlTokenKind::EndTag => {
                    let open = stack
                        .iter()
                        .skip(1)
                        .rposition(|node| node.name().is_some_and(|name| token.name_is(name)));
                    match open {
                        Some(index) => {
                            let depth = index + 1;
                            while stack.len() > depth + 1 {
                                close_top(&mut stack);
                            }
                            if let Some(node) = stack.last_mut() {
                                node.raw_close = token.raw().to_string();
                            }
                            close_top(&mut stack);
                        }
                        None => push_child(
                            &mut stack,
                            HtmlNode::leaf(HtmlNodeKind::StrayEndTag, token.raw()),
                        ),
                    }
                }
            }
        }

        while stack.len() > 1 {
            close_top(&mut stack);
        }
        stack.pop().unwrap_or_else(|| HtmlNode::leaf(HtmlNodeKind::Document, ""))
    }

    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            HtmlNodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn is_element(&self, name: &str) -> bool {
        self.name().is_some_and(|own| own.eq_ignore_ascii_case(name))
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        match &self.kind {
            HtmlNodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.write_outer_html(&mut out);
        out
    }

    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.write_outer_html(&mut out);
        }
        out
    }

    fn write_outer_html(&self, out: &mut String) {
        out.push_str(&self.raw_open);
        for child in &self.children {
            child.write_outer_html(out);
        }
        out.push_str(&self.raw_close);
    }

    /// Concatenated raw text of all descendant text nodes, entities left encoded.
    pub fn inner_text(&self) -> String {
        let mut out = String::new();
        self.visit(&mut |node| {
            if node.kind == HtmlNodeKind::Text {
                out.push_str(&node.raw_open);
            }
        });
        out
    }

    /// Pre-order walk over this node and every descendant.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a HtmlNode)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }

    pub fn remove_child(&mut self, index: usize) -> HtmlNode {
        self.children.remove(index)
    }
}

fn push_child(stack: &mut [HtmlNode], node: HtmlNode) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

fn close_top(stack: &mut Vec<HtmlNode>) {
    if let Some(node) = stack.pop() {
        push_child(stack, node);
    }
}
