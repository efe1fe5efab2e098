mod allow_list;
mod diagnostic;
mod dom;
mod encode;
mod link;
mod reader;
mod rewrite;
mod sanitize;
mod scan;
mod source_info;
mod span;
mod url;
mod writer;
mod xref;
mod xref_spec;

pub use allow_list::{
    ALLOWED_CELL_STYLES, EMBEDDED_CONTENT_ELEMENTS, RESERVED_ATTRIBUTE_PREFIXES,
    TABLE_CELL_ELEMENTS, XREF_ELEMENT, is_allowed_attribute, is_allowed_element,
};
pub use diagnostic::{
    DUPLICATE_UID, Diagnostic, DiagnosticSink, ErrorLevel, HTML_EMBED, NullSink, XREF_NOT_FOUND,
};
pub use dom::{HtmlNode, HtmlNodeKind};
pub use encode::{decode, encode, encode_meta};
pub use link::{LinkResolver, add_link_type, has_link_markers, transform_links};
pub use reader::{HtmlAttribute, HtmlReader, HtmlToken, HtmlTokenKind, QuoteStyle};
pub use rewrite::{HtmlContext, HtmlRewriteOptions, transform_html};
pub use sanitize::sanitize_html;
pub use scan::{
    ExtractedTitle, count_words, create_html_meta_tags, get_bookmarks, try_extract_title,
};
pub use source_info::{Located, SourceInfo};
pub use span::{Span, SpanError};
pub use url::{LinkType, UrlParts, link_type, split_url};
pub use writer::{RewritePoint, RewriteWriter};
pub use xref::{ResolvedXref, XrefMap, XrefResolver, has_xref_markers, transform_xref};
pub use xref_spec::{
    ExternalXrefSpec, InternalXrefSpec, LazyProperty, XrefSpec, pick_effective_spec,
};
