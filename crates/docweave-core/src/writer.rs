use crate::span::Span;

/// A claimed range of the original fragment and the text that replaces it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewritePoint {
    pub span: Span,
    pub replacement: String,
}

impl RewritePoint {
    pub fn replace(span: Span, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }

    pub fn remove(span: Span) -> Self {
        Self::replace(span, String::new())
    }

    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self::replace(Span::empty_at(offset), text)
    }
}

/// Copies the fragment verbatim except at rewrite points.
///
/// Points must arrive in document order and must not overlap; violating that is a
/// bug in the calling transform and panics.
pub struct RewriteWriter<'a> {
    source: &'a str,
    out: String,
    cursor: usize,
    rewrites: usize,
}

impl<'a> RewriteWriter<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            out: String::with_capacity(source.len() + 64),
            cursor: 0,
            rewrites: 0,
        }
    }

    pub fn apply(&mut self, point: &RewritePoint) {
        let span = point.span;
        assert!(
            span.start >= self.cursor,
            "rewrite point {}..{} overlaps a previous point ending at {}",
            span.start,
            span.end,
            self.cursor
        );
        assert!(
            span.start <= span.end && span.end <= self.source.len(),
            "rewrite point {}..{} is outside the fragment (len {})",
            span.start,
            span.end,
            self.source.len()
        );
        log::debug!(
            "rewrite {}..{} -> {:?}",
            span.start,
            span.end,
            point.replacement
        );
        self.out.push_str(&self.source[self.cursor..span.start]);
        self.out.push_str(&point.replacement);
        self.cursor = span.end;
        self.rewrites += 1;
    }

    pub fn apply_all(&mut self, points: &[RewritePoint]) {
        for point in points {
            self.apply(point);
        }
    }

    pub fn replace(&mut self, span: Span, replacement: &str) {
        self.apply(&RewritePoint::replace(span, replacement));
    }

    pub fn remove(&mut self, span: Span) {
        self.apply(&RewritePoint::remove(span));
    }

    pub fn rewrites(&self) -> usize {
        self.rewrites
    }

    pub fn finish(mut self) -> String {
        if self.rewrites == 0 {
            return self.source.to_string();
        }
        self.out.push_str(&self.source[self.cursor..]);
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::{RewritePoint, RewriteWriter};
    use crate::span::Span;

    #[test]
    fn copies_gaps_and_tail_verbatim() {
        let source = "<a href=\"x\">y</a>";
        let mut writer = RewriteWriter::new(source);
        writer.replace(Span { start: 9, end: 10 }, "z.html");
        writer.apply(&RewritePoint::insert(11, " data-k=\"v\""));
        assert_eq!(writer.finish(), "<a href=\"z.html\" data-k=\"v\">y</a>");
    }

    #[test]
    fn untouched_fragment_is_returned_as_is() {
        let writer = RewriteWriter::new("plain <b>text</b>");
        assert_eq!(writer.finish(), "plain <b>text</b>");
    }

    #[test]
    #[should_panic(expected = "overlaps")]
    fn overlapping_points_panic() {
        let mut writer = RewriteWriter::new("0123456789");
        writer.remove(Span { start: 2, end: 6 });
        writer.remove(Span { start: 4, end: 8 });
    }
}
