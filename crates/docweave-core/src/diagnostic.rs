use std::fmt;

use serde::Serialize;

use crate::source_info::SourceInfo;

pub const HTML_EMBED: &str = "html-embed";
pub const DUPLICATE_UID: &str = "duplicate-uid";
pub const XREF_NOT_FOUND: &str = "xref-not-found";

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(into = "DiagnosticRecord")]
pub struct Diagnostic {
    pub level: ErrorLevel,
    pub code: &'static str,
    pub message: String,
    pub source: Option<SourceInfo>,
}

impl Diagnostic {
    pub fn new(
        level: ErrorLevel,
        code: &'static str,
        message: impl Into<String>,
        source: Option<SourceInfo>,
    ) -> Self {
        Self {
            level,
            code,
            message: message.into(),
            source,
        }
    }

    pub fn warning(
        code: &'static str,
        message: impl Into<String>,
        source: Option<SourceInfo>,
    ) -> Self {
        Self::new(ErrorLevel::Warning, code, message, source)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "{}: ", source)?;
        }
        write!(f, "{} {}: {}", self.level, self.code, self.message)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorLevel {
    Off,
    Info,
    Suggestion,
    Warning,
    Error,
}

impl fmt::Display for ErrorLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorLevel::Off => "off",
            ErrorLevel::Info => "info",
            ErrorLevel::Suggestion => "suggestion",
            ErrorLevel::Warning => "warning",
            ErrorLevel::Error => "error",
        };
        f.write_str(label)
    }
}

/// Flat wire shape consumed by build log readers.
#[derive(Serialize)]
struct DiagnosticRecord {
    message_severity: ErrorLevel,
    code: &'static str,
    message: String,
    file: Option<String>,
    line: usize,
    end_line: usize,
    column: usize,
    end_column: usize,
}

impl From<Diagnostic> for DiagnosticRecord {
    fn from(diagnostic: Diagnostic) -> Self {
        let source = diagnostic.source.unwrap_or_default();
        let file = (!source.file.is_empty()).then_some(source.file);
        Self {
            message_severity: diagnostic.level,
            code: diagnostic.code,
            message: diagnostic.message,
            file,
            line: source.line,
            end_line: source.end_line,
            column: source.column,
            end_column: source.end_column,
        }
    }
}

/// Append-only collector for soft errors raised while rewriting.
pub trait DiagnosticSink {
    fn add(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn add(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Sink that discards everything, for callers that only want the rewritten text.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn add(&mut self, _diagnostic: Diagnostic) {}
}
