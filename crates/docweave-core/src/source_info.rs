use std::fmt;

use serde::{Deserialize, Serialize};

/// Location of a markdown block in its source file. Lines and columns are 1-based.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SourceInfo {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl SourceInfo {
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            end_line: line,
            end_column: column,
        }
    }

    pub fn with_end(mut self, end_line: usize, end_column: usize) -> Self {
        self.end_line = end_line;
        self.end_column = end_column;
        self
    }

    /// Shifts both columns so several elements on one line stay distinguishable.
    pub fn with_column_offset(&self, offset: usize) -> Self {
        Self {
            file: self.file.clone(),
            line: self.line,
            column: self.column + offset,
            end_line: self.end_line,
            end_column: self.end_column + offset,
        }
    }
}

impl fmt::Display for SourceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({},{})", self.file, self.line, self.column)
    }
}

/// A value paired with where it was authored.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Located<T> {
    pub value: T,
    pub source: Option<SourceInfo>,
}

impl<T> Located<T> {
    pub fn new(value: T, source: Option<SourceInfo>) -> Self {
        Self { value, source }
    }

    pub fn unlocated(value: T) -> Self {
        Self {
            value,
            source: None,
        }
    }
}

impl Located<String> {
    pub fn as_str(&self) -> &str {
        &self.value
    }
}
