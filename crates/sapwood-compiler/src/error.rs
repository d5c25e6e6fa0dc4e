use sapwood_core::Point;

use crate::diagnostics::{DiagnosticMessage, Diagnostics};

/// A query that failed to compile.
///
/// `position` and `message` describe the first error after suppressing
/// follow-on errors; `diagnostics` holds everything that was reported.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message} at {}:{}", position.row + 1, position.column + 1)]
pub struct QueryError {
    pub position: Point,
    /// Byte offset of `position` in the query text.
    pub offset: usize,
    pub message: String,
    pub diagnostics: Diagnostics,
}

impl QueryError {
    pub(crate) fn new(source: &str, diagnostics: Diagnostics) -> Self {
        let first = diagnostics.first_error();
        let (offset, message) = match &first {
            Some(first) => (first.range().start, first.message().to_owned()),
            None => (0, "query failed to compile".to_owned()),
        };
        Self {
            position: point_at(source, offset),
            offset,
            message,
            diagnostics,
        }
    }

    /// The first error, if the query produced one.
    pub fn first(&self) -> Option<DiagnosticMessage> {
        self.diagnostics.first_error()
    }

    /// Annotated rendering of every remaining error and warning.
    pub fn render(&self, source: &str) -> String {
        self.diagnostics.render_filtered(source)
    }
}

/// Row and byte column of `offset`.
fn point_at(source: &str, offset: usize) -> Point {
    let offset = offset.min(source.len());
    let before = &source.as_bytes()[..offset];
    let row = before.iter().filter(|&&b| b == b'\n').count();
    let line_start = before
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1);
    Point::new(row, offset - line_start)
}
