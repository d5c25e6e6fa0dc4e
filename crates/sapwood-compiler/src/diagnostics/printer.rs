//! Query diagnostics as annotated source snippets.
//!
//! Without source text every diagnostic falls back to its one-line
//! `Display` form, which is what the compiler's own tests snapshot.

use std::fmt::Write;
use std::ops::Range;

use annotate_snippets::{AnnotationKind, Group, Level, Patch, Renderer, Snippet};
use rowan::TextRange;

use super::Diagnostics;
use super::message::{DiagnosticMessage, Severity};

pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    source: Option<&'s str>,
    /// Shown in the snippet header, usually the query file name.
    path: Option<&'s str>,
    colored: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub fn new(diagnostics: &'d Diagnostics) -> Self {
        Self {
            diagnostics,
            source: None,
            path: None,
            colored: false,
        }
    }

    pub fn source(mut self, source: &'s str) -> Self {
        self.source = Some(source);
        self
    }

    pub fn path(mut self, path: &'s str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    /// One block per diagnostic, separated by a newline.
    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        for (index, diagnostic) in self.diagnostics.iter().enumerate() {
            if index > 0 {
                w.write_char('\n')?;
            }
            match self.source {
                Some(source) => {
                    let report = self.report(diagnostic, source);
                    write!(w, "{}", renderer.render(&report))?;
                    for hint in &diagnostic.hints {
                        write!(w, "\n  = help: {hint}")?;
                    }
                }
                None => write!(w, "{diagnostic}")?,
            }
        }
        Ok(())
    }

    fn report<'a>(&self, diagnostic: &'a DiagnosticMessage, source: &'a str) -> Vec<Group<'a>>
    where
        's: 'a,
    {
        let span = visible_span(diagnostic.range, source.len());
        let mut snippet = Snippet::source(source)
            .line_start(1)
            .annotation(AnnotationKind::Primary.span(span.clone()).label(&diagnostic.message));
        if let Some(path) = self.path {
            snippet = snippet.path(path);
        }
        snippet = diagnostic.related.iter().fold(snippet, |snippet, related| {
            snippet.annotation(
                AnnotationKind::Context
                    .span(visible_span(related.range, source.len()))
                    .label(&related.message),
            )
        });

        let level = match diagnostic.severity() {
            Severity::Error => Level::ERROR,
            Severity::Warning => Level::WARNING,
        };
        let mut report = vec![level.primary_title(&diagnostic.message).element(snippet)];

        if let Some(fix) = &diagnostic.fix {
            let patched = Snippet::source(source)
                .line_start(1)
                .patch(Patch::new(span, &fix.replacement));
            report.push(Level::HELP.secondary_title(&fix.description).element(patched));
        }
        report
    }
}

/// The byte span to underline. Zero-width spans cover the next byte when
/// there is one, and spans never reach past the end of the source.
fn visible_span(range: TextRange, len: usize) -> Range<usize> {
    let start = usize::from(range.start()).min(len);
    let end = usize::from(range.end()).min(len);
    if start < end {
        start..end
    } else {
        start..(start + 1).min(len)
    }
}
