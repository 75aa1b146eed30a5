//! Error types and diagnostic reporting

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use thiserror::Error;
use super::Span;

/// Fatal front end error. The first one raised aborts the pipeline.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("scan error on line {line}: {message}")]
    Scan { message: String, line: usize, span: Span },

    #[error("parse error on line {line}: expected {expected}, found {found}")]
    Parse {
        expected: String,
        found: String,
        line: usize,
        span: Span,
    },

    #[error("semantic error: {message}")]
    Semantic { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    pub fn scan(message: impl Into<String>, line: usize, span: Span) -> Self {
        Self::Scan {
            message: message.into(),
            line,
            span,
        }
    }

    pub fn parse(
        expected: impl Into<String>,
        found: impl Into<String>,
        line: usize,
        span: Span,
    ) -> Self {
        Self::Parse {
            expected: expected.into(),
            found: found.into(),
            line,
            span,
        }
    }

    pub fn semantic(message: impl Into<String>) -> Self {
        Self::Semantic {
            message: message.into(),
        }
    }

    /// Source line the error was detected on, when the stage tracks one
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Scan { line, .. } | Self::Parse { line, .. } => Some(*line),
            Self::Semantic { .. } | Self::Io(_) => None,
        }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

/// Diagnostic reporter for pretty error output
pub struct DiagnosticReporter {
    files: SimpleFiles<String, String>,
    writer: StandardStream,
    config: term::Config,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self {
            files: SimpleFiles::new(),
            writer: StandardStream::stderr(ColorChoice::Auto),
            config: term::Config::default(),
        }
    }

    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> usize {
        self.files.add(name.into(), source.into())
    }

    pub fn report_error(&self, file_id: usize, error: &CompileError) {
        let diagnostic = match error {
            CompileError::Scan { message, span, .. } => Diagnostic::error()
                .with_message("Scan error")
                .with_labels(vec![
                    Label::primary(file_id, span.start..span.end).with_message(message)
                ]),

            CompileError::Parse { expected, found, span, .. } => Diagnostic::error()
                .with_message("Syntax error")
                .with_labels(vec![
                    Label::primary(file_id, span.start..span.end)
                        .with_message(format!("expected {expected}, found {found}"))
                ]),

            CompileError::Semantic { message } => Diagnostic::error()
                .with_message(format!("Semantic error: {message}")),

            CompileError::Io(err) => {
                Diagnostic::error().with_message(format!("IO error: {err}"))
            }
        };

        let _ = term::emit(&mut self.writer.lock(), &self.config, &self.files, &diagnostic);
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new()
    }
}
