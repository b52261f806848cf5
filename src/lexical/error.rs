use std::fmt::Display;

use crate::base::{
    log::{Message, Severity, SourceCodeDisplay},
    source_file::Span,
};

use super::token::{Token, TokenizeError};

/// Represents an error that occurred during the lexical analysis of the source code.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    TokenizeError(#[from] TokenizeError),
    #[error(transparent)]
    CoverageViolation(#[from] CoverageViolation),
}

/// A numeric literal with a base modifier has an integer prefix other than `0`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub struct InvalidBasePrefix {
    /// Span of the integer prefix in front of the base modifier.
    pub span: Span,

    /// The base modifier letter that followed the prefix.
    pub modifier: char,
}

impl Display for InvalidBasePrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\n{}",
            Message::new(
                Severity::Error,
                format_args!(
                    "a numeric literal with base modifier '{}' must start with '0', found '{}'",
                    self.modifier,
                    self.span.str()
                ),
            ),
            SourceCodeDisplay::new(&self.span, Option::<i32>::None)
        )
    }
}

/// A numeric literal with a base modifier has no digits after the modifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub struct MissingBaseDigits {
    /// Span of the literal up to and including the base modifier.
    pub span: Span,

    /// The numeric base selected by the modifier.
    pub base: u32,
}

impl Display for MissingBaseDigits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\n{}",
            Message::new(
                Severity::Error,
                format_args!(
                    "expected at least one base-{} digit after the base modifier",
                    self.base
                ),
            ),
            SourceCodeDisplay::new(&self.span, Option::<i32>::None)
        )
    }
}

/// Positional detail of one token at a coverage boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBound {
    /// The kind of the token.
    pub kind: &'static str,

    /// The span of the token.
    pub span: Span,
}

impl TokenBound {
    /// Describe the given token for a coverage report.
    #[must_use]
    pub fn describing(token: &Token) -> Self {
        Self {
            kind: token.kind_name(),
            span: token.span().clone(),
        }
    }
}

impl Display for TokenBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let start = self.span.start();
        let end = self.span.end();
        write!(
            f,
            "{} token, start offset {} ({start}), end offset {} ({end})",
            self.kind, start.offset, end.offset
        )
    }
}

/// The emitted token sequence does not exactly partition the source content.
///
/// Raised only by the debug coverage verification pass; a missing `previous`
/// means the gap is at the content start, a missing `next` means it is at the
/// content end.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub struct CoverageViolation {
    /// The token before the faulty boundary.
    pub previous: Option<TokenBound>,

    /// The token after the faulty boundary.
    pub next: Option<TokenBound>,
}

impl Display for CoverageViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            Message::new(
                Severity::Error,
                "token stream does not fully cover the source content",
            )
        )?;

        match &self.previous {
            Some(previous) => write!(f, "\nprevious: {previous}")?,
            None => write!(f, "\nprevious: start of content")?,
        }
        match &self.next {
            Some(next) => write!(f, "\nnext: {next}"),
            None => write!(f, "\nnext: end of content"),
        }
    }
}
