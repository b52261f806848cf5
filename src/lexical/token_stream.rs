//! Contains the [`TokenStream`] struct and its related types.

use std::{fmt::Debug, sync::Arc};

use colored::Colorize;
use derive_more::Deref;
use itertools::Itertools;

use crate::base::{
    self,
    source_file::SourceFile,
    Handler,
};

use super::{
    error::{CoverageViolation, TokenBound},
    token::{Token, TokenizeError},
    Error,
};

/// Is the flat, position-annotated sequence of tokens lexed from one source file.
///
/// This struct is the final output of the lexical analysis phase and is meant
/// to be consumed by reference by the next stage of the compilation process.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, PartialEq, Deref)]
pub struct TokenStream {
    #[deref]
    tokens: Vec<Token>,
}

impl Debug for TokenStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.tokens.iter()).finish()
    }
}

impl TokenStream {
    /// Tokenizes the given source code.
    ///
    /// This function repeatedly calls [`Token::tokenize()`] until the cursor
    /// reaches the real content end. The token sequence built so far is the
    /// explicit lookback context consulted by the dot-prefixed fraction rule.
    ///
    /// # Errors
    /// Any lexical error is fatal to the compile unit: it is reported to the
    /// handler and propagated, and no tokens are returned.
    #[tracing::instrument(level = "debug", skip_all, fields(source_file = %source_file.identifier()))]
    pub fn tokenize(
        source_file: &Arc<SourceFile>,
        handler: &impl Handler<base::Error>,
    ) -> base::Result<Self> {
        let mut tokens = Vec::new();
        let mut cursor = source_file.cursor();

        loop {
            let before = cursor.position().offset;

            match Token::tokenize(&mut cursor, &mut tokens) {
                Ok(token) => {
                    // Every variant must consume at least one byte per
                    // invocation, otherwise the scan loop would never
                    // terminate.
                    assert!(
                        cursor.position().offset > before,
                        "token variant failed to advance the cursor"
                    );
                    tokens.push(token);
                }
                Err(TokenizeError::EndOfSourceCode) => break,
                Err(error) => {
                    tracing::error!("fatal lexical error encountered while tokenizing source code");
                    let error = Error::from(error);
                    handler.receive(error.clone().into());
                    return Err(error.into());
                }
            }
        }

        tracing::debug!(tokens = tokens.len(), "tokenized source file");

        Ok(Self { tokens })
    }

    /// Verifies that the token sequence exactly partitions the source content.
    ///
    /// Asserts that the first token starts at the real content start, that
    /// every adjacent pair of tokens meets without gap or overlap, and that
    /// the last token ends at the real content end.
    ///
    /// # Errors
    /// - [`CoverageViolation`] with the full positional detail of both tokens
    ///   at the faulty boundary. No repair is attempted.
    pub fn verify_coverage(
        &self,
        source_file: &Arc<SourceFile>,
    ) -> Result<(), CoverageViolation> {
        if let Some(first) = self.tokens.first() {
            if first.span().start().offset != source_file.start() {
                return Err(CoverageViolation {
                    previous: None,
                    next: Some(TokenBound::describing(first)),
                });
            }
        }

        for (previous, next) in self.tokens.iter().tuple_windows() {
            if previous.span().end().offset != next.span().start().offset {
                return Err(CoverageViolation {
                    previous: Some(TokenBound::describing(previous)),
                    next: Some(TokenBound::describing(next)),
                });
            }
        }

        if let Some(last) = self.tokens.last() {
            if last.span().end().offset != source_file.end() {
                return Err(CoverageViolation {
                    previous: Some(TokenBound::describing(last)),
                    next: None,
                });
            }
        }

        Ok(())
    }

    /// Renders the token stream with one visual category per token kind for
    /// human inspection.
    ///
    /// Symbols are magenta, numeric literals blue, string literals cyan and
    /// keywords yellow; everything else is left unstyled. The concatenated
    /// plain text equals the source content.
    #[must_use]
    pub fn render_highlighted(&self) -> String {
        self.tokens
            .iter()
            .map(|token| {
                let lexeme = token.span().str();
                match token {
                    Token::Symbol(_) => lexeme.magenta().to_string(),
                    Token::Numeric(_) => lexeme.blue().to_string(),
                    Token::StringLiteral(_) => lexeme.cyan().to_string(),
                    Token::Word(word) if word.keyword.is_some() => {
                        lexeme.yellow().to_string()
                    }
                    _ => lexeme.to_string(),
                }
            })
            .collect()
    }

    /// Dissolves this struct into its token sequence.
    #[must_use]
    pub fn dissolve(self) -> Vec<Token> {
        self.tokens
    }
}
