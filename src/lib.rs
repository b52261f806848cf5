//! The `Kirigami` language.
//!
//! This crate is the lexical front end of the `Kirigami` compiler: it converts
//! raw source text into a flat, position-annotated sequence of tokens.

#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    clippy::missing_errors_doc
)]
#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::missing_panics_doc, clippy::missing_const_for_fn)]

pub mod base;
pub mod lexical;

use std::path::Path;

use base::{source_file::SourceFile, FileProvider, Handler, Result};
use lexical::token_stream::TokenStream;

/// Converts the source code at the given path to tokens.
///
/// # Errors
/// - If an error occurs while reading the file.
/// - If a lexical error occurs while tokenizing the source code.
pub fn tokenize(
    handler: &impl Handler<base::Error>,
    provider: &impl FileProvider,
    path: &Path,
) -> Result<TokenStream> {
    let source_file = SourceFile::load(path, path.display().to_string(), provider)?;

    TokenStream::tokenize(&source_file, handler)
}

/// Converts the given source code string to tokens.
///
/// # Errors
/// - If a lexical error occurs while tokenizing the source code.
pub fn tokenize_str(
    handler: &impl Handler<base::Error>,
    identifier: &str,
    source: &str,
) -> Result<TokenStream> {
    let source_file = SourceFile::from_string(identifier.to_string(), source);

    TokenStream::tokenize(&source_file, handler)
}

/// Converts the source code at the given path to tokens with the debug
/// diagnostics enabled.
///
/// On top of [`tokenize`], this verifies that the token sequence exactly
/// partitions the source content and prints the highlighted token stream to
/// stdout for inspection.
///
/// # Errors
/// - If an error occurs while reading the file.
/// - If a lexical error occurs while tokenizing the source code.
/// - If the token sequence does not fully cover the source content.
pub fn tokenize_debug(
    handler: &impl Handler<base::Error>,
    provider: &impl FileProvider,
    path: &Path,
) -> Result<TokenStream> {
    let source_file = SourceFile::load(path, path.display().to_string(), provider)?;

    let stream = TokenStream::tokenize(&source_file, handler)?;

    if let Err(violation) = stream.verify_coverage(&source_file) {
        let error = lexical::Error::from(violation);
        handler.receive(error.clone().into());
        return Err(error.into());
    }
    tracing::debug!(
        path = ?source_file.path_relative(),
        "token stream fully covers the source content"
    );

    println!("{}", stream.render_highlighted());

    Ok(stream)
}
