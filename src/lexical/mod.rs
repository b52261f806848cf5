//! The lexical module is responsible for converting raw source text into a flat,
//! position-annotated stream of tokens that the parser can understand.

pub mod char_class;

pub mod token_stream;

pub mod token;

mod error;
pub use error::{CoverageViolation, Error, InvalidBasePrefix, MissingBaseDigits, TokenBound};
