//! Module for handling source files, scanning cursors and spans.

use std::{
    cmp::Ordering,
    fmt::{Debug, Display},
    path::{Path, PathBuf},
    sync::Arc,
};

use getset::{CopyGetters, Getters};

use super::{
    file_provider::FileProvider,
    log::{Message, Severity},
    Error,
};

/// Number of NUL sentinel bytes wrapped around the real content on each side.
///
/// Token parsing never looks around by more than two bytes relative to a byte
/// it has already verified, so two sentinels make the whole lookaround window
/// safe without bounds checks.
const SENTINEL_LEN: usize = 2;

/// Represents a source file that contains the source code of one compile unit.
///
/// The stored content is padded with [`SENTINEL_LEN`] NUL bytes on each side;
/// [`SourceFile::start`] and [`SourceFile::end`] give the bounds of the real
/// content inside the padded text.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Getters, CopyGetters)]
pub struct SourceFile {
    /// Get the path of the source file.
    #[get = "pub"]
    path: PathBuf,
    /// Get the identifier of the source file used in diagnostics.
    #[get = "pub"]
    identifier: String,
    content: String,
    /// Get the byte offset where the real content starts in the padded text.
    #[get_copy = "pub"]
    start: usize,
    /// Get the byte offset where the real content ends in the padded text (exclusive).
    #[get_copy = "pub"]
    end: usize,
}

#[allow(clippy::missing_fields_in_debug)]
impl Debug for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFile")
            .field("path", &self.path)
            .field("identifier", &self.identifier)
            .field("start", &self.start)
            .field("end", &self.end)
            .finish()
    }
}

impl SourceFile {
    fn new(path: PathBuf, identifier: String, source: &str) -> Arc<Self> {
        let sentinels = "\0".repeat(SENTINEL_LEN);
        let content = format!("{sentinels}{source}{sentinels}");
        let end = content.len() - SENTINEL_LEN;

        Arc::new(Self {
            path,
            identifier,
            content,
            start: SENTINEL_LEN,
            end,
        })
    }

    /// Create a source file directly from a string.
    #[must_use]
    pub fn from_string(identifier: String, source: &str) -> Arc<Self> {
        Self::new(PathBuf::from(&identifier), identifier.clone(), source)
    }

    /// Load the source file from the given file path.
    ///
    /// # Errors
    /// - [`Error::IoError`]: Error occurred when reading the file contents.
    pub fn load(
        path: &Path,
        identifier: String,
        provider: &impl FileProvider,
    ) -> Result<Arc<Self>, Error> {
        let source = provider.read_str(path)?;
        Ok(Self::new(path.to_path_buf(), identifier, &source))
    }

    /// Get the real (sentinel-excluded) source content.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.content[self.start..self.end]
    }

    /// Get a [`SourceCursor`] positioned at the first real content byte.
    #[must_use]
    pub fn cursor(self: &Arc<Self>) -> SourceCursor {
        SourceCursor {
            source_file: self.clone(),
            position: Position {
                offset: self.start,
                line: 1,
                column: 1,
            },
        }
    }

    /// Get the relative path of the source file from the current working directory.
    #[must_use]
    pub fn path_relative(&self) -> Option<PathBuf> {
        pathdiff::diff_paths(&self.path, std::env::current_dir().ok()?)
    }
}

/// A location in the padded source text.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    /// Byte offset into the padded source text.
    pub offset: usize,

    /// Line number (starts at 1).
    pub line: usize,

    /// Column number (starts at 1).
    pub column: usize,
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The scanning cursor over a source file.
///
/// The cursor is exclusively owned by the tokenizer for the lifetime of one
/// scan. Only [`SourceCursor::advance`] and [`SourceCursor::seek`] mutate the
/// position.
#[derive(Debug, Clone, Getters, CopyGetters)]
pub struct SourceCursor {
    /// Get the source file the cursor is scanning.
    #[get = "pub"]
    source_file: Arc<SourceFile>,
    /// Get the current position of the cursor.
    #[get_copy = "pub"]
    position: Position,
}

impl SourceCursor {
    /// Get the byte at the cursor plus the given offset.
    ///
    /// Negative offsets look back, positive offsets look ahead. Reads within
    /// the sentinel window and beyond the underlying storage yield `0`.
    #[must_use]
    pub fn peek(&self, offset: isize) -> u8 {
        let index = self.position.offset as isize + offset;
        usize::try_from(index)
            .ok()
            .and_then(|index| self.source_file.content.as_bytes().get(index))
            .copied()
            .unwrap_or(0)
    }

    /// Fail if fewer than `amount` bytes remain before the real content end.
    ///
    /// # Errors
    /// - [`UnexpectedEndOfInput`] if the remaining content is too short.
    pub fn ensure_available(&self, amount: usize) -> Result<(), UnexpectedEndOfInput> {
        if self.position.offset + amount > self.source_file.end {
            return Err(UnexpectedEndOfInput {
                identifier: self.source_file.identifier.clone(),
                position: self.position,
            });
        }
        Ok(())
    }

    /// Move the cursor forward by `amount` bytes, one byte at a time.
    ///
    /// Crossing a line feed increments the line and resets the column to 1;
    /// any other byte increments the column. Availability is not checked.
    pub fn advance(&mut self, amount: usize) {
        for _ in 0..amount {
            if self.peek(0) == b'\n' {
                self.position.line += 1;
                self.position.column = 1;
            } else {
                self.position.column += 1;
            }
            self.position.offset += 1;
        }
    }

    /// Ensure `amount` bytes are available, then advance over them.
    ///
    /// # Errors
    /// - [`UnexpectedEndOfInput`] if the remaining content is too short.
    pub fn consume(&mut self, amount: usize) -> Result<(), UnexpectedEndOfInput> {
        self.ensure_available(amount)?;
        self.advance(amount);
        Ok(())
    }

    /// Reposition the cursor absolutely.
    ///
    /// Restores offset, line and column in one step. Used only to retract an
    /// already emitted `.` symbol when it turns out to start a fractional
    /// numeric literal.
    pub fn seek(&mut self, position: Position) {
        self.position = position;
    }

    /// Whether the cursor has reached the real content end.
    #[must_use]
    pub fn at_end(&self) -> bool {
        self.position.offset >= self.source_file.end
    }
}

/// A lookahead or consume operation required more bytes than remain before
/// the real content end.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
pub struct UnexpectedEndOfInput {
    /// Identifier of the source file.
    pub identifier: String,

    /// Position of the cursor when the end was hit.
    pub position: Position,
}

impl Display for UnexpectedEndOfInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            Message::new(
                Severity::Error,
                format_args!(
                    "{}:{} unexpected end of input",
                    self.identifier, self.position
                ),
            )
        )
    }
}

/// Represents a range of bytes in a source file.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, CopyGetters, Getters)]
pub struct Span {
    /// Get the start position of the span.
    #[get_copy = "pub"]
    start: Position,

    /// Get the end position of the span (exclusive).
    #[get_copy = "pub"]
    end: Position,

    /// Get the source file that the span is located in.
    #[get = "pub"]
    source_file: Arc<SourceFile>,
}

#[allow(clippy::missing_fields_in_debug)]
impl Debug for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Span")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("content", &self.str())
            .finish()
    }
}

impl PartialEq for Span {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.source_file, &other.source_file)
            && self.start == other.start
            && self.end == other.end
    }
}

impl Eq for Span {}

#[allow(clippy::non_canonical_partial_ord_impl)]
impl PartialOrd for Span {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let self_ptr_value = Arc::as_ptr(&self.source_file) as usize;
        let other_ptr_value = Arc::as_ptr(&other.source_file) as usize;

        Some(self_ptr_value.cmp(&other_ptr_value).then_with(|| {
            self.start
                .cmp(&other.start)
                .then_with(|| self.end.cmp(&other.end))
        }))
    }
}

impl Ord for Span {
    fn cmp(&self, other: &Self) -> Ordering {
        let self_ptr_value = Arc::as_ptr(&self.source_file) as usize;
        let other_ptr_value = Arc::as_ptr(&other.source_file) as usize;

        self_ptr_value
            .cmp(&other_ptr_value)
            .then_with(|| self.start.cmp(&other.start))
            .then_with(|| self.end.cmp(&other.end))
    }
}

impl std::hash::Hash for Span {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.start.hash(state);
        self.end.hash(state);
        Arc::as_ptr(&self.source_file).hash(state);
    }
}

impl Span {
    /// Create a span from the given start and end positions in the source file.
    ///
    /// # Panics
    /// If the positions are out of order or outside the padded content.
    #[must_use]
    pub fn new(source_file: Arc<SourceFile>, start: Position, end: Position) -> Self {
        assert!(
            start.offset <= end.offset && end.offset <= source_file.content.len(),
            "invalid span bounds {}..{}",
            start.offset,
            end.offset
        );

        Self {
            start,
            end,
            source_file,
        }
    }

    /// Get the lexeme slice of the source text that the span covers.
    #[must_use]
    pub fn str(&self) -> &str {
        &self.source_file.content[self.start.offset..self.end.offset]
    }

    /// Get the length of the span in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    /// Whether the span covers no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Represents an element that is located within a source file.
pub trait SourceElement {
    /// Get the span location of the element.
    fn span(&self) -> Span;
}

impl<T: SourceElement> SourceElement for Box<T> {
    fn span(&self) -> Span {
        self.as_ref().span()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_tracks_lines_and_columns() {
        let file = SourceFile::from_string("test".to_string(), "ab\ncd");
        let mut cursor = file.cursor();

        assert_eq!(cursor.position().line, 1);
        assert_eq!(cursor.position().column, 1);

        cursor.advance(3);
        assert_eq!(cursor.position().line, 2);
        assert_eq!(cursor.position().column, 1);
        assert_eq!(cursor.peek(0), b'c');

        cursor.advance(2);
        assert!(cursor.at_end());
    }

    #[test]
    fn peek_is_safe_beyond_the_content() {
        let file = SourceFile::from_string("test".to_string(), "x");
        let cursor = file.cursor();

        assert_eq!(cursor.peek(-1), 0);
        assert_eq!(cursor.peek(-2), 0);
        assert_eq!(cursor.peek(0), b'x');
        assert_eq!(cursor.peek(1), 0);
        assert_eq!(cursor.peek(100), 0);
        assert_eq!(cursor.peek(-100), 0);
    }

    #[test]
    fn ensure_available_fails_past_the_end() {
        let file = SourceFile::from_string("test".to_string(), "ab");
        let mut cursor = file.cursor();

        assert!(cursor.ensure_available(2).is_ok());
        assert!(cursor.ensure_available(3).is_err());

        cursor.advance(2);
        assert!(cursor.consume(1).is_err());
    }

    #[test]
    fn seek_restores_the_full_position() {
        let file = SourceFile::from_string("test".to_string(), "a\nb");
        let mut cursor = file.cursor();
        let saved = cursor.position();

        cursor.advance(3);
        cursor.seek(saved);

        assert_eq!(cursor.position(), saved);
        assert_eq!(cursor.peek(0), b'a');
    }
}
