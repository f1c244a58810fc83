//! A char oriented, text editing optimized [Piece Table], indexed by a
//! red-black tree of document ranges.
//!
//! The document is a sequence of pieces, each referencing a span of either
//! the original text or a single append-only edit buffer. A [`RangeTree`]
//! maps every char index of the document to the piece covering it, so reads
//! and edits at arbitrary offsets resolve in logarithmic time.
//!
//! [Piece Table]: https://en.wikipedia.org/wiki/Piece_table

mod buffer;
mod config;
mod error;
mod piece;
mod range;
pub mod rbtree;
mod slice;
mod str_utils;

use std::borrow::Cow;

use tracing::{error, trace};

use buffer::{Buffers, EditBuffer};
pub use buffer::PieceSource;
pub use config::Config;
pub use error::{Error, Result};
pub use piece::Piece;
pub use range::TextRange;
pub use rbtree::RangeTree;
pub use slice::Slice;

#[derive(Debug)]
pub struct PieceTable<'b> {
    buffers: Buffers<'b>,
    /// Maps the document range of every piece to the piece. The ranges tile
    /// `[0, len_chars)` without gaps.
    pieces: RangeTree<Piece>,

    len_bytes: usize,
    len_chars: usize,
}

impl<'b> PieceTable<'b> {
    /// Create a new [`PieceTable`] with the initial contents set to `initial`.
    ///
    /// The text may be borrowed or owned.
    ///
    /// # Examples
    ///
    /// ```
    /// # use text_storage::PieceTable;
    /// let pt = PieceTable::new("initial");
    /// assert_eq!(pt.text(), "initial");
    ///
    /// let owned = PieceTable::new(String::from("owned"));
    /// assert_eq!(owned.len_chars(), 5);
    /// ```
    pub fn new(initial: impl Into<Cow<'b, str>>) -> Self {
        Self::with_config(initial, Config::default())
    }

    pub fn with_config(initial: impl Into<Cow<'b, str>>, config: Config) -> Self {
        let original = initial.into();
        let len_bytes = original.len();
        let len_chars = str_utils::count_chars(&original);

        let mut pieces = RangeTree::with_cache_capacity(config.cache_capacity);
        if len_chars > 0 {
            let piece = Piece {
                source: PieceSource::Original,
                document_range: TextRange::new(0, len_chars),
                start: 0,
                end: len_bytes,
            };
            if pieces.insert(piece.document_range, piece).is_err() {
                unreachable!("an empty tree has nothing to overlap");
            }
        }

        let edit = EditBuffer::new(config.initial_edit_capacity, config.growth_factor);

        Self { buffers: Buffers::new(original, edit), pieces, len_bytes, len_chars }
    }

    /// Total number of chars in the piece table.
    ///
    /// Runs in `O(1)`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use text_storage::PieceTable;
    /// let pt = PieceTable::new("123456");
    /// assert_eq!(pt.len_chars(), 6);
    /// ```
    #[inline(always)]
    pub fn len_chars(&self) -> usize {
        self.len_chars
    }

    /// Total number of bytes in the piece table.
    ///
    /// Runs in `O(1)`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use text_storage::PieceTable;
    /// let pt = PieceTable::new("1234⑤");
    /// assert_eq!(pt.len_bytes(), 7); // the 5 takes 3 bytes
    /// ```
    #[inline(always)]
    pub fn len_bytes(&self) -> usize {
        self.len_bytes
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len_chars == 0
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    /// The pieces of the document, in order.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter().map(|(_range, piece)| piece)
    }

    /// The tree indexing the pieces by document range.
    pub fn index(&self) -> &RangeTree<Piece> {
        &self.pieces
    }

    /// Bytes written to the edit buffer so far, including text that is no
    /// longer part of the document.
    pub fn edit_buffer_len(&self) -> usize {
        self.buffers.edit.len()
    }

    pub fn edit_buffer_capacity(&self) -> usize {
        self.buffers.edit.capacity()
    }

    /// The char at `index`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if `index >= self.len_chars()`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use text_storage::{PieceTable, Error};
    /// let mut pt = PieceTable::new("héllo");
    /// pt.insert(0, "¡").unwrap();
    /// assert_eq!(pt.char_at(0), Ok('¡'));
    /// assert_eq!(pt.char_at(2), Ok('é'));
    /// assert!(matches!(pt.char_at(6), Err(Error::OutOfBounds { .. })));
    /// ```
    pub fn char_at(&self, index: usize) -> Result<char> {
        self.check_range(TextRange::new(index, 1))?;

        let piece = self.pieces.get(index).ok_or_else(|| piece_not_found(index))?;
        let text = self.resolve(piece, TextRange::new(index, 1));
        text.chars().next().ok_or_else(|| piece_not_found(index))
    }

    /// Collect the chars in `range` into a new string.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if `range` does not fit in the document, and
    /// [`Error::PieceNotFound`] if the piece index has a hole.
    ///
    /// # Examples
    ///
    /// ```
    /// # use text_storage::{PieceTable, TextRange};
    /// let mut pt = PieceTable::new("hello world");
    /// pt.replace(6..11, "there").unwrap();
    /// assert_eq!(pt.substring(TextRange::new(4, 4)).unwrap(), "o th");
    /// assert!(pt.substring(8..12).is_err());
    /// ```
    pub fn substring(&self, range: impl Into<TextRange>) -> Result<String> {
        let range = range.into();
        self.check_range(range)?;

        let mut text = String::with_capacity(range.length);
        let mut cursor = range.location;

        if !range.is_empty() {
            for (key, piece) in self.pieces.iter_from(range.location) {
                if cursor >= range.end() {
                    break;
                }
                if !key.contains(cursor) {
                    return Err(piece_not_found(cursor));
                }
                text.push_str(self.resolve(piece, range));
                cursor = key.end();
            }
        }

        if cursor < range.end() {
            return Err(piece_not_found(cursor));
        }
        Ok(text)
    }

    /// A borrowed view of `range`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if `range` does not fit in the document.
    pub fn slice(&self, range: impl Into<TextRange>) -> Result<Slice<'_>> {
        let range = range.into();
        self.check_range(range)?;
        Ok(Slice::new(range, self))
    }

    /// Collect the text from the piece table.
    ///
    /// This function allocates a new string. You can use
    /// [`PieceTable::chunks`] to iterate over `&str` chunks without
    /// allocations.
    ///
    /// # Examples
    ///
    /// ```
    /// # use text_storage::PieceTable;
    /// let mut pt = PieceTable::new("content");
    /// pt.insert(0, "abcd, ").unwrap();
    /// assert_eq!(pt.text(), "abcd, content");
    /// ```
    pub fn text(&self) -> String {
        let mut text = String::with_capacity(self.len_bytes);
        self.chunks().for_each(|chunk| text.push_str(chunk));

        debug_assert_eq!(text.len(), self.len_bytes);
        debug_assert_eq!(str_utils::count_chars(&text), self.len_chars);

        text
    }

    /// Returns an iterator over all the `&str` chunks in the table.
    ///
    /// # Examples
    ///
    /// ```
    /// # use text_storage::PieceTable;
    /// let mut pt = PieceTable::new("hithere");
    /// pt.insert(2, ", and hello, ").unwrap();
    /// assert_eq!(pt.chunks().collect::<String>(), "hi, and hello, there");
    /// ```
    pub fn chunks(&self) -> impl Iterator<Item = &str> {
        self.pieces.iter().map(move |(_range, piece)| &self.buffers[piece.source][piece.byte_range()])
    }

    /// Replace the chars in `range` with `text`.
    ///
    /// This is the single edit primitive: an empty `range` inserts, an empty
    /// `text` removes.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if `range` does not fit in the document; nothing
    /// is changed then. [`Error::PieceNotFound`] if the piece index turns out
    /// to be inconsistent.
    ///
    /// # Examples
    ///
    /// ```
    /// # use text_storage::PieceTable;
    /// let mut pt = PieceTable::new("hello world");
    /// pt.replace(5..6, "").unwrap();
    /// assert_eq!(pt.text(), "helloworld");
    /// pt.replace(0..5, "goodbye, ").unwrap();
    /// assert_eq!(pt.text(), "goodbye, world");
    /// ```
    pub fn replace(&mut self, range: impl Into<TextRange>, text: &str) -> Result<()> {
        let range = range.into();
        self.check_range(range)?;
        if range.is_empty() && text.is_empty() {
            return Ok(());
        }

        let len_chars = str_utils::count_chars(text);
        let (start, end) = (range.location, range.end());
        let new_end = start + len_chars;
        // Pieces after the edit only move if the length changes.
        let shifts = len_chars != range.length;

        let mut affected = Vec::new();
        if start < self.len_chars {
            for (key, piece) in self.pieces.iter_from(start) {
                if !shifts && key.location >= end {
                    break;
                }
                debug_assert_eq!(key, piece.document_range);
                affected.push(*piece);
            }
            if affected.is_empty() {
                return Err(piece_not_found(start));
            }
        }

        trace!(%range, inserted = len_chars, affected = affected.len(), "replace");

        let appended = (!text.is_empty()).then(|| self.buffers.edit.append(text));

        let mut placed = Vec::with_capacity(affected.len() + 2);
        let mut removed_bytes = 0;
        for piece in affected {
            let key = piece.document_range;
            if self.pieces.remove(key).is_none() {
                return Err(piece_not_found(key.location));
            }

            if key.location >= end {
                placed.push(piece.moved_to(key.location - end + new_end));
                continue;
            }

            // The piece overlaps the edit: keep whatever lies outside of it.
            removed_bytes += piece.len_bytes();
            let piece_text = &self.buffers[piece.source][piece.byte_range()];
            if key.location < start {
                let prefix = piece.prefix(piece_text, start);
                removed_bytes -= prefix.len_bytes();
                placed.push(prefix);
            }
            if key.end() > end {
                let suffix = piece.suffix(piece_text, end);
                removed_bytes -= suffix.len_bytes();
                placed.push(suffix.moved_to(new_end));
            }
        }

        if let Some(bytes) = appended {
            placed.push(Piece {
                source: PieceSource::Edit,
                document_range: TextRange::new(start, len_chars),
                start: bytes.start,
                end: bytes.end,
            });
        }

        for piece in placed {
            self.pieces.insert(piece.document_range, piece)?;
        }

        self.len_chars = self.len_chars - range.length + len_chars;
        self.len_bytes = self.len_bytes - removed_bytes + text.len();

        Ok(())
    }

    /// Insert `text` at char index `index`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if `index > self.len_chars()`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use text_storage::PieceTable;
    /// let mut pt = PieceTable::new("rld");
    /// pt.insert(0, "hellowo").unwrap();
    /// pt.insert(5, " ").unwrap();
    /// assert_eq!(pt.text(), "hello world");
    /// assert!(pt.insert(12, "!").is_err());
    /// ```
    pub fn insert(&mut self, index: usize, text: &str) -> Result<()> {
        self.replace(TextRange::empty(index), text)
    }

    /// Removes the text in the given char index range.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if the range does not fit in the document.
    ///
    /// # Examples
    ///
    /// ```
    /// # use text_storage::PieceTable;
    /// let mut pt = PieceTable::new("hello_there");
    /// pt.insert(5, "  ").unwrap();
    /// pt.insert(7, " ").unwrap();
    /// pt.remove(6..=8).unwrap();
    /// assert_eq!(pt.text(), "hello there");
    /// ```
    ///
    /// ```
    /// # use text_storage::PieceTable;
    /// let mut pt = PieceTable::new("012345");
    /// pt.remove(..).unwrap();
    /// assert_eq!(pt.text(), "");
    /// ```
    ///
    /// ```
    /// # use text_storage::PieceTable;
    /// let mut pt = PieceTable::new("012345");
    /// pt.remove(5..0).unwrap(); // an empty range
    /// assert_eq!(pt.text(), "012345"); // unchanged
    /// ```
    pub fn remove<R>(&mut self, range: R) -> Result<()>
    where
        R: std::ops::RangeBounds<usize>,
    {
        let (start, end) = self.simplify_range_bounds(range);
        self.replace(start..end, "")
    }

    fn simplify_range_bounds<R>(&self, range: R) -> (usize, usize)
    where
        R: std::ops::RangeBounds<usize>,
    {
        let start = match range.start_bound() {
            std::ops::Bound::Included(&i) => i,
            std::ops::Bound::Excluded(&i) => i.saturating_add(1),
            std::ops::Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            std::ops::Bound::Included(&i) => i.saturating_add(1),
            std::ops::Bound::Excluded(&i) => i,
            std::ops::Bound::Unbounded => self.len_chars,
        };
        (start, end)
    }

    fn check_range(&self, range: TextRange) -> Result<()> {
        let end = range.location.checked_add(range.length);
        if end.is_none_or(|end| end > self.len_chars) {
            return Err(Error::OutOfBounds { range, len: self.len_chars });
        }
        Ok(())
    }

    /// The text of `piece` that lies within `range`.
    pub(crate) fn resolve(&self, piece: &Piece, range: TextRange) -> &str {
        let text = &self.buffers[piece.source][piece.byte_range()];
        let doc = piece.document_range;
        if range.location <= doc.location && doc.end() <= range.end() {
            return text;
        }

        let from = range.location.max(doc.location) - doc.location;
        let to = range.end().min(doc.end()) - doc.location;
        &text[str_utils::char_range_to_bytes(text, from..to)]
    }
}

fn piece_not_found(position: usize) -> Error {
    error!(position, "no piece covers an in-bounds char index");
    Error::PieceNotFound(position)
}

impl std::fmt::Display for PieceTable<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.chunks().try_for_each(|p| write!(f, "{p}"))
    }
}
