use crate::{PieceSource, TextRange, str_utils};

/// One contiguous run of the document and where its text lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    /// Which buffer this piece references.
    pub source: PieceSource,
    /// The chars of the document this piece currently covers.
    pub document_range: TextRange,
    /// Start byte offset in the source buffer.
    pub start: usize,
    /// End byte offset (exclusive) in the source buffer.
    pub end: usize,
}

impl Piece {
    pub(crate) fn byte_range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }

    #[inline]
    pub(crate) fn len_bytes(&self) -> usize {
        self.end - self.start
    }

    /// The same text, placed at `location` in the document.
    pub(crate) fn moved_to(self, location: usize) -> Self {
        Self { document_range: self.document_range.moved_to(location), ..self }
    }

    /// The part of this piece before document index `at`. `text` is the
    /// piece's own text.
    pub(crate) fn prefix(self, text: &str, at: usize) -> Self {
        let chars = at - self.document_range.location;
        let bytes = str_utils::char_to_byte(text, chars);
        Self {
            document_range: TextRange::new(self.document_range.location, chars),
            end: self.start + bytes,
            ..self
        }
    }

    /// The part of this piece from document index `at` on. `text` is the
    /// piece's own text.
    pub(crate) fn suffix(self, text: &str, at: usize) -> Self {
        let chars = at - self.document_range.location;
        let bytes = str_utils::char_to_byte(text, chars);
        Self {
            document_range: TextRange::new(at, self.document_range.length - chars),
            start: self.start + bytes,
            ..self
        }
    }
}
