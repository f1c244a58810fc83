use std::borrow::Cow;

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceSource {
    /// The text the table was created with.
    Original,
    /// The append-only buffer holding all inserted text.
    Edit,
}

/// The append-only buffer all inserted text is written to.
///
/// Bytes are never overwritten or reused, so a piece may keep referencing any
/// span of it for the lifetime of the table.
#[derive(Debug)]
pub(crate) struct EditBuffer {
    content: String,
    growth_factor: usize,
}

impl EditBuffer {
    /// Smallest capacity allocated by a growth.
    const MIN_CAPACITY: usize = 64;

    pub(crate) fn new(capacity: usize, growth_factor: usize) -> Self {
        Self { content: String::with_capacity(capacity), growth_factor }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.content.len()
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.content.capacity()
    }

    /// Append `text`, returning the byte range it now occupies.
    pub(crate) fn append(&mut self, text: &str) -> std::ops::Range<usize> {
        if self.len() + text.len() > self.capacity() {
            self.grow(text.len());
        }

        let start = self.len();
        self.content.push_str(text);
        start..self.len()
    }

    /// Reallocate to hold at least `additional` more bytes, multiplying the
    /// capacity by the growth factor.
    pub(crate) fn grow(&mut self, additional: usize) {
        let old = self.capacity();
        let needed = self.len() + additional;
        let new = old.saturating_mul(self.growth_factor).max(needed).max(Self::MIN_CAPACITY);

        self.content.reserve_exact(new - self.len());
        debug!(old, new = self.capacity(), "grew edit buffer");
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.content
    }
}

#[derive(Debug)]
pub(crate) struct Buffers<'b> {
    /// Borrowed from the caller or owned by the table.
    pub(crate) original: Cow<'b, str>,
    pub(crate) edit: EditBuffer,
}

impl<'b> Buffers<'b> {
    pub(crate) fn new(original: Cow<'b, str>, edit: EditBuffer) -> Self {
        Self { original, edit }
    }
}

impl std::ops::Index<PieceSource> for Buffers<'_> {
    type Output = str;

    fn index(&self, index: PieceSource) -> &Self::Output {
        match index {
            PieceSource::Original => &self.original,
            PieceSource::Edit => self.edit.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_returns_written_span() {
        let mut buf = EditBuffer::new(0, 2);
        assert_eq!(buf.append("abc"), 0..3);
        assert_eq!(buf.append(""), 3..3);
        assert_eq!(buf.append("éf"), 3..6);
        assert_eq!(buf.as_str(), "abcéf");
    }

    #[test]
    fn capacity_grows_geometrically() {
        let mut buf = EditBuffer::new(0, 2);
        buf.append("a");
        let first = buf.capacity();
        assert!(first >= EditBuffer::MIN_CAPACITY);

        buf.append(&"b".repeat(first));
        assert!(buf.capacity() >= first * 2);
        assert!(buf.len() <= buf.capacity());
    }

    #[test]
    fn growth_covers_large_appends() {
        let mut buf = EditBuffer::new(4, 2);
        let text = "x".repeat(1000);
        buf.append(&text);
        assert!(buf.capacity() >= 1000);
        assert_eq!(buf.as_str(), text);
    }

    #[test]
    fn index_by_source() {
        let mut edit = EditBuffer::new(0, 2);
        edit.append("added");
        let buffers = Buffers::new(Cow::Borrowed("original"), edit);
        assert_eq!(&buffers[PieceSource::Original], "original");
        assert_eq!(&buffers[PieceSource::Edit], "added");
    }
}
