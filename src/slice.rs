use crate::{PieceTable, TextRange};

/// A borrowed view of a range of chars of a [`PieceTable`].
///
/// Created by [`PieceTable::slice`], which checks the bounds.
#[derive(Debug, Clone, Copy)]
pub struct Slice<'a> {
    range: TextRange,
    table: &'a PieceTable<'a>,
}

impl<'a> Slice<'a> {
    pub(crate) const fn new(range: TextRange, table: &'a PieceTable<'a>) -> Self {
        Self { range, table }
    }

    pub const fn range(&self) -> TextRange {
        self.range
    }

    pub const fn len_chars(&self) -> usize {
        self.range.length
    }

    pub const fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Iterate over the `&str` chunks of the slice, one per piece, without
    /// allocating.
    ///
    /// # Examples
    ///
    /// ```
    /// # use text_storage::PieceTable;
    /// let mut pt = PieceTable::new("hithere");
    /// pt.insert(2, ", and hello, ").unwrap();
    /// let slice = pt.slice(1..9).unwrap();
    /// assert_eq!(slice.chunks().collect::<Vec<_>>(), ["i", ", and h"]);
    /// ```
    pub fn chunks(self) -> impl Iterator<Item = &'a str> {
        let Self { range, table } = self;
        let pieces = (!range.is_empty()).then(|| table.pieces.iter_from(range.location));

        pieces
            .into_iter()
            .flatten()
            .take_while(move |(key, _piece)| key.location < range.end())
            .map(move |(_key, piece)| table.resolve(piece, range))
    }
}

impl std::fmt::Display for Slice<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.chunks().try_for_each(|s| write!(f, "{s}"))
    }
}

#[cfg(test)]
mod tests {
    use crate::PieceTable;

    #[test]
    fn empty_slice_has_no_chunks() {
        let pt = PieceTable::new("abc");
        let slice = pt.slice(1..1).unwrap();
        assert!(slice.is_empty());
        assert_eq!(slice.chunks().count(), 0);
        assert_eq!(slice.to_string(), "");
    }

    #[test]
    fn spans_many_pieces() {
        let mut pt = PieceTable::new("0123456789");
        pt.insert(3, "abc").unwrap();
        pt.insert(8, "xy").unwrap();
        assert_eq!(pt.text(), "012abc34xy56789");

        let slice = pt.slice(2..12).unwrap();
        assert_eq!(slice.len_chars(), 10);
        assert_eq!(slice.to_string(), "2abc34xy56");
        assert_eq!(slice.chunks().count(), 5);
    }
}
