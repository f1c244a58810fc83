/// A half-open interval `[location, location + length)` of char indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextRange {
    pub location: usize,
    pub length: usize,
}

impl TextRange {
    pub const fn new(location: usize, length: usize) -> Self {
        Self { location, length }
    }

    /// An empty range at `location`, used for pure insertions.
    pub const fn empty(location: usize) -> Self {
        Self { location, length: 0 }
    }

    /// One past the last index covered by this range.
    #[inline]
    pub const fn end(&self) -> usize {
        self.location + self.length
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    #[inline]
    pub const fn contains(&self, position: usize) -> bool {
        self.location <= position && position < self.end()
    }

    /// Whether the two ranges share at least one index, or an empty range
    /// sits strictly inside the other one.
    #[inline]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.location < other.end() && other.location < self.end()
    }

    /// The same range moved so that it starts at `location`.
    pub const fn moved_to(&self, location: usize) -> Self {
        Self { location, length: self.length }
    }

    pub const fn to_std(self) -> std::ops::Range<usize> {
        self.location..self.end()
    }
}

impl From<std::ops::Range<usize>> for TextRange {
    fn from(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end.saturating_sub(range.start))
    }
}

impl From<TextRange> for std::ops::Range<usize> {
    fn from(range: TextRange) -> Self {
        range.to_std()
    }
}

impl std::fmt::Display for TextRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.location, self.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_is_partial_intersection() {
        let r = TextRange::new(0, 5);
        assert!(r.overlaps(&TextRange::new(2, 3)));
        assert!(r.overlaps(&TextRange::new(4, 10)));
        assert!(!r.overlaps(&TextRange::new(5, 1)));
        // An empty range on a boundary touches nothing.
        assert!(!r.overlaps(&TextRange::empty(5)));
        assert!(!r.overlaps(&TextRange::empty(0)));
        assert!(r.overlaps(&TextRange::empty(3)));
    }

    #[test]
    fn from_std_range() {
        assert_eq!(TextRange::from(3..7), TextRange::new(3, 4));
        assert_eq!(TextRange::from(7..3), TextRange::new(7, 0));
        assert_eq!(TextRange::new(3, 4).to_string(), "[3, 7)");
    }
}
