use thiserror::Error;

use crate::TextRange;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A range was inserted into a [`RangeTree`](crate::RangeTree) that
    /// partially intersects a stored range.
    #[error("range {range} overlaps the stored range {existing}")]
    Overlap { range: TextRange, existing: TextRange },

    /// A read or an edit addressed text outside of `[0, len)`.
    #[error("range {range} is out of bounds for a document of {len} chars")]
    OutOfBounds { range: TextRange, len: usize },

    /// No piece covers a position that is inside the document. The piece
    /// index and the document length disagree, which is a bug.
    #[error("no piece covers char index {0}")]
    PieceNotFound(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
