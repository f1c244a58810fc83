/// Tunables of a [`PieceTable`](crate::PieceTable).
///
/// None of these change what the table returns, only how fast it does so.
///
/// # Examples
///
/// ```
/// # use text_storage::{Config, PieceTable};
/// let config = Config::default().with_cache_capacity(0).with_growth_factor(3);
/// let mut pt = PieceTable::with_config("abc", config);
/// pt.insert(3, "def").unwrap();
/// assert_eq!(pt.text(), "abcdef");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// How many recently resolved tree nodes are remembered. `0` disables the
    /// cache.
    pub cache_capacity: usize,
    /// The factor the edit buffer capacity is multiplied by when it fills.
    pub growth_factor: usize,
    /// Bytes reserved for the edit buffer up front.
    pub initial_edit_capacity: usize,
}

impl Config {
    pub const DEFAULT_CACHE_CAPACITY: usize = 8;
    pub const DEFAULT_GROWTH_FACTOR: usize = 2;

    #[must_use]
    pub const fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Factors below 2 would not amortize appends, so they are raised to 2.
    #[must_use]
    pub const fn with_growth_factor(mut self, factor: usize) -> Self {
        self.growth_factor = if factor < 2 { 2 } else { factor };
        self
    }

    #[must_use]
    pub const fn with_initial_edit_capacity(mut self, capacity: usize) -> Self {
        self.initial_edit_capacity = capacity;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_capacity: Self::DEFAULT_CACHE_CAPACITY,
            growth_factor: Self::DEFAULT_GROWTH_FACTOR,
            initial_edit_capacity: 0,
        }
    }
}
