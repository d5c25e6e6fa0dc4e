/// Parser limits and tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum reductions between two consumed tokens (default: 10,000).
    pub(crate) reduction_fuel: u32,
    /// Segments a tree may accumulate across incremental parses before it
    /// is compacted into one (default: 8).
    pub(crate) compaction_threshold: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            reduction_fuel: 10_000,
            compaction_threshold: 8,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reduction budget per token. When it runs out the token is
    /// skipped as an error.
    pub fn reduction_fuel(mut self, fuel: u32) -> Self {
        self.reduction_fuel = fuel.max(1);
        self
    }

    /// Set the segment count that triggers compaction.
    pub fn compaction_threshold(mut self, segments: usize) -> Self {
        self.compaction_threshold = segments.max(1);
        self
    }

    pub fn get_reduction_fuel(&self) -> u32 {
        self.reduction_fuel
    }
    pub fn get_compaction_threshold(&self) -> usize {
        self.compaction_threshold
    }
}
