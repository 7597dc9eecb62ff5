//! Per-array growth metrics.
//!
//! [`ArrayStats`] is updated on every growth attempt so callers can see
//! how often an array reallocates and how close it runs to its ceiling.

/// Growth counters collected over the lifetime of an array.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArrayStats {
    /// Number of successful reallocations.
    pub grow_events: u64,
    /// Number of growth attempts the allocation strategy refused.
    pub failed_grows: u64,
    /// Number of growth attempts rejected by the capacity ceiling.
    pub capacity_rejections: u64,
    /// Largest length observed.
    pub peak_len: usize,
}

impl ArrayStats {
    pub(crate) fn observe_len(&mut self, len: usize) {
        if len > self.peak_len {
            self.peak_len = len;
        }
    }
}
