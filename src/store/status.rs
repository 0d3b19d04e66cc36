//! Per-chain load status.

/// Lifecycle of one fetch chain, published alongside its data read model.
///
/// A failed fetch leaves the previously published data in place; `Failed`
/// is how observers tell stale-after-failure apart from fresh data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    /// No fetch has been requested yet.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The most recent fetch committed its result.
    Ready,
    /// The most recent fetch failed; prior data is still what's published.
    Failed { message: String },
}

impl LoadStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}
