//! Tick statistics.

/// Summary of one rebuild + cull pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Chunks remeshed this pass.
    pub rebuilt: u32,
    /// Chunks dropped because they meshed to nothing.
    pub evicted: u32,
    /// Chunks with geometry after the pass.
    pub active_chunks: u32,
    /// Chunks that passed the frustum test.
    pub visible_chunks: u32,
    /// Face groups published as visible.
    pub visible_faces: u32,
    /// Rebuild phase duration in microseconds.
    pub rebuild_us: u64,
    /// Cull phase duration in microseconds.
    pub cull_us: u64,
}

impl TickReport {
    /// Total duration of the pass in microseconds.
    #[must_use]
    pub const fn total_us(&self) -> u64 {
        self.rebuild_us + self.cull_us
    }

    /// Returns true if the pass stayed within `budget_us`.
    #[must_use]
    pub const fn within_budget(&self, budget_us: u64) -> bool {
        self.total_us() <= budget_us
    }
}
