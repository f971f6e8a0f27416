use serde::Serialize;

/// Aggregate progress of a conductor pass.
///
/// `completed` never decreases during a pass; `total` may shrink when an
/// item that was not reached yet is removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchProgress {
    pub total: usize,
    pub completed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub running: bool,
}

impl BatchProgress {
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.completed)
    }
}
