use std::collections::HashSet;

use crate::stage_manager::Stage;
use crate::stage_manager::error::StageSystemError;

/// Done-set of lifecycle stages for one API object
#[derive(Debug, Default, Clone)]
pub struct StageTracker {
    done: HashSet<Stage>,
}

impl StageTracker {
    /// Create a tracker with no completed stages
    pub fn new() -> Self {
        Self { done: HashSet::new() }
    }

    /// Mark `stage` as started.
    ///
    /// A stage is recorded before its body runs, so a stage that fails half
    /// way is still considered done and cannot be retried.
    pub fn begin(&mut self, stage: Stage) -> Result<(), StageSystemError> {
        if !self.done.insert(stage) {
            return Err(StageSystemError::StageAlreadyDone { stage });
        }
        log::debug!("Entering lifecycle stage: {}", stage);
        Ok(())
    }

    /// Check whether `stage` has been started
    pub fn is_done(&self, stage: Stage) -> bool {
        self.done.contains(&stage)
    }

    /// Completed stages in execution order
    pub fn completed(&self) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|stage| self.done.contains(stage))
            .collect()
    }
}
