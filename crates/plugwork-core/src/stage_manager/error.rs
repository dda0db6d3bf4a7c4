//! # Plugwork Core Stage Manager Errors
//!
//! Defines [`StageSystemError`], raised when a lifecycle stage is requested
//! twice or named incorrectly.
use thiserror::Error;

use crate::stage_manager::Stage;

#[derive(Debug, Error)]
pub enum StageSystemError {
    #[error("API.{stage}() already called")]
    StageAlreadyDone { stage: Stage },

    #[error("Unknown lifecycle stage '{name}'")]
    UnknownStage { name: String },
}
