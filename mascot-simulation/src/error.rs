use crate::mascot::MascotId;
use thiserror::Error;

/// Rejections surfaced to the UI collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("No mascot with id {0}")]
    UnknownMascot(MascotId),

    #[error("Cannot delete the last mascot")]
    LastMascot,

    #[error("Mascot {0} is not in action mode")]
    ActionModeDisabled(MascotId),

    #[error("Mascot {0} is disabled")]
    MascotDisabled(MascotId),
}
