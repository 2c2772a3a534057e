//! Messages from background tasks back to the UI loop

use crate::types::Job;

#[derive(Debug)]
pub enum AppEvent {
    JobAdded(Job),
    /// User-facing error text from a failed add
    IntakeFailed(String),
    ModelChecked(bool),
}
