//! Error types for the spray-programme core.
//!
//! Data-quality problems (bad frequencies, missing dates) are not errors here;
//! they degrade to defaults or skip the entry.  What *is* an error is a caller
//! asking for a transition the programme state does not allow.

use thiserror::Error;
use wasm_bindgen::JsValue;

use crate::programme_state::ProgrammeState;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgrammeError {
    #[error("cannot {action} programme {id}: entry is {state}")]
    InvalidTransition {
        id: u32,
        action: &'static str,
        state: ProgrammeState,
    },

    #[error("programme {id} needs a frequency, start date or end date to be scheduled")]
    MissingScheduleData { id: u32 },
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid date '{0}'")]
    InvalidDate(String),

    #[error("malformed programme payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ProgrammeError> for JsValue {
    fn from(err: ProgrammeError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

impl From<ModelError> for JsValue {
    fn from(err: ModelError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
