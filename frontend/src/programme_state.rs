//! Active-in-programme vs. available lifecycle for spray products.
//!
//! State is never stored; it is derived from `status` plus whether the entry
//! carries any schedule data.  Transitions mutate the local copy of the entry
//! and hand back the [`ProgrammeCommand`] the caller must send to the backend
//! to persist it (see `command_executors`).

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::SPRAY_PROGRAMMES_PATH;
use crate::error::ProgrammeError;
use crate::models::{ApiSprayProgrammeUpdate, ProgrammeStatus, SprayProgrammeEntry};
use crate::scheduling::FrequencySpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgrammeState {
    /// Catalogued product, not scheduled.
    Available,
    /// Active and scheduled.
    InProgramme,
}

impl ProgrammeState {
    pub fn of(entry: &SprayProgrammeEntry) -> Self {
        if entry.status != ProgrammeStatus::Inactive && entry.has_schedule_data() {
            ProgrammeState::InProgramme
        } else {
            ProgrammeState::Available
        }
    }
}

impl fmt::Display for ProgrammeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgrammeState::Available => write!(f, "available"),
            ProgrammeState::InProgramme => write!(f, "in programme"),
        }
    }
}

/// Persistence request produced by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgrammeCommand {
    Update {
        id: u32,
        payload: ApiSprayProgrammeUpdate,
    },
    Deactivate {
        id: u32,
    },
    Delete {
        id: u32,
    },
}

impl ProgrammeCommand {
    pub fn id(&self) -> u32 {
        match self {
            ProgrammeCommand::Update { id, .. }
            | ProgrammeCommand::Deactivate { id }
            | ProgrammeCommand::Delete { id } => *id,
        }
    }

    /// HTTP method and `/api`-relative path the command is sent to.
    ///
    /// The backend's PUT only writes the schedule columns, never `status`;
    /// its DELETE marks the row inactive, stamps `end_date` and keeps the
    /// application history.  Deactivation therefore goes through DELETE, and
    /// so does deletion, which the backend has no separate route for.
    pub fn route(&self) -> (&'static str, String) {
        let path = format!("{}/{}", SPRAY_PROGRAMMES_PATH, self.id());
        match self {
            ProgrammeCommand::Update { .. } => ("PUT", path),
            ProgrammeCommand::Deactivate { .. } | ProgrammeCommand::Delete { .. } => ("DELETE", path),
        }
    }
}

/// Form values for "add to programme".  Every field is editable.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScheduleFields {
    pub application_rate: Option<String>,
    pub frequency: Option<FrequencySpec>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub target: Option<String>,
}

impl ScheduleFields {
    /// Pre-fill from whatever the entry already describes.
    pub fn prefill(entry: &SprayProgrammeEntry) -> Self {
        Self {
            application_rate: entry.application_rate.clone(),
            frequency: entry.frequency.clone(),
            start_date: entry.start_date,
            end_date: entry.end_date,
            target: entry.target.clone(),
        }
    }

    fn has_schedule_data(&self) -> bool {
        self.frequency.is_some() || self.start_date.is_some() || self.end_date.is_some()
    }
}

/// Partial edit of an in-programme entry.  `None` leaves a field as is;
/// `Some(None)` clears it.  In JSON a missing key leaves the field and an
/// explicit `null` clears it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProgrammeUpdate {
    #[serde(default, deserialize_with = "present")]
    pub application_rate: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub frequency: Option<Option<FrequencySpec>>,
    #[serde(default, deserialize_with = "present")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "present")]
    pub end_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "present")]
    pub target: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub notes: Option<Option<String>>,
}

fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ProgrammeUpdate {
    fn apply(self, entry: &mut SprayProgrammeEntry) {
        if let Some(v) = self.application_rate {
            entry.application_rate = v;
        }
        if let Some(v) = self.frequency {
            entry.frequency = v;
        }
        if let Some(v) = self.start_date {
            entry.start_date = v;
        }
        if let Some(v) = self.end_date {
            entry.end_date = v;
        }
        if let Some(v) = self.target {
            entry.target = v;
        }
        if let Some(v) = self.notes {
            entry.notes = v;
        }
    }
}

/// Schedule a product, from either state.  Re-adding an active entry just
/// updates it.
pub fn add_to_programme(
    entry: &mut SprayProgrammeEntry,
    fields: ScheduleFields,
) -> Result<ProgrammeCommand, ProgrammeError> {
    if !fields.has_schedule_data() {
        tracing::warn!(programme_id = entry.id, "add to programme without schedule data");
        return Err(ProgrammeError::MissingScheduleData { id: entry.id });
    }

    entry.application_rate = fields.application_rate;
    entry.frequency = fields.frequency;
    entry.start_date = fields.start_date;
    entry.end_date = fields.end_date;
    entry.target = fields.target;
    if entry.status == ProgrammeStatus::Inactive {
        // PUT cannot flip `status` back; the row reloads as inactive.
        tracing::warn!(programme_id = entry.id, "reactivation is not persisted by the backend");
    }
    entry.status = ProgrammeStatus::Active;

    tracing::debug!(programme_id = entry.id, product = %entry.product_name, "added to programme");
    Ok(ProgrammeCommand::Update {
        id: entry.id,
        payload: ApiSprayProgrammeUpdate::from(&*entry),
    })
}

/// Edit the schedule of an entry that is already in the programme.  The
/// entry is left untouched when the edit is rejected.
pub fn edit_programme(
    entry: &mut SprayProgrammeEntry,
    update: ProgrammeUpdate,
) -> Result<ProgrammeCommand, ProgrammeError> {
    require_in_programme(entry, "edit")?;

    let mut edited = entry.clone();
    update.apply(&mut edited);
    if !edited.has_schedule_data() {
        return Err(ProgrammeError::MissingScheduleData { id: entry.id });
    }
    *entry = edited;

    Ok(ProgrammeCommand::Update {
        id: entry.id,
        payload: ApiSprayProgrammeUpdate::from(&*entry),
    })
}

/// Take an entry out of the programme.  Recorded applications are kept.
pub fn remove_from_programme(
    entry: &mut SprayProgrammeEntry,
) -> Result<ProgrammeCommand, ProgrammeError> {
    require_in_programme(entry, "remove")?;
    entry.status = ProgrammeStatus::Inactive;
    tracing::debug!(programme_id = entry.id, "removed from programme");
    Ok(ProgrammeCommand::Deactivate { id: entry.id })
}

/// Permanently delete an entry, from either state.
pub fn delete_programme(entry: &SprayProgrammeEntry) -> ProgrammeCommand {
    ProgrammeCommand::Delete { id: entry.id }
}

fn require_in_programme(
    entry: &SprayProgrammeEntry,
    action: &'static str,
) -> Result<(), ProgrammeError> {
    let state = ProgrammeState::of(entry);
    if state == ProgrammeState::InProgramme {
        return Ok(());
    }
    tracing::warn!(programme_id = entry.id, action, %state, "rejected programme transition");
    Err(ProgrammeError::InvalidTransition {
        id: entry.id,
        action,
        state,
    })
}

// ---------------------------------------------------------------------------
// Display partition
// ---------------------------------------------------------------------------

/// "Active Spray Programmes" and "Available Products" sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProgrammePartition<'a> {
    pub active: Vec<&'a SprayProgrammeEntry>,
    pub available: Vec<&'a SprayProgrammeEntry>,
}

pub fn partition(entries: &[SprayProgrammeEntry]) -> ProgrammePartition<'_> {
    let (active, available) = entries
        .iter()
        .partition(|e| ProgrammeState::of(e) == ProgrammeState::InProgramme);
    ProgrammePartition { active, available }
}

/// Group a section by category for the insecticide / fungicide / foliar tabs.
pub fn by_category<'a>(
    entries: &[&'a SprayProgrammeEntry],
) -> BTreeMap<String, Vec<&'a SprayProgrammeEntry>> {
    let mut groups: BTreeMap<String, Vec<&'a SprayProgrammeEntry>> = BTreeMap::new();
    for entry in entries {
        groups
            .entry(entry.category.as_wire().to_string())
            .or_default()
            .push(*entry);
    }
    groups
}
