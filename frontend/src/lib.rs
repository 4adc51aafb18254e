use chrono::NaiveDate;
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod clock;
pub mod command_executors;
pub mod constants; // Module for constants and default values
pub mod due_date;
pub mod error;
pub mod logging;
pub mod models;
pub mod network;
pub mod programme_state;
pub mod scheduling;
pub mod upcoming;
pub mod urgency;

#[cfg(test)]
mod schedule_prop_test;

use clock::{ScheduleClock, SystemClock};
use models::{parse_backend_date, parse_programmes_json, SprayProgrammeEntry};
use programme_state::{ProgrammeUpdate, ScheduleFields};
use scheduling::FrequencySpec;

// Main entry point for the WASM application
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    // Initialize better panic messages
    console_error_panic_hook::set_once();

    logging::init(logging::LogConfig::from_env());
    network::init_api_config(None);

    Ok(())
}

/// Point the client at a different backend at runtime.  `None` restores the
/// build-time default.
#[wasm_bindgen]
pub fn configure(api_base_url: Option<String>) {
    network::init_api_config(api_base_url.as_deref());
}

// ---------------------------------------------------------------------------
// Scheduling views
// ---------------------------------------------------------------------------

/// Ranked "upcoming applications" for a system.  `programmes_json` is the
/// list endpoint's body; `now` is an ISO date or timestamp (defaults to the
/// browser clock).
#[wasm_bindgen]
pub fn upcoming_applications(
    programmes_json: &str,
    now: Option<String>,
    limit: Option<usize>,
) -> Result<JsValue, JsValue> {
    let entries = parse_programmes_json(programmes_json)?;
    let today = resolve_today(now.as_deref())?;
    let limit = limit.unwrap_or(constants::DEFAULT_UPCOMING_LIMIT);
    to_js(&upcoming::upcoming_applications(&entries, today, limit))
}

/// Every scheduled entry, ranked, without the display cap.
#[wasm_bindgen]
pub fn full_schedule(programmes_json: &str, now: Option<String>) -> Result<JsValue, JsValue> {
    let entries = parse_programmes_json(programmes_json)?;
    let today = resolve_today(now.as_deref())?;
    to_js(&upcoming::schedule_all(&entries, today))
}

/// `{ active, available }` sections for the product lists.  Active rows
/// carry a due-date badge, or "Unscheduled" when none can be computed.
#[wasm_bindgen]
pub fn partition_programmes(programmes_json: &str, now: Option<String>) -> Result<JsValue, JsValue> {
    let entries = parse_programmes_json(programmes_json)?;
    let today = resolve_today(now.as_deref())?;
    to_js(&upcoming::overview(&entries, today))
}

/// Badge text for a due date: "Overdue", "Today", "Tomorrow" or "N days".
#[wasm_bindgen]
pub fn urgency_badge(next_due: &str, now: Option<String>) -> Result<String, JsValue> {
    let next_due = parse_backend_date(next_due)?;
    let today = resolve_today(now.as_deref())?;
    Ok(urgency::Urgency::for_date(next_due, today).badge_label())
}

/// Day count for a number or a phrase like "Every 14 days".
#[wasm_bindgen]
pub fn frequency_days(spec: JsValue) -> i64 {
    let spec: Option<FrequencySpec> = serde_wasm_bindgen::from_value(spec).unwrap_or(None);
    scheduling::parse_frequency(spec.as_ref())
}

// ---------------------------------------------------------------------------
// Programme transitions
//
// Each takes the entry as previously returned by this module, applies the
// transition, queues the backend write and returns the updated entry.
// ---------------------------------------------------------------------------

#[wasm_bindgen]
pub fn add_to_programme(entry: JsValue, fields: JsValue) -> Result<JsValue, JsValue> {
    let mut entry: SprayProgrammeEntry = from_js(entry)?;
    let fields: ScheduleFields = if fields.is_undefined() || fields.is_null() {
        ScheduleFields::prefill(&entry)
    } else {
        from_js(fields)?
    };
    let cmd = programme_state::add_to_programme(&mut entry, fields)?;
    command_executors::execute_programme_command(cmd);
    to_js(&entry)
}

#[wasm_bindgen]
pub fn edit_programme(entry: JsValue, update: JsValue) -> Result<JsValue, JsValue> {
    let mut entry: SprayProgrammeEntry = from_js(entry)?;
    let update: ProgrammeUpdate = from_js(update)?;
    let cmd = programme_state::edit_programme(&mut entry, update)?;
    command_executors::execute_programme_command(cmd);
    to_js(&entry)
}

#[wasm_bindgen]
pub fn remove_from_programme(entry: JsValue) -> Result<JsValue, JsValue> {
    let mut entry: SprayProgrammeEntry = from_js(entry)?;
    let cmd = programme_state::remove_from_programme(&mut entry)?;
    command_executors::execute_programme_command(cmd);
    to_js(&entry)
}

#[wasm_bindgen]
pub fn delete_programme(entry: JsValue) -> Result<(), JsValue> {
    let entry: SprayProgrammeEntry = from_js(entry)?;
    command_executors::execute_programme_command(programme_state::delete_programme(&entry));
    Ok(())
}

// ---------------------------------------------------------------------------
// Backend calls
// ---------------------------------------------------------------------------

/// Fetch and normalise every programme of a system.
#[wasm_bindgen]
pub async fn load_programmes(system_id: String) -> Result<JsValue, JsValue> {
    let entries = network::ApiClient::get_spray_programmes(&system_id).await?;
    to_js(&entries)
}

/// Create a programme from form values.  Returns the new id.
#[wasm_bindgen]
pub async fn create_programme(system_id: String, fields: JsValue) -> Result<u32, JsValue> {
    let form: NewProgramme = from_js(fields)?;
    let category = models::Category::from(form.category);
    let mut payload = models::ApiSprayProgrammeCreate::new(&system_id, &category, &form.product_name)
        .with_target(&category, form.target);
    payload.active_ingredient = form.active_ingredient;
    payload.application_rate = form.application_rate;
    payload.rate_unit = form.rate_unit;
    payload.frequency_days = form.frequency.as_ref().map(|f| scheduling::parse_frequency(Some(f)));
    payload.start_date = form.start_date;
    payload.end_date = form.end_date;
    payload.notes = form.notes;
    network::ApiClient::create_spray_programme(&payload).await
}

/// Record an application made on `date` (ISO, defaults to today).
#[wasm_bindgen]
pub async fn record_application(
    programme_id: u32,
    date: Option<String>,
    rating: Option<u8>,
    notes: Option<String>,
) -> Result<u32, JsValue> {
    let mut record = models::ApiSprayApplicationRecord::new(programme_id, resolve_today(date.as_deref())?);
    if let Some(rating) = rating {
        record = record.with_rating(rating);
    }
    record.notes = notes;
    network::ApiClient::record_application(&record).await
}

/// Application history rows plus the latest parsed date.
#[wasm_bindgen]
pub async fn application_history(programme_id: u32) -> Result<JsValue, JsValue> {
    let history = network::ApiClient::get_application_history(programme_id).await?;
    to_js(&HistoryOut {
        latest_application: history.latest_application(),
        applications: &history.applications,
    })
}

/// Seed the default product catalogue.  Returns the number of rows created.
#[wasm_bindgen]
pub async fn create_default_programmes(system_id: String, force: Option<bool>) -> Result<u32, JsValue> {
    network::ApiClient::create_default_programmes(&system_id, force.unwrap_or(false)).await
}

#[derive(serde::Deserialize)]
struct NewProgramme {
    category: String,
    product_name: String,
    #[serde(default)]
    active_ingredient: Option<String>,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    application_rate: Option<String>,
    #[serde(default)]
    rate_unit: Option<String>,
    #[serde(default)]
    frequency: Option<FrequencySpec>,
    #[serde(default)]
    start_date: Option<NaiveDate>,
    #[serde(default)]
    end_date: Option<NaiveDate>,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Serialize)]
struct HistoryOut<'a> {
    latest_application: Option<NaiveDate>,
    applications: &'a [models::ApiSprayApplication],
}

// ---------------------------------------------------------------------------
// Boundary helpers
// ---------------------------------------------------------------------------

fn resolve_today(now: Option<&str>) -> Result<NaiveDate, JsValue> {
    match now.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Ok(parse_backend_date(raw)?),
        None => Ok(SystemClock.today()),
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(JsValue::from)
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(JsValue::from)
}

// wasm-bindgen tests ----------------------------------------------------------
