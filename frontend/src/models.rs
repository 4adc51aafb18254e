use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::constants::PLACEHOLDER_TARGET;
use crate::error::ModelError;
use crate::scheduling::FrequencySpec;

/// Product category.  The backend stores plural slugs; singular forms show up
/// in older rows so both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Insecticide,
    Fungicide,
    FoliarFeed,
    Other(String),
}

impl Category {
    pub fn as_wire(&self) -> &str {
        match self {
            Category::Insecticide => "insecticides",
            Category::Fungicide => "fungicides",
            Category::FoliarFeed => "foliar-feeds",
            Category::Other(slug) => slug,
        }
    }

    /// Whether the category belongs to one of the three standard tabs.
    pub fn is_standard(&self) -> bool {
        !matches!(self, Category::Other(_))
    }

    /// Heading used for the tabbed product lists.
    pub fn label(&self) -> &str {
        match self {
            Category::Insecticide => "Insecticides",
            Category::Fungicide => "Fungicides",
            Category::FoliarFeed => "Foliar Feeds",
            Category::Other(slug) => slug,
        }
    }
}

impl From<String> for Category {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "insecticide" | "insecticides" => Category::Insecticide,
            "fungicide" | "fungicides" => Category::Fungicide,
            "foliar-feed" | "foliar-feeds" | "foliar_feed" | "foliar_feeds" => Category::FoliarFeed,
            _ => Category::Other(raw),
        }
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_wire().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stored programme status.  Absent on the wire means active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgrammeStatus {
    #[default]
    Active,
    Inactive,
}

impl ProgrammeStatus {
    pub fn from_wire(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()) {
            Some(s) if s == "inactive" => ProgrammeStatus::Inactive,
            _ => ProgrammeStatus::Active,
        }
    }
}

// ---------------------------------------------------------------------------
// Backend wire format
// ---------------------------------------------------------------------------

/// One row of `GET /api/spray-programmes?system_id=…`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiSprayProgramme {
    pub id: u32,
    pub product_name: String,
    pub category: Option<String>,
    pub active_ingredient: Option<String>,
    pub target_areas: Option<String>,
    /// Older rows name the target column directly.
    pub target_pest: Option<String>,
    pub application_rate: Option<String>,
    pub frequency: Option<FrequencySpec>,
    pub frequency_days: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub last_application: Option<String>,
    pub last_application_date: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub applied: Option<bool>,
}

/// The list endpoint wraps rows in `{ "programmes": [...] }`; callers that
/// already unwrapped it hand us the bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum ProgrammesPayload {
    Wrapped { programmes: Vec<serde_json::Value> },
    Bare(Vec<serde_json::Value>),
}

// ---------------------------------------------------------------------------
// Normalised entry
// ---------------------------------------------------------------------------

/// A product/application definition for one system, with every wire-level
/// convention resolved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SprayProgrammeEntry {
    pub id: u32,
    pub category: Category,
    pub product_name: String,
    pub active_ingredient: Option<String>,
    pub target: Option<String>,
    pub application_rate: Option<String>,
    pub frequency: Option<FrequencySpec>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub last_application: Option<NaiveDate>,
    pub status: ProgrammeStatus,
    pub notes: Option<String>,
}

impl SprayProgrammeEntry {
    /// Ingestion edge: the only place wire quirks are interpreted.
    pub fn from_api(api: ApiSprayProgramme) -> Self {
        let id = api.id;
        let frequency = match api.frequency_days {
            Some(days) => Some(FrequencySpec::Numeric(days)),
            None => api.frequency.and_then(|f| match f {
                FrequencySpec::Textual(text) => non_empty(Some(text)).map(FrequencySpec::Textual),
                numeric => Some(numeric),
            }),
        };

        Self {
            id,
            category: Category::from(api.category.unwrap_or_default()),
            product_name: api.product_name,
            active_ingredient: non_empty(api.active_ingredient),
            target: non_empty(api.target_areas)
                .or_else(|| non_empty(api.target_pest))
                .filter(|t| t != PLACEHOLDER_TARGET),
            application_rate: non_empty(api.application_rate),
            frequency,
            start_date: lenient_date(id, "start_date", api.start_date),
            end_date: lenient_date(id, "end_date", api.end_date),
            last_application: lenient_date(
                id,
                "last_application",
                non_empty(api.last_application).or(api.last_application_date),
            ),
            status: ProgrammeStatus::from_wire(api.status.as_deref()),
            notes: non_empty(api.notes),
        }
    }

    /// Whether the entry carries any schedule data at all.
    pub fn has_schedule_data(&self) -> bool {
        self.frequency.is_some() || self.start_date.is_some() || self.end_date.is_some()
    }
}

/// Decode a list response, skipping (and logging) rows that do not match the
/// expected shape so one bad row never hides the rest of the system.
pub fn parse_programmes_json(json: &str) -> Result<Vec<SprayProgrammeEntry>, ModelError> {
    let rows = match serde_json::from_str::<ProgrammesPayload>(json)? {
        ProgrammesPayload::Wrapped { programmes } => programmes,
        ProgrammesPayload::Bare(rows) => rows,
    };

    let entries = rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value::<ApiSprayProgramme>(row) {
            Ok(api) => Some(SprayProgrammeEntry::from_api(api)),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed spray programme row");
                None
            }
        })
        .collect();
    Ok(entries)
}

/// Parse the date formats the backend emits: `YYYY-MM-DD`, SQL datetimes,
/// and RFC 3339 timestamps.  Time of day is discarded.
pub fn parse_backend_date(raw: &str) -> Result<NaiveDate, ModelError> {
    let s = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    Err(ModelError::InvalidDate(raw.to_string()))
}

fn lenient_date(id: u32, field: &'static str, raw: Option<String>) -> Option<NaiveDate> {
    let raw = non_empty(raw)?;
    match parse_backend_date(&raw) {
        Ok(date) => Some(date),
        Err(e) => {
            tracing::warn!(programme_id = id, field, error = %e, "ignoring unparseable date");
            None
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Outbound payloads
// ---------------------------------------------------------------------------

/// Body of `POST /api/spray-programmes`.  The backend files the target under
/// a category-specific key.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ApiSprayProgrammeCreate {
    pub system_id: String,
    pub category: String,
    pub product_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_ingredient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_pest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_disease: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrient_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_rate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ApiSprayProgrammeCreate {
    pub fn new(system_id: &str, category: &Category, product_name: &str) -> Self {
        Self {
            system_id: system_id.to_string(),
            category: category.as_wire().to_string(),
            product_name: product_name.to_string(),
            ..Default::default()
        }
    }

    /// Route the target into the field the backend reads for this category.
    pub fn with_target(mut self, category: &Category, target: Option<String>) -> Self {
        let target = non_empty(target);
        match category {
            Category::Insecticide => self.target_pest = target,
            Category::Fungicide => self.target_disease = target,
            Category::FoliarFeed => self.nutrient_type = target,
            Category::Other(_) => self.target_pest = target,
        }
        self
    }
}

/// Body of `PUT /api/spray-programmes/{id}`.  The backend overwrites every
/// schedule column, so the payload is always built from a complete entry.
/// `status` is not among them; see `ProgrammeCommand::route`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ApiSprayProgrammeUpdate {
    pub product_name: String,
    pub active_ingredient: Option<String>,
    pub target_pest: Option<String>,
    pub application_rate: Option<String>,
    pub frequency: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl From<&SprayProgrammeEntry> for ApiSprayProgrammeUpdate {
    fn from(entry: &SprayProgrammeEntry) -> Self {
        Self {
            product_name: entry.product_name.clone(),
            active_ingredient: entry.active_ingredient.clone(),
            target_pest: entry.target.clone(),
            application_rate: entry.application_rate.clone(),
            frequency: entry.frequency.as_ref().map(FrequencySpec::to_backend_text),
            start_date: entry.start_date,
            end_date: entry.end_date,
            notes: entry.notes.clone(),
        }
    }
}

/// Body of `POST /api/spray-programmes/record`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ApiSprayApplicationRecord {
    pub programme_id: u32,
    pub application_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dilution_rate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_applied: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_conditions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effectiveness_rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ApiSprayApplicationRecord {
    pub fn new(programme_id: u32, application_date: NaiveDate) -> Self {
        Self {
            programme_id,
            application_date,
            dilution_rate: None,
            volume_applied: None,
            weather_conditions: None,
            effectiveness_rating: None,
            notes: None,
        }
    }

    /// Ratings outside 1-5 are dropped rather than sent.
    pub fn with_rating(mut self, rating: u8) -> Self {
        self.effectiveness_rating = (1..=5).contains(&rating).then_some(rating);
        self
    }
}

/// One row of `GET /api/spray-programmes/{id}/history`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiSprayApplication {
    pub id: u32,
    pub programme_id: u32,
    pub application_date: String,
    pub dilution_rate: Option<String>,
    pub volume_applied: Option<f64>,
    pub weather_conditions: Option<String>,
    pub effectiveness_rating: Option<i64>,
    pub notes: Option<String>,
    pub product_name: Option<String>,
    pub category: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ApiApplicationHistory {
    pub applications: Vec<ApiSprayApplication>,
}

impl ApiApplicationHistory {
    /// Most recent application date in the history, if any row parses.
    pub fn latest_application(&self) -> Option<NaiveDate> {
        self.applications
            .iter()
            .filter_map(|a| parse_backend_date(&a.application_date).ok())
            .max()
    }
}
