use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::constants::{AUTH_TOKEN_KEYS, SPRAY_PROGRAMMES_PATH};
use crate::models::{
    parse_programmes_json, ApiApplicationHistory, ApiSprayApplicationRecord,
    ApiSprayProgrammeCreate, SprayProgrammeEntry,
};
use crate::programme_state::ProgrammeCommand;

#[derive(Deserialize)]
struct CreatedOut {
    id: u32,
}

#[derive(Deserialize)]
struct RecordedOut {
    application_id: u32,
}

#[derive(Deserialize)]
struct DefaultsOut {
    #[serde(default)]
    created: u32,
}

#[derive(Serialize)]
struct DefaultsIn<'a> {
    system_id: &'a str,
    force: bool,
}

// REST API Client for spray programme operations
pub struct ApiClient;

impl ApiClient {
    fn url(path: &str) -> String {
        super::api_config().url(path)
    }

    // ---------------- Spray programmes ----------------

    /// Every programme row of a system, active and inactive, normalised.
    pub async fn get_spray_programmes(system_id: &str) -> Result<Vec<SprayProgrammeEntry>, JsValue> {
        let url = Self::url(&format!("{}?system_id={}", SPRAY_PROGRAMMES_PATH, system_id));
        let body = Self::fetch_json(&url, "GET", None).await?;
        let entries = parse_programmes_json(&body)?;
        tracing::debug!(system_id, count = entries.len(), "loaded spray programmes");
        Ok(entries)
    }

    // Create a programme; returns the backend id
    pub async fn create_spray_programme(payload: &ApiSprayProgrammeCreate) -> Result<u32, JsValue> {
        let url = Self::url(SPRAY_PROGRAMMES_PATH);
        let out: CreatedOut = Self::send(&url, "POST", payload).await?;
        Ok(out.id)
    }

    /// Persist a programme transition on the route it maps to.
    pub async fn send_programme_command(cmd: &ProgrammeCommand) -> Result<(), JsValue> {
        let (method, path) = cmd.route();
        let body = match cmd {
            ProgrammeCommand::Update { payload, .. } => Some(Self::encode(payload)?),
            ProgrammeCommand::Deactivate { .. } | ProgrammeCommand::Delete { .. } => None,
        };
        Self::fetch_json(&Self::url(&path), method, body.as_deref()).await?;
        Ok(())
    }

    /// Record that a programme was applied.  The backend derives
    /// `last_application` from these rows on the next list fetch.
    pub async fn record_application(record: &ApiSprayApplicationRecord) -> Result<u32, JsValue> {
        let url = Self::url(&format!("{}/record", SPRAY_PROGRAMMES_PATH));
        let out: RecordedOut = Self::send(&url, "POST", record).await?;
        Ok(out.application_id)
    }

    pub async fn get_application_history(id: u32) -> Result<ApiApplicationHistory, JsValue> {
        let url = Self::url(&format!("{}/{}/history", SPRAY_PROGRAMMES_PATH, id));
        let body = Self::fetch_json(&url, "GET", None).await?;
        Self::decode(&body)
    }

    /// Seed the standard product catalogue for a new system.  Returns how
    /// many rows were created (0 when the system already had programmes and
    /// `force` was not set).
    pub async fn create_default_programmes(system_id: &str, force: bool) -> Result<u32, JsValue> {
        let url = Self::url(&format!("{}/create-defaults", SPRAY_PROGRAMMES_PATH));
        let out: DefaultsOut = Self::send(&url, "POST", &DefaultsIn { system_id, force }).await?;
        Ok(out.created)
    }

    // -------------------------------------------------------------------
    // JSON helpers
    // -------------------------------------------------------------------

    async fn send<B: Serialize, T: DeserializeOwned>(url: &str, method: &str, payload: &B) -> Result<T, JsValue> {
        let body = Self::encode(payload)?;
        let resp = Self::fetch_json(url, method, Some(&body)).await?;
        Self::decode(&resp)
    }

    fn encode<B: Serialize>(payload: &B) -> Result<String, JsValue> {
        serde_json::to_string(payload)
            .map_err(|e| JsValue::from_str(&format!("Failed to encode request: {:?}", e)))
    }

    fn decode<T: DeserializeOwned>(body: &str) -> Result<T, JsValue> {
        serde_json::from_str(body)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse response: {:?}", e)))
    }

    // Helper function to make fetch requests
    pub async fn fetch_json(url: &str, method: &str, body: Option<&str>) -> Result<String, JsValue> {
        use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

        let opts = RequestInit::new();
        opts.set_method(method);
        opts.set_mode(RequestMode::Cors);

        let headers = Headers::new()?;

        // Always attempt to attach Authorization header if token present.
        if let Some(token) = auth_token() {
            headers.append("Authorization", &format!("Bearer {}", token))?;
        }

        if let Some(data) = body {
            opts.set_body(&JsValue::from_str(data));
            headers.append("Content-Type", "application/json")?;
        }

        opts.set_headers(&headers);

        let request = Request::new_with_str_and_init(url, &opts)?;

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window exists"))?;
        let resp_value = JsFuture::from(window.fetch_with_request(&request)).await?;
        let resp: Response = resp_value.dyn_into()?;

        if !resp.ok() {
            let status = resp.status();
            let status_text = resp.status_text();
            tracing::warn!(method, url, status, "API request failed");
            return Err(JsValue::from_str(&format!("API request failed: {} {}", status, status_text)));
        }

        // Parse body as text – caller can decode JSON.
        let text = JsFuture::from(resp.text()?).await?;
        Ok(text.as_string().unwrap_or_default())
    }
}

/// Bearer token persisted by the login flow, checked under each legacy key.
fn auth_token() -> Option<String> {
    let storage = web_sys::window()?.local_storage().ok()??;
    AUTH_TOKEN_KEYS
        .iter()
        .filter_map(|key| storage.get_item(key).ok().flatten())
        .find(|token| !token.is_empty())
}
