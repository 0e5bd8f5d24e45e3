use patientor_core::constants::{DIAGNOSES_PATH, PATIENTS_PATH};
use patientor_core::{
    ClientConfig, Diagnosis, Entry, NewEntry, Patient, PatientorApi, PatientorError,
    PatientorResult,
};
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Error body returned by the service on failure.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// `reqwest`-backed client of the Patientor REST service.
#[derive(Clone, Debug)]
pub struct PatientorClient {
    cfg: ClientConfig,
    http: reqwest::Client,
}

impl PatientorClient {
    pub fn new(cfg: ClientConfig) -> Self {
        Self::with_http_client(cfg, reqwest::Client::new())
    }

    /// Use a preconfigured `reqwest::Client` (proxies, TLS roots, default headers).
    pub fn with_http_client(cfg: ClientConfig, http: reqwest::Client) -> Self {
        Self { cfg, http }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.cfg
    }

    fn endpoint(&self, path: &str) -> PatientorResult<Url> {
        Url::parse(&self.cfg.url(path))
            .map_err(|e| PatientorError::InvalidInput(format!("invalid service url: {e}")))
    }

    /// URL of one patient, followed by `rest`. The id is percent-encoded as a single segment.
    fn patient_endpoint(&self, id: &str, rest: &[&str]) -> PatientorResult<Url> {
        validate_path_segment(id)?;
        let mut url = self.endpoint(PATIENTS_PATH)?;
        url.path_segments_mut()
            .map_err(|()| {
                PatientorError::InvalidInput(format!(
                    "service url '{}' cannot carry a path",
                    self.cfg.api_base_url()
                ))
            })?
            .push(id)
            .extend(rest);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> PatientorResult<T> {
        tracing::debug!("GET {}", url);
        let response = self.http.get(url).send().await.map_err(transport)?;
        decode(response).await
    }
}

impl PatientorApi for PatientorClient {
    async fn fetch_patient_list(&self) -> PatientorResult<Vec<Patient>> {
        self.get_json(self.endpoint(PATIENTS_PATH)?).await
    }

    async fn fetch_patient(&self, id: &str) -> PatientorResult<Patient> {
        self.get_json(self.patient_endpoint(id, &[])?).await
    }

    async fn fetch_diagnoses(&self) -> PatientorResult<Vec<Diagnosis>> {
        self.get_json(self.endpoint(DIAGNOSES_PATH)?).await
    }

    async fn create_entry(&self, patient_id: &str, entry: &NewEntry) -> PatientorResult<Entry> {
        let url = self.patient_endpoint(patient_id, &["entries"])?;
        tracing::debug!("POST {}", url);
        let response = self
            .http
            .post(url)
            .json(entry)
            .send()
            .await
            .map_err(transport)?;
        decode(response).await
    }
}

fn transport(err: reqwest::Error) -> PatientorError {
    PatientorError::Transport(err.to_string())
}

/// Decode a JSON body, or turn a non-success status into `PatientorError::Rejected`.
async fn decode<T: DeserializeOwned>(response: Response) -> PatientorResult<T> {
    let status = response.status();
    let body = response.bytes().await.map_err(transport)?;

    if !status.is_success() {
        return Err(PatientorError::Rejected {
            status: status.as_u16(),
            message: rejection_message(status, &body),
        });
    }

    serde_json::from_slice(&body).map_err(|e| PatientorError::Deserialization(e.to_string()))
}

/// Prefer the service's `error` field, then the raw body, then the status reason.
fn rejection_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(ErrorBody { error }) = serde_json::from_slice::<ErrorBody>(body) {
        return error;
    }

    let text = String::from_utf8_lossy(body).trim().to_string();
    if !text.is_empty() {
        return text;
    }

    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}

/// Ids name exactly one path segment: non-empty, and never a dot segment.
fn validate_path_segment(id: &str) -> PatientorResult<()> {
    if id.trim().is_empty() {
        return Err(PatientorError::InvalidInput("patient id cannot be empty".into()));
    }

    if matches!(id, "." | "..") {
        return Err(PatientorError::InvalidInput(format!(
            "patient id '{id}' is not a valid path segment"
        )));
    }

    if id.contains(['/', '?', '#']) || id.chars().any(char::is_whitespace) {
        return Err(PatientorError::InvalidInput(format!(
            "patient id '{id}' contains characters not allowed in a path segment"
        )));
    }

    Ok(())
}
