use crate::backend::BackendError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

pub const PDF_MIME: &str = "application/pdf";

const INVALID_INGEST_RESPONSE: &str = "Invalid ingest response from backend.";

/// A file picked up from a drop, mirroring what the windowing layer hands over.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub mime: String,
    pub path: Option<PathBuf>,
    pub bytes: Option<Arc<[u8]>>,
}

impl UploadFile {
    pub fn from_path(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            mime: String::new(),
            path: Some(path),
            bytes: None,
        }
    }

    pub fn is_pdf(&self) -> bool {
        self.mime.trim().eq_ignore_ascii_case(PDF_MIME)
            || self.name.to_ascii_lowercase().ends_with(".pdf")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentReference {
    pub document_id: u64,
    pub file_name: String,
    pub size_bytes: u64,
    pub chunks_inserted: u64,
    #[serde(default)]
    pub already_indexed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub selected_model: String,
    pub selected_model_id: String,
    pub document_ids: Vec<u64>,
    pub top_k: u32,
}

/// Null or mistyped values fall back to the field default.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(default, deserialize_with = "lenient")]
    pub chunk_id: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub document_id: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub score: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub excerpt: String,
}

impl Source {
    pub fn page(&self) -> Option<u32> {
        self.page.filter(|page| *page > 0)
    }

    pub fn heading(&self) -> String {
        match self.page() {
            Some(page) => format!("{} • page {} • score {}", self.title, page, self.score),
            None => format!("{} • score {}", self.title, self.score),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChatReply {
    pub answer: String,
    pub sources: Vec<Source>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalModel {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub size_bytes: u64,
    #[serde(default)]
    pub is_loaded: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDownload {
    #[serde(default)]
    pub target_dir: Option<String>,
    #[serde(default)]
    pub downloaded_files: Vec<Value>,
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FineTuneJob {
    pub job_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct FineTunedDownload {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct InitAck {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

pub fn decode_chat_reply(payload: &Value) -> Result<ChatReply, BackendError> {
    let answer = payload
        .get("answer")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let sources = match payload.get("sources") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match Source::deserialize(item) {
                Ok(source) => Some(source),
                Err(err) => {
                    warn!(error = %err, "skipping unreadable chat source");
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    };

    Ok(ChatReply { answer, sources })
}

pub fn decode_ingest_result(
    payload: &Value,
    file_name: &str,
    size_bytes: u64,
) -> Result<DocumentReference, BackendError> {
    let first = payload
        .get("results")
        .and_then(Value::as_array)
        .and_then(|results| results.first());

    let Some(first) = first else {
        let reported = payload
            .get("errors")
            .and_then(Value::as_array)
            .and_then(|errors| errors.first())
            .and_then(|error| error.get("error"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|message| !message.is_empty());
        return Err(match reported {
            Some(message) => BackendError::Rejected(message.to_string()),
            None => BackendError::MalformedResponse(INVALID_INGEST_RESPONSE.to_string()),
        });
    };

    let document_id = first
        .get("documentId")
        .and_then(Value::as_u64)
        .filter(|id| *id > 0)
        .ok_or_else(|| BackendError::MalformedResponse(INVALID_INGEST_RESPONSE.to_string()))?;

    Ok(DocumentReference {
        document_id,
        file_name: first
            .get("file")
            .and_then(Value::as_str)
            .unwrap_or(file_name)
            .to_string(),
        size_bytes,
        chunks_inserted: first
            .get("chunksInserted")
            .and_then(Value::as_u64)
            .unwrap_or(0),
        already_indexed: first
            .get("alreadyExists")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}

pub fn decode_local_models(payload: &Value) -> Result<Vec<LocalModel>, BackendError> {
    match payload {
        Value::Array(_) => serde_json::from_value(payload.clone()).map_err(|err| {
            BackendError::MalformedResponse(format!("invalid local model listing: {err}"))
        }),
        _ => Ok(Vec::new()),
    }
}

pub fn decode_model_download(payload: &Value) -> Result<ModelDownload, BackendError> {
    if !payload.is_object() {
        return Ok(ModelDownload::default());
    }
    serde_json::from_value(payload.clone()).map_err(|err| {
        BackendError::MalformedResponse(format!("invalid model download response: {err}"))
    })
}

pub fn decode_fine_tune_job(payload: &Value) -> FineTuneJob {
    let job_id = ["jobId", "job_id"]
        .iter()
        .filter_map(|key| payload.get(*key))
        .find_map(|value| match value {
            Value::String(id) if !id.trim().is_empty() => Some(id.trim().to_string()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        });
    FineTuneJob { job_id }
}

pub fn decode_fine_tuned_download(payload: &Value) -> FineTunedDownload {
    serde_json::from_value(payload.clone()).unwrap_or_default()
}

pub fn decode_init_ack(payload: &Value) -> InitAck {
    serde_json::from_value(payload.clone()).unwrap_or_default()
}
