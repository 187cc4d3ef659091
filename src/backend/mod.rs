use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub mod dispatch;
#[cfg(test)]
pub mod fake;
pub mod http;
pub mod wire;

use wire::{
    ChatReply, ChatRequest, DocumentReference, FineTuneJob, FineTunedDownload, InitAck,
    LocalModel, ModelDownload, UploadFile,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("could not reach backend: {0}")]
    Network(String),
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("{0}")]
    MalformedResponse(String),
    #[error("{0}")]
    Rejected(String),
    #[error("cannot read {file_name}: {message}")]
    UnreadableFile { file_name: String, message: String },
    #[error("{operation} was interrupted before completing")]
    Interrupted { operation: &'static str },
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Every backend call the client knows about, with its route and fallback error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Init,
    Ingest,
    Chat,
    DownloadModel,
    ListLocalModels,
    StartFineTune,
    DownloadFineTuned,
}

impl Operation {
    pub fn method(self) -> Method {
        match self {
            Self::ListLocalModels => Method::Get,
            _ => Method::Post,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Self::Init => "/api/init",
            Self::Ingest => "/api/ingest",
            Self::Chat => "/api/chat",
            Self::DownloadModel => "/api/models/download",
            Self::ListLocalModels => "/api/models/local",
            Self::StartFineTune => "/api/finetune",
            Self::DownloadFineTuned => "/api/finetune/download",
        }
    }

    pub fn default_error(self) -> &'static str {
        match self {
            Self::Init => "Backend initialization failed.",
            Self::Ingest => "Failed to ingest PDF.",
            Self::Chat => "Chat request failed.",
            Self::DownloadModel => "Model download failed.",
            Self::ListLocalModels => "Failed to fetch local GGUF models.",
            Self::StartFineTune => "Failed to start fine-tuning.",
            Self::DownloadFineTuned => "Failed to download fine-tuned model.",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Ingest => "ingest",
            Self::Chat => "chat",
            Self::DownloadModel => "download_model",
            Self::ListLocalModels => "list_local_models",
            Self::StartFineTune => "start_fine_tune",
            Self::DownloadFineTuned => "download_fine_tuned",
        }
    }
}

#[async_trait]
pub trait Backend: Send + Sync {
    async fn initialize(&self) -> Result<InitAck, BackendError>;

    async fn ingest_document(&self, file: &UploadFile) -> Result<DocumentReference, BackendError>;

    async fn send_chat_message(&self, request: &ChatRequest) -> Result<ChatReply, BackendError>;

    async fn request_model_download(&self, model_id: &str) -> Result<ModelDownload, BackendError>;

    async fn list_local_models(&self) -> Result<Vec<LocalModel>, BackendError>;

    async fn start_fine_tuning(&self, dataset_name: &str) -> Result<FineTuneJob, BackendError>;

    async fn download_fine_tuned_model(
        &self,
        custom_name: &str,
    ) -> Result<FineTunedDownload, BackendError>;
}

/// Response bodies are never trusted to be JSON: empty becomes `{}`, anything
/// unparseable becomes `{"message": <raw text>}`.
pub fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Object(Map::new());
    }

    match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(_) => {
            let mut fallback = Map::new();
            fallback.insert("message".to_string(), Value::String(text.to_string()));
            Value::Object(fallback)
        }
    }
}

pub fn error_message(payload: &Value, fallback: &str) -> String {
    for key in ["detail", "message"] {
        let Some(value) = payload.get(key) else {
            continue;
        };
        if !is_truthy(value) {
            continue;
        }
        return match value {
            Value::String(message) => message.clone(),
            other => other.to_string(),
        };
    }
    fallback.to_string()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty(),
        Value::Number(number) => number.as_f64().map(|n| n != 0.0).unwrap_or(true),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::{error_message, parse_body, BackendError, Method, Operation};
    use serde_json::json;

    #[test]
    fn detail_wins_over_message() {
        let payload = parse_body(r#"{"detail":"model not found","message":"ignored"}"#);
        assert_eq!(error_message(&payload, "Chat request failed."), "model not found");
    }

    #[test]
    fn status_error_displays_exactly_the_extracted_message() {
        let payload = parse_body(r#"{"detail":"model not found"}"#);
        let error = BackendError::Status {
            status: 404,
            message: error_message(&payload, Operation::Chat.default_error()),
        };
        assert_eq!(error.to_string(), "model not found");
    }

    #[test]
    fn message_is_used_when_detail_is_blank() {
        let payload = json!({ "detail": "", "message": "Modal Error: timeout" });
        assert_eq!(error_message(&payload, "fallback"), "Modal Error: timeout");
    }

    #[test]
    fn structured_detail_is_rendered_as_json() {
        let payload = json!({ "detail": [{ "loc": ["body", "modelId"], "msg": "field required" }] });
        assert_eq!(
            error_message(&payload, "fallback"),
            r#"[{"loc":["body","modelId"],"msg":"field required"}]"#
        );
    }

    #[test]
    fn raw_text_becomes_the_message() {
        let payload = parse_body("502 Bad Gateway");
        assert_eq!(
            error_message(&payload, Operation::Ingest.default_error()),
            "502 Bad Gateway"
        );
    }

    #[test]
    fn empty_body_uses_operation_default() {
        let payload = parse_body("");
        assert_eq!(payload, json!({}));
        assert_eq!(
            error_message(&payload, Operation::DownloadFineTuned.default_error()),
            "Failed to download fine-tuned model."
        );

        let array = parse_body("[1, 2]");
        assert_eq!(error_message(&array, "Model download failed."), "Model download failed.");
    }

    #[test]
    fn operation_routes_match_backend_surface() {
        assert_eq!(Operation::ListLocalModels.method(), Method::Get);
        assert_eq!(Operation::ListLocalModels.path(), "/api/models/local");
        assert_eq!(Operation::Chat.method(), Method::Post);
        assert_eq!(Operation::DownloadFineTuned.path(), "/api/finetune/download");
    }
}
