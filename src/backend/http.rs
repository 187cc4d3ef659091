use crate::backend::wire::{
    decode_chat_reply, decode_fine_tune_job, decode_fine_tuned_download, decode_ingest_result,
    decode_init_ack, decode_local_models, decode_model_download, ChatReply, ChatRequest,
    DocumentReference, FineTuneJob, FineTunedDownload, InitAck, LocalModel, ModelDownload,
    UploadFile, PDF_MIME,
};
use crate::backend::{error_message, parse_body, Backend, BackendError, Method, Operation};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

enum Payload {
    Empty,
    Json(Value),
    Multipart(Form),
}

/// `Backend` over plain HTTP. No timeout is configured; a hung request is
/// bounded only by the network stack.
#[derive(Clone)]
pub struct HttpBackend {
    http: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
        let http = Client::builder()
            .build()
            .map_err(|err| BackendError::Client(err.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, operation: Operation) -> String {
        format!("{}{}", self.base_url, operation.path())
    }

    async fn call(&self, operation: Operation, payload: Payload) -> Result<Value, BackendError> {
        let url = self.url_for(operation);
        let method = match operation.method() {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };

        let request = self.http.request(method, &url);
        let request = match payload {
            Payload::Empty => request,
            Payload::Json(body) => request.json(&body),
            Payload::Multipart(form) => request.multipart(form),
        };

        debug!(operation = operation.as_str(), %url, "sending backend request");
        let response = request.send().await.map_err(|err| {
            warn!(operation = operation.as_str(), error = %err, "backend unreachable");
            BackendError::Network(err.to_string())
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| BackendError::Network(err.to_string()))?;
        let body = parse_body(&text);

        if !status.is_success() {
            let message = error_message(&body, operation.default_error());
            warn!(
                operation = operation.as_str(),
                status = status.as_u16(),
                %message,
                "backend returned an error"
            );
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }

        debug!(operation = operation.as_str(), status = status.as_u16(), "backend request succeeded");
        Ok(body)
    }
}

async fn read_upload(file: &UploadFile) -> Result<Vec<u8>, BackendError> {
    if let Some(bytes) = &file.bytes {
        return Ok(bytes.to_vec());
    }

    let Some(path) = &file.path else {
        return Err(BackendError::UnreadableFile {
            file_name: file.name.clone(),
            message: "no file contents available".to_string(),
        });
    };

    tokio::fs::read(path)
        .await
        .map_err(|err| BackendError::UnreadableFile {
            file_name: file.name.clone(),
            message: err.to_string(),
        })
}

#[async_trait]
impl Backend for HttpBackend {
    async fn initialize(&self) -> Result<InitAck, BackendError> {
        let body = self.call(Operation::Init, Payload::Empty).await?;
        Ok(decode_init_ack(&body))
    }

    async fn ingest_document(&self, file: &UploadFile) -> Result<DocumentReference, BackendError> {
        let bytes = read_upload(file).await?;
        let size_bytes = bytes.len() as u64;
        let part = Part::bytes(bytes)
            .file_name(file.name.clone())
            .mime_str(PDF_MIME)
            .map_err(|err| BackendError::Client(err.to_string()))?;
        let form = Form::new().part("files", part);

        let body = self.call(Operation::Ingest, Payload::Multipart(form)).await?;
        decode_ingest_result(&body, &file.name, size_bytes)
    }

    async fn send_chat_message(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        let payload = serde_json::to_value(request)
            .map_err(|err| BackendError::Client(format!("cannot encode chat request: {err}")))?;
        let body = self.call(Operation::Chat, Payload::Json(payload)).await?;
        decode_chat_reply(&body)
    }

    async fn request_model_download(&self, model_id: &str) -> Result<ModelDownload, BackendError> {
        let body = self
            .call(
                Operation::DownloadModel,
                Payload::Json(json!({ "modelId": model_id })),
            )
            .await?;
        decode_model_download(&body)
    }

    async fn list_local_models(&self) -> Result<Vec<LocalModel>, BackendError> {
        let body = self.call(Operation::ListLocalModels, Payload::Empty).await?;
        decode_local_models(&body)
    }

    async fn start_fine_tuning(&self, dataset_name: &str) -> Result<FineTuneJob, BackendError> {
        let body = self
            .call(
                Operation::StartFineTune,
                Payload::Json(json!({ "datasetName": dataset_name })),
            )
            .await?;
        Ok(decode_fine_tune_job(&body))
    }

    async fn download_fine_tuned_model(
        &self,
        custom_name: &str,
    ) -> Result<FineTunedDownload, BackendError> {
        let body = self
            .call(
                Operation::DownloadFineTuned,
                Payload::Json(json!({ "customName": custom_name })),
            )
            .await?;
        Ok(decode_fine_tuned_download(&body))
    }
}
