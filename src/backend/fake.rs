use crate::backend::wire::{
    ChatReply, ChatRequest, DocumentReference, FineTuneJob, FineTunedDownload, InitAck,
    LocalModel, ModelDownload, UploadFile,
};
use crate::backend::{Backend, BackendError};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Scripted backend: chat replies are served in order, ingestion outcomes are
/// keyed by file name (unknown files get a fresh id). A panicking fake blows up
/// in `initialize` and `list_local_models`.
#[derive(Default)]
pub struct FakeBackend {
    chat_replies: Mutex<VecDeque<Result<ChatReply, BackendError>>>,
    ingest_failures: Mutex<HashMap<String, BackendError>>,
    next_document_id: Mutex<u64>,
    local_models: Mutex<Option<Result<Vec<LocalModel>, BackendError>>>,
    panics: bool,
    pub chat_requests: Mutex<Vec<ChatRequest>>,
    pub ingested: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            next_document_id: Mutex::new(100),
            ..Self::default()
        }
    }

    pub fn reply_with(self, reply: Result<ChatReply, BackendError>) -> Self {
        self.chat_replies
            .lock()
            .expect("fake backend lock")
            .push_back(reply);
        self
    }

    pub fn fail_ingest(self, file_name: &str, error: BackendError) -> Self {
        self.ingest_failures
            .lock()
            .expect("fake backend lock")
            .insert(file_name.to_string(), error);
        self
    }

    pub fn with_local_models(self, models: Result<Vec<LocalModel>, BackendError>) -> Self {
        *self.local_models.lock().expect("fake backend lock") = Some(models);
        self
    }

    pub fn panicking(mut self) -> Self {
        self.panics = true;
        self
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_requests.lock().expect("fake backend lock").len()
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn initialize(&self) -> Result<InitAck, BackendError> {
        if self.panics {
            panic!("fake backend crashed during initialization");
        }
        Ok(InitAck {
            status: Some("ok".to_string()),
            message: None,
        })
    }

    async fn ingest_document(&self, file: &UploadFile) -> Result<DocumentReference, BackendError> {
        self.ingested
            .lock()
            .expect("fake backend lock")
            .push(file.name.clone());
        if let Some(error) = self
            .ingest_failures
            .lock()
            .expect("fake backend lock")
            .get(&file.name)
        {
            return Err(error.clone());
        }

        let mut next = self.next_document_id.lock().expect("fake backend lock");
        *next += 1;
        Ok(DocumentReference {
            document_id: *next,
            file_name: file.name.clone(),
            size_bytes: file.bytes.as_ref().map(|bytes| bytes.len() as u64).unwrap_or(0),
            chunks_inserted: 3,
            already_indexed: false,
        })
    }

    async fn send_chat_message(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        self.chat_requests
            .lock()
            .expect("fake backend lock")
            .push(request.clone());
        self.chat_replies
            .lock()
            .expect("fake backend lock")
            .pop_front()
            .unwrap_or_else(|| {
                Ok(ChatReply {
                    answer: format!("echo: {}", request.message),
                    sources: Vec::new(),
                })
            })
    }

    async fn request_model_download(&self, model_id: &str) -> Result<ModelDownload, BackendError> {
        Ok(ModelDownload {
            target_dir: Some(format!("/models/{model_id}")),
            downloaded_files: vec![serde_json::json!(format!("{model_id}-q4_k_m.gguf"))],
            model_id: Some(model_id.to_string()),
            status: Some("ok".to_string()),
        })
    }

    async fn list_local_models(&self) -> Result<Vec<LocalModel>, BackendError> {
        if self.panics {
            panic!("fake backend crashed while listing models");
        }
        self.local_models
            .lock()
            .expect("fake backend lock")
            .clone()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn start_fine_tuning(&self, _dataset_name: &str) -> Result<FineTuneJob, BackendError> {
        Ok(FineTuneJob {
            job_id: Some("job-1".to_string()),
        })
    }

    async fn download_fine_tuned_model(
        &self,
        custom_name: &str,
    ) -> Result<FineTunedDownload, BackendError> {
        Ok(FineTunedDownload {
            status: Some("ok".to_string()),
            message: Some(format!("Saved as {custom_name}-q4_k_m.gguf")),
        })
    }
}
