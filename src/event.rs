use crate::backend::wire::{
    ChatReply, DocumentReference, FineTuneJob, FineTunedDownload, InitAck, LocalModel,
    ModelDownload,
};
use crate::backend::BackendError;

/// Which screen started an ingestion batch; chat results are tied to one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOrigin {
    Home,
    Chat { session_id: u64 },
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    BackendReady(Result<InitAck, BackendError>),
    DocumentIngested {
        origin: IngestOrigin,
        file_name: String,
        result: Result<DocumentReference, BackendError>,
    },
    IngestionSettled {
        origin: IngestOrigin,
    },
    ChatSettled {
        session_id: u64,
        result: Result<ChatReply, BackendError>,
    },
    LocalModelsLoaded(Result<Vec<LocalModel>, BackendError>),
    ModelDownloadSettled {
        model_id: String,
        result: Result<ModelDownload, BackendError>,
    },
    FineTuneStarted(Result<FineTuneJob, BackendError>),
    FineTunedDownloadSettled {
        custom_name: String,
        result: Result<FineTunedDownload, BackendError>,
    },
}
