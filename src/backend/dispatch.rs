use crate::backend::wire::{ChatRequest, UploadFile};
use crate::backend::{Backend, BackendError};
use crate::event::{AppEvent, IngestOrigin};
use std::sync::mpsc;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// Sends `event` when dropped unless `settle` replaced it first. Keeps the UI
/// flags from getting stuck if a task panics or is torn down mid-flight.
struct SettleGuard {
    tx: mpsc::Sender<AppEvent>,
    event: Option<AppEvent>,
}

impl SettleGuard {
    fn new(tx: mpsc::Sender<AppEvent>, fallback: AppEvent) -> Self {
        Self {
            tx,
            event: Some(fallback),
        }
    }

    fn settle(mut self, event: AppEvent) {
        self.event = Some(event);
    }
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        if let Some(event) = self.event.take() {
            let _ = self.tx.send(event);
        }
    }
}

pub async fn run_chat_turn(
    backend: &dyn Backend,
    session_id: u64,
    request: ChatRequest,
    tx: &mpsc::Sender<AppEvent>,
) {
    let guard = SettleGuard::new(
        tx.clone(),
        AppEvent::ChatSettled {
            session_id,
            result: Err(BackendError::Interrupted {
                operation: "chat request",
            }),
        },
    );

    debug!(
        session_id,
        documents = request.document_ids.len(),
        top_k = request.top_k,
        "sending chat message"
    );
    let result = backend.send_chat_message(&request).await;
    if let Err(err) = &result {
        warn!(session_id, error = %err, "chat request failed");
    }
    guard.settle(AppEvent::ChatSettled { session_id, result });
}

/// Ingests files one after another; a failure is reported and the batch moves on.
pub async fn run_ingestion(
    backend: &dyn Backend,
    origin: IngestOrigin,
    files: Vec<UploadFile>,
    tx: &mpsc::Sender<AppEvent>,
) {
    let _guard = SettleGuard::new(tx.clone(), AppEvent::IngestionSettled { origin });

    for file in files {
        let result = backend.ingest_document(&file).await;
        match &result {
            Ok(reference) => info!(
                file = %file.name,
                document_id = reference.document_id,
                chunks = reference.chunks_inserted,
                "document ingested"
            ),
            Err(err) => warn!(file = %file.name, error = %err, "document ingestion failed"),
        }
        let _ = tx.send(AppEvent::DocumentIngested {
            origin,
            file_name: file.name,
            result,
        });
    }
}

/// Runs backend calls on the tokio runtime and reports back over the app channel.
#[derive(Clone)]
pub struct BackendClient {
    backend: Arc<dyn Backend>,
    tx: mpsc::Sender<AppEvent>,
    runtime_handle: Handle,
}

impl BackendClient {
    pub fn new(backend: Arc<dyn Backend>, tx: mpsc::Sender<AppEvent>, runtime_handle: Handle) -> Self {
        Self {
            backend,
            tx,
            runtime_handle,
        }
    }

    pub fn initialize(&self) {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        self.runtime_handle.spawn(async move {
            let guard = SettleGuard::new(
                tx.clone(),
                AppEvent::BackendReady(Err(BackendError::Interrupted {
                    operation: "backend initialization",
                })),
            );
            let result = backend.initialize().await;
            match &result {
                Ok(ack) => info!(status = ?ack.status, "backend initialized"),
                Err(err) => warn!(error = %err, "backend initialization failed; continuing"),
            }
            guard.settle(AppEvent::BackendReady(result));
        });
    }

    pub fn send_chat(&self, session_id: u64, request: ChatRequest) {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        self.runtime_handle.spawn(async move {
            run_chat_turn(backend.as_ref(), session_id, request, &tx).await;
        });
    }

    pub fn ingest(&self, origin: IngestOrigin, files: Vec<UploadFile>) {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        self.runtime_handle.spawn(async move {
            run_ingestion(backend.as_ref(), origin, files, &tx).await;
        });
    }

    pub fn list_local_models(&self) {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        self.runtime_handle.spawn(async move {
            let guard = SettleGuard::new(
                tx.clone(),
                AppEvent::LocalModelsLoaded(Err(BackendError::Interrupted {
                    operation: "local model listing",
                })),
            );
            let result = backend.list_local_models().await;
            match &result {
                Ok(models) => debug!(count = models.len(), "local models listed"),
                Err(err) => warn!(error = %err, "listing local models failed"),
            }
            guard.settle(AppEvent::LocalModelsLoaded(result));
        });
    }

    pub fn download_model(&self, model_id: String) {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        self.runtime_handle.spawn(async move {
            let guard = SettleGuard::new(
                tx.clone(),
                AppEvent::ModelDownloadSettled {
                    model_id: model_id.clone(),
                    result: Err(BackendError::Interrupted {
                        operation: "model download",
                    }),
                },
            );
            info!(%model_id, "requesting model download");
            let result = backend.request_model_download(&model_id).await;
            match &result {
                Ok(download) => info!(
                    %model_id,
                    reported_id = ?download.model_id,
                    status = ?download.status,
                    files = download.downloaded_files.len(),
                    target_dir = ?download.target_dir,
                    "model download settled"
                ),
                Err(err) => warn!(%model_id, error = %err, "model download failed"),
            }
            guard.settle(AppEvent::ModelDownloadSettled { model_id, result });
        });
    }

    pub fn start_fine_tune(&self, dataset_name: String) {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        self.runtime_handle.spawn(async move {
            let guard = SettleGuard::new(
                tx.clone(),
                AppEvent::FineTuneStarted(Err(BackendError::Interrupted {
                    operation: "fine-tuning request",
                })),
            );
            info!(%dataset_name, "starting fine-tuning job");
            let result = backend.start_fine_tuning(&dataset_name).await;
            match &result {
                Ok(job) => info!(job_id = ?job.job_id, "fine-tuning job accepted"),
                Err(err) => warn!(error = %err, "fine-tuning request failed"),
            }
            guard.settle(AppEvent::FineTuneStarted(result));
        });
    }

    pub fn download_fine_tuned(&self, custom_name: String) {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        self.runtime_handle.spawn(async move {
            let guard = SettleGuard::new(
                tx.clone(),
                AppEvent::FineTunedDownloadSettled {
                    custom_name: custom_name.clone(),
                    result: Err(BackendError::Interrupted {
                        operation: "fine-tuned model download",
                    }),
                },
            );
            info!(%custom_name, "downloading fine-tuned model");
            let result = backend.download_fine_tuned_model(&custom_name).await;
            match &result {
                Ok(download) => info!(
                    %custom_name,
                    status = ?download.status,
                    message = ?download.message,
                    "fine-tuned model downloaded"
                ),
                Err(err) => warn!(%custom_name, error = %err, "fine-tuned download failed"),
            }
            guard.settle(AppEvent::FineTunedDownloadSettled {
                custom_name,
                result,
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::{run_chat_turn, run_ingestion, BackendClient, SettleGuard};
    use crate::backend::fake::FakeBackend;
    use crate::backend::wire::{ChatReply, LocalModel, UploadFile};
    use crate::backend::BackendError;
    use crate::event::{AppEvent, IngestOrigin};
    use crate::session::chat::ChatSession;
    use crate::ui::catalog::ModelRef;
    use crate::ui::library::LibraryState;
    use std::path::PathBuf;
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::time::Duration;

    fn pdf(name: &str) -> UploadFile {
        UploadFile::from_path(PathBuf::from(format!("/tmp/{name}")))
    }

    fn apply(chat: &mut ChatSession, event: AppEvent) {
        match event {
            AppEvent::ChatSettled { session_id, result } if session_id == chat.id() => {
                chat.complete_send(result);
            }
            AppEvent::DocumentIngested {
                origin: IngestOrigin::Chat { session_id },
                file_name,
                result,
            } if session_id == chat.id() => chat.record_ingestion(&file_name, result),
            AppEvent::IngestionSettled {
                origin: IngestOrigin::Chat { session_id },
            } if session_id == chat.id() => chat.finish_ingestion(),
            other => panic!("unexpected event {other:?}"),
        }
    }

    fn drain(chat: &mut ChatSession, rx: &mpsc::Receiver<AppEvent>) -> usize {
        let mut applied = 0;
        while let Ok(event) = rx.try_recv() {
            apply(chat, event);
            applied += 1;
        }
        applied
    }

    #[tokio::test]
    async fn transcript_grows_by_two_per_successful_submit() {
        let backend = FakeBackend::new();
        let (tx, rx) = mpsc::channel();
        let mut chat = ChatSession::new(1, ModelRef::unknown(), &[]);

        for turn in 0..4 {
            chat.set_input(format!("question {turn}"));
            let request = chat.submit().expect("idle session should submit");
            run_chat_turn(&backend, chat.id(), request, &tx).await;
            assert_eq!(drain(&mut chat, &rx), 1);
        }

        assert_eq!(chat.transcript().len(), 1 + 2 * 4);
        assert_eq!(backend.chat_calls(), 4);
        assert!(!chat.is_sending());
    }

    #[tokio::test]
    async fn blank_input_makes_no_backend_call() {
        let backend = FakeBackend::new();
        let mut chat = ChatSession::new(1, ModelRef::unknown(), &[]);
        chat.set_input("   ");
        assert!(chat.submit().is_none());
        assert_eq!(backend.chat_calls(), 0);
        assert_eq!(chat.transcript().len(), 1);
    }

    #[tokio::test]
    async fn failed_chat_still_produces_one_entry_and_unlocks() {
        let backend = FakeBackend::new().reply_with(Err(BackendError::Status {
            status: 404,
            message: "model not found".to_string(),
        }));
        let (tx, rx) = mpsc::channel();
        let mut chat = ChatSession::new(3, ModelRef::unknown(), &[]);

        chat.set_input("hello");
        let request = chat.submit().expect("submit should fire");
        run_chat_turn(&backend, chat.id(), request, &tx).await;
        drain(&mut chat, &rx);

        assert_eq!(chat.transcript().len(), 3);
        assert_eq!(
            chat.transcript().last().map(|m| m.content.as_str()),
            Some("Backend error: model not found")
        );
        assert!(!chat.is_sending());
    }

    #[tokio::test]
    async fn chat_request_carries_accumulated_document_ids() {
        let backend = FakeBackend::new().reply_with(Ok(ChatReply {
            answer: "done".to_string(),
            sources: Vec::new(),
        }));
        let (tx, rx) = mpsc::channel();
        let mut chat = ChatSession::new(2, ModelRef::unknown(), &[]);

        let files = chat
            .begin_ingestion(vec![pdf("a.pdf"), pdf("b.pdf")])
            .expect("batch should start");
        run_ingestion(&backend, IngestOrigin::Chat { session_id: 2 }, files, &tx).await;
        drain(&mut chat, &rx);

        chat.set_input("summarize");
        let request = chat.submit().expect("submit should fire");
        assert_eq!(request.document_ids, vec![101, 102]);
        run_chat_turn(&backend, chat.id(), request, &tx).await;
        drain(&mut chat, &rx);

        let sent = backend.chat_requests.lock().expect("fake backend lock");
        assert_eq!(sent[0].document_ids, vec![101, 102]);
    }

    #[tokio::test]
    async fn one_failed_file_does_not_abort_the_batch() {
        let backend = FakeBackend::new().fail_ingest(
            "two.pdf",
            BackendError::Status {
                status: 500,
                message: "cannot parse PDF".to_string(),
            },
        );
        let (tx, rx) = mpsc::channel();
        let mut chat = ChatSession::new(5, ModelRef::unknown(), &[]);
        let before = chat.context().len();

        let files = chat
            .begin_ingestion(vec![pdf("one.pdf"), pdf("two.pdf"), pdf("three.pdf")])
            .expect("batch should start");
        run_ingestion(&backend, IngestOrigin::Chat { session_id: 5 }, files, &tx).await;
        assert_eq!(drain(&mut chat, &rx), 4);

        assert_eq!(
            *backend.ingested.lock().expect("fake backend lock"),
            vec!["one.pdf", "two.pdf", "three.pdf"]
        );
        let statuses: Vec<_> = chat.transcript()[1..]
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(
            statuses,
            vec![
                "📄 Successfully ingested: one.pdf (Added to context)",
                "❌ Failed to ingest two.pdf: cannot parse PDF",
                "📄 Successfully ingested: three.pdf (Added to context)",
            ]
        );
        assert_eq!(chat.context().len(), before + 2);
        assert!(!chat.is_ingesting());
    }

    #[test]
    fn guard_sends_fallback_when_dropped_unsettled() {
        let (tx, rx) = mpsc::channel();
        {
            let _guard = SettleGuard::new(
                tx,
                AppEvent::ChatSettled {
                    session_id: 9,
                    result: Err(BackendError::Interrupted {
                        operation: "chat request",
                    }),
                },
            );
        }
        match rx.try_recv() {
            Ok(AppEvent::ChatSettled {
                session_id: 9,
                result: Err(BackendError::Interrupted { .. }),
            }) => {}
            other => panic!("expected interrupted chat settlement, got {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn settled_guard_sends_exactly_one_event() {
        let (tx, rx) = mpsc::channel();
        let guard = SettleGuard::new(tx, AppEvent::IngestionSettled { origin: IngestOrigin::Home });
        guard.settle(AppEvent::ChatSettled {
            session_id: 1,
            result: Ok(ChatReply::default()),
        });
        assert!(matches!(rx.try_recv(), Ok(AppEvent::ChatSettled { .. })));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn client_reports_results_over_the_channel() {
        let (tx, rx) = mpsc::channel();
        let client = BackendClient::new(
            Arc::new(FakeBackend::new()),
            tx,
            tokio::runtime::Handle::current(),
        );

        client.download_model("gemma-2-2b".to_string());
        let event = tokio::task::spawn_blocking(move || rx.recv_timeout(Duration::from_secs(5)))
            .await
            .expect("blocking receive should join")
            .expect("download should settle");
        match event {
            AppEvent::ModelDownloadSettled { model_id, result } => {
                assert_eq!(model_id, "gemma-2-2b");
                let download = result.expect("fake download succeeds");
                assert_eq!(download.target_dir.as_deref(), Some("/models/gemma-2-2b"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn client_delivers_local_model_listing() {
        let (tx, rx) = mpsc::channel();
        let models = vec![LocalModel {
            key: "llama".to_string(),
            file_name: "Llama-3.2-3B-Instruct-Q4_K_M.gguf".to_string(),
            path: "/models/llama-3.2-3b/Llama-3.2-3B-Instruct-Q4_K_M.gguf".to_string(),
            size_bytes: 2_019_377_696,
            is_loaded: true,
        }];
        let backend = FakeBackend::new().with_local_models(Ok(models.clone()));
        let client = BackendClient::new(Arc::new(backend), tx, tokio::runtime::Handle::current());

        client.list_local_models();
        let event = tokio::task::spawn_blocking(move || rx.recv_timeout(Duration::from_secs(5)))
            .await
            .expect("blocking receive should join")
            .expect("listing should settle");
        match event {
            AppEvent::LocalModelsLoaded(Ok(listed)) => assert_eq!(listed, models),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn panicking_listing_still_settles_the_library() {
        let (tx, rx) = mpsc::channel();
        let client = BackendClient::new(
            Arc::new(FakeBackend::new().panicking()),
            tx,
            tokio::runtime::Handle::current(),
        );
        let mut library = LibraryState::default();
        library.begin_refresh();

        client.list_local_models();
        let event = tokio::task::spawn_blocking(move || rx.recv_timeout(Duration::from_secs(5)))
            .await
            .expect("blocking receive should join")
            .expect("listing should settle even after a panic");
        match event {
            AppEvent::LocalModelsLoaded(result) => {
                assert_eq!(
                    result,
                    Err(BackendError::Interrupted {
                        operation: "local model listing"
                    })
                );
                library.apply(result);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(!library.is_loading());
        assert!(library.error().is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn panicking_initialization_still_reports_readiness() {
        let (tx, rx) = mpsc::channel();
        let client = BackendClient::new(
            Arc::new(FakeBackend::new().panicking()),
            tx,
            tokio::runtime::Handle::current(),
        );

        client.initialize();
        let event = tokio::task::spawn_blocking(move || rx.recv_timeout(Duration::from_secs(5)))
            .await
            .expect("blocking receive should join")
            .expect("initialization should settle even after a panic");
        assert!(matches!(
            event,
            AppEvent::BackendReady(Err(BackendError::Interrupted {
                operation: "backend initialization"
            }))
        ));
    }
}
