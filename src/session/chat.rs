use crate::backend::wire::{ChatReply, ChatRequest, DocumentReference, UploadFile};
use crate::backend::BackendError;
use crate::session::context::DocumentContext;
use crate::session::Message;
use crate::ui::catalog::ModelRef;
use thiserror::Error;
use tracing::debug;

pub const NO_ANSWER: &str = "No answer generated.";

/// Failures that end up as assistant entries in the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("⚠️ Please upload PDF files only.")]
    IngestionRejected,
    #[error("❌ Failed to ingest {file_name}: {message}")]
    IngestionFailed { file_name: String, message: String },
    #[error("Backend error: {message}")]
    ChatRequestFailed { message: String },
}

fn welcome_message(model: &ModelRef) -> String {
    format!(
        "Hi! I'm {}. Ask a question about your documents and I'll answer with sources. \
         You can also drop new PDFs here at any time to add them to my context!",
        model.name
    )
}

/// Chat screen state: transcript, document context and the two busy flags.
///
/// Submits and ingestion batches are two-phase. `submit` / `begin_ingestion`
/// record the optimistic part and hand back the work to run; the caller feeds
/// results back through `complete_send` / `record_ingestion` and finally
/// `finish_ingestion`.
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: u64,
    model: ModelRef,
    transcript: Vec<Message>,
    context: DocumentContext,
    documents: Vec<DocumentReference>,
    input: String,
    is_sending: bool,
    is_ingesting: bool,
}

impl ChatSession {
    pub fn new(id: u64, model: ModelRef, carried: &[DocumentReference]) -> Self {
        let mut context = DocumentContext::new();
        context.seed(carried.iter().map(|reference| reference.document_id));

        let mut documents: Vec<DocumentReference> = Vec::new();
        for reference in carried {
            let seen = documents
                .iter()
                .any(|existing| existing.document_id == reference.document_id);
            if !seen && context.contains(reference.document_id) {
                documents.push(reference.clone());
            }
        }

        Self {
            id,
            transcript: vec![Message::assistant(welcome_message(&model))],
            model,
            context,
            documents,
            input: String::new(),
            is_sending: false,
            is_ingesting: false,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn model(&self) -> &ModelRef {
        &self.model
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn context(&self) -> &DocumentContext {
        &self.context
    }

    pub fn documents(&self) -> &[DocumentReference] {
        &self.documents
    }

    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    #[cfg(test)]
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn is_sending(&self) -> bool {
        self.is_sending
    }

    pub fn is_ingesting(&self) -> bool {
        self.is_ingesting
    }

    pub fn is_busy(&self) -> bool {
        self.is_sending || self.is_ingesting
    }

    pub fn can_submit(&self) -> bool {
        !self.input.trim().is_empty() && !self.is_busy()
    }

    /// Appends the user's question and returns the request to send, or `None`
    /// when the input is blank or another operation is outstanding.
    pub fn submit(&mut self) -> Option<ChatRequest> {
        if !self.can_submit() {
            return None;
        }

        let question = self.input.trim().to_string();
        self.transcript.push(Message::user(question.clone()));
        self.input.clear();
        self.is_sending = true;

        Some(ChatRequest {
            message: question,
            selected_model: self.model.name.clone(),
            selected_model_id: self.model.id_or_empty().to_string(),
            document_ids: self.context.active_ids(),
            top_k: self.model.top_k(),
        })
    }

    /// Records the outcome of the outstanding submit. Ignored when nothing is pending.
    pub fn complete_send(&mut self, result: Result<ChatReply, BackendError>) -> bool {
        if !self.is_sending {
            debug!(session_id = self.id, "ignoring chat result with no pending submit");
            return false;
        }

        let message = match result {
            Ok(reply) => {
                let answer = if reply.answer.trim().is_empty() {
                    NO_ANSWER.to_string()
                } else {
                    reply.answer
                };
                Message::assistant_with_sources(answer, reply.sources)
            }
            Err(error) => Message::assistant(
                SessionError::ChatRequestFailed {
                    message: error.to_string(),
                }
                .to_string(),
            ),
        };
        self.transcript.push(message);
        self.is_sending = false;
        true
    }

    /// Filters a drop down to PDFs and enters the ingesting state. Returns the
    /// files to ingest, or `None` when busy or nothing qualified.
    pub fn begin_ingestion(&mut self, files: Vec<UploadFile>) -> Option<Vec<UploadFile>> {
        if self.is_ingesting || files.is_empty() {
            return None;
        }

        let pdfs: Vec<UploadFile> = files.into_iter().filter(UploadFile::is_pdf).collect();
        if pdfs.is_empty() {
            self.transcript
                .push(Message::assistant(SessionError::IngestionRejected.to_string()));
            return None;
        }

        self.is_ingesting = true;
        Some(pdfs)
    }

    pub fn record_ingestion(
        &mut self,
        file_name: &str,
        result: Result<DocumentReference, BackendError>,
    ) {
        if !self.is_ingesting {
            debug!(session_id = self.id, file_name, "ignoring ingestion result outside a batch");
            return;
        }

        match result {
            Ok(reference) => {
                self.transcript.push(Message::assistant(format!(
                    "📄 Successfully ingested: {file_name} (Added to context)"
                )));
                self.register(reference);
            }
            Err(error) => {
                self.transcript.push(Message::assistant(
                    SessionError::IngestionFailed {
                        file_name: file_name.to_string(),
                        message: error.to_string(),
                    }
                    .to_string(),
                ));
            }
        }
    }

    pub fn finish_ingestion(&mut self) {
        self.is_ingesting = false;
    }

    fn register(&mut self, reference: DocumentReference) {
        if self.context.add(reference.document_id) {
            self.documents.push(reference);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ChatSession, SessionError, NO_ANSWER};
    use crate::backend::wire::{ChatReply, DocumentReference, Source, UploadFile};
    use crate::backend::BackendError;
    use crate::session::{Message, Role};
    use crate::ui::catalog::{find_model, ModelRef};
    use std::path::PathBuf;

    fn reference(id: u64, file_name: &str) -> DocumentReference {
        DocumentReference {
            document_id: id,
            file_name: file_name.to_string(),
            size_bytes: 1024,
            chunks_inserted: 4,
            already_indexed: false,
        }
    }

    fn session() -> ChatSession {
        let model = ModelRef::from(find_model("mistral-7b-instruct").expect("catalog entry"));
        ChatSession::new(1, model, &[reference(1, "a.pdf"), reference(2, "b.pdf")])
    }

    fn pdf(name: &str) -> UploadFile {
        UploadFile::from_path(PathBuf::from(format!("/tmp/{name}")))
    }

    #[test]
    fn new_session_starts_with_welcome_and_carried_documents() {
        let chat = session();
        assert_eq!(chat.transcript().len(), 1);
        assert_eq!(chat.transcript()[0].role, Role::Assistant);
        assert!(chat.transcript()[0]
            .content
            .starts_with("Hi! I'm Mistral 7B Instruct v0.3."));
        assert_eq!(chat.context().active_ids(), vec![1, 2]);
        assert_eq!(chat.documents().len(), 2);
    }

    #[test]
    fn submit_builds_request_from_model_and_context() {
        let mut chat = session();
        chat.set_input("  What changed in v2?  ");

        let request = chat.submit().expect("submit should fire");
        assert_eq!(request.message, "What changed in v2?");
        assert_eq!(request.selected_model, "Mistral 7B Instruct v0.3");
        assert_eq!(request.selected_model_id, "mistral-7b-instruct");
        assert_eq!(request.document_ids, vec![1, 2]);
        assert_eq!(request.top_k, 7);

        assert!(chat.is_sending());
        assert!(chat.input_mut().is_empty());
        assert_eq!(
            chat.transcript().last(),
            Some(&Message::user("What changed in v2?"))
        );
    }

    #[test]
    fn blank_input_never_submits() {
        let mut chat = session();
        chat.set_input(" \t\n ");
        assert!(chat.submit().is_none());
        assert_eq!(chat.transcript().len(), 1);
        assert!(!chat.is_sending());
    }

    #[test]
    fn second_submit_while_sending_is_a_no_op() {
        let mut chat = session();
        chat.set_input("first");
        assert!(chat.submit().is_some());

        chat.set_input("second");
        assert!(chat.submit().is_none());
        let user_turns = chat
            .transcript()
            .iter()
            .filter(|message| message.role == Role::User)
            .count();
        assert_eq!(user_turns, 1);
        assert_eq!(chat.input_mut().as_str(), "second");
    }

    #[test]
    fn submit_is_blocked_while_ingesting() {
        let mut chat = session();
        assert!(chat.begin_ingestion(vec![pdf("c.pdf")]).is_some());
        chat.set_input("question");
        assert!(!chat.can_submit());
        assert!(chat.submit().is_none());
    }

    #[test]
    fn reply_is_appended_verbatim() {
        let mut chat = session();
        chat.set_input("q");
        chat.submit();

        assert!(chat.complete_send(Ok(ChatReply {
            answer: "X".to_string(),
            sources: Vec::new(),
        })));
        assert_eq!(
            chat.transcript().last(),
            Some(&Message {
                role: Role::Assistant,
                content: "X".to_string(),
                sources: Vec::new(),
            })
        );
        assert!(!chat.is_sending());
    }

    #[test]
    fn reply_sources_are_kept() {
        let mut chat = session();
        chat.set_input("q");
        chat.submit();
        let source = Source {
            chunk_id: 8,
            document_id: 2,
            title: "b.pdf".to_string(),
            page: Some(3),
            score: 0.42,
            excerpt: "...".to_string(),
        };
        chat.complete_send(Ok(ChatReply {
            answer: "Answer".to_string(),
            sources: vec![source.clone()],
        }));
        assert_eq!(chat.transcript().last().map(|m| m.sources.clone()), Some(vec![source]));
    }

    #[test]
    fn empty_answer_gets_placeholder() {
        let mut chat = session();
        chat.set_input("q");
        chat.submit();
        chat.complete_send(Ok(ChatReply::default()));
        assert_eq!(chat.transcript().last().map(|m| m.content.as_str()), Some(NO_ANSWER));
    }

    #[test]
    fn failed_request_becomes_assistant_entry() {
        let mut chat = session();
        chat.set_input("q");
        chat.submit();
        chat.complete_send(Err(BackendError::Status {
            status: 500,
            message: "model not found".to_string(),
        }));

        let last = chat.transcript().last().expect("failure entry");
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, "Backend error: model not found");
        assert!(!chat.is_sending());
        assert_eq!(chat.transcript().len(), 3);
    }

    #[test]
    fn stray_result_without_pending_submit_is_ignored() {
        let mut chat = session();
        assert!(!chat.complete_send(Ok(ChatReply::default())));
        assert_eq!(chat.transcript().len(), 1);
    }

    #[test]
    fn non_pdf_drop_is_rejected_with_warning() {
        let mut chat = session();
        let dropped = vec![pdf("notes.txt"), pdf("image.png")];
        assert!(chat.begin_ingestion(dropped).is_none());
        assert!(!chat.is_ingesting());
        assert_eq!(
            chat.transcript().last().map(|m| m.content.clone()),
            Some(SessionError::IngestionRejected.to_string())
        );
    }

    #[test]
    fn empty_drop_changes_nothing() {
        let mut chat = session();
        assert!(chat.begin_ingestion(Vec::new()).is_none());
        assert_eq!(chat.transcript().len(), 1);
    }

    #[test]
    fn ingestion_keeps_only_pdfs_and_blocks_new_batches() {
        let mut chat = session();
        let files = chat
            .begin_ingestion(vec![pdf("c.pdf"), pdf("d.docx"), pdf("E.PDF")])
            .expect("batch should start");
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["c.pdf", "E.PDF"]);
        assert!(chat.begin_ingestion(vec![pdf("f.pdf")]).is_none());
    }

    #[test]
    fn ingestion_results_update_transcript_and_context() {
        let mut chat = session();
        chat.begin_ingestion(vec![pdf("c.pdf"), pdf("d.pdf")]);

        chat.record_ingestion("c.pdf", Ok(reference(3, "c.pdf")));
        chat.record_ingestion(
            "d.pdf",
            Err(BackendError::Status {
                status: 500,
                message: "corrupt file".to_string(),
            }),
        );
        chat.finish_ingestion();

        let tail: Vec<_> = chat.transcript()[1..]
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(
            tail,
            vec![
                "📄 Successfully ingested: c.pdf (Added to context)",
                "❌ Failed to ingest d.pdf: corrupt file",
            ]
        );
        assert_eq!(chat.context().active_ids(), vec![1, 2, 3]);
        assert!(!chat.is_ingesting());
    }

    #[test]
    fn re_ingesting_a_known_document_does_not_duplicate_it() {
        let mut chat = session();
        chat.begin_ingestion(vec![pdf("a.pdf")]);
        chat.record_ingestion("a.pdf", Ok(reference(1, "a.pdf")));
        chat.finish_ingestion();
        assert_eq!(chat.context().active_ids(), vec![1, 2]);
        assert_eq!(chat.documents().len(), 2);
    }

    #[test]
    fn unknown_model_sends_empty_id_and_default_top_k() {
        let mut chat = ChatSession::new(7, ModelRef::unknown(), &[]);
        chat.set_input("hello");
        let request = chat.submit().expect("submit should fire");
        assert_eq!(request.selected_model, "Unknown SLM");
        assert_eq!(request.selected_model_id, "");
        assert_eq!(request.top_k, 5);
        assert!(request.document_ids.is_empty());
    }
}
