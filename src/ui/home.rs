use crate::backend::wire::{DocumentReference, FineTuneJob, FineTunedDownload, UploadFile};
use crate::backend::BackendError;
use crate::session::chat::SessionError;
use crate::ui::carousel::Carousel;
use crate::ui::catalog::{catalog, ModelRef};
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FineTuneState {
    pub is_training: bool,
    pub job_id: Option<String>,
    pub is_downloading: bool,
    pub custom_name: String,
    pub status: Option<String>,
}

#[derive(Debug)]
pub struct HomeState {
    pub carousel: Carousel,
    uploaded: Vec<DocumentReference>,
    is_ingesting: bool,
    upload_status: Vec<String>,
    pub fine_tune: FineTuneState,
}

impl HomeState {
    pub fn new(carousel_interval: Duration, default_custom_name: &str, now: Instant) -> Self {
        Self {
            carousel: Carousel::new(catalog().len(), carousel_interval, now),
            uploaded: Vec::new(),
            is_ingesting: false,
            upload_status: Vec::new(),
            fine_tune: FineTuneState {
                custom_name: default_custom_name.to_string(),
                ..FineTuneState::default()
            },
        }
    }

    pub fn selected_model(&self) -> Option<ModelRef> {
        self.carousel
            .selected()
            .and_then(|index| catalog().get(index))
            .map(ModelRef::from)
    }

    pub fn uploaded(&self) -> &[DocumentReference] {
        &self.uploaded
    }

    pub fn upload_status(&self) -> &[String] {
        &self.upload_status
    }

    pub fn is_ingesting(&self) -> bool {
        self.is_ingesting
    }

    pub fn begin_upload(&mut self, files: Vec<UploadFile>) -> Option<Vec<UploadFile>> {
        if self.is_ingesting || files.is_empty() {
            return None;
        }
        let pdfs: Vec<UploadFile> = files.into_iter().filter(UploadFile::is_pdf).collect();
        if pdfs.is_empty() {
            self.upload_status
                .push(SessionError::IngestionRejected.to_string());
            return None;
        }
        self.is_ingesting = true;
        Some(pdfs)
    }

    pub fn record_upload(&mut self, file_name: &str, result: Result<DocumentReference, BackendError>) {
        match result {
            Ok(reference) => {
                let line = if reference.already_indexed {
                    format!("{file_name} was already indexed")
                } else {
                    format!(
                        "Uploaded {file_name} ({} chunks)",
                        reference.chunks_inserted
                    )
                };
                self.upload_status.push(line);
                if self
                    .uploaded
                    .iter()
                    .all(|existing| existing.document_id != reference.document_id)
                {
                    self.uploaded.push(reference);
                }
            }
            Err(error) => self.upload_status.push(
                SessionError::IngestionFailed {
                    file_name: file_name.to_string(),
                    message: error.to_string(),
                }
                .to_string(),
            ),
        }
    }

    pub fn finish_upload(&mut self) {
        self.is_ingesting = false;
    }

    pub fn can_start_fine_tune(&self) -> bool {
        self.carousel.selected().is_some()
            && !self.fine_tune.is_training
            && !self.fine_tune.is_downloading
    }

    pub fn begin_fine_tune(&mut self) -> bool {
        if !self.can_start_fine_tune() {
            return false;
        }
        self.fine_tune.is_training = true;
        self.fine_tune.job_id = None;
        self.fine_tune.status = Some("Initializing fine-tuning containers...".to_string());
        true
    }

    pub fn apply_fine_tune_started(&mut self, result: Result<FineTuneJob, BackendError>) {
        match result {
            Ok(FineTuneJob {
                job_id: Some(job_id),
            }) => {
                self.fine_tune.status = Some(format!("Training in progress (ID: {job_id})"));
                self.fine_tune.job_id = Some(job_id);
            }
            Ok(FineTuneJob { job_id: None }) => {
                debug!("fine-tune response carried no job id");
                self.fine_tune.is_training = false;
                self.fine_tune.status =
                    Some("Fine-tuning request accepted but no job id was returned.".to_string());
            }
            Err(error) => {
                self.fine_tune.is_training = false;
                self.fine_tune.status = Some(format!("Error: {error}"));
            }
        }
    }

    pub fn can_download_fine_tuned(&self) -> bool {
        self.fine_tune.job_id.is_some()
            && !self.fine_tune.is_downloading
            && !self.fine_tune.custom_name.trim().is_empty()
    }

    /// Returns the trimmed custom name to request.
    pub fn begin_fine_tuned_download(&mut self) -> Option<String> {
        if !self.can_download_fine_tuned() {
            return None;
        }
        self.fine_tune.is_downloading = true;
        self.fine_tune.status = Some("Downloading GGUF from cloud...".to_string());
        Some(self.fine_tune.custom_name.trim().to_string())
    }

    pub fn apply_fine_tuned_download(
        &mut self,
        custom_name: &str,
        result: Result<FineTunedDownload, BackendError>,
    ) {
        self.fine_tune.is_downloading = false;
        self.fine_tune.status = Some(match result {
            Ok(_) => format!("{custom_name} is now available in 'Your models'."),
            Err(error) => format!("Download error: {error}"),
        });
    }
}
