use crate::backend::wire::ModelDownload;
use crate::backend::BackendError;
use crate::ui::catalog::find_model;
use std::time::{Duration, Instant};

const COPIED_FLASH: Duration = Duration::from_millis(1200);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadStatus {
    Succeeded(String),
    Failed(String),
}

impl DownloadStatus {
    pub fn text(&self) -> &str {
        match self {
            Self::Succeeded(text) | Self::Failed(text) => text,
        }
    }
}

/// One download at a time, plus the transient "copied" marker for CLI commands.
#[derive(Debug, Default)]
pub struct DiscoverState {
    downloading_id: Option<String>,
    status: Option<DownloadStatus>,
    copied: Option<(String, Instant)>,
}

impl DiscoverState {
    pub fn downloading_id(&self) -> Option<&str> {
        self.downloading_id.as_deref()
    }

    pub fn is_downloading(&self, model_id: &str) -> bool {
        self.downloading_id.as_deref() == Some(model_id)
    }

    pub fn status(&self) -> Option<&DownloadStatus> {
        self.status.as_ref()
    }

    pub fn begin_download(&mut self, model_id: &str) -> bool {
        if self.downloading_id.is_some() {
            return false;
        }
        self.status = None;
        self.downloading_id = Some(model_id.to_string());
        true
    }

    pub fn apply_download(&mut self, model_id: &str, result: Result<ModelDownload, BackendError>) {
        if self.downloading_id.as_deref() == Some(model_id) {
            self.downloading_id = None;
        }
        self.status = Some(match result {
            Ok(download) => DownloadStatus::Succeeded(download_summary(model_id, &download)),
            Err(error) => DownloadStatus::Failed(error.to_string()),
        });
    }

    pub fn mark_copied(&mut self, model_id: &str, now: Instant) {
        self.copied = Some((model_id.to_string(), now));
    }

    pub fn is_copied(&self, model_id: &str, now: Instant) -> bool {
        matches!(
            &self.copied,
            Some((id, at)) if id == model_id && now.saturating_duration_since(*at) < COPIED_FLASH
        )
    }

    pub fn has_pending_flash(&self, now: Instant) -> bool {
        self.copied
            .as_ref()
            .is_some_and(|(_, at)| now.saturating_duration_since(*at) < COPIED_FLASH)
    }
}

fn download_summary(model_id: &str, download: &ModelDownload) -> String {
    let name = find_model(model_id)
        .map(|entry| entry.name)
        .unwrap_or(model_id);
    let count = download.downloaded_files.len();
    let plural = if count == 1 { "" } else { "s" };
    let dir = download.target_dir.as_deref().unwrap_or("the models directory");
    format!("{name} downloaded locally ({count} file{plural}) in {dir}")
}
