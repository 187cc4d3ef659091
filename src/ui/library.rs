use crate::backend::wire::LocalModel;
use crate::backend::BackendError;
use crate::ui::catalog::{match_local_model, ModelDescriptor};

/// Local model listing for the "Your models" screen.
#[derive(Debug, Default)]
pub struct LibraryState {
    models: Vec<LocalModel>,
    loading: bool,
    error: Option<String>,
    loaded_once: bool,
}

impl LibraryState {
    pub fn models(&self) -> &[LocalModel] {
        &self.models
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_empty_after_load(&self) -> bool {
        self.loaded_once && !self.loading && self.error.is_none() && self.models.is_empty()
    }

    /// Returns false while a listing is already outstanding.
    pub fn begin_refresh(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        self.error = None;
        true
    }

    pub fn apply(&mut self, result: Result<Vec<LocalModel>, BackendError>) {
        self.loading = false;
        self.loaded_once = true;
        match result {
            Ok(models) => self.models = models,
            Err(error) => self.error = Some(error.to_string()),
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (&LocalModel, Option<&'static ModelDescriptor>)> {
        self.models
            .iter()
            .map(|model| (model, match_local_model(model)))
    }
}
