use crate::backend::dispatch::BackendClient;
use crate::backend::wire::{Source, UploadFile};
use crate::config::AppConfig;
use crate::event::{AppEvent, IngestOrigin};
use crate::session::Role;
use crate::theme::Theme;
use crate::ui::catalog::{catalog, format_size, ModelRef};
use crate::ui::discover::{DiscoverState, DownloadStatus};
use crate::ui::home::HomeState;
use crate::ui::library::LibraryState;
use crate::ui::navigation::{Navigator, Screen};
use eframe::egui::{self, Color32, RichText, ScrollArea};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

const BUSY_REPAINT: Duration = Duration::from_millis(100);
const CAROUSEL_REPAINT: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq, Eq)]
enum BackendStatus {
    Connecting,
    Ready,
    Unavailable(String),
}

/// Clicks collected while rendering and applied once the frame's panels are drawn.
#[derive(Debug, Clone, PartialEq)]
enum UiAction {
    Navigate(Screen),
    CarouselPrev,
    CarouselNext,
    SelectModel(usize),
    StartFineTune,
    DownloadFineTuned,
    OpenWorkspace,
    RefreshLibrary,
    ChatWith(ModelRef),
    DownloadModel(&'static str),
    CopyCommand {
        model_id: &'static str,
        command: &'static str,
    },
    SubmitChat,
}

pub struct SlmStudioApp {
    rx: Receiver<AppEvent>,
    client: BackendClient,
    config: AppConfig,
    theme: Theme,
    navigator: Navigator,
    home: HomeState,
    library: LibraryState,
    discover: DiscoverState,
    backend_status: BackendStatus,
    diagnostics_log: Vec<String>,
    drop_hover: bool,
    scroll_to_bottom: bool,
}

impl SlmStudioApp {
    pub fn new(rx: Receiver<AppEvent>, client: BackendClient, config: AppConfig, theme: Theme) -> Self {
        let home = HomeState::new(
            config.carousel_interval,
            &config.finetune_default_name,
            Instant::now(),
        );
        Self {
            rx,
            client,
            config,
            theme,
            navigator: Navigator::new(),
            home,
            library: LibraryState::default(),
            discover: DiscoverState::default(),
            backend_status: BackendStatus::Connecting,
            diagnostics_log: Vec::new(),
            drop_hover: false,
            scroll_to_bottom: false,
        }
    }

    fn timestamp() -> String {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(duration) => duration.as_secs().to_string(),
            Err(_) => "0".to_string(),
        }
    }

    fn log_diagnostic(&mut self, message: impl Into<String>) {
        self.diagnostics_log
            .push(format!("[{}] {}", Self::timestamp(), message.into()));
    }

    fn backend_label(&self) -> (String, Color32) {
        match &self.backend_status {
            BackendStatus::Connecting => ("Connecting...".to_string(), Color32::YELLOW),
            BackendStatus::Ready => ("Backend ready".to_string(), self.theme.success),
            BackendStatus::Unavailable(_) => ("Backend unavailable".to_string(), self.theme.danger),
        }
    }

    fn has_work_in_flight(&self) -> bool {
        self.backend_status == BackendStatus::Connecting
            || self.home.is_ingesting()
            || self.home.fine_tune.is_downloading
            || (self.home.fine_tune.is_training && self.home.fine_tune.job_id.is_none())
            || self.library.is_loading()
            || self.discover.downloading_id().is_some()
            || self.navigator.chat().is_some_and(|chat| chat.is_busy())
    }

    fn refresh_library(&mut self) {
        if self.library.begin_refresh() {
            self.client.list_local_models();
        }
    }

    fn drain_events(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.apply_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.log_diagnostic("event channel disconnected");
                    break;
                }
            }
        }
    }

    fn log_stale(&mut self, session_id: u64, what: &str) {
        debug!(session_id, what, "dropping result for a closed chat session");
        self.log_diagnostic(format!("ignored stale {what} for chat session {session_id}"));
    }

    fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::BackendReady(Ok(ack)) => {
                self.backend_status = BackendStatus::Ready;
                self.log_diagnostic(format!(
                    "backend initialized: {}",
                    ack.message.or(ack.status).unwrap_or_else(|| "ok".to_string())
                ));
            }
            AppEvent::BackendReady(Err(error)) => {
                self.log_diagnostic(format!("backend initialization failed: {error}"));
                self.backend_status = BackendStatus::Unavailable(error.to_string());
            }
            AppEvent::DocumentIngested {
                origin: IngestOrigin::Home,
                file_name,
                result,
            } => {
                if let Err(error) = &result {
                    self.log_diagnostic(format!("ingestion of {file_name} failed: {error}"));
                }
                self.home.record_upload(&file_name, result);
            }
            AppEvent::DocumentIngested {
                origin: IngestOrigin::Chat { session_id },
                file_name,
                result,
            } => match self.navigator.chat_for(session_id) {
                Some(chat) => {
                    chat.record_ingestion(&file_name, result);
                    self.scroll_to_bottom = true;
                }
                None => self.log_stale(session_id, "ingestion result"),
            },
            AppEvent::IngestionSettled {
                origin: IngestOrigin::Home,
            } => self.home.finish_upload(),
            AppEvent::IngestionSettled {
                origin: IngestOrigin::Chat { session_id },
            } => match self.navigator.chat_for(session_id) {
                Some(chat) => chat.finish_ingestion(),
                None => self.log_stale(session_id, "ingestion completion"),
            },
            AppEvent::ChatSettled { session_id, result } => {
                if let Err(error) = &result {
                    self.log_diagnostic(format!("chat request failed: {error}"));
                }
                match self.navigator.chat_for(session_id) {
                    Some(chat) => {
                        chat.complete_send(result);
                        self.scroll_to_bottom = true;
                    }
                    None => self.log_stale(session_id, "chat reply"),
                }
            }
            AppEvent::LocalModelsLoaded(result) => {
                if let Err(error) = &result {
                    self.log_diagnostic(format!("listing local models failed: {error}"));
                }
                self.library.apply(result);
            }
            AppEvent::ModelDownloadSettled { model_id, result } => {
                if let Err(error) = &result {
                    self.log_diagnostic(format!("download of {model_id} failed: {error}"));
                }
                self.discover.apply_download(&model_id, result);
            }
            AppEvent::FineTuneStarted(result) => {
                if let Err(error) = &result {
                    self.log_diagnostic(format!("fine-tuning request failed: {error}"));
                }
                self.home.apply_fine_tune_started(result);
            }
            AppEvent::FineTunedDownloadSettled {
                custom_name,
                result,
            } => {
                if let Err(error) = &result {
                    self.log_diagnostic(format!("fine-tuned download failed: {error}"));
                }
                self.home.apply_fine_tuned_download(&custom_name, result);
            }
        }
    }

    fn perform(&mut self, action: UiAction, ctx: &egui::Context) {
        match action {
            UiAction::Navigate(screen) => {
                if self.navigator.navigate(screen) && screen == Screen::YourModels {
                    self.refresh_library();
                }
            }
            UiAction::CarouselPrev => self.home.carousel.prev(),
            UiAction::CarouselNext => self.home.carousel.next(),
            UiAction::SelectModel(index) => {
                self.home.carousel.select(index);
            }
            UiAction::StartFineTune => {
                if self.home.begin_fine_tune() {
                    self.client
                        .start_fine_tune(self.config.finetune_dataset.clone());
                }
            }
            UiAction::DownloadFineTuned => {
                if let Some(custom_name) = self.home.begin_fine_tuned_download() {
                    self.client.download_fine_tuned(custom_name);
                }
            }
            UiAction::OpenWorkspace => {
                let model = self.home.selected_model();
                let documents = self.home.uploaded().to_vec();
                self.navigator.start_chat(model, &documents);
                self.scroll_to_bottom = true;
            }
            UiAction::ChatWith(model) => {
                self.navigator.start_chat(Some(model), &[]);
                self.scroll_to_bottom = true;
            }
            UiAction::RefreshLibrary => self.refresh_library(),
            UiAction::DownloadModel(model_id) => {
                if self.discover.begin_download(model_id) {
                    self.client.download_model(model_id.to_string());
                }
            }
            UiAction::CopyCommand { model_id, command } => {
                ctx.copy_text(command.to_string());
                self.discover.mark_copied(model_id, Instant::now());
            }
            UiAction::SubmitChat => {
                let Some(chat) = self.navigator.chat_mut() else {
                    return;
                };
                let session_id = chat.id();
                if let Some(request) = chat.submit() {
                    self.client.send_chat(session_id, request);
                    self.scroll_to_bottom = true;
                }
            }
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let (hovering, dropped) = ctx.input(|i| {
            (
                !i.raw.hovered_files.is_empty(),
                i.raw.dropped_files.clone(),
            )
        });
        self.drop_hover = hovering;
        if dropped.is_empty() {
            return;
        }

        let files: Vec<UploadFile> = dropped.into_iter().map(upload_from_drop).collect();
        match self.navigator.current() {
            Screen::Home => {
                if let Some(files) = self.home.begin_upload(files) {
                    self.client.ingest(IngestOrigin::Home, files);
                }
            }
            Screen::Chat => {
                if let Some(chat) = self.navigator.chat_mut() {
                    let session_id = chat.id();
                    if let Some(files) = chat.begin_ingestion(files) {
                        self.client
                            .ingest(IngestOrigin::Chat { session_id }, files);
                    }
                    self.scroll_to_bottom = true;
                }
            }
            other => debug!(
                screen = other.as_str(),
                count = files.len(),
                "ignoring files dropped outside an upload area"
            ),
        }
    }

    fn render_top_bar(&mut self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        let (status_label, status_color) = self.backend_label();
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new("SLM Studio")
                        .strong()
                        .color(self.theme.brand_purple_soft),
                );
                ui.separator();
                for screen in Screen::NAV {
                    let active = self.navigator.current() == screen;
                    if ui.selectable_label(active, screen.label()).clicked() {
                        actions.push(UiAction::Navigate(screen));
                    }
                }
                if self.navigator.current() == Screen::Chat {
                    let _ = ui.selectable_label(true, Screen::Chat.label());
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let response = ui.label(RichText::new(status_label).color(status_color));
                    if let BackendStatus::Unavailable(reason) = &self.backend_status {
                        response.on_hover_text(reason);
                    }
                });
            });
        });
    }

    fn render_diagnostics(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("diagnostics_panel").show(ctx, |ui| {
            egui::CollapsingHeader::new("Diagnostics")
                .default_open(false)
                .show(ui, |ui| {
                    ScrollArea::vertical()
                        .id_salt("diagnostics_log")
                        .max_height(90.0)
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            for entry in &self.diagnostics_log {
                                ui.label(entry);
                            }
                        });
                });
        });
    }

    fn render_home(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        let muted = self.theme.text_muted;
        ui.heading("Pick a small language model");
        ui.label(
            RichText::new("Choose a model, drop your PDFs and open a workspace to chat with them.")
                .color(muted),
        );
        ui.add_space(self.theme.spacing_8);

        let window = self.home.carousel.window();
        let selected = self.home.carousel.selected();
        ui.horizontal(|ui| {
            if ui.button("<").clicked() {
                actions.push(UiAction::CarouselPrev);
            }
            for index in window {
                let Some(entry) = catalog().get(index) else {
                    continue;
                };
                let is_selected = selected == Some(index);
                self.theme.selectable_card_frame(is_selected).show(ui, |ui| {
                    ui.set_width(220.0);
                    ui.label(
                        RichText::new(format!("{} • {}", entry.family, entry.size))
                            .small()
                            .color(muted),
                    );
                    ui.strong(entry.name);
                    ui.label(RichText::new(entry.price_label).color(self.theme.brand_orange));
                    ui.label(RichText::new(entry.why_use).small());
                    let label = if is_selected { "Selected" } else { "Select" };
                    if ui.add_enabled(!is_selected, egui::Button::new(label)).clicked() {
                        actions.push(UiAction::SelectModel(index));
                    }
                });
            }
            if ui.button(">").clicked() {
                actions.push(UiAction::CarouselNext);
            }
        });

        ui.add_space(self.theme.spacing_16);
        let drop_fill = if self.drop_hover {
            self.theme.surface_3
        } else {
            self.theme.surface_2
        };
        self.theme
            .panel_frame(drop_fill, self.theme.spacing_16 as i8)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.strong("Documents");
                if self.home.is_ingesting() {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Ingesting documents...");
                    });
                } else {
                    ui.label(
                        RichText::new("Drop PDF files anywhere in this window to add them to your workspace.")
                            .color(muted),
                    );
                }
                for reference in self.home.uploaded() {
                    ui.label(format!(
                        "{} · {}",
                        reference.file_name,
                        format_size(reference.size_bytes)
                    ));
                }
                for line in self.home.upload_status() {
                    ui.label(RichText::new(line).small().color(muted));
                }
            });

        ui.add_space(self.theme.spacing_8);
        self.theme.card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.strong("Fine-tuning");
            ui.label(
                RichText::new(format!("Dataset: {}", self.config.finetune_dataset))
                    .small()
                    .color(muted),
            );
            ui.horizontal(|ui| {
                let label = if self.home.fine_tune.is_training {
                    "Training..."
                } else {
                    "Start fine-tune"
                };
                if ui
                    .add_enabled(self.home.can_start_fine_tune(), egui::Button::new(label))
                    .clicked()
                {
                    actions.push(UiAction::StartFineTune);
                }
                if self.home.fine_tune.job_id.is_some() {
                    ui.add(
                        egui::TextEdit::singleline(&mut self.home.fine_tune.custom_name)
                            .desired_width(200.0)
                            .hint_text("Model name"),
                    );
                    let label = if self.home.fine_tune.is_downloading {
                        "Downloading..."
                    } else {
                        "Download fine-tuned"
                    };
                    if ui
                        .add_enabled(self.home.can_download_fine_tuned(), egui::Button::new(label))
                        .clicked()
                    {
                        actions.push(UiAction::DownloadFineTuned);
                    }
                }
            });
            if let Some(status) = &self.home.fine_tune.status {
                ui.label(status);
            }
        });

        ui.add_space(self.theme.spacing_16);
        let model_label = self
            .home
            .selected_model()
            .map(|model| model.name)
            .unwrap_or_else(|| "no model selected".to_string());
        if ui
            .add_enabled(
                !self.home.is_ingesting(),
                self.theme.primary_button("Open workspace"),
            )
            .on_hover_text(format!("Chat with {model_label}"))
            .clicked()
        {
            actions.push(UiAction::OpenWorkspace);
        }
    }

    fn render_your_models(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        let muted = self.theme.text_muted;
        ui.horizontal(|ui| {
            ui.heading("Your models");
            if ui
                .add_enabled(!self.library.is_loading(), egui::Button::new("Refresh"))
                .clicked()
            {
                actions.push(UiAction::RefreshLibrary);
            }
            if self.library.is_loading() {
                ui.spinner();
            }
        });
        if let Some(error) = self.library.error() {
            ui.label(RichText::new(error).color(self.theme.danger));
        }
        if self.library.is_empty_after_load() {
            ui.label(
                RichText::new("No local GGUF models yet. Download one from Discover or fine-tune your own.")
                    .color(muted),
            );
        }

        ScrollArea::vertical().id_salt("library_scroll").show(ui, |ui| {
            for (model, entry) in self.library.entries() {
                self.theme.card_frame().show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.horizontal(|ui| {
                        let family = entry
                            .map(|entry| format!("{} • {}", entry.family, entry.size))
                            .unwrap_or_else(|| "Local GGUF".to_string());
                        ui.label(RichText::new(family).small().color(muted));
                        let (badge, color) = if model.is_loaded {
                            ("Loaded", self.theme.success)
                        } else {
                            ("Available", muted)
                        };
                        ui.label(self.theme.badge(badge, color));
                    });
                    let model_ref = ModelRef::from_local(model);
                    ui.strong(model_ref.name.as_str());
                    ui.label(RichText::new(model.file_name.as_str()).small().color(muted));
                    ui.label(RichText::new(format_size(model.size_bytes)).small().color(muted));
                    if ui.add(self.theme.primary_button("Start chat")).clicked() {
                        actions.push(UiAction::ChatWith(model_ref));
                    }
                });
            }
        });
    }

    fn render_discover(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        let muted = self.theme.text_muted;
        let now = Instant::now();
        ui.heading("Discover models");
        if let Some(status) = self.discover.status() {
            let ok = matches!(status, DownloadStatus::Succeeded(_));
            ui.label(RichText::new(status.text()).color(self.theme.status_color(ok)));
        }

        let busy = self.discover.downloading_id().is_some();
        ScrollArea::vertical().id_salt("discover_scroll").show(ui, |ui| {
            for entry in catalog() {
                self.theme.card_frame().show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.horizontal(|ui| {
                        ui.strong(entry.name);
                        if entry.mandatory {
                            ui.label(self.theme.badge("Core", self.theme.brand_orange));
                        } else if entry.loaded_by_default {
                            ui.label(self.theme.badge("Preloaded", self.theme.brand_purple_soft));
                        }
                        ui.label(
                            RichText::new(format!(
                                "{} • {} • {}",
                                entry.family, entry.size, entry.quantization
                            ))
                            .small()
                            .color(muted),
                        );
                    });
                    ui.label(entry.description);
                    ui.label(RichText::new(entry.why_use).color(self.theme.brand_purple_soft));
                    ui.horizontal_wrapped(|ui| {
                        for strength in entry.strengths {
                            ui.label(RichText::new(*strength).small().color(self.theme.success));
                        }
                    });
                    ui.label(RichText::new(entry.best_for).small().color(muted));
                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new(entry.price_label)
                                .strong()
                                .color(self.theme.brand_orange),
                        );
                        let label = if self.discover.is_downloading(entry.id) {
                            "Downloading..."
                        } else {
                            "Download"
                        };
                        if ui.add_enabled(!busy, self.theme.primary_button(label)).clicked() {
                            actions.push(UiAction::DownloadModel(entry.id));
                        }
                        let copy_label = if self.discover.is_copied(entry.id, now) {
                            "Copied!"
                        } else {
                            "Copy CLI command"
                        };
                        if ui.button(copy_label).clicked() {
                            actions.push(UiAction::CopyCommand {
                                model_id: entry.id,
                                command: entry.command,
                            });
                        }
                        ui.hyperlink_to("Model page", entry.download_url);
                    });
                });
                ui.add_space(self.theme.spacing_8);
            }
        });
    }

    fn render_chat(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        let theme = &self.theme;
        let scroll_to_bottom = self.scroll_to_bottom;
        let Some(chat) = self.navigator.chat_mut() else {
            ui.label("No chat session. Pick a model to start one.");
            return;
        };

        ui.horizontal(|ui| {
            ui.heading(chat.model().name.as_str());
            let context_label = if chat.context().is_empty() {
                "No documents yet, drop PDFs here".to_string()
            } else {
                format!("{} document(s) in context", chat.context().len())
            };
            let response = ui.label(RichText::new(context_label).color(theme.text_muted));
            if !chat.documents().is_empty() {
                let names: Vec<&str> = chat
                    .documents()
                    .iter()
                    .map(|reference| reference.file_name.as_str())
                    .collect();
                response.on_hover_text(names.join("\n"));
            }
            if chat.is_ingesting() {
                ui.spinner();
                ui.label("Ingesting...");
            }
        });
        ui.separator();

        let session_id = chat.id();
        let transcript_height = (ui.available_height() - 70.0).max(120.0);
        ScrollArea::vertical()
            .id_salt("chat_transcript")
            .max_height(transcript_height)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for (index, message) in chat.transcript().iter().enumerate() {
                    let from_user = message.role == Role::User;
                    theme.bubble_frame(from_user).show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        let speaker = if from_user { "You" } else { chat.model().name.as_str() };
                        ui.label(RichText::new(speaker).small().color(theme.text_muted));
                        ui.label(message.content.as_str());
                        if !message.sources.is_empty() {
                            render_sources(ui, theme, (session_id, index), &message.sources);
                        }
                    });
                }
                if chat.is_sending() {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(RichText::new("Thinking...").color(theme.text_muted));
                    });
                }
                if scroll_to_bottom {
                    ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                }
            });

        ui.separator();
        let hint = if chat.is_sending() {
            "Waiting for response..."
        } else if chat.is_ingesting() {
            "Ingesting documents..."
        } else {
            "Ask about your documents..."
        };
        let input_enabled = !chat.is_busy();
        let mut send_now = false;
        ui.horizontal(|ui| {
            let width = (ui.available_width() - 80.0).max(120.0);
            let response = ui.add_enabled(
                input_enabled,
                egui::TextEdit::singleline(chat.input_mut())
                    .desired_width(width)
                    .hint_text(hint),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                send_now = true;
            }
            send_now |= ui
                .add_enabled(chat.can_submit(), theme.primary_button("Send"))
                .clicked();
        });
        if send_now {
            actions.push(UiAction::SubmitChat);
        }
        self.scroll_to_bottom = false;
    }

    fn schedule_repaint(&self, ctx: &egui::Context, now: Instant) {
        if self.has_work_in_flight() || self.discover.has_pending_flash(now) {
            ctx.request_repaint_after(BUSY_REPAINT);
        } else if self.home.carousel.is_auto_advancing() && self.navigator.current() == Screen::Home {
            ctx.request_repaint_after(CAROUSEL_REPAINT);
        }
    }
}

fn render_sources(ui: &mut egui::Ui, theme: &Theme, salt: (u64, usize), sources: &[Source]) {
    egui::CollapsingHeader::new(format!("Sources ({})", sources.len()))
        .id_salt(salt)
        .default_open(false)
        .show(ui, |ui| {
            for source in sources {
                ui.label(RichText::new(source.heading()).small().strong());
                if !source.excerpt.is_empty() {
                    ui.label(RichText::new(source.excerpt.as_str()).small().color(theme.text_muted));
                }
            }
        });
}

fn upload_from_drop(file: egui::DroppedFile) -> UploadFile {
    let mut upload = match file.path {
        Some(path) => UploadFile::from_path(path),
        None => UploadFile {
            name: String::new(),
            mime: String::new(),
            path: None,
            bytes: None,
        },
    };
    if !file.name.is_empty() {
        upload.name = file.name;
    }
    upload.mime = file.mime;
    upload.bytes = file.bytes;
    if upload.name.is_empty() {
        warn!("dropped file has neither a name nor a path");
    }
    upload
}

impl eframe::App for SlmStudioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();
        let now = Instant::now();
        self.home.carousel.tick(now);
        self.handle_dropped_files(ctx);

        let mut actions = Vec::new();
        self.render_top_bar(ctx, &mut actions);
        self.render_diagnostics(ctx);
        egui::CentralPanel::default().show(ctx, |ui| match self.navigator.current() {
            Screen::Home => {
                ScrollArea::vertical()
                    .id_salt("home_scroll")
                    .show(ui, |ui| self.render_home(ui, &mut actions));
            }
            Screen::YourModels => self.render_your_models(ui, &mut actions),
            Screen::Discover => self.render_discover(ui, &mut actions),
            Screen::Chat => self.render_chat(ui, &mut actions),
        });

        for action in actions {
            self.perform(action, ctx);
        }
        self.schedule_repaint(ctx, now);
    }
}
