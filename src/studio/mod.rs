use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use eframe::egui;
use tokio::runtime::Handle;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{info, warn};

use crate::board::{BoardItem, ItemId};
use crate::canvas::CanvasController;
use crate::config::HubSettings;
use crate::dashboards::{DashboardCatalog, DashboardSelection};
use crate::research::{NormalizedResearch, VisualizationDraft, normalize_response};

pub mod canvas;
pub mod charts;
pub mod events;

use self::canvas::render_board;
use self::events::{StudioCommand, StudioEvent};

const APP_TITLE: &str = "VC Research Hub";
const PREVIEW_CHAR_LIMIT: usize = 180;
const MAX_STATUS_LOG: usize = 24;

pub fn run_studio(settings: &HubSettings) -> Result<()> {
    let runtime_handle = Handle::try_current().context("studio requires a tokio runtime")?;

    let (command_tx, command_rx) = unbounded_channel::<StudioCommand>();
    let (event_tx, event_rx) = unbounded_channel::<StudioEvent>();
    spawn_research_worker(&runtime_handle, command_rx, event_tx);

    let initial = settings.initial_dashboard;
    info!(%initial, "starting native studio shell");

    eframe::run_native(
        APP_TITLE,
        eframe::NativeOptions::default(),
        Box::new(move |_cc| Ok(Box::new(StudioApp::new(initial, command_tx, event_rx)))),
    )
    .map_err(|error| anyhow::anyhow!("studio UI exited with error: {error}"))
}

/// Normalizes pasted assistant output off the UI thread. The canvas itself is
/// never touched here; results travel back as events.
fn spawn_research_worker(
    handle: &Handle,
    mut command_rx: UnboundedReceiver<StudioCommand>,
    event_tx: UnboundedSender<StudioEvent>,
) {
    let _task = handle.spawn(async move {
        let mut next_request_id = 1_u64;
        while let Some(command) = command_rx.recv().await {
            match command {
                StudioCommand::NormalizeResponse { raw } => {
                    let request_id = next_request_id;
                    next_request_id += 1;

                    if event_tx
                        .send(StudioEvent::ResearchStarted {
                            request_id,
                            input_chars: raw.chars().count(),
                            started_at: SystemTime::now(),
                        })
                        .is_err()
                    {
                        break;
                    }

                    let event = match normalize_response(&raw) {
                        Ok(research) => StudioEvent::ResearchCompleted {
                            request_id,
                            research,
                        },
                        Err(error) => {
                            warn!(request_id, error = %error, "research normalization failed");
                            StudioEvent::ResearchFailed { request_id, error }
                        }
                    };
                    if event_tx.send(event).is_err() {
                        break;
                    }
                }
                StudioCommand::Shutdown => break,
            }
        }
    });
}

struct StudioApp {
    catalog: DashboardCatalog,
    canvas: CanvasController,
    selected_item: Option<ItemId>,
    command_tx: UnboundedSender<StudioCommand>,
    event_rx: UnboundedReceiver<StudioEvent>,
    input_buffer: String,
    research: Option<NormalizedResearch>,
    research_error: Option<String>,
    follow_up: Option<String>,
    status_log: Vec<String>,
    request_in_flight: bool,
    runtime_disconnected: bool,
}

impl StudioApp {
    fn new(
        initial: DashboardSelection,
        command_tx: UnboundedSender<StudioCommand>,
        event_rx: UnboundedReceiver<StudioEvent>,
    ) -> Self {
        Self {
            catalog: DashboardCatalog::default(),
            canvas: CanvasController::new(initial),
            selected_item: None,
            command_tx,
            event_rx,
            input_buffer: String::new(),
            research: None,
            research_error: None,
            follow_up: None,
            status_log: vec!["Studio ready. Paste an assistant response to analyze it.".to_owned()],
            request_in_flight: false,
            runtime_disconnected: false,
        }
    }

    fn drain_events(&mut self) {
        loop {
            match self.event_rx.try_recv() {
                Ok(event) => self.apply_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.runtime_disconnected {
                        warn!("studio research worker disconnected");
                        self.push_status("Research worker disconnected. Restart studio to continue.");
                    }
                    self.runtime_disconnected = true;
                    self.request_in_flight = false;
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: StudioEvent) {
        match event {
            StudioEvent::ResearchStarted {
                request_id,
                input_chars,
                ..
            } => {
                self.request_in_flight = true;
                self.push_status(format!("Analyzing request #{request_id} ({input_chars} chars)"));
            }
            StudioEvent::ResearchCompleted {
                request_id,
                research,
            } => {
                self.request_in_flight = false;
                self.push_status(format!(
                    "Request #{request_id}: {} insights, {} visualizations",
                    research.insights.len(),
                    research.drafts.len()
                ));
                self.research = Some(research);
                self.research_error = None;
            }
            StudioEvent::ResearchFailed { request_id, error } => {
                self.request_in_flight = false;
                self.push_status(format!("Request #{request_id} failed: {error}"));
                self.research = None;
                self.research_error = Some(error.to_string());
            }
        }
    }

    fn push_status(&mut self, line: impl Into<String>) {
        self.status_log.push(line.into());
        if self.status_log.len() > MAX_STATUS_LOG {
            let extra = self.status_log.len() - MAX_STATUS_LOG;
            self.status_log.drain(0..extra);
        }
    }

    fn submit_response(&mut self) {
        let raw = self.input_buffer.trim().to_owned();
        if raw.is_empty() {
            return;
        }

        self.request_in_flight = true;
        if let Err(error) = self
            .command_tx
            .send(StudioCommand::NormalizeResponse { raw })
        {
            self.request_in_flight = false;
            self.runtime_disconnected = true;
            self.push_status(format!("Failed to submit response to research worker: {error}"));
        }
    }

    fn select_follow_up(&mut self, question: String) {
        info!(question = %question, "follow-up question selected");
        self.follow_up = Some(question);
    }

    fn switch_dashboard(&mut self, selection: DashboardSelection) {
        if selection == self.canvas.selection() {
            return;
        }
        self.selected_item = None;
        self.canvas.move_to_dashboard(selection);
    }

    fn render_sidebar(&mut self, ui: &mut egui::Ui) {
        ui.heading("Dashboards");
        ui.separator();

        let active = self.canvas.selection();
        let mut requested = None;
        for folder in &self.catalog.folders {
            egui::CollapsingHeader::new(&folder.name)
                .id_salt(("folder", folder.id))
                .default_open(folder.id == active.folder_id)
                .show(ui, |ui| {
                    for dashboard in &folder.dashboards {
                        let selection = DashboardSelection::new(folder.id, dashboard.id);
                        let label = if dashboard.starred {
                            format!("★ {}", dashboard.name)
                        } else {
                            dashboard.name.clone()
                        };
                        if ui.selectable_label(selection == active, label).clicked() {
                            requested = Some(selection);
                        }
                    }
                });
        }
        if let Some(selection) = requested {
            self.switch_dashboard(selection);
        }

        ui.separator();
        let question = match self.selected_item.and_then(|id| self.canvas.item(id)) {
            Some(item) => render_item_details(ui, item),
            None => {
                ui.label("Select an item to see related insights.");
                None
            }
        };
        if let Some(question) = question {
            self.select_follow_up(question);
        }
    }

    fn render_research_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Research");
        ui.separator();
        let mut dismiss_follow_up = false;
        if let Some(question) = &self.follow_up {
            ui.group(|ui| {
                ui.label(egui::RichText::new("Ask your assistant").strong());
                ui.label(question);
                ui.horizontal(|ui| {
                    if ui.button("Copy").clicked() {
                        ui.ctx().copy_text(question.clone());
                    }
                    if ui.button("Dismiss").clicked() {
                        dismiss_follow_up = true;
                    }
                });
            });
        }
        if dismiss_follow_up {
            self.follow_up = None;
        }
        ui.label("Assistant response");
        ui.add(
            egui::TextEdit::multiline(&mut self.input_buffer)
                .hint_text("Paste the assistant's JSON answer...")
                .desired_rows(8),
        );

        let can_send = !self.request_in_flight
            && !self.runtime_disconnected
            && !self.input_buffer.trim().is_empty();
        if ui
            .add_enabled(can_send, egui::Button::new("Analyze"))
            .clicked()
        {
            self.submit_response();
        }
        if self.request_in_flight {
            ui.label("Analyzing...");
        }
        if self.runtime_disconnected {
            ui.colored_label(
                egui::Color32::from_rgb(173, 33, 33),
                "Research worker is disconnected.",
            );
        }

        ui.separator();
        let mut to_add: Vec<VisualizationDraft> = Vec::new();
        egui::ScrollArea::vertical()
            .max_height((ui.available_height() - 140.0).max(160.0))
            .show(ui, |ui| {
                if let Some(error) = &self.research_error {
                    ui.colored_label(
                        egui::Color32::from_rgb(173, 33, 33),
                        format!("Could not read that response: {error}"),
                    );
                    return;
                }
                let Some(research) = &self.research else {
                    ui.label("No research results yet.");
                    return;
                };

                ui.label(egui::RichText::new("Insights").strong());
                for insight in &research.insights {
                    ui.group(|ui| {
                        ui.label(preview_text(&insight.content));
                        ui.label(format!(
                            "Confidence {:.0}% | {}",
                            insight.confidence * 100.0,
                            insight.source
                        ));
                        if ui.button("Add as note").clicked() {
                            to_add.push(VisualizationDraft::from_insight(insight));
                        }
                    });
                }

                ui.add_space(6.0);
                ui.label(egui::RichText::new("Visualizations").strong());
                for draft in &research.drafts {
                    ui.group(|ui| {
                        ui.label(egui::RichText::new(&draft.title).strong());
                        ui.label(format!("{} → {}", draft.visual_type, draft.kind));
                        if let Some(description) = &draft.description {
                            ui.label(preview_text(description));
                        }
                        for follow_up in &draft.related_insights {
                            ui.label(format!("• {}", follow_up.question));
                        }
                        if ui.button("Add to board").clicked() {
                            to_add.push(draft.clone());
                        }
                    });
                }
            });
        for draft in to_add {
            self.canvas.add_visualization(draft);
        }

        ui.separator();
        egui::ScrollArea::vertical()
            .id_salt("status_log")
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for line in &self.status_log {
                    ui.label(line);
                }
            });
    }

    fn render_canvas_pane(&mut self, ui: &mut egui::Ui) {
        let selection = self.canvas.selection();
        let name = self
            .catalog
            .dashboard_name(selection)
            .unwrap_or("Untitled dashboard");

        ui.horizontal(|ui| {
            ui.heading(name);
            ui.separator();
            if ui.button("Add text note").clicked() {
                self.canvas.add_text_note();
            }
            ui.label(format!("{} items", self.canvas.items().len()));
            if let Some(mode) = self.canvas.interaction().mode() {
                ui.label(format!("Interaction: {}", mode.label()));
            }
        });
        ui.separator();

        egui::ScrollArea::both().show(ui, |ui| {
            render_board(ui, &mut self.canvas, &mut self.selected_item);
        });
    }
}

/// Returns the related question the user clicked, if any.
fn render_item_details(ui: &mut egui::Ui, item: &BoardItem) -> Option<String> {
    ui.label(egui::RichText::new(&item.title).strong());
    if let Some(source) = &item.source {
        ui.label(format!("Source: {source}"));
    }
    if let Some(url) = &item.source_url {
        ui.hyperlink(url);
    }
    let mut clicked = None;
    for insight in &item.related_insights {
        ui.group(|ui| {
            ui.label(&insight.text);
            if ui.link(&insight.question).clicked() {
                clicked = Some(insight.question.clone());
            }
        });
    }
    clicked
}

impl Drop for StudioApp {
    fn drop(&mut self) {
        let _ = self.command_tx.send(StudioCommand::Shutdown);
    }
}

impl eframe::App for StudioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();

        egui::SidePanel::left("studio_dashboards")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| self.render_sidebar(ui));

        egui::SidePanel::right("studio_research")
            .resizable(true)
            .default_width(360.0)
            .show(ctx, |ui| self.render_research_panel(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.render_canvas_pane(ui));

        ctx.request_repaint_after(Duration::from_millis(120));
    }
}

fn preview_text(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= PREVIEW_CHAR_LIMIT {
        return trimmed.to_owned();
    }

    let mut preview = trimmed
        .chars()
        .take(PREVIEW_CHAR_LIMIT.saturating_sub(1))
        .collect::<String>();
    preview.push('…');
    preview
}

#[cfg(test)]
mod tests {
    use tokio::runtime::Handle;
    use tokio::sync::mpsc::unbounded_channel;

    use super::events::{StudioCommand, StudioEvent};
    use super::{StudioApp, preview_text, spawn_research_worker};
    use crate::dashboards::DashboardSelection;
    use crate::research::{ResearchError, normalize_response};

    fn idle_app() -> StudioApp {
        let (command_tx, _command_rx) = unbounded_channel();
        let (_event_tx, event_rx) = unbounded_channel();
        StudioApp::new(DashboardSelection::default(), command_tx, event_rx)
    }

    #[test]
    fn preview_text_truncates_long_text() {
        let long_text = "x".repeat(260);
        let preview = preview_text(&long_text);
        assert_eq!(preview.chars().count(), 180);
        assert!(preview.ends_with('…'));
        assert_eq!(preview_text("  short  "), "short");
    }

    #[test]
    fn failed_request_replaces_previous_results_with_error() {
        let mut app = idle_app();
        let research = normalize_response(
            r#"{"insights": [{"content": "Seed rounds cooled"}], "visualizations": []}"#,
        )
        .expect("response should normalize");
        app.apply_event(StudioEvent::ResearchCompleted {
            request_id: 1,
            research,
        });
        assert!(app.research.is_some());

        let error = ResearchError::MalformedResponse {
            reason: "no JSON object found".to_owned(),
        };
        app.request_in_flight = true;
        app.apply_event(StudioEvent::ResearchFailed {
            request_id: 2,
            error: error.clone(),
        });
        assert!(app.research.is_none());
        assert_eq!(app.research_error, Some(error.to_string()));
        assert!(!app.request_in_flight);

        let research = normalize_response(r#"{"insights": [], "visualizations": []}"#)
            .expect("empty response should normalize");
        app.apply_event(StudioEvent::ResearchCompleted {
            request_id: 3,
            research,
        });
        assert!(app.research.is_some());
        assert_eq!(app.research_error, None);
    }

    #[test]
    fn follow_up_questions_leave_the_response_buffer_alone() {
        let mut app = idle_app();
        app.input_buffer = "{\"insights\": []}".to_owned();
        app.select_follow_up("What is driving 2024 growth?".to_owned());
        assert_eq!(app.input_buffer, "{\"insights\": []}");
        assert_eq!(app.follow_up.as_deref(), Some("What is driving 2024 growth?"));
    }

    #[tokio::test]
    async fn worker_reports_start_then_result_for_each_request() {
        let (command_tx, command_rx) = unbounded_channel();
        let (event_tx, mut event_rx) = unbounded_channel();
        spawn_research_worker(&Handle::current(), command_rx, event_tx);

        command_tx
            .send(StudioCommand::NormalizeResponse {
                raw: r#"{"insights": [{"content": "Seed rounds cooled"}], "visualizations": []}"#
                    .to_owned(),
            })
            .expect("worker should accept commands");
        command_tx
            .send(StudioCommand::NormalizeResponse {
                raw: "no json here".to_owned(),
            })
            .expect("worker should accept commands");
        command_tx
            .send(StudioCommand::Shutdown)
            .expect("worker should accept shutdown");

        let mut events = Vec::new();
        while let Some(event) = event_rx.recv().await {
            events.push(event);
        }

        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], StudioEvent::ResearchStarted { request_id: 1, .. }));
        match &events[1] {
            StudioEvent::ResearchCompleted {
                request_id,
                research,
            } => {
                assert_eq!(*request_id, 1);
                assert_eq!(research.insights.len(), 1);
                assert_eq!(research.insights[0].confidence, 0.8);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(matches!(events[2], StudioEvent::ResearchStarted { request_id: 2, .. }));
        assert!(matches!(
            events[3],
            StudioEvent::ResearchFailed {
                request_id: 2,
                error: ResearchError::MalformedResponse { .. }
            }
        ));
    }
}
