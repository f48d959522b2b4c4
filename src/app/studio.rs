use crate::app::assets::ImageAsset;
use crate::app::orchestrator::GenerationOrchestrator;
use crate::config::Settings;
use crate::error::{CollaboratorError, TryOnError};
use crate::generation::collaborator::{Dispatcher, GenerationCollaborator};
use crate::generation::request::{PendingRequest, RequestKind, Ticket};
use crate::ui;
use crate::ui::previews::PreviewCache;
use crate::ui::result_view::PointerTracker;
use eframe::egui;
use eframe::egui::TextureHandle;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Which uploaded photo a file pick is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetSlot {
    Model,
    Product,
}

impl AssetSlot {
    pub fn label(&self) -> &'static str {
        match self {
            AssetSlot::Model => "Model photo",
            AssetSlot::Product => "Product photo",
        }
    }
}

/// Desktop shell: projects the orchestrator's state every frame and turns
/// clicks and pointer input into transitions.
pub struct TryOnApp {
    pub(crate) orchestrator: GenerationOrchestrator,
    collaborator: Arc<dyn GenerationCollaborator>,
    dispatcher: Dispatcher,
    pub(crate) previews: PreviewCache,
    pub(crate) overlay: Option<TextureHandle>,
    pub(crate) pointer: PointerTracker,
    /// Size of the result image on screen during the last frame.
    pub(crate) result_display: Option<(usize, usize)>,
    pub(crate) load_error: Option<String>,
}

impl TryOnApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        settings: &Settings,
        collaborator: Arc<dyn GenerationCollaborator>,
    ) -> Self {
        let mut orchestrator = GenerationOrchestrator::new(settings.require_mask());
        orchestrator.set_brush_size(settings.brush_size);
        orchestrator.controls_mut().aspect_ratio = settings.aspect_ratio;
        log::info!(
            "try-on studio ready (model {}, mask {})",
            collaborator.name(),
            if settings.require_mask() { "required" } else { "off" }
        );
        Self::with_orchestrator(orchestrator, collaborator)
    }

    pub fn with_orchestrator(
        orchestrator: GenerationOrchestrator,
        collaborator: Arc<dyn GenerationCollaborator>,
    ) -> Self {
        Self {
            orchestrator,
            collaborator,
            dispatcher: Dispatcher::new(),
            previews: PreviewCache::new(),
            overlay: None,
            pointer: PointerTracker::default(),
            result_display: None,
            load_error: None,
        }
    }

    pub fn orchestrator(&self) -> &GenerationOrchestrator {
        &self.orchestrator
    }

    /// Read a photo from disk and hand it to the orchestrator.
    pub(crate) fn load_asset(&mut self, slot: AssetSlot, path: &Path) {
        let asset = match ImageAsset::load(path) {
            Ok(asset) => asset,
            Err(err) => {
                log::warn!("{} rejected: {err}", slot.label());
                self.load_error = Some(err.to_string());
                return;
            }
        };
        self.load_error = None;
        let outcome = match slot {
            AssetSlot::Model => self.orchestrator.set_model_asset(asset),
            AssetSlot::Product => self.orchestrator.set_product_asset(asset),
        };
        if let Err(err) = outcome {
            self.load_error = Some(err.to_string());
        }
    }

    /// Send an accepted request to the service on a worker thread.
    pub(crate) fn submit(&mut self, ctx: &egui::Context, request: Result<PendingRequest, TryOnError>) {
        let pending = match request {
            Ok(pending) => pending,
            Err(err) if err.is_validation() => {
                log::info!("request not issued: {err}");
                return;
            }
            Err(err) => {
                log::warn!("request refused: {err}");
                return;
            }
        };
        let repaint = ctx.clone();
        let dispatched = self.dispatcher.dispatch(pending, Arc::clone(&self.collaborator), move || {
            repaint.request_repaint();
        });
        if let Err(pending) = dispatched {
            log::error!("dispatcher busy, failing request {}", pending.ticket);
            let busy = CollaboratorError::Transport("another request is still running".to_string());
            let _ = self.orchestrator.complete(pending.ticket, Err(busy));
        }
    }

    /// Kind and ticket of the call currently running on the worker.
    pub(crate) fn running_request(&self) -> Option<(Ticket, RequestKind)> {
        self.dispatcher.current()
    }

    fn poll_dispatcher(&mut self) {
        if let Some((ticket, outcome)) = self.dispatcher.poll() {
            if let Err(err) = self.orchestrator.complete(ticket, outcome) {
                log::debug!("completion {ticket}: {err}");
            }
        }
    }
}

impl eframe::App for TryOnApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_dispatcher();

        ui::controls::control_panel(self, ctx);
        ui::result_view::edit_toolbar(self, ctx);
        ui::result_view::result_view(self, ctx);

        // The worker wakes us on completion; this only keeps the spinner moving.
        if self.orchestrator.is_pending() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
