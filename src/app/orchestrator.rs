//! The try-on workflow state machine.
//!
//! Transitions are synchronous. Issuing a request hands back a
//! [`PendingRequest`]; the caller runs it and reports the outcome through
//! [`GenerationOrchestrator::complete`]. At most one request is outstanding.

use crate::app::assets::ImageAsset;
use crate::app::state::{AppState, Controls, Phase};
use crate::brush_engine::brush::{Brush, BrushTool};
use crate::canvas::mask::produce_mask;
use crate::canvas::surface::{DrawingSurface, RasterSurface};
use crate::error::{MissingAsset, TryOnError};
use crate::generation::aspect_ratio::{self, AspectRatioChoice};
use crate::generation::collaborator::CollaboratorOutcome;
use crate::generation::prompt::{MASK_EXTRACTION_PROMPT, build_generation_prompt, build_inpaint_prompt};
use crate::generation::request::{GenerationRequest, ImagePayload, PendingRequest, RequestKind, Ticket};
use crate::utils::profiler::ScopeTimer;

struct InFlight {
    ticket: Ticket,
    kind: RequestKind,
    previous: Phase,
}

pub struct GenerationOrchestrator {
    state: AppState,
    surface: Option<DrawingSurface>,
    brush: Brush,
    require_mask: bool,
    in_flight: Option<InFlight>,
    next_ticket: u64,
}

impl Default for GenerationOrchestrator {
    fn default() -> Self {
        Self::new(true)
    }
}

impl GenerationOrchestrator {
    /// `require_mask` selects the masked workflow, where composing needs a
    /// previously extracted garment mask.
    pub fn new(require_mask: bool) -> Self {
        Self {
            state: AppState::default(),
            surface: None,
            brush: Brush::default(),
            require_mask,
            in_flight: None,
            next_ticket: 1,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn controls_mut(&mut self) -> &mut Controls {
        &mut self.state.controls
    }

    pub fn requires_mask(&self) -> bool {
        self.require_mask
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn pending_kind(&self) -> Option<RequestKind> {
        self.in_flight.as_ref().map(|f| f.kind)
    }

    pub fn clear_error(&mut self) {
        self.state.last_error = None;
    }

    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    pub fn set_tool(&mut self, tool: BrushTool) {
        self.brush.tool = tool;
        if let Some(surface) = self.surface.as_mut() {
            surface.set_tool(tool);
        }
    }

    pub fn set_brush_size(&mut self, size: f32) {
        self.brush.set_diameter(size);
        if let Some(surface) = self.surface.as_mut() {
            surface.set_brush_size(size);
        }
    }

    /// The drawing surface, while region editing is active.
    pub fn surface(&self) -> Option<&DrawingSurface> {
        match self.state.phase {
            Phase::Editing => self.surface.as_ref(),
            _ => None,
        }
    }

    pub fn surface_mut(&mut self) -> Option<&mut DrawingSurface> {
        match self.state.phase {
            Phase::Editing => self.surface.as_mut(),
            _ => None,
        }
    }

    pub fn set_model_asset(&mut self, asset: ImageAsset) -> Result<(), TryOnError> {
        self.ensure_idle_request()?;
        log::info!(
            "model photo set: {}x{} {}",
            asset.width(),
            asset.height(),
            asset.mime_type()
        );
        self.state.model = Some(asset);
        if self.state.mask.take().is_some() {
            log::info!("discarding mask extracted from the previous model photo");
        }
        if matches!(self.state.phase, Phase::Idle | Phase::MaskReady) {
            self.state.phase = Phase::ModelReady;
        }
        Ok(())
    }

    pub fn set_product_asset(&mut self, asset: ImageAsset) -> Result<(), TryOnError> {
        self.ensure_idle_request()?;
        log::info!(
            "product photo set: {}x{} {}",
            asset.width(),
            asset.height(),
            asset.mime_type()
        );
        self.state.product = Some(asset);
        Ok(())
    }

    /// Ask the service for a garment mask of the model photo.
    pub fn request_mask(&mut self) -> Result<PendingRequest, TryOnError> {
        self.ensure_idle_request()?;
        let Some(model) = self.state.model.as_ref() else {
            return Err(self.reject(TryOnError::MissingAsset(MissingAsset::Model)));
        };
        let request = GenerationRequest::new(vec![model.to_payload()], MASK_EXTRACTION_PROMPT);
        Ok(self.issue(RequestKind::Mask, request, Phase::MaskPending))
    }

    /// Compose the try-on image from the model, product and (when required) mask.
    pub fn request_generate(&mut self) -> Result<PendingRequest, TryOnError> {
        self.ensure_idle_request()?;
        let missing = match (self.state.model.is_some(), self.state.product.is_some()) {
            (true, true) => None,
            (false, true) => Some(MissingAsset::Model),
            (true, false) => Some(MissingAsset::Product),
            (false, false) => Some(MissingAsset::Both),
        };
        if let Some(missing) = missing {
            return Err(self.reject(TryOnError::MissingAsset(missing)));
        }
        if self.require_mask && self.state.mask.is_none() {
            return Err(self.reject(TryOnError::MissingMask));
        }
        let (Some(model), Some(product)) = (self.state.model.as_ref(), self.state.product.as_ref()) else {
            return Err(TryOnError::MissingAsset(MissingAsset::Both));
        };

        let choice = self.state.controls.aspect_ratio;
        let ratio = match choice {
            AspectRatioChoice::UseModel => aspect_ratio::resolve(model.width(), model.height()),
            AspectRatioChoice::UseProduct => aspect_ratio::resolve(product.width(), product.height()),
            fixed => fixed.fixed_ratio().map(str::to_string),
        };
        let ratio = ratio.unwrap_or_else(|| {
            log::warn!("could not resolve aspect ratio for {choice}, leaving it out of the prompt");
            String::new()
        });
        let prompt = build_generation_prompt(&self.state.controls.instruction, &ratio);

        let mut parts = vec![model.to_payload(), product.to_payload()];
        if let Some(mask) = self.state.mask.as_ref() {
            parts.push(mask.to_payload());
        }
        let request = GenerationRequest::new(parts, prompt);
        Ok(self.issue(RequestKind::Generate, request, Phase::Composing))
    }

    /// Start region editing over the current result. The surface matches
    /// the result's displayed size and always starts empty.
    pub fn enter_edit_mode(&mut self, display_width: usize, display_height: usize) -> Result<(), TryOnError> {
        self.ensure_idle_request()?;
        if self.state.result.is_none() {
            return Err(self.reject(TryOnError::NoResult));
        }
        self.surface = Some(DrawingSurface::attach(display_width, display_height, self.brush.clone()));
        self.state.phase = Phase::Editing;
        self.state.last_error = None;
        log::info!("entered region editing ({display_width}x{display_height})");
        Ok(())
    }

    /// Send the painted region and description for inpainting.
    pub fn request_inpaint(&mut self) -> Result<PendingRequest, TryOnError> {
        self.ensure_idle_request()?;
        if self.state.phase != Phase::Editing {
            return Err(self.reject(TryOnError::NotEditing));
        }
        let description = self.state.controls.inpaint_description.trim().to_string();
        if description.is_empty() {
            return Err(self.reject(TryOnError::EmptyInpaintDescription));
        }
        let mask_png = match self.build_region_mask() {
            Some(png) => png,
            None => return Err(self.reject(TryOnError::MaskConstructionFailed)),
        };
        let Some(result) = self.state.result.as_ref() else {
            return Err(self.reject(TryOnError::NoResult));
        };

        let parts = vec![result.to_payload(), ImagePayload::png(mask_png)];
        let request = GenerationRequest::new(parts, build_inpaint_prompt(&description));
        Ok(self.issue(RequestKind::Inpaint, request, Phase::InpaintPending))
    }

    /// Leave region editing without contacting the service.
    pub fn cancel_edit(&mut self) -> Result<(), TryOnError> {
        self.ensure_idle_request()?;
        if self.state.phase != Phase::Editing {
            return Err(TryOnError::NotEditing);
        }
        self.surface = None;
        self.state.phase = Phase::ResultReady;
        log::info!("region editing cancelled");
        Ok(())
    }

    /// Deliver the outcome of the outstanding request.
    ///
    /// A failure is stored as the last error and also returned. An outcome
    /// whose ticket is not the outstanding one is rejected untouched.
    pub fn complete(&mut self, ticket: Ticket, outcome: CollaboratorOutcome) -> Result<(), TryOnError> {
        match self.in_flight.as_ref() {
            Some(flight) if flight.ticket == ticket => {}
            _ => {
                log::warn!("ignoring stale completion {ticket}");
                return Err(TryOnError::StaleCompletion);
            }
        }
        let Some(flight) = self.in_flight.take() else {
            return Err(TryOnError::StaleCompletion);
        };

        let image = match outcome {
            Ok(Some(payload)) => ImageAsset::from_payload(payload)
                .map_err(|err| TryOnError::CollaboratorFailure(err.to_string())),
            Ok(None) => Err(TryOnError::CollaboratorFailure("no image returned".to_string())),
            Err(err) => Err(TryOnError::CollaboratorFailure(err.to_string())),
        };

        match image {
            Ok(asset) => {
                log::info!(
                    "{} request {ticket} succeeded ({}x{})",
                    flight.kind.label(),
                    asset.width(),
                    asset.height()
                );
                self.apply_success(&flight, asset);
                Ok(())
            }
            Err(err) => {
                log::error!("{} request {ticket} failed: {err}", flight.kind.label());
                self.apply_failure(&flight);
                self.state.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    fn apply_success(&mut self, flight: &InFlight, asset: ImageAsset) {
        match flight.kind {
            // A mask refreshed after a result exists leaves the result view
            // (and any region being painted) where it was.
            RequestKind::Mask => {
                self.state.mask = Some(asset);
                self.state.phase = match flight.previous {
                    Phase::ResultReady | Phase::Editing => flight.previous,
                    _ => Phase::MaskReady,
                };
            }
            RequestKind::Generate | RequestKind::Inpaint => {
                self.state.result = Some(asset);
                self.surface = None;
                self.state.phase = Phase::ResultReady;
            }
        }
    }

    fn apply_failure(&mut self, flight: &InFlight) {
        self.state.phase = match flight.kind {
            RequestKind::Mask => {
                self.state.mask = None;
                match flight.previous {
                    Phase::ResultReady | Phase::Editing => flight.previous,
                    _ => Phase::ModelReady,
                }
            }
            RequestKind::Generate | RequestKind::Inpaint => flight.previous,
        };
    }

    fn build_region_mask(&self) -> Option<Vec<u8>> {
        let _timer = ScopeTimer::new("region mask");
        let mask = produce_mask(self.surface.as_ref().map(|s| s.snapshot()))?;
        if mask.selected_pixels() == 0 {
            log::warn!("region mask is empty, nothing painted");
            return None;
        }
        match mask.encode_png() {
            Ok(png) => Some(png),
            Err(err) => {
                log::error!("failed to encode region mask: {err}");
                None
            }
        }
    }

    fn ensure_idle_request(&self) -> Result<(), TryOnError> {
        match self.in_flight.as_ref() {
            Some(flight) => {
                log::warn!("rejected: {} request {} still pending", flight.kind.label(), flight.ticket);
                Err(TryOnError::RequestInFlight)
            }
            None => Ok(()),
        }
    }

    fn reject(&mut self, err: TryOnError) -> TryOnError {
        log::warn!("request rejected: {err}");
        self.state.last_error = Some(err.to_string());
        err
    }

    fn issue(&mut self, kind: RequestKind, request: GenerationRequest, pending_phase: Phase) -> PendingRequest {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.in_flight = Some(InFlight {
            ticket,
            kind,
            previous: self.state.phase,
        });
        log::info!("{} request {ticket} issued from {:?}", kind.label(), self.state.phase);
        self.state.phase = pending_phase;
        self.state.last_error = None;
        PendingRequest {
            ticket,
            kind,
            request,
        }
    }
}
