use crate::app::assets::ImageAsset;
use crate::generation::aspect_ratio::AspectRatioChoice;

/// Where the try-on workflow currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    ModelReady,
    MaskPending,
    MaskReady,
    Composing,
    ResultReady,
    Editing,
    InpaintPending,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Idle => "Waiting for a model photo",
            Phase::ModelReady => "Model photo loaded",
            Phase::MaskPending => "Extracting garment mask...",
            Phase::MaskReady => "Mask ready",
            Phase::Composing => "Generating try-on image...",
            Phase::ResultReady => "Result ready",
            Phase::Editing => "Paint the region to change",
            Phase::InpaintPending => "Applying region edit...",
        }
    }

    /// A collaborator call is outstanding in this phase.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            Phase::MaskPending | Phase::Composing | Phase::InpaintPending
        )
    }
}

/// User-editable inputs that feed the next request.
#[derive(Clone, Debug, Default)]
pub struct Controls {
    pub instruction: String,
    pub aspect_ratio: AspectRatioChoice,
    pub inpaint_description: String,
}

/// Everything the window projects. Only the orchestrator mutates the
/// fields; the shell edits [`Controls`] directly.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub phase: Phase,
    pub model: Option<ImageAsset>,
    pub product: Option<ImageAsset>,
    pub mask: Option<ImageAsset>,
    pub result: Option<ImageAsset>,
    pub last_error: Option<String>,
    pub controls: Controls,
}

impl AppState {
    pub fn is_pending(&self) -> bool {
        self.phase.is_pending()
    }

    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_request_phases_are_pending() {
        let pending: Vec<Phase> = [
            Phase::Idle,
            Phase::ModelReady,
            Phase::MaskPending,
            Phase::MaskReady,
            Phase::Composing,
            Phase::ResultReady,
            Phase::Editing,
            Phase::InpaintPending,
        ]
        .into_iter()
        .filter(Phase::is_pending)
        .collect();
        assert_eq!(
            pending,
            vec![Phase::MaskPending, Phase::Composing, Phase::InpaintPending]
        );
    }

    #[test]
    fn fresh_state_is_idle_and_empty() {
        let state = AppState::default();
        assert_eq!(state.phase, Phase::Idle);
        assert!(!state.is_pending());
        assert!(!state.has_result());
        assert_eq!(state.controls.aspect_ratio, AspectRatioChoice::UseModel);
    }
}
