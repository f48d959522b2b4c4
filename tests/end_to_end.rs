use image::{ImageFormat, Rgba, RgbaImage};
use rusty_tryon::canvas::surface::RasterSurface;
use rusty_tryon::error::CollaboratorError;
use rusty_tryon::generation::collaborator::{CollaboratorOutcome, Dispatcher, GenerationCollaborator};
use rusty_tryon::generation::request::{GenerationRequest, ImagePayload, PendingRequest, RequestKind};
use rusty_tryon::utils::coords::ScreenRect;
use rusty_tryon::utils::vector::Vec2;
use rusty_tryon::{GenerationOrchestrator, ImageAsset, Phase, TryOnError};
use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

fn png(width: u32, height: u32, shade: u8) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba([shade, shade, shade, 255]));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// Replays canned outcomes in order and records every request it sees.
struct Scripted {
    outcomes: Mutex<VecDeque<CollaboratorOutcome>>,
    seen: Mutex<Vec<GenerationRequest>>,
}

impl Scripted {
    fn new(outcomes: Vec<CollaboratorOutcome>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn seen(&self) -> Vec<GenerationRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl GenerationCollaborator for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    fn generate(&self, request: &GenerationRequest) -> CollaboratorOutcome {
        self.seen.lock().unwrap().push(request.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(CollaboratorError::Transport("script exhausted".into())))
    }
}

/// Run one request through a worker thread and feed the outcome back.
fn run(
    orch: &mut GenerationOrchestrator,
    collaborator: &Arc<Scripted>,
    pending: PendingRequest,
) -> Result<(), TryOnError> {
    let mut dispatcher = Dispatcher::new();
    let shared: Arc<dyn GenerationCollaborator> = collaborator.clone();
    dispatcher.dispatch(pending, shared, || {}).unwrap();
    let (ticket, outcome) = dispatcher.wait().unwrap();
    orch.complete(ticket, outcome)
}

#[test]
fn mask_generate_then_inpaint() {
    let mask_png = png(1024, 768, 255);
    let first_result = png(1024, 768, 120);
    let edited_result = png(1024, 768, 90);
    let collaborator = Scripted::new(vec![
        Ok(Some(ImagePayload::png(mask_png))),
        Ok(Some(ImagePayload::png(first_result))),
        Ok(Some(ImagePayload::png(edited_result))),
    ]);

    let mut orch = GenerationOrchestrator::default();
    orch.set_model_asset(ImageAsset::from_bytes(png(1024, 768, 200)).unwrap())
        .unwrap();
    orch.set_product_asset(ImageAsset::from_bytes(png(800, 800, 40)).unwrap())
        .unwrap();
    assert_eq!(orch.phase(), Phase::ModelReady);

    let pending = orch.request_mask().unwrap();
    assert_eq!(orch.phase(), Phase::MaskPending);
    run(&mut orch, &collaborator, pending).unwrap();
    assert_eq!(orch.phase(), Phase::MaskReady);
    assert!(orch.state().mask.is_some());

    let pending = orch.request_generate().unwrap();
    assert_eq!(pending.kind, RequestKind::Generate);
    assert!(pending.request.prompt().contains("4:3"));
    run(&mut orch, &collaborator, pending).unwrap();
    assert_eq!(orch.phase(), Phase::ResultReady);
    let first_id = orch.state().result.as_ref().unwrap().id();

    // Result shown at half size; the stroke goes through the layout mapping.
    orch.enter_edit_mode(512, 384).unwrap();
    let screen = ScreenRect::new(100.0, 50.0, 512.0, 384.0);
    let surface = orch.surface_mut().unwrap();
    surface.pointer_down(Vec2::new(300.0, 200.0), screen);
    surface.pointer_move(Vec2::new(360.0, 240.0), screen);
    surface.pointer_up();
    assert!(surface.snapshot().has_ink());

    orch.controls_mut().inpaint_description = "fix the sleeve".to_string();
    let pending = orch.request_inpaint().unwrap();
    assert_eq!(orch.phase(), Phase::InpaintPending);
    run(&mut orch, &collaborator, pending).unwrap();

    assert_eq!(orch.phase(), Phase::ResultReady);
    assert_ne!(orch.state().result.as_ref().unwrap().id(), first_id);
    assert!(orch.state().last_error.is_none());

    let seen = collaborator.seen();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0].parts().len(), 1);
    assert_eq!(seen[1].parts().len(), 3);
    assert_eq!(seen[2].parts().len(), 2);
    assert!(seen[2].prompt().contains("fix the sleeve"));

    let mask = image::load_from_memory(&seen[2].parts()[1].data)
        .unwrap()
        .to_luma8();
    assert_eq!(mask.dimensions(), (512, 384));
    assert!(mask.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    assert_eq!(mask.get_pixel(230, 170).0[0], 0);
    assert_eq!(mask.get_pixel(10, 10).0[0], 255);
}

#[test]
fn service_failure_keeps_last_good_result() {
    let collaborator = Scripted::new(vec![
        Ok(Some(ImagePayload::png(png(64, 64, 10)))),
        Err(CollaboratorError::Service {
            status: 503,
            message: "overloaded".into(),
        }),
    ]);
    let mut orch = GenerationOrchestrator::new(false);
    orch.set_model_asset(ImageAsset::from_bytes(png(64, 64, 1)).unwrap())
        .unwrap();
    orch.set_product_asset(ImageAsset::from_bytes(png(64, 64, 2)).unwrap())
        .unwrap();

    let pending = orch.request_generate().unwrap();
    run(&mut orch, &collaborator, pending).unwrap();
    let kept = orch.state().result.as_ref().unwrap().id();

    let pending = orch.request_generate().unwrap();
    let err = run(&mut orch, &collaborator, pending).unwrap_err();
    assert!(matches!(err, TryOnError::CollaboratorFailure(_)));
    assert_eq!(orch.phase(), Phase::ResultReady);
    assert_eq!(orch.state().result.as_ref().unwrap().id(), kept);
    assert!(orch
        .state()
        .last_error
        .as_deref()
        .unwrap()
        .contains("overloaded"));
}
