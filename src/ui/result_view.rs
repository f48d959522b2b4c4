use crate::app::state::Phase;
use crate::app::studio::TryOnApp;
use crate::brush_engine::brush::{BrushTool, MAX_BRUSH_SIZE, MIN_BRUSH_SIZE};
use crate::canvas::surface::{DrawingSurface, RasterSurface};
use crate::ui::previews::PreviewSlot;
use crate::utils::coords::ScreenRect;
use crate::utils::vector::Vec2;
use eframe::egui;
use eframe::egui::{Color32, ColorImage, Rect, TextureHandle, TextureOptions, pos2};

/// Turns per-frame button state into surface pointer events.
///
/// A stroke only starts on the frame the button goes down over the image;
/// dragging out of the image ends it, and coming back does not resume it.
#[derive(Default, Debug)]
pub struct PointerTracker {
    pressed: bool,
}

impl PointerTracker {
    pub fn feed(
        &mut self,
        surface: &mut DrawingSurface,
        pressed: bool,
        pos: Option<Vec2>,
        screen: ScreenRect,
    ) {
        match (self.pressed, pressed, pos) {
            (false, true, Some(p)) if screen.contains(p) => surface.pointer_down(p, screen),
            (true, true, Some(p)) if screen.contains(p) => surface.pointer_move(p, screen),
            (true, true, _) => surface.pointer_leave(),
            (true, false, _) => surface.pointer_up(),
            _ => {}
        }
        self.pressed = pressed;
    }

    pub fn reset(&mut self) {
        self.pressed = false;
    }
}

/// Largest size that fits `available` while keeping the image's aspect
/// ratio. Never upscales.
pub fn fit_size(width: u32, height: u32, available: egui::Vec2) -> egui::Vec2 {
    if width == 0 || height == 0 {
        return egui::Vec2::ZERO;
    }
    let (w, h) = (width as f32, height as f32);
    let scale = (available.x / w).min(available.y / h).min(1.0);
    if !scale.is_finite() || scale <= 0.0 {
        return egui::Vec2::ZERO;
    }
    egui::vec2((w * scale).floor(), (h * scale).floor())
}

/// Tool strip above the result: edit entry, or brush controls while editing.
pub fn edit_toolbar(app: &mut TryOnApp, ctx: &egui::Context) {
    if !app.orchestrator.state().has_result() {
        return;
    }
    egui::TopBottomPanel::top("edit_toolbar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            let busy = app.orchestrator.state().is_pending();
            if app.orchestrator.phase() != Phase::Editing {
                if ui
                    .add_enabled(!busy, egui::Button::new("Edit region"))
                    .clicked()
                {
                    let (w, h) = app.result_display.unwrap_or_else(|| {
                        app.orchestrator
                            .state()
                            .result
                            .as_ref()
                            .map(|r| (r.width() as usize, r.height() as usize))
                            .unwrap_or_default()
                    });
                    if let Err(err) = app.orchestrator.enter_edit_mode(w, h) {
                        log::warn!("could not enter region editing: {err}");
                    }
                    app.pointer.reset();
                }
                return;
            }

            let mut tool = app.orchestrator.brush().tool;
            for option in [BrushTool::Paint, BrushTool::Erase] {
                ui.selectable_value(&mut tool, option, option.label());
            }
            if tool != app.orchestrator.brush().tool {
                app.orchestrator.set_tool(tool);
            }

            let mut size = app.orchestrator.brush().diameter();
            if ui
                .add(egui::Slider::new(&mut size, MIN_BRUSH_SIZE..=MAX_BRUSH_SIZE).text("Size"))
                .changed()
            {
                app.orchestrator.set_brush_size(size);
            }

            ui.separator();
            let controls = app.orchestrator.controls_mut();
            ui.add(
                egui::TextEdit::singleline(&mut controls.inpaint_description)
                    .hint_text("Describe the change")
                    .desired_width(260.0),
            );
            if ui.button("Apply edit").clicked() {
                let request = app.orchestrator.request_inpaint();
                app.submit(ctx, request);
            }
            if ui.button("Cancel").clicked() {
                if let Err(err) = app.orchestrator.cancel_edit() {
                    log::warn!("cancel edit: {err}");
                }
            }
        });
    });
}

/// Central panel: the current result, with the drawing overlay on top
/// while editing.
pub fn result_view(app: &mut TryOnApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let Some(result) = app.orchestrator.state().result.clone() else {
            app.previews.texture(ctx, PreviewSlot::Result, None);
            ui.centered_and_justified(|ui| {
                ui.weak("Upload a model and a product photo, then generate a try-on image.");
            });
            return;
        };
        let Some(texture) = app
            .previews
            .texture(ctx, PreviewSlot::Result, Some(&result))
            .cloned()
        else {
            ui.label("The generated image could not be displayed.");
            return;
        };

        let size = fit_size(result.width(), result.height(), ui.available_size());
        let (response, painter) = ui.allocate_painter(size, egui::Sense::drag());
        let rect = response.rect;
        let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
        painter.image(texture.id(), rect, uv, Color32::WHITE);

        let display = (rect.width().round() as usize, rect.height().round() as usize);
        app.result_display = Some(display);

        let Some(surface) = app.orchestrator.surface_mut() else {
            app.overlay = None;
            app.pointer.reset();
            return;
        };
        surface.observe_size(display.0, display.1);

        let screen = ScreenRect::new(rect.left(), rect.top(), rect.width(), rect.height());
        let pos = response
            .interact_pointer_pos()
            .or_else(|| response.hover_pos())
            .map(|p| Vec2::new(p.x, p.y));
        app.pointer
            .feed(surface, response.is_pointer_button_down_on(), pos, screen);

        sync_overlay(&mut app.overlay, ctx, surface);
        if let Some(overlay) = &app.overlay {
            painter.image(overlay.id(), rect, uv, Color32::WHITE);
        }
    });
}

/// Re-upload the drawing overlay when the surface changed.
fn sync_overlay(overlay: &mut Option<TextureHandle>, ctx: &egui::Context, surface: &mut DrawingSurface) {
    let dirty = surface.take_dirty();
    if !dirty && overlay.is_some() {
        return;
    }
    let buffer = surface.snapshot();
    if buffer.is_zero_area() {
        *overlay = None;
        return;
    }
    let mut image = ColorImage::new([buffer.width(), buffer.height()], Color32::TRANSPARENT);
    buffer.write_to_color_image(&mut image);
    match overlay {
        Some(texture) => texture.set(image, TextureOptions::NEAREST),
        None => *overlay = Some(ctx.load_texture("edit_overlay", image, TextureOptions::NEAREST)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush_engine::brush::Brush;

    const SCREEN: ScreenRect = ScreenRect::new(10.0, 10.0, 100.0, 100.0);

    #[test]
    fn fit_keeps_aspect_and_never_upscales() {
        assert_eq!(fit_size(1024, 768, egui::vec2(512.0, 1000.0)), egui::vec2(512.0, 384.0));
        assert_eq!(fit_size(200, 100, egui::vec2(800.0, 800.0)), egui::vec2(200.0, 100.0));
        assert_eq!(fit_size(0, 100, egui::vec2(800.0, 800.0)), egui::Vec2::ZERO);
    }

    #[test]
    fn press_drag_release_paints_one_stroke() {
        let mut surface = DrawingSurface::attach(100, 100, Brush::new(10.0));
        let mut tracker = PointerTracker::default();
        tracker.feed(&mut surface, true, Some(Vec2::new(20.0, 20.0)), SCREEN);
        assert!(surface.is_drawing());
        tracker.feed(&mut surface, true, Some(Vec2::new(60.0, 20.0)), SCREEN);
        tracker.feed(&mut surface, false, Some(Vec2::new(60.0, 20.0)), SCREEN);
        assert!(!surface.is_drawing());
        let buffer = surface.snapshot();
        assert!(buffer.pixel(30, 10).unwrap().a() > 0);
    }

    #[test]
    fn leaving_ends_the_stroke_and_reentry_does_not_resume() {
        let mut surface = DrawingSurface::attach(100, 100, Brush::new(10.0));
        let mut tracker = PointerTracker::default();
        tracker.feed(&mut surface, true, Some(Vec2::new(20.0, 20.0)), SCREEN);
        tracker.feed(&mut surface, true, Some(Vec2::new(500.0, 20.0)), SCREEN);
        assert!(!surface.is_drawing());
        tracker.feed(&mut surface, true, Some(Vec2::new(90.0, 90.0)), SCREEN);
        assert!(!surface.is_drawing());
        assert_eq!(surface.snapshot().pixel(80, 80).unwrap().a(), 0);
    }

    #[test]
    fn press_outside_the_image_does_nothing() {
        let mut surface = DrawingSurface::attach(100, 100, Brush::new(10.0));
        let mut tracker = PointerTracker::default();
        tracker.feed(&mut surface, true, Some(Vec2::new(0.0, 0.0)), SCREEN);
        assert!(!surface.is_drawing());
        assert!(!surface.snapshot().has_ink());
    }
}
