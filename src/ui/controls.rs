use crate::app::studio::{AssetSlot, TryOnApp};
use crate::generation::aspect_ratio::AspectRatioChoice;
use crate::ui::previews::PreviewSlot;
use eframe::egui;
use eframe::egui::Color32;
use std::path::PathBuf;

const THUMBNAIL_HEIGHT: f32 = 140.0;
const ERROR_COLOR: Color32 = Color32::from_rgb(220, 80, 80);

/// Left panel: uploads, prompt settings and the mask/generate actions.
pub fn control_panel(app: &mut TryOnApp, ctx: &egui::Context) {
    egui::SidePanel::left("tryon_controls")
        .default_width(300.0)
        .resizable(true)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                let busy = app.orchestrator.state().is_pending();

                ui.heading("Photos");
                asset_picker(app, ui, ctx, AssetSlot::Model, busy);
                ui.add_space(6.0);
                asset_picker(app, ui, ctx, AssetSlot::Product, busy);

                if app.orchestrator.requires_mask() {
                    ui.add_space(6.0);
                    ui.label("Garment mask");
                    let mask = app.orchestrator.state().mask.as_ref();
                    match app.previews.texture(ctx, PreviewSlot::Mask, mask) {
                        Some(texture) => {
                            ui.add(egui::Image::new(texture).max_height(THUMBNAIL_HEIGHT));
                        }
                        None => {
                            ui.weak("No mask yet");
                        }
                    }
                }

                ui.separator();
                ui.heading("Try-on");

                let controls = app.orchestrator.controls_mut();
                egui::ComboBox::from_label("Aspect ratio")
                    .selected_text(controls.aspect_ratio.label())
                    .show_ui(ui, |ui| {
                        for choice in AspectRatioChoice::ALL {
                            ui.selectable_value(&mut controls.aspect_ratio, choice, choice.label());
                        }
                    });

                ui.label("Instruction");
                ui.add(
                    egui::TextEdit::multiline(&mut controls.instruction)
                        .hint_text("Leave empty to use the default try-on instruction")
                        .desired_rows(4)
                        .desired_width(f32::INFINITY),
                );

                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    if app.orchestrator.requires_mask()
                        && ui
                            .add_enabled(!busy, egui::Button::new("Extract mask"))
                            .clicked()
                    {
                        let request = app.orchestrator.request_mask();
                        app.submit(ctx, request);
                    }
                    if ui
                        .add_enabled(!busy, egui::Button::new("Generate"))
                        .clicked()
                    {
                        let request = app.orchestrator.request_generate();
                        app.submit(ctx, request);
                    }
                });

                ui.separator();
                ui.horizontal(|ui| {
                    if busy {
                        ui.add(egui::Spinner::new());
                    }
                    ui.label(app.orchestrator.phase().label());
                });
                if let Some((ticket, kind)) = app.running_request() {
                    ui.weak(format!("Waiting for {} request {ticket}", kind.label()));
                }

                if let Some(err) = app.load_error.clone() {
                    ui.colored_label(ERROR_COLOR, err);
                }
                if let Some(err) = app.orchestrator.state().last_error.clone() {
                    ui.colored_label(ERROR_COLOR, err);
                    if ui.small_button("Dismiss").clicked() {
                        app.orchestrator.clear_error();
                    }
                }
            });
        });
}

fn asset_picker(
    app: &mut TryOnApp,
    ui: &mut egui::Ui,
    ctx: &egui::Context,
    slot: AssetSlot,
    busy: bool,
) {
    ui.horizontal(|ui| {
        ui.label(slot.label());
        if ui
            .add_enabled(!busy, egui::Button::new("Choose..."))
            .clicked()
        {
            if let Some(path) = pick_image() {
                app.load_asset(slot, &path);
            }
        }
    });

    let state = app.orchestrator.state();
    let (asset, preview) = match slot {
        AssetSlot::Model => (state.model.as_ref(), PreviewSlot::Model),
        AssetSlot::Product => (state.product.as_ref(), PreviewSlot::Product),
    };
    let info = asset.map(|a| format!("{}x{} {}", a.width(), a.height(), a.mime_type()));
    if let Some(texture) = app.previews.texture(ctx, preview, asset) {
        ui.add(egui::Image::new(texture).max_height(THUMBNAIL_HEIGHT));
    }
    if let Some(info) = info {
        ui.weak(info);
    }
}

fn pick_image() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter("Images", &["png", "jpg", "jpeg", "webp"])
        .pick_file()
}
