//! egui panels for uploads, prompt settings and the result editor.
pub mod controls;
pub mod previews;
pub mod result_view;
