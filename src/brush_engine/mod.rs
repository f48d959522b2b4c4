//! Freehand brush model and per-stroke state for the region editor.
pub mod brush;
pub mod stroke;
