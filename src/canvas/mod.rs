//! Raster buffer, drawing surface and mask derivation for region editing.
pub mod mask;
pub mod raster;
pub mod surface;
