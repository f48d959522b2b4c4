pub mod app;
pub mod brush_engine;
pub mod canvas;
pub mod config;
pub mod error;
pub mod generation;
pub mod ui;
pub mod utils;

pub use app::assets::ImageAsset;
pub use app::{AppState, GenerationOrchestrator, Phase, TryOnApp};
pub use config::Settings;
pub use error::{CollaboratorError, MissingAsset, TryOnError};
