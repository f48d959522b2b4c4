pub mod assets;
pub mod orchestrator;
pub mod state;
pub mod studio;

pub use orchestrator::GenerationOrchestrator;
pub use state::{AppState, Controls, Phase};
pub use studio::TryOnApp;
