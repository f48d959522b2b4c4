//! Command-line and environment configuration.

use clap::Parser;

use crate::brush_engine::brush::{DEFAULT_BRUSH_SIZE, clamp_brush_size};
use crate::generation::aspect_ratio::AspectRatioChoice;
use crate::generation::gemini::{DEFAULT_API_BASE, DEFAULT_MODEL};

#[derive(Debug, Clone, Parser)]
#[command(name = "rusty-tryon", version, about = "Virtual try-on studio with region inpainting")]
pub struct Settings {
    /// API key for the generation service.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Image model used for every request.
    #[arg(long, env = "TRYON_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    #[arg(long, env = "TRYON_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 90)]
    pub timeout_secs: u64,

    /// Compose without first extracting a garment mask.
    #[arg(long)]
    pub no_mask: bool,

    /// Initial brush diameter for region editing (5-100).
    #[arg(long, default_value_t = DEFAULT_BRUSH_SIZE, value_parser = parse_brush_size)]
    pub brush_size: f32,

    /// Initial aspect ratio selection.
    #[arg(long, default_value = "use-model-ratio")]
    pub aspect_ratio: AspectRatioChoice,
}

impl Settings {
    /// Whether composing requires a previously extracted mask.
    pub fn require_mask(&self) -> bool {
        !self.no_mask
    }
}

fn parse_brush_size(raw: &str) -> Result<f32, String> {
    let size: f32 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not a number"))?;
    Ok(clamp_brush_size(size))
}
