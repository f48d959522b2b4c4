//! Everything that talks to, or prepares data for, the image-generation service.
pub mod aspect_ratio;
pub mod collaborator;
pub mod gemini;
pub mod prompt;
pub mod request;
