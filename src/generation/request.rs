use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

/// One encoded image handed to, or returned by, the generation service.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ImagePayload {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    pub fn png(data: Vec<u8>) -> Self {
        Self::new("image/png", data)
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.data)
    }

    pub fn from_base64(mime_type: impl Into<String>, encoded: &str) -> Result<Self, base64::DecodeError> {
        Ok(Self::new(mime_type, BASE64.decode(encoded.trim().as_bytes())?))
    }
}

impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Ordered image parts plus one trailing instruction.
///
/// Built once per request and handed to the service as-is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    parts: Vec<ImagePayload>,
    prompt: String,
}

impl GenerationRequest {
    pub fn new(parts: Vec<ImagePayload>, prompt: impl Into<String>) -> Self {
        Self {
            parts,
            prompt: prompt.into(),
        }
    }

    pub fn parts(&self) -> &[ImagePayload] {
        &self.parts
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

/// Which of the three request flows a request belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestKind {
    Mask,
    Generate,
    Inpaint,
}

impl RequestKind {
    pub fn label(&self) -> &'static str {
        match self {
            RequestKind::Mask => "mask",
            RequestKind::Generate => "try-on",
            RequestKind::Inpaint => "inpaint",
        }
    }
}

/// Identifies an outstanding request so its response can be matched up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Ticket(pub(crate) u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A request accepted by the orchestrator and waiting to be sent.
#[derive(Clone, Debug)]
pub struct PendingRequest {
    pub ticket: Ticket,
    pub kind: RequestKind,
    pub request: GenerationRequest,
}
