//! Generation request assembly: reference images, aspect ratio and the
//! instruction text with its reference prefix.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::error;

use crate::error::{StudioError, StudioResult};
use crate::media::UploadedImage;

pub const SINGLE_REFERENCE_PREFIX: &str =
    "Use the attached reference photo as the basis for this image.";
pub const MULTI_REFERENCE_PREFIX: &str = "Use all of the attached reference photos to understand the subject's shared facial identity and likeness across them.";

pub const DEFAULT_ASPECT_RATIO: &str = "1:1";

/// Opaque aspect ratio hint, passed to the model unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectRatio(String);

impl AspectRatio {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self(DEFAULT_ASPECT_RATIO.to_string())
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A directly renderable image: `data:<mimeType>;base64,<payload>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageHandle(String);

impl ImageHandle {
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self::from_base64(mime_type, &BASE64.encode(bytes))
    }

    pub fn from_base64(mime_type: &str, payload: &str) -> Self {
        Self(format!("data:{mime_type};base64,{payload}"))
    }

    /// Wraps a string without checking it; decoding validates.
    pub fn from_raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.0
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(";base64,"))
            .map(|(mime, _)| mime)
            .filter(|mime| !mime.is_empty())
    }

    pub fn decode(&self) -> StudioResult<InlineImage> {
        let rest = self.0.strip_prefix("data:").ok_or_else(|| {
            StudioError::InvalidImageReference("handle is not a data URI".to_string())
        })?;
        let (mime, payload) = rest.split_once(";base64,").ok_or_else(|| {
            StudioError::InvalidImageReference("handle has no base64 marker".to_string())
        })?;
        if mime.trim().is_empty() {
            return Err(StudioError::InvalidImageReference(
                "handle has an empty mime type".to_string(),
            ));
        }
        let bytes = BASE64.decode(payload.as_bytes()).map_err(|err| {
            StudioError::InvalidImageReference(format!("handle payload is not base64: {err}"))
        })?;
        if bytes.is_empty() {
            return Err(StudioError::InvalidImageReference(
                "handle payload is empty".to_string(),
            ));
        }
        Ok(InlineImage {
            bytes,
            mime_type: mime.to_string(),
        })
    }

    /// First 8 hex chars of the payload digest, for logs and file names.
    pub fn short_digest(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        hex::encode(&digest[..4])
    }
}

impl fmt::Display for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mime_type() {
            Some(mime) => write!(f, "<{mime} image {}>", self.short_digest()),
            None => write!(f, "<image {}>", self.short_digest()),
        }
    }
}

/// Transport-ready image part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl InlineImage {
    pub fn base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }
}

/// Where a reference image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Raw(UploadedImage),
    Handle(ImageHandle),
}

impl ImageSource {
    pub fn resolve(&self) -> StudioResult<InlineImage> {
        match self {
            ImageSource::Raw(image) => Ok(InlineImage {
                bytes: image.bytes().to_vec(),
                mime_type: image.mime_type().to_string(),
            }),
            ImageSource::Handle(handle) => handle.decode(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub instruction: String,
    pub reference_images: Vec<InlineImage>,
    pub aspect_ratio: AspectRatio,
}

pub fn reference_prefix(reference_count: usize) -> Option<&'static str> {
    match reference_count {
        0 => None,
        1 => Some(SINGLE_REFERENCE_PREFIX),
        _ => Some(MULTI_REFERENCE_PREFIX),
    }
}

pub fn build_request(
    instruction: &str,
    references: &[ImageSource],
    aspect_ratio: Option<AspectRatio>,
) -> StudioResult<GenerationRequest> {
    if instruction.trim().is_empty() {
        return Err(StudioError::MissingInput(
            "Prompt cannot be empty.".to_string(),
        ));
    }

    let mut reference_images = Vec::with_capacity(references.len());
    for (idx, source) in references.iter().enumerate() {
        match source.resolve() {
            Ok(image) => reference_images.push(image),
            Err(err) => {
                error!(reference = idx, error = %err, "reference image could not be decoded");
                return Err(err);
            }
        }
    }

    let instruction = match reference_prefix(reference_images.len()) {
        Some(prefix) => format!("{prefix} {instruction}"),
        None => instruction.to_string(),
    };

    Ok(GenerationRequest {
        instruction,
        reference_images,
        aspect_ratio: aspect_ratio.unwrap_or_default(),
    })
}
