//! Upload validation and HEIC/HEIF normalization.

use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::StudioConfig;
use crate::error::{StudioError, StudioResult};

pub const SUPPORTED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/heic",
    "image/heif",
];

pub const CONVERSION_TARGET_MIME: &str = "image/jpeg";
pub const CONVERSION_QUALITY: f32 = 0.9;

/// A file as handed over by the host, before any validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl MediaFile {
    pub fn new(
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a file and declares its type from the extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("failed reading {}", path.display()))?;
        let filename = path
            .file_name()
            .and_then(|value| value.to_str())
            .unwrap_or("upload")
            .to_string();
        let mime_type = mime_for_path(path).unwrap_or("application/octet-stream");
        Ok(Self::new(filename, mime_type, bytes))
    }
}

/// Normalized upload: always one of the formats the model accepts directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    bytes: Vec<u8>,
    mime_type: String,
    origin_filename: String,
}

impl UploadedImage {
    pub fn new(
        bytes: impl Into<Vec<u8>>,
        mime_type: impl Into<String>,
        origin_filename: impl Into<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
            origin_filename: origin_filename.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn origin_filename(&self) -> &str {
        &self.origin_filename
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionPolicy {
    /// One failed conversion fails the whole upload.
    FailFast,
    /// Failed conversions are logged and the file is dropped.
    BestEffort,
}

pub trait FormatConverter: Send + Sync {
    /// Returns one or more converted blobs; callers use the first.
    fn convert(&self, bytes: &[u8], target_mime: &str, quality: f32) -> Result<Vec<Vec<u8>>>;
}

/// Runs an external converter program in a scratch directory.
///
/// Argument placeholders: `{input}`, `{output}`, `{quality}` (0–100).
#[derive(Debug, Clone)]
pub struct CommandConverter {
    argv: Vec<String>,
}

impl CommandConverter {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }
}

impl FormatConverter for CommandConverter {
    fn convert(&self, bytes: &[u8], target_mime: &str, quality: f32) -> Result<Vec<Vec<u8>>> {
        let Some((program, args)) = self.argv.split_first() else {
            bail!("no converter command configured");
        };
        let scratch = tempfile::tempdir().context("failed to create converter scratch dir")?;
        let input = scratch.path().join("input.heic");
        let output = scratch
            .path()
            .join(format!("output.{}", extension_for_mime(target_mime)));
        std::fs::write(&input, bytes).context("failed to stage converter input")?;

        let quality_pct = (quality.clamp(0.0, 1.0) * 100.0).round() as u32;
        let resolved: Vec<String> = args
            .iter()
            .map(|arg| {
                arg.replace("{input}", &input.to_string_lossy())
                    .replace("{output}", &output.to_string_lossy())
                    .replace("{quality}", &quality_pct.to_string())
            })
            .collect();

        let run = Command::new(program)
            .args(&resolved)
            .output()
            .with_context(|| format!("failed to launch converter '{program}'"))?;
        if !run.status.success() {
            let stderr = String::from_utf8_lossy(&run.stderr);
            bail!(
                "converter '{program}' exited with {}: {}",
                run.status,
                stderr.trim().chars().take(300).collect::<String>()
            );
        }
        let converted = std::fs::read(&output)
            .with_context(|| format!("converter '{program}' produced no output"))?;
        if converted.is_empty() {
            bail!("converter '{program}' produced an empty file");
        }
        Ok(vec![converted])
    }
}

pub struct MediaNormalizer {
    converter: Box<dyn FormatConverter>,
    max_bytes: u64,
}

impl MediaNormalizer {
    pub fn new(converter: Box<dyn FormatConverter>, max_bytes: u64) -> Self {
        Self {
            converter,
            max_bytes,
        }
    }

    /// Converter command and size ceiling from configuration.
    pub fn from_config(config: &StudioConfig) -> Self {
        Self::new(
            Box::new(CommandConverter::new(config.converter_command.clone())),
            config.max_upload_bytes(),
        )
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn validate(&self, file: &MediaFile) -> StudioResult<()> {
        let mime = file.mime_type.trim().to_ascii_lowercase();
        if !SUPPORTED_MIME_TYPES.contains(&mime.as_str()) {
            return Err(StudioError::UnsupportedFormat {
                filename: file.filename.clone(),
                mime_type: file.mime_type.clone(),
            });
        }
        let size = file.bytes.len() as u64;
        if size > self.max_bytes {
            return Err(StudioError::TooLarge {
                filename: file.filename.clone(),
                size_bytes: size,
                limit_mb: self.max_bytes / (1024 * 1024),
            });
        }
        Ok(())
    }

    /// Single-file entry point; conversion failures always surface.
    pub fn normalize(&self, file: MediaFile) -> StudioResult<UploadedImage> {
        self.validate(&file)?;
        self.convert_if_needed(file)
    }

    /// Validates every file before converting any of them; the first invalid
    /// file rejects the whole batch. Conversion failures follow `policy`.
    pub fn normalize_batch(
        &self,
        files: Vec<MediaFile>,
        policy: ConversionPolicy,
    ) -> StudioResult<Vec<UploadedImage>> {
        for file in &files {
            self.validate(file)?;
        }

        let mut out = Vec::with_capacity(files.len());
        for file in files {
            match self.convert_if_needed(file) {
                Ok(image) => out.push(image),
                Err(StudioError::ConversionFailed { filename, reason })
                    if policy == ConversionPolicy::BestEffort =>
                {
                    warn!(%filename, %reason, "dropping upload after failed conversion");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(out)
    }

    fn convert_if_needed(&self, file: MediaFile) -> StudioResult<UploadedImage> {
        let mime = file.mime_type.trim().to_ascii_lowercase();
        if mime != "image/heic" && mime != "image/heif" {
            return Ok(UploadedImage::new(file.bytes, mime, file.filename));
        }

        info!(filename = %file.filename, bytes = file.bytes.len(), "converting {mime} upload to jpeg");
        let converted = self
            .converter
            .convert(&file.bytes, CONVERSION_TARGET_MIME, CONVERSION_QUALITY)
            .map_err(|err| StudioError::ConversionFailed {
                filename: file.filename.clone(),
                reason: format!("{err:#}"),
            })?;
        let Some(first) = converted.into_iter().next() else {
            return Err(StudioError::ConversionFailed {
                filename: file.filename.clone(),
                reason: "converter returned no output".to_string(),
            });
        };
        Ok(UploadedImage::new(
            first,
            CONVERSION_TARGET_MIME,
            converted_filename(&file.filename),
        ))
    }
}

/// `photo.HEIC` → `photo.jpeg`; other names are returned unchanged.
pub fn converted_filename(name: &str) -> String {
    let lowered = name.to_ascii_lowercase();
    for ext in [".heic", ".heif"] {
        if lowered.ends_with(ext) {
            return format!("{}.jpeg", &name[..name.len() - ext.len()]);
        }
    }
    name.to_string()
}

pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())?;
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime.trim().to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/heic" => "heic",
        "image/heif" => "heif",
        _ => "png",
    }
}
