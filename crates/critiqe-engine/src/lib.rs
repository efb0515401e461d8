//! Prompt composition, generation requests and the interactive session for
//! Critiqe Studio.

pub mod client;
pub mod config;
pub mod dryrun;
pub mod error;
pub mod gemini;
pub mod logging;
pub mod media;
pub mod preview;
pub mod prompt;
pub mod request;
pub mod workflow;

pub use client::{CancelToken, ImageGenerator, TextModel};
pub use config::StudioConfig;
pub use dryrun::DryrunClient;
pub use error::{StudioError, StudioResult};
pub use gemini::GeminiClient;
pub use media::{
    CommandConverter, ConversionPolicy, FormatConverter, MediaFile, MediaNormalizer,
    UploadedImage,
};
pub use prompt::{compose, DraftRequest, PromptDrafter};
pub use request::{build_request, AspectRatio, GenerationRequest, ImageHandle, ImageSource};
pub use workflow::{
    Completion, DisplayView, EnhanceMode, GenerationKind, GenerationResult, PendingGeneration,
    Session, ToolMode, WorkflowState,
};
