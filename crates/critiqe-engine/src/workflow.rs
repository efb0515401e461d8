//! Interactive session: reference pool, prompt inputs, the single current
//! result and the workflow state that decides which actions are permitted.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use critiqe_contracts::catalog::{Catalog, Platform};
use critiqe_contracts::events::{ImageSummary, SessionEvent, SessionLog};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::client::{CancelToken, ImageGenerator};
use crate::error::{StudioError, StudioResult};
use crate::media::{ConversionPolicy, MediaFile, MediaNormalizer, UploadedImage};
use crate::preview::{PreviewHandle, PreviewRegistry};
use crate::prompt::{compose, tweak_prompt, DraftRequest, PromptDrafter, ENHANCE_PROMPT};
use crate::request::{build_request, AspectRatio, GenerationRequest, ImageHandle, ImageSource};

pub const NO_IMAGES_MESSAGE: &str = "Please upload at least one image.";
pub const EMPTY_PROMPT_MESSAGE: &str = "Prompt cannot be empty.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolMode {
    StyleEditor,
    Enhancer,
    SocialCreator,
}

impl ToolMode {
    pub fn label(self) -> &'static str {
        match self {
            ToolMode::StyleEditor => "style editor",
            ToolMode::Enhancer => "photo enhancer",
            ToolMode::SocialCreator => "social creator",
        }
    }

    /// Social posts can be generated from a topic alone.
    pub fn requires_images(self) -> bool {
        !matches!(self, ToolMode::SocialCreator)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    AwaitingInput,
    DraftingPrompt,
    ReviewingPrompt,
    Generating,
    ShowingResult,
    Failed(String),
}

impl WorkflowState {
    pub fn is_busy(&self) -> bool {
        matches!(self, WorkflowState::DraftingPrompt | WorkflowState::Generating)
    }

    pub fn label(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "idle",
            WorkflowState::AwaitingInput => "awaiting input",
            WorkflowState::DraftingPrompt => "drafting a prompt",
            WorkflowState::ReviewingPrompt => "reviewing the prompt",
            WorkflowState::Generating => "generating",
            WorkflowState::ShowingResult => "showing a result",
            WorkflowState::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowState::Failed(reason) => write!(f, "failed: {reason}"),
            other => f.write_str(other.label()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayView {
    Result,
    Original,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnhanceMode {
    Auto,
    Tweak(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub handle: ImageHandle,
    pub sequence: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationKind {
    Initial,
    Refine(String),
}

/// A generation that has been admitted by the session but not completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingGeneration {
    pub sequence: u64,
    pub request: GenerationRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Shown(GenerationResult),
    /// A newer generation already owns the result slot.
    Superseded,
}

#[derive(Debug, Clone, Copy)]
enum FailedStep {
    Draft,
    Generation,
}

#[derive(Debug, Clone)]
struct InFlight {
    sequence: u64,
    resume: WorkflowState,
}

pub struct Session {
    id: String,
    mode: ToolMode,
    catalog: Arc<Catalog>,
    state: WorkflowState,
    resume_state: Option<WorkflowState>,
    references: Vec<UploadedImage>,
    previews: PreviewRegistry,
    preview_handles: Vec<PreviewHandle>,
    style_id: Option<String>,
    modifiers: BTreeSet<String>,
    instruction: String,
    enhance_mode: EnhanceMode,
    topic: String,
    platform_id: Option<String>,
    mood_id: Option<String>,
    result: Option<GenerationResult>,
    view: DisplayView,
    next_sequence: u64,
    in_flight: Option<InFlight>,
    events: Option<SessionLog>,
    cancel: Option<CancelToken>,
}

impl Session {
    pub fn new(mode: ToolMode, catalog: Arc<Catalog>) -> Self {
        let platform_id = catalog.default_platform().map(|platform| platform.id.clone());
        let mood_id = catalog.default_mood().map(|mood| mood.id.clone());
        Self {
            id: format!("session-{}", Uuid::new_v4()),
            mode,
            catalog,
            state: WorkflowState::Idle,
            resume_state: None,
            references: Vec::new(),
            previews: PreviewRegistry::new(),
            preview_handles: Vec::new(),
            style_id: None,
            modifiers: BTreeSet::new(),
            instruction: String::new(),
            enhance_mode: EnhanceMode::Auto,
            topic: String::new(),
            platform_id,
            mood_id,
            result: None,
            view: DisplayView::Result,
            next_sequence: 1,
            in_flight: None,
            events: None,
            cancel: None,
        }
    }

    /// Appends session events to `path` as JSONL.
    pub fn with_event_log(mut self, path: &Path) -> Self {
        self.events = Some(SessionLog::new(path, self.id.clone()));
        self.emit(SessionEvent::SessionStarted {
            mode: self.mode.label().to_string(),
        });
        self
    }

    /// Shares a client's cancel token with the session. `cancel_generation`
    /// trips it; every newly admitted draft or generation clears it again.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn view(&self) -> DisplayView {
        self.view
    }

    pub fn references(&self) -> &[UploadedImage] {
        &self.references
    }

    pub fn preview_handles(&self) -> &[PreviewHandle] {
        &self.preview_handles
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    pub fn result(&self) -> Option<&GenerationResult> {
        self.result.as_ref()
    }

    pub fn style_id(&self) -> Option<&str> {
        self.style_id.as_deref()
    }

    pub fn modifiers(&self) -> &BTreeSet<String> {
        &self.modifiers
    }

    pub fn enhance_mode(&self) -> &EnhanceMode {
        &self.enhance_mode
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn platform(&self) -> Option<&Platform> {
        self.platform_id
            .as_deref()
            .and_then(|id| self.catalog.platform(id))
    }

    pub fn mood_label(&self) -> Option<&str> {
        self.mood_id
            .as_deref()
            .and_then(|id| self.catalog.mood(id))
            .map(|mood| mood.label.as_str())
    }

    /// Text the next initial generation will be sent with.
    pub fn instruction(&self) -> String {
        match (self.mode, &self.enhance_mode) {
            (ToolMode::Enhancer, EnhanceMode::Auto) => ENHANCE_PROMPT.to_string(),
            (ToolMode::Enhancer, EnhanceMode::Tweak(text)) if text.trim().is_empty() => {
                String::new()
            }
            (ToolMode::Enhancer, EnhanceMode::Tweak(text)) => tweak_prompt(text),
            _ => self.instruction.clone(),
        }
    }

    pub fn upload(
        &mut self,
        normalizer: &MediaNormalizer,
        files: Vec<MediaFile>,
        policy: ConversionPolicy,
    ) -> StudioResult<usize> {
        self.ensure_not_busy()?;
        if files.is_empty() {
            return Err(StudioError::MissingInput(NO_IMAGES_MESSAGE.to_string()));
        }
        let images = normalizer.normalize_batch(files, policy)?;
        if images.is_empty() {
            return Err(StudioError::MissingInput(NO_IMAGES_MESSAGE.to_string()));
        }
        self.resume_from_failure();

        self.previews.revoke_all();
        self.preview_handles = images
            .iter()
            .map(|image| self.previews.create(image))
            .collect();
        self.references = images;

        let next = match (self.mode, &self.state) {
            (ToolMode::SocialCreator, WorkflowState::ReviewingPrompt)
            | (ToolMode::SocialCreator, WorkflowState::ShowingResult) => self.state.clone(),
            _ => WorkflowState::AwaitingInput,
        };
        self.state = next;

        let images = self
            .references
            .iter()
            .map(|image| ImageSummary::of(image.origin_filename(), image.mime_type(), image.bytes()))
            .collect();
        info!(count = self.references.len(), "reference images replaced");
        self.emit(SessionEvent::ImagesUploaded { images });
        Ok(self.references.len())
    }

    pub fn select_style(&mut self, id: &str) -> StudioResult<()> {
        self.require_mode(ToolMode::StyleEditor, "select a style")?;
        self.ensure_not_busy()?;
        if self.catalog.style(id).is_none() {
            return Err(StudioError::UnknownCatalogEntry {
                kind: "style",
                id: id.to_string(),
            });
        }
        if self.style_id.as_deref() == Some(id) {
            return Ok(());
        }
        self.resume_from_failure();
        self.style_id = Some(id.to_string());
        self.modifiers.clear();
        self.recompose();
        self.emit(SessionEvent::StyleSelected {
            style: id.to_string(),
        });
        Ok(())
    }

    /// Returns whether the modifier is now selected.
    pub fn toggle_modifier(&mut self, id: &str) -> StudioResult<bool> {
        self.require_mode(ToolMode::StyleEditor, "toggle a modifier")?;
        self.ensure_not_busy()?;
        if self.catalog.modifier(id).is_none() {
            return Err(StudioError::UnknownCatalogEntry {
                kind: "modifier",
                id: id.to_string(),
            });
        }
        self.resume_from_failure();
        let selected = if self.modifiers.remove(id) {
            false
        } else {
            self.modifiers.insert(id.to_string());
            true
        };
        self.recompose();
        Ok(selected)
    }

    pub fn edit_prompt(&mut self, text: &str) -> StudioResult<()> {
        if self.mode == ToolMode::Enhancer {
            return Err(self.unavailable("edit the prompt"));
        }
        self.ensure_not_busy()?;
        self.resume_from_failure();
        self.instruction = text.to_string();
        if self.mode == ToolMode::SocialCreator
            && self.state == WorkflowState::AwaitingInput
            && !text.trim().is_empty()
        {
            self.state = WorkflowState::ReviewingPrompt;
        }
        Ok(())
    }

    pub fn set_enhance_mode(&mut self, mode: EnhanceMode) -> StudioResult<()> {
        self.require_mode(ToolMode::Enhancer, "choose an enhancement")?;
        self.ensure_not_busy()?;
        self.resume_from_failure();
        self.enhance_mode = mode;
        Ok(())
    }

    pub fn set_topic(&mut self, topic: &str) -> StudioResult<()> {
        self.require_mode(ToolMode::SocialCreator, "set a topic")?;
        self.ensure_not_busy()?;
        self.resume_from_failure();
        self.topic = topic.to_string();
        let has_topic = !self.topic.trim().is_empty();
        match self.state {
            WorkflowState::Idle if has_topic => self.state = WorkflowState::AwaitingInput,
            WorkflowState::AwaitingInput if !has_topic && self.references.is_empty() => {
                self.state = WorkflowState::Idle
            }
            _ => {}
        }
        Ok(())
    }

    pub fn select_platform(&mut self, id: &str) -> StudioResult<()> {
        self.require_mode(ToolMode::SocialCreator, "select a platform")?;
        self.ensure_not_busy()?;
        if self.catalog.platform(id).is_none() {
            return Err(StudioError::UnknownCatalogEntry {
                kind: "platform",
                id: id.to_string(),
            });
        }
        self.resume_from_failure();
        self.platform_id = Some(id.to_string());
        Ok(())
    }

    pub fn select_mood(&mut self, id: &str) -> StudioResult<()> {
        self.require_mode(ToolMode::SocialCreator, "select a mood")?;
        self.ensure_not_busy()?;
        if self.catalog.mood(id).is_none() {
            return Err(StudioError::UnknownCatalogEntry {
                kind: "mood",
                id: id.to_string(),
            });
        }
        self.resume_from_failure();
        self.mood_id = Some(id.to_string());
        Ok(())
    }

    /// Drafts the social prompt; on success the draft becomes the editable
    /// instruction and the session waits for review.
    pub fn draft_prompt(&mut self, drafter: &PromptDrafter<'_>) -> StudioResult<String> {
        self.require_mode(ToolMode::SocialCreator, "draft a prompt")?;
        self.ensure_not_busy()?;
        let settled = self.settled_state();
        if !matches!(
            settled,
            WorkflowState::AwaitingInput
                | WorkflowState::ReviewingPrompt
                | WorkflowState::ShowingResult
        ) {
            return Err(StudioError::MissingInput(
                "Please describe what your post is about.".to_string(),
            ));
        }
        let Some(platform) = self.platform().cloned() else {
            return Err(StudioError::MissingInput("Please choose a platform.".to_string()));
        };
        let request = DraftRequest {
            topic: self.topic.clone(),
            platform,
            mood: self.mood_label().unwrap_or("Professional").to_string(),
            has_reference_images: !self.references.is_empty(),
        };
        if request.topic.trim().is_empty() {
            return Err(StudioError::MissingInput(
                "Please describe what your post is about.".to_string(),
            ));
        }

        self.resume_from_failure();
        self.rearm_cancel();
        self.state = WorkflowState::DraftingPrompt;
        self.emit(SessionEvent::DraftStarted {
            platform: request.platform.id.clone(),
            mood: request.mood.clone(),
        });

        match drafter.draft(&request) {
            Ok(text) => {
                self.instruction = text.clone();
                self.state = WorkflowState::ReviewingPrompt;
                self.emit(SessionEvent::DraftCompleted {
                    chars: text.chars().count(),
                });
                Ok(text)
            }
            Err(err) => {
                self.fail(settled, &err, FailedStep::Draft);
                Err(err)
            }
        }
    }

    /// Blocking initial generation from the current instruction.
    pub fn generate(&mut self, generator: &dyn ImageGenerator) -> StudioResult<GenerationResult> {
        let pending = self.begin_generation(GenerationKind::Initial)?;
        self.run(generator, pending)
    }

    /// Blocking follow-up against the current result.
    pub fn refine(
        &mut self,
        generator: &dyn ImageGenerator,
        instruction: &str,
    ) -> StudioResult<GenerationResult> {
        let pending = self.begin_generation(GenerationKind::Refine(instruction.to_string()))?;
        self.run(generator, pending)
    }

    fn run(
        &mut self,
        generator: &dyn ImageGenerator,
        pending: PendingGeneration,
    ) -> StudioResult<GenerationResult> {
        let outcome = generator.generate(&pending.request);
        let failure = outcome.as_ref().err().cloned();
        match self.complete_generation(pending.sequence, outcome)? {
            Completion::Shown(result) => Ok(result),
            Completion::Superseded => Err(failure.unwrap_or(StudioError::Cancelled)),
        }
    }

    /// Admits a generation and builds its request. The caller submits the
    /// request and reports back through [`Session::complete_generation`].
    pub fn begin_generation(&mut self, kind: GenerationKind) -> StudioResult<PendingGeneration> {
        let action = match kind {
            GenerationKind::Initial => "generate",
            GenerationKind::Refine(_) => "refine",
        };
        self.ensure_not_busy()?;
        let settled = self.settled_state();

        let (instruction, sources) = match &kind {
            GenerationKind::Initial => self.initial_inputs(&settled)?,
            GenerationKind::Refine(text) => self.refine_inputs(&settled, text)?,
        };
        let aspect_ratio = self.aspect_ratio();

        self.resume_from_failure();
        let request = match build_request(&instruction, &sources, aspect_ratio) {
            Ok(request) => request,
            Err(err) if err.is_validation() => return Err(err),
            Err(err) => {
                self.fail(settled, &err, FailedStep::Generation);
                return Err(err);
            }
        };

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.in_flight = Some(InFlight {
            sequence,
            resume: settled,
        });
        self.rearm_cancel();
        self.state = WorkflowState::Generating;
        info!(
            sequence,
            action,
            references = request.reference_images.len(),
            aspect_ratio = %request.aspect_ratio,
            "generation started"
        );
        self.emit(SessionEvent::GenerationStarted {
            sequence,
            kind: action.to_string(),
            references: request.reference_images.len(),
            aspect_ratio: request.aspect_ratio.as_str().to_string(),
        });
        Ok(PendingGeneration { sequence, request })
    }

    /// Applies a finished generation. The result slot is last-write-wins by
    /// sequence. A late success from an abandoned generation still becomes
    /// the shown result unless something newer landed first; it only moves
    /// the session to `ShowingResult` when nothing else is in flight.
    pub fn complete_generation(
        &mut self,
        sequence: u64,
        outcome: StudioResult<ImageHandle>,
    ) -> StudioResult<Completion> {
        let current = self
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.sequence == sequence);

        if !current {
            let newer_exists = self
                .result
                .as_ref()
                .is_some_and(|result| result.sequence > sequence);
            return match outcome {
                Ok(handle) if !newer_exists => {
                    info!(sequence, "late generation replaced the result");
                    let result = self.show(handle, sequence, true);
                    if self.in_flight.is_none() {
                        self.resume_from_failure();
                        self.state = WorkflowState::ShowingResult;
                    }
                    Ok(Completion::Shown(result))
                }
                Ok(_) => {
                    info!(sequence, "discarding superseded generation");
                    Ok(Completion::Superseded)
                }
                Err(err) => {
                    warn!(sequence, error = %err, "ignoring failure of superseded generation");
                    Ok(Completion::Superseded)
                }
            };
        }

        let Some(in_flight) = self.in_flight.take() else {
            return Ok(Completion::Superseded);
        };
        match outcome {
            Ok(handle) => {
                info!(sequence, image = %handle, "generation completed");
                let result = self.show(handle, sequence, false);
                self.state = WorkflowState::ShowingResult;
                Ok(Completion::Shown(result))
            }
            Err(err) => {
                self.fail(in_flight.resume, &err, FailedStep::Generation);
                Err(err)
            }
        }
    }

    /// Abandons the in-flight generation; its completion will be ignored.
    pub fn cancel_generation(&mut self) -> bool {
        let Some(in_flight) = self.in_flight.take() else {
            return false;
        };
        info!(sequence = in_flight.sequence, "generation cancelled");
        if let Some(token) = self.cancel.as_ref() {
            token.cancel();
        }
        self.state = in_flight.resume;
        true
    }

    pub fn show_original(&mut self) -> StudioResult<()> {
        if self.result.is_none() {
            return Err(self.unavailable("show the original"));
        }
        self.set_view(DisplayView::Original);
        Ok(())
    }

    pub fn show_result(&mut self) -> StudioResult<()> {
        if self.result.is_none() {
            return Err(self.unavailable("show the result"));
        }
        self.set_view(DisplayView::Result);
        Ok(())
    }

    /// Returns to the state that preceded the failed operation.
    pub fn dismiss_failure(&mut self) -> Option<String> {
        let WorkflowState::Failed(reason) = &self.state else {
            return None;
        };
        let reason = reason.clone();
        self.resume_from_failure();
        Some(reason)
    }

    fn initial_inputs(
        &self,
        settled: &WorkflowState,
    ) -> StudioResult<(String, Vec<ImageSource>)> {
        if self.mode.requires_images() && self.references.is_empty() {
            return Err(StudioError::MissingInput(NO_IMAGES_MESSAGE.to_string()));
        }
        if self.mode == ToolMode::SocialCreator
            && !matches!(
                settled,
                WorkflowState::ReviewingPrompt | WorkflowState::ShowingResult
            )
        {
            return Err(self.unavailable_in("generate", settled));
        }
        let instruction = self.instruction();
        if instruction.trim().is_empty() {
            let message = match self.mode {
                ToolMode::StyleEditor if self.style_id.is_none() => "Please select a style.",
                ToolMode::Enhancer => "Please describe the change you want.",
                _ => EMPTY_PROMPT_MESSAGE,
            };
            return Err(StudioError::MissingInput(message.to_string()));
        }
        Ok((instruction, self.original_sources()))
    }

    fn refine_inputs(
        &self,
        settled: &WorkflowState,
        text: &str,
    ) -> StudioResult<(String, Vec<ImageSource>)> {
        let Some(result) = self.result.as_ref() else {
            return Err(self.unavailable_in("refine", settled));
        };
        if *settled != WorkflowState::ShowingResult {
            return Err(self.unavailable_in("refine", settled));
        }
        if text.trim().is_empty() {
            return Err(StudioError::MissingInput(
                "Please enter a follow-up instruction.".to_string(),
            ));
        }
        let sources = match self.view {
            DisplayView::Original if !self.references.is_empty() => self.original_sources(),
            _ => vec![ImageSource::Handle(result.handle.clone())],
        };
        Ok((text.to_string(), sources))
    }

    fn original_sources(&self) -> Vec<ImageSource> {
        self.references
            .iter()
            .cloned()
            .map(ImageSource::Raw)
            .collect()
    }

    fn aspect_ratio(&self) -> Option<AspectRatio> {
        match self.mode {
            ToolMode::SocialCreator => self
                .platform()
                .map(|platform| AspectRatio::new(platform.aspect_ratio.clone())),
            _ => None,
        }
    }

    /// Stores a new result; the view always flips back to it.
    fn show(&mut self, handle: ImageHandle, sequence: u64, late: bool) -> GenerationResult {
        self.emit(SessionEvent::GenerationCompleted {
            sequence,
            mime_type: handle.mime_type().map(str::to_string),
            digest: handle.short_digest(),
            late,
        });
        let result = GenerationResult { handle, sequence };
        self.result = Some(result.clone());
        self.view = DisplayView::Result;
        result
    }

    fn recompose(&mut self) {
        self.instruction = match self.style_id.as_deref() {
            Some(style_id) => compose(&self.catalog, style_id, &self.modifiers),
            None => String::new(),
        };
    }

    fn set_view(&mut self, view: DisplayView) {
        if self.view == view {
            return;
        }
        self.view = view;
        let label = match view {
            DisplayView::Result => "result",
            DisplayView::Original => "original",
        };
        self.emit(SessionEvent::ViewChanged {
            view: label.to_string(),
        });
    }

    fn settled_state(&self) -> WorkflowState {
        match &self.state {
            WorkflowState::Failed(_) => self
                .resume_state
                .clone()
                .unwrap_or(WorkflowState::Idle),
            other => other.clone(),
        }
    }

    fn resume_from_failure(&mut self) {
        if matches!(self.state, WorkflowState::Failed(_)) {
            self.state = self.resume_state.take().unwrap_or(WorkflowState::Idle);
        }
    }

    fn fail(&mut self, resume: WorkflowState, err: &StudioError, step: FailedStep) {
        let reason = err.user_message();
        match err {
            StudioError::InvalidImageReference(detail) => {
                error!(detail = %detail, "internal image reference error")
            }
            other => warn!(error = %other, "operation failed"),
        }
        let error = err.to_string();
        self.emit(match step {
            FailedStep::Draft => SessionEvent::DraftFailed {
                reason: reason.clone(),
                error,
            },
            FailedStep::Generation => SessionEvent::GenerationFailed {
                reason: reason.clone(),
                error,
            },
        });
        self.state = WorkflowState::Failed(reason);
        self.resume_state = Some(resume);
    }

    fn rearm_cancel(&self) {
        if let Some(token) = self.cancel.as_ref() {
            token.reset();
        }
    }

    fn ensure_not_busy(&self) -> StudioResult<()> {
        if self.state.is_busy() {
            return Err(StudioError::Busy);
        }
        Ok(())
    }

    fn require_mode(&self, mode: ToolMode, action: &str) -> StudioResult<()> {
        if self.mode == mode {
            return Ok(());
        }
        Err(self.unavailable(action))
    }

    fn unavailable(&self, action: &str) -> StudioError {
        StudioError::ActionUnavailable {
            action: action.to_string(),
            state: format!("in {} mode ({})", self.mode.label(), self.state.label()),
        }
    }

    fn unavailable_in(&self, action: &str, state: &WorkflowState) -> StudioError {
        StudioError::ActionUnavailable {
            action: action.to_string(),
            state: state.label().to_string(),
        }
    }

    fn emit(&self, event: SessionEvent) {
        let Some(events) = self.events.as_ref() else {
            return;
        };
        if let Err(err) = events.record(&event) {
            warn!(event = event.kind(), error = %err, "failed to append session event");
        }
    }
}
