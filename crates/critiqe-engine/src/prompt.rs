//! Prompt composition: catalog templates for the style editor, fixed texts
//! for the enhancer and model-drafted prompts for the social creator.

use std::collections::BTreeSet;

use critiqe_contracts::catalog::{Catalog, Platform};
use tracing::{info, warn};

use crate::client::TextModel;
use crate::error::{StudioError, StudioResult};

pub const ENHANCE_PROMPT: &str = "Restore and enhance this photograph to professional quality. Significantly improve sharpness, clarity, and resolution. Fix blurriness, reduce noise, and correct lighting balance while strictly maintaining the original subject, facial features, and composition. Output in 4k definition, photorealistic.";

/// Style template followed by the selected fragments in catalog order.
///
/// Selection order is irrelevant; ids that are not in the catalog are
/// ignored. An unknown style yields an empty prompt.
pub fn compose(catalog: &Catalog, style_id: &str, selected: &BTreeSet<String>) -> String {
    let Some(style) = catalog.style(style_id) else {
        return String::new();
    };
    let fragments = catalog
        .modifiers()
        .filter(|modifier| selected.contains(&modifier.id))
        .map(|modifier| modifier.prompt_fragment.trim())
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<&str>>()
        .join(" ");

    [style.prompt_template.trim(), fragments.as_str()]
        .into_iter()
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<&str>>()
        .join(" ")
}

pub fn tweak_prompt(instruction: &str) -> String {
    format!(
        "Edit this image based on the following instruction: \"{}\". Maintain the original composition and subject identity unless specified otherwise. High quality, photorealistic result.",
        instruction.trim()
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftRequest {
    pub topic: String,
    pub platform: Platform,
    pub mood: String,
    pub has_reference_images: bool,
}

impl DraftRequest {
    pub fn instruction(&self) -> String {
        let mut lines = vec![
            "You are an art director writing a prompt for an AI image generator.".to_string(),
            format!(
                "Write one image-description prompt for a {} post about: \"{}\".",
                self.platform.name,
                self.topic.trim()
            ),
            format!(
                "Platform guidance ({}, aspect ratio {}): {}",
                self.platform.name, self.platform.aspect_ratio, self.platform.guidance
            ),
            format!("The overall mood should be {}.", self.mood),
        ];
        if self.has_reference_images {
            lines.push(
                "Reference photos of a person are attached to the generation request. The subject of the image must be the person shown in those photos, not a newly invented person; describe the scene, pose, wardrobe and setting around them.".to_string(),
            );
        } else {
            lines.push(
                "No reference photos are provided; describe every subject in the scene explicitly.".to_string(),
            );
        }
        lines.push(
            "Respond with the prompt only, as a single paragraph of plain text. No commentary, headings, quotes or markdown.".to_string(),
        );
        lines.join("\n")
    }
}

pub struct PromptDrafter<'a> {
    model: &'a dyn TextModel,
}

impl<'a> PromptDrafter<'a> {
    pub fn new(model: &'a dyn TextModel) -> Self {
        Self { model }
    }

    /// One text-model call; the result is an editable starting point.
    pub fn draft(&self, request: &DraftRequest) -> StudioResult<String> {
        if request.topic.trim().is_empty() {
            return Err(StudioError::MissingInput(
                "Please describe what your post is about.".to_string(),
            ));
        }
        info!(
            model = self.model.name(),
            platform = %request.platform.id,
            mood = %request.mood,
            has_reference_images = request.has_reference_images,
            "drafting prompt"
        );
        let text = self.model.complete(&request.instruction()).map_err(|err| {
            warn!(error = %err, "prompt draft call failed");
            match err {
                StudioError::DraftGenerationFailed(_)
                | StudioError::Cancelled
                | StudioError::AuthMissing => err,
                other => StudioError::DraftGenerationFailed(other.to_string()),
            }
        })?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(StudioError::DraftGenerationFailed(
                "model returned no text".to_string(),
            ));
        }
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeSet;

    use critiqe_contracts::catalog::Catalog;

    use super::*;

    /// Records prompts and answers with a fixed reply.
    pub(crate) struct ScriptedText {
        pub reply: StudioResult<String>,
        pub prompts: RefCell<Vec<String>>,
    }

    impl ScriptedText {
        pub(crate) fn replying(reply: StudioResult<String>) -> Self {
            Self {
                reply,
                prompts: RefCell::new(Vec::new()),
            }
        }
    }

    impl TextModel for ScriptedText {
        fn name(&self) -> &str {
            "scripted"
        }

        fn complete(&self, prompt: &str) -> StudioResult<String> {
            self.prompts.borrow_mut().push(prompt.to_string());
            self.reply.clone()
        }
    }

    fn ids(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn draft_request(catalog: &Catalog, topic: &str, has_images: bool) -> DraftRequest {
        DraftRequest {
            topic: topic.to_string(),
            platform: catalog.platform("instagram-story").cloned().unwrap_or_else(|| {
                panic!("builtin catalog has instagram-story")
            }),
            mood: "Playful".to_string(),
            has_reference_images: has_images,
        }
    }

    #[test]
    fn compose_uses_catalog_order_not_selection_order() {
        let catalog = Catalog::builtin();
        let first = compose(&catalog, "studio-headshot", &ids(&["improve-lighting", "maintain-likeness"]));
        let second = compose(&catalog, "studio-headshot", &ids(&["maintain-likeness", "improve-lighting"]));
        assert_eq!(first, second);

        let likeness = catalog.modifier("maintain-likeness").map(|m| m.prompt_fragment.clone());
        let lighting = catalog.modifier("improve-lighting").map(|m| m.prompt_fragment.clone());
        let base = catalog.style("studio-headshot").map(|s| s.prompt_template.clone());
        let (Some(likeness), Some(lighting), Some(base)) = (likeness, lighting, base) else {
            panic!("builtin catalog entries missing");
        };
        assert_eq!(first, format!("{base} {likeness} {lighting}"));
    }

    #[test]
    fn compose_without_modifiers_is_the_template() {
        let catalog = Catalog::builtin();
        let composed = compose(&catalog, "pop-art", &BTreeSet::new());
        assert_eq!(
            Some(composed.as_str()),
            catalog.style("pop-art").map(|style| style.prompt_template.as_str())
        );
        assert!(!composed.ends_with(' '));
    }

    #[test]
    fn compose_with_unknown_style_is_empty() {
        let catalog = Catalog::builtin();
        assert_eq!(compose(&catalog, "no-such-style", &ids(&["maintain-likeness"])), "");
    }

    #[test]
    fn tweak_prompt_wraps_instruction() {
        let text = tweak_prompt("  remove the glare ");
        assert!(text.starts_with("Edit this image based on the following instruction: \"remove the glare\"."));
    }

    #[test]
    fn draft_instruction_mentions_platform_mood_and_reference_subject() {
        let catalog = Catalog::builtin();
        let with_images = draft_request(&catalog, "Our new cafe opening", true).instruction();
        assert!(with_images.contains("Our new cafe opening"));
        assert!(with_images.contains("9:16"));
        assert!(with_images.contains("Playful"));
        assert!(with_images.contains("not a newly invented person"));
        assert!(with_images.contains("No commentary"));

        let without = draft_request(&catalog, "Our new cafe opening", false).instruction();
        assert!(without.contains("No reference photos"));
    }

    #[test]
    fn draft_makes_exactly_one_call_and_trims() -> anyhow::Result<()> {
        let catalog = Catalog::builtin();
        let model = ScriptedText::replying(Ok("  A sunny cafe storefront.\n".to_string()));
        let draft = PromptDrafter::new(&model).draft(&draft_request(&catalog, "cafe", false))?;
        assert_eq!(draft, "A sunny cafe storefront.");
        assert_eq!(model.prompts.borrow().len(), 1);
        Ok(())
    }

    #[test]
    fn empty_topic_is_rejected_before_calling_the_model() {
        let catalog = Catalog::builtin();
        let model = ScriptedText::replying(Ok("unused".to_string()));
        let err = PromptDrafter::new(&model).draft(&draft_request(&catalog, "   ", false)).err();
        assert!(matches!(err, Some(StudioError::MissingInput(_))));
        assert!(model.prompts.borrow().is_empty());
    }

    #[test]
    fn blank_or_failed_reply_is_a_draft_failure() {
        let catalog = Catalog::builtin();
        let request = draft_request(&catalog, "cafe", false);

        let blank = ScriptedText::replying(Ok("  \n".to_string()));
        assert!(matches!(
            PromptDrafter::new(&blank).draft(&request),
            Err(StudioError::DraftGenerationFailed(_))
        ));

        let down = ScriptedText::replying(Err(StudioError::TransportError("503".to_string())));
        assert!(matches!(
            PromptDrafter::new(&down).draft(&request),
            Err(StudioError::DraftGenerationFailed(_))
        ));
    }
}
