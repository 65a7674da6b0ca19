mod gemini;
mod instruction;
mod postprocess;

use crate::form::PromptForm;
use crate::logging::{record_compose_trace, ComposeStageRecord, ComposeTraceRecord};
use tracing::{info, warn};

pub use gemini::{GeminiGenerator, GenerationError, TextGenerator};
pub use instruction::{build_instructions, InstructionPair};
pub use postprocess::clean_reply;

/// Quality keywords appended to every generated prompt. The model is told to
/// leave these out of its reply; they are joined on programmatically so the
/// suffix is byte-stable across generations.
pub const TECHNICAL_SUFFIX: &str = "4k resolution, highly detailed, smooth motion, \
trending on artstation, unreal engine 5 render, cinematic composition, no distortion";

/// Turns a form snapshot into the final prompt string.
///
/// Composition never fails: any service error resolves to the deterministic
/// fallback join, so the caller always receives displayable text. This is a
/// deliberate contract (the user must always get something), not a gap.
pub struct PromptComposer<G> {
    generator: G,
}

impl<G: TextGenerator> PromptComposer<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub async fn compose(&self, form: &PromptForm) -> String {
        let instructions = build_instructions(form);

        let mut stages = if tracing::level_enabled!(tracing::Level::DEBUG) {
            Some(Vec::new())
        } else {
            None
        };

        let final_prompt = match self.generator.generate(&instructions).await {
            Ok(raw) => {
                let cleaned = clean_reply(&raw);
                if let Some(ref mut stages) = stages {
                    stages.push(ComposeStageRecord::new("clean_reply", raw, cleaned.clone()));
                }

                let description = if cleaned.is_empty() {
                    warn!("Model returned an empty description; using the story idea as-is");
                    form.story_idea.clone()
                } else {
                    cleaned
                };

                let assembled = format!("{description}, {TECHNICAL_SUFFIX}");
                if let Some(ref mut stages) = stages {
                    stages.push(ComposeStageRecord::new(
                        "append_technical_suffix",
                        description,
                        assembled.clone(),
                    ));
                }

                info!("✨ Prompt refined (model description + technical suffix)");
                assembled
            }
            Err(err) => {
                warn!("Prompt generation failed, falling back to plain concatenation: {err}");
                let assembled = fallback_prompt(form);
                if let Some(ref mut stages) = stages {
                    stages.push(ComposeStageRecord::new(
                        "deterministic_fallback",
                        form.story_idea.clone(),
                        assembled.clone(),
                    ));
                }
                assembled
            }
        };

        if let Some(stages) = stages {
            record_compose_trace(ComposeTraceRecord::new(
                form.story_idea.clone(),
                final_prompt.clone(),
                stages,
            ));
        }

        final_prompt
    }
}

/// Degraded deterministic prompt: the raw selections joined with the suffix.
pub fn fallback_prompt(form: &PromptForm) -> String {
    [
        form.story_idea.as_str(),
        form.style.label(),
        form.camera.label(),
        form.mood.label(),
        TECHNICAL_SUFFIX,
    ]
    .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{AnimationStyle, CameraMovement, LightingMood};

    #[test]
    fn fallback_joins_selections_and_suffix() {
        let form = PromptForm {
            story_idea: "Idea".to_string(),
            style: AnimationStyle::Claymation,
            camera: CameraMovement::Drone,
            mood: LightingMood::Magical,
        };

        assert_eq!(
            fallback_prompt(&form),
            format!("Idea, Claymation/Stop Motion, Drone Shot, Magical Glowing, {TECHNICAL_SUFFIX}")
        );
    }

    #[test]
    fn technical_suffix_is_byte_stable() {
        assert_eq!(
            TECHNICAL_SUFFIX,
            "4k resolution, highly detailed, smooth motion, trending on artstation, \
             unreal engine 5 render, cinematic composition, no distortion"
        );
    }
}
