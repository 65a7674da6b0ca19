use crate::form::PromptForm;

/// System/user instruction pair for a single `generateContent` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionPair {
    pub system: String,
    pub user: String,
}

const SYSTEM_INSTRUCTION: &str = "\
You are an expert prompt engineer for high-end AI video generation (specifically Google Veo).
Your task is to take a simple story idea and technical parameters, and weave them into a single, cohesive, descriptive paragraph.

Guidelines:
1. Focus on visual details: colors, textures, and action.
2. Incorporate the 'Visual Style', 'Camera Movement', and 'Lighting' naturally into the description.
3. Keep the tone magical, high-quality, and suitable for the requested style (e.g., cute for Disney, tactile for Claymation).
4. Do NOT add technical quality tags (like 4k, unreal engine) in your output text; these will be appended programmatically later.
5. The output should be one or two solid sentences describing the scene.";

pub fn build_instructions(form: &PromptForm) -> InstructionPair {
    let user = format!(
        "Story Idea: \"{}\"\n\
         Visual Style: {} ({})\n\
         Camera Movement: {}\n\
         Lighting/Mood: {}\n\n\
         Write the visual description part of the prompt.",
        form.story_idea,
        form.style.label(),
        form.style.description(),
        form.camera.label(),
        form.mood.label(),
    );

    InstructionPair {
        system: SYSTEM_INSTRUCTION.to_string(),
        user,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{AnimationStyle, CameraMovement, LightingMood};

    #[test]
    fn user_instruction_interpolates_all_selections_verbatim() {
        let form = PromptForm {
            story_idea: "A small bear eating honey in a glowing forest".to_string(),
            style: AnimationStyle::Claymation,
            camera: CameraMovement::Drone,
            mood: LightingMood::GoldenHour,
        };

        let pair = build_instructions(&form);
        assert!(pair
            .user
            .contains("Story Idea: \"A small bear eating honey in a glowing forest\""));
        assert!(pair.user.contains("Claymation/Stop Motion"));
        assert!(pair.user.contains("Aardman style claymation"));
        assert!(pair.user.contains("Camera Movement: Drone Shot"));
        assert!(pair.user.contains("Lighting/Mood: Golden Hour"));
    }

    #[test]
    fn system_instruction_forbids_quality_tags() {
        let pair = build_instructions(&PromptForm::default());
        assert!(pair.system.contains("Do NOT add technical quality tags"));
        assert!(pair.system.contains("one or two solid sentences"));
    }
}
