use serde::{Deserialize, Serialize};

/// Story ideas longer than this are truncated at a character boundary.
pub const MAX_STORY_IDEA_CHARS: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnimationStyle {
    #[default]
    DisneyPixar,
    Claymation,
    VectorFlat,
    Watercolor,
}

impl AnimationStyle {
    pub const ALL: [Self; 4] = [
        Self::DisneyPixar,
        Self::Claymation,
        Self::VectorFlat,
        Self::Watercolor,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::DisneyPixar => "3D Disney/Pixar Style",
            Self::Claymation => "Claymation/Stop Motion",
            Self::VectorFlat => "2D Vector Flat Design",
            Self::Watercolor => "Watercolor Storybook",
        }
    }

    /// Descriptive clause handed to the model alongside the label.
    pub fn description(&self) -> &'static str {
        match self {
            Self::DisneyPixar => {
                "3D animation style, cute big eyes, fluffy texture, vibrant colors, \
                 Disney Pixar style render"
            }
            Self::Claymation => {
                "Aardman style claymation, stop motion animation, tactile clay texture, \
                 handmade feel, fingerprint details"
            }
            Self::VectorFlat => {
                "2D vector flat design, Kurzgesagt style, clean lines, educational \
                 animation style, bright solid colors, minimal shading"
            }
            Self::Watercolor => {
                "Watercolor storybook illustration style, soft edges, dreamy atmosphere, \
                 paper texture background, hand-painted look"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CameraMovement {
    #[default]
    Static,
    SlowPan,
    ZoomIn,
    Drone,
    LowAngle,
}

impl CameraMovement {
    pub const ALL: [Self; 5] = [
        Self::Static,
        Self::SlowPan,
        Self::ZoomIn,
        Self::Drone,
        Self::LowAngle,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Static => "Static Shot",
            Self::SlowPan => "Slow Pan",
            Self::ZoomIn => "Slow Zoom In",
            Self::Drone => "Drone Shot",
            Self::LowAngle => "Low Angle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LightingMood {
    #[default]
    Sunny,
    GoldenHour,
    Magical,
    Studio,
}

impl LightingMood {
    pub const ALL: [Self; 4] = [
        Self::Sunny,
        Self::GoldenHour,
        Self::Magical,
        Self::Studio,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sunny => "Sunny Day",
            Self::GoldenHour => "Golden Hour",
            Self::Magical => "Magical Glowing",
            Self::Studio => "Soft Studio Lighting",
        }
    }
}

/// Resolves a user-typed choice against an option list: either a 1-based
/// index or a case-insensitive match on the label (or a unique prefix of it).
pub fn resolve_choice<T: Copy>(input: &str, options: &[T], label: fn(&T) -> &'static str) -> Option<T> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(index) = trimmed.parse::<usize>() {
        if (1..=options.len()).contains(&index) {
            return Some(options[index - 1]);
        }
        return None;
    }

    let needle = trimmed.to_ascii_lowercase();
    let mut prefix_match = None;
    let mut prefix_hits = 0;

    for option in options {
        let candidate = label(option).to_ascii_lowercase();
        if candidate == needle {
            return Some(*option);
        }
        if candidate.starts_with(&needle) {
            prefix_match = Some(*option);
            prefix_hits += 1;
        }
    }

    if prefix_hits == 1 {
        prefix_match
    } else {
        None
    }
}

/// The user's current selections. Mutated one field at a time by the app;
/// the composer only ever sees an immutable snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PromptForm {
    pub story_idea: String,
    pub style: AnimationStyle,
    pub camera: CameraMovement,
    pub mood: LightingMood,
}

impl PromptForm {
    pub fn set_story_idea(&mut self, idea: &str) {
        if idea.chars().count() > MAX_STORY_IDEA_CHARS {
            tracing::warn!(
                "Story idea exceeds {} characters; truncating",
                MAX_STORY_IDEA_CHARS
            );
            self.story_idea = idea.chars().take(MAX_STORY_IDEA_CHARS).collect();
        } else {
            self.story_idea = idea.to_string();
        }
    }

    pub fn has_story_idea(&self) -> bool {
        !self.story_idea.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_initial_selections() {
        let form = PromptForm::default();
        assert_eq!(form.style, AnimationStyle::DisneyPixar);
        assert_eq!(form.camera, CameraMovement::Static);
        assert_eq!(form.mood, LightingMood::Sunny);
        assert!(form.story_idea.is_empty());
        assert!(!form.has_story_idea());
    }

    #[test]
    fn story_idea_is_clamped_at_character_boundary() {
        let mut form = PromptForm::default();
        let long: String = "ä".repeat(MAX_STORY_IDEA_CHARS + 50);
        form.set_story_idea(&long);
        assert_eq!(form.story_idea.chars().count(), MAX_STORY_IDEA_CHARS);
        assert!(form.story_idea.chars().all(|c| c == 'ä'));
    }

    #[test]
    fn whitespace_only_idea_is_not_ready() {
        let mut form = PromptForm::default();
        form.set_story_idea("   \t ");
        assert!(!form.has_story_idea());
    }

    #[test]
    fn setting_one_field_leaves_the_rest_untouched() {
        let mut form = PromptForm::default();
        form.set_story_idea("A bear explores.");
        form.mood = LightingMood::Magical;
        assert_eq!(form.style, AnimationStyle::DisneyPixar);
        assert_eq!(form.camera, CameraMovement::Static);
        assert_eq!(form.story_idea, "A bear explores.");
    }

    #[test]
    fn choice_resolution_accepts_index_and_label() {
        let by_index = resolve_choice("2", &AnimationStyle::ALL, AnimationStyle::label);
        assert_eq!(by_index, Some(AnimationStyle::Claymation));

        let by_label = resolve_choice("drone shot", &CameraMovement::ALL, CameraMovement::label);
        assert_eq!(by_label, Some(CameraMovement::Drone));

        let by_prefix = resolve_choice("water", &AnimationStyle::ALL, AnimationStyle::label);
        assert_eq!(by_prefix, Some(AnimationStyle::Watercolor));
    }

    #[test]
    fn choice_resolution_rejects_ambiguous_and_out_of_range() {
        assert_eq!(
            resolve_choice("slow", &CameraMovement::ALL, CameraMovement::label),
            None
        );
        assert_eq!(
            resolve_choice("0", &LightingMood::ALL, LightingMood::label),
            None
        );
        assert_eq!(
            resolve_choice("9", &LightingMood::ALL, LightingMood::label),
            None
        );
    }

    #[test]
    fn every_style_has_a_distinct_descriptor() {
        let mut seen = std::collections::HashSet::new();
        for style in AnimationStyle::ALL {
            assert!(!style.description().is_empty());
            assert!(seen.insert(style.description()));
        }
    }
}
