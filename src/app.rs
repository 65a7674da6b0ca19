use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Table};
use tracing::{debug, error, info, warn};

use crate::compose::{GeminiGenerator, PromptComposer, TextGenerator};
use crate::config::{Config, ConfigManager};
use crate::form::{AnimationStyle, CameraMovement, LightingMood, PromptForm};
use crate::input::{command_summary, CopiedFlag, FormCommand, PromptClipboard};
use crate::status::StatusWriter;

/// Shown instead of a prompt when the generation cycle fails outside the
/// composer boundary. The composer itself never fails; see `compose`.
pub const GENERATION_FAILED_MESSAGE: &str =
    "Oops! The magic wand fizzled out. Please try again.";

pub struct MagicPromptApp<G> {
    composer: PromptComposer<G>,
    clipboard: Option<PromptClipboard>,
    status_writer: StatusWriter,
    api_key: String,
    current_config: Config,
    form: PromptForm,
    generated_prompt: Option<String>,
    copied: CopiedFlag,
    is_generating: bool,
}

impl MagicPromptApp<GeminiGenerator> {
    pub fn new(config_manager: &ConfigManager, api_key: String) -> Result<Self> {
        let config = config_manager.get();
        let generator = GeminiGenerator::new(api_key.clone(), &config)
            .context("Failed to configure the generation backend")?;

        if !generator.has_credentials() {
            warn!(
                "GEMINI_API_KEY is not set; every generation will use the deterministic fallback"
            );
        }
        info!("🎯 Generation backend ready (model: {})", generator.model());

        Self::with_generator(config_manager, generator, api_key)
    }

    pub fn apply_config_update(&mut self, new_config: Config) -> Result<()> {
        if new_config == self.current_config {
            debug!("Config unchanged; ignoring update");
            return Ok(());
        }

        if self.is_generating {
            warn!("Skipping config refresh while a generation is in flight");
            return Ok(());
        }

        if GeminiGenerator::needs_refresh(&self.current_config, &new_config) {
            let generator = GeminiGenerator::new(self.api_key.clone(), &new_config)
                .context("Failed to reconfigure the generation backend")?;
            info!("🎯 Generation backend refreshed (model: {})", generator.model());
            self.composer = PromptComposer::new(generator);
        }

        self.current_config = new_config;
        info!("Configuration updated");
        Ok(())
    }
}

impl<G: TextGenerator> MagicPromptApp<G> {
    /// Builds the app around an already-constructed generation backend.
    /// `new` routes through here; tests inject scripted backends the same way.
    pub fn with_generator(
        config_manager: &ConfigManager,
        generator: G,
        api_key: String,
    ) -> Result<Self> {
        let config = config_manager.get();

        let clipboard = match PromptClipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(err) => {
                warn!("Clipboard unavailable; copy will only light the indicator: {err:#}");
                None
            }
        };

        let status_writer = StatusWriter::new()?;
        status_writer.set_generating(false)?;

        Ok(Self {
            composer: PromptComposer::new(generator),
            clipboard,
            status_writer,
            api_key,
            current_config: config,
            form: PromptForm::default(),
            generated_prompt: None,
            copied: CopiedFlag::default(),
            is_generating: false,
        })
    }

    pub fn form(&self) -> &PromptForm {
        &self.form
    }

    pub fn generated_prompt(&self) -> Option<&str> {
        self.generated_prompt.as_deref()
    }

    pub fn is_generating(&self) -> bool {
        self.is_generating
    }

    pub fn is_copied(&self) -> bool {
        self.copied.is_lit()
    }

    pub async fn handle_command(&mut self, command: FormCommand) -> Result<()> {
        match command {
            FormCommand::SetIdea(idea) => {
                self.form.set_story_idea(&idea);
                info!(
                    "📖 Story idea set ({} characters)",
                    self.form.story_idea.chars().count()
                );
            }
            FormCommand::SetStyle(style) => {
                self.form.style = style;
                info!("🎨 Visual style: {}", style.label());
            }
            FormCommand::SetCamera(camera) => {
                self.form.camera = camera;
                info!("🎥 Camera movement: {}", camera.label());
            }
            FormCommand::SetMood(mood) => {
                self.form.mood = mood;
                info!("☀️ Lighting mood: {}", mood.label());
            }
            FormCommand::Generate => self.generate().await,
            FormCommand::Copy => self.copy_prompt(),
            FormCommand::Show => self.show_form(),
            FormCommand::Help => println!("{}", command_summary()),
            FormCommand::Quit => debug!("Quit is handled by the event loop"),
        }

        Ok(())
    }

    async fn generate(&mut self) {
        if self.is_generating {
            warn!("Still generating the previous prompt, ignoring request");
            return;
        }

        if !self.form.has_story_idea() {
            warn!("📖 Story idea is empty - nothing to generate");
            return;
        }

        info!("✨ Creating magic...");
        self.is_generating = true;
        self.generated_prompt = None;
        self.copied.clear();

        let prompt = match self.run_generation().await {
            Ok(prompt) => prompt,
            Err(err) => {
                error!("❌ Prompt generation cycle failed: {err:#}");
                GENERATION_FAILED_MESSAGE.to_string()
            }
        };

        self.display_prompt(&prompt);
        self.generated_prompt = Some(prompt);
        self.is_generating = false;

        if let Err(err) = self.status_writer.set_generating(false) {
            warn!("Failed to clear busy status: {err:#}");
        }

        if self.current_config.auto_copy_clipboard {
            self.copy_prompt();
        }
    }

    async fn run_generation(&mut self) -> Result<String> {
        self.status_writer
            .set_generating(true)
            .context("Failed to publish busy status")?;

        Ok(self.composer.compose(&self.form).await)
    }

    fn copy_prompt(&mut self) {
        if self.is_generating {
            warn!("Still generating, nothing to copy yet");
            return;
        }

        let Some(prompt) = self.generated_prompt.clone() else {
            warn!("No generated prompt to copy yet");
            return;
        };

        match self.clipboard.as_mut() {
            Some(clipboard) => clipboard.copy(&prompt),
            None => warn!("Clipboard unavailable; prompt not copied"),
        }

        self.copied.flash();
        info!("📋 Copied!");
    }

    fn display_prompt(&self, prompt: &str) {
        println!();
        println!("✨ Your magic prompt:");
        println!("{prompt}");
        println!();
    }

    fn show_form(&self) {
        let mut form_table = Table::new();
        form_table
            .load_preset(UTF8_FULL_CONDENSED)
            .set_header(vec!["Field", "Selection"]);
        let idea_display = if self.form.has_story_idea() {
            self.form.story_idea.as_str()
        } else {
            "<empty>"
        };
        form_table
            .add_row(vec!["Story idea", idea_display])
            .add_row(vec!["Visual style", self.form.style.label()])
            .add_row(vec!["Camera", self.form.camera.label()])
            .add_row(vec!["Mood", self.form.mood.label()]);

        let mut options_table = Table::new();
        options_table
            .load_preset(UTF8_FULL_CONDENSED)
            .set_header(vec!["#", "Visual style", "Camera", "Mood"]);
        let rows = AnimationStyle::ALL
            .len()
            .max(CameraMovement::ALL.len())
            .max(LightingMood::ALL.len());
        for index in 0..rows {
            options_table.add_row(vec![
                (index + 1).to_string(),
                AnimationStyle::ALL
                    .get(index)
                    .map(|style| style.label().to_string())
                    .unwrap_or_default(),
                CameraMovement::ALL
                    .get(index)
                    .map(|camera| camera.label().to_string())
                    .unwrap_or_default(),
                LightingMood::ALL
                    .get(index)
                    .map(|mood| mood.label().to_string())
                    .unwrap_or_default(),
            ]);
        }

        println!("{form_table}");
        println!("{options_table}");
        if let Some(prompt) = &self.generated_prompt {
            println!("Last prompt: {prompt}");
        }
    }
}
