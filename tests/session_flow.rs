//! Drives the app the way the terminal loop does: raw lines through the
//! command parser into the form state holder.

use promptwand_rs::compose::{GenerationError, InstructionPair, TextGenerator, TECHNICAL_SUFFIX};
use promptwand_rs::form::{AnimationStyle, CameraMovement, LightingMood};
use promptwand_rs::input::parse_line;
use promptwand_rs::{ConfigManager, MagicPromptApp};
use std::future::Future;

struct EchoingGenerator;

impl TextGenerator for EchoingGenerator {
    fn generate(
        &self,
        instructions: &InstructionPair,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send {
        // Reply with a marker proving which selections reached the service
        let reply = format!(
            "refined[{}]",
            instructions
                .user
                .lines()
                .next()
                .unwrap_or_default()
                .trim_start_matches("Story Idea: ")
                .trim_matches('"')
        );
        async move { Ok(reply) }
    }
}

#[tokio::test]
async fn scripted_session_generates_and_copies() {
    let config_manager = ConfigManager::load().expect("config manager loads");
    let mut app = MagicPromptApp::with_generator(&config_manager, EchoingGenerator, String::new())
        .expect("app builds");

    let lines = [
        "idea A small bear eating honey",
        "style 2",
        "camera drone",
        "mood golden hour",
        "",
        "copy",
    ];

    for line in lines {
        let command = parse_line(line).expect("line parses");
        app.handle_command(command).await.expect("command handled");
    }

    assert_eq!(app.form().style, AnimationStyle::Claymation);
    assert_eq!(app.form().camera, CameraMovement::Drone);
    assert_eq!(app.form().mood, LightingMood::GoldenHour);

    let prompt = app.generated_prompt().expect("prompt stored");
    assert_eq!(
        prompt,
        format!("refined[A small bear eating honey], {TECHNICAL_SUFFIX}")
    );
    assert!(app.is_copied());
    assert!(!app.is_generating());
}
