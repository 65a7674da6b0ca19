use crate::form::{resolve_choice, AnimationStyle, CameraMovement, LightingMood};

/// One user action parsed from a stdin line. Field-setting commands replace
/// exactly one form field; everything else is dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormCommand {
    SetIdea(String),
    SetStyle(AnimationStyle),
    SetCamera(CameraMovement),
    SetMood(LightingMood),
    Generate,
    Copy,
    Show,
    Help,
    Quit,
}

/// Parses a line into a command. `Err` carries a user-facing message.
///
/// An empty line triggers generation, mirroring the press-Enter idiom of the
/// interactive loop.
pub fn parse_line(line: &str) -> Result<FormCommand, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(FormCommand::Generate);
    }

    let (keyword, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (trimmed, ""),
    };

    match keyword.to_ascii_lowercase().as_str() {
        "idea" => {
            if rest.is_empty() {
                Err("Usage: idea <your story idea>".to_string())
            } else {
                Ok(FormCommand::SetIdea(rest.to_string()))
            }
        }
        "style" => resolve_choice(rest, &AnimationStyle::ALL, AnimationStyle::label)
            .map(FormCommand::SetStyle)
            .ok_or_else(|| unknown_choice("style", rest, &choice_list(&AnimationStyle::ALL, AnimationStyle::label))),
        "camera" => resolve_choice(rest, &CameraMovement::ALL, CameraMovement::label)
            .map(FormCommand::SetCamera)
            .ok_or_else(|| unknown_choice("camera", rest, &choice_list(&CameraMovement::ALL, CameraMovement::label))),
        "mood" => resolve_choice(rest, &LightingMood::ALL, LightingMood::label)
            .map(FormCommand::SetMood)
            .ok_or_else(|| unknown_choice("mood", rest, &choice_list(&LightingMood::ALL, LightingMood::label))),
        "generate" | "go" => Ok(FormCommand::Generate),
        "copy" => Ok(FormCommand::Copy),
        "show" => Ok(FormCommand::Show),
        "help" | "?" => Ok(FormCommand::Help),
        "quit" | "exit" => Ok(FormCommand::Quit),
        other => Err(format!(
            "Unknown command '{other}' - type 'help' for the command list"
        )),
    }
}

pub fn command_summary() -> &'static str {
    "Commands:\n\
     \x20 idea <text>       set the story idea (max 300 characters)\n\
     \x20 style <n|name>    pick a visual style\n\
     \x20 camera <n|name>   pick a camera movement\n\
     \x20 mood <n|name>     pick a lighting mood\n\
     \x20 show              show the current form and options\n\
     \x20 generate / Enter  generate the magic prompt\n\
     \x20 copy              copy the last prompt to the clipboard\n\
     \x20 quit              exit"
}

fn unknown_choice(field: &str, input: &str, options: &str) -> String {
    format!("Unknown {field} '{input}'. Options: {options}")
}

fn choice_list<T: Copy>(options: &[T], label: fn(&T) -> &'static str) -> String {
    options
        .iter()
        .enumerate()
        .map(|(index, option)| format!("{}. {}", index + 1, label(option)))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_line_means_generate() {
        assert_eq!(parse_line(""), Ok(FormCommand::Generate));
        assert_eq!(parse_line("   "), Ok(FormCommand::Generate));
    }

    #[test]
    fn idea_captures_the_rest_of_the_line() {
        assert_eq!(
            parse_line("idea A small bear eating honey"),
            Ok(FormCommand::SetIdea("A small bear eating honey".to_string()))
        );
        assert!(parse_line("idea").is_err());
    }

    #[test]
    fn selections_accept_index_and_label() {
        assert_eq!(
            parse_line("style 2"),
            Ok(FormCommand::SetStyle(AnimationStyle::Claymation))
        );
        assert_eq!(
            parse_line("camera drone shot"),
            Ok(FormCommand::SetCamera(CameraMovement::Drone))
        );
        assert_eq!(
            parse_line("mood magical glowing"),
            Ok(FormCommand::SetMood(LightingMood::Magical))
        );
    }

    #[test]
    fn bad_selection_lists_the_options() {
        let err = parse_line("style neon").unwrap_err();
        assert!(err.contains("1. 3D Disney/Pixar Style"));
        assert!(err.contains("4. Watercolor Storybook"));
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(parse_line("GENERATE"), Ok(FormCommand::Generate));
        assert_eq!(parse_line("Copy"), Ok(FormCommand::Copy));
        assert_eq!(parse_line("QUIT"), Ok(FormCommand::Quit));
    }

    #[test]
    fn unknown_commands_point_at_help() {
        let err = parse_line("frobnicate").unwrap_err();
        assert!(err.contains("help"));
    }
}
