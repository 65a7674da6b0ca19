mod clipboard;
mod commands;

pub use clipboard::{CopiedFlag, PromptClipboard, COPIED_FLASH};
pub use commands::{command_summary, parse_line, FormCommand};
