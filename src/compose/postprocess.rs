use regex::Regex;
use std::sync::LazyLock;

static SPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" +").expect("valid space collapse regex"));

/// Normalizes a raw model reply into a single prompt-ready line.
///
/// Models occasionally wrap the description in quotes or spread it over
/// multiple lines; the final prompt is always one comma-joined line, so both
/// are flattened here. Returns an empty string for replies with no content.
pub fn clean_reply(reply: &str) -> String {
    let flattened = normalize_line_breaks(reply);
    let collapsed = SPACE_REGEX.replace_all(&flattened, " ");
    strip_wrapping_quotes(collapsed.trim()).to_string()
}

fn normalize_line_breaks(input: &str) -> String {
    if input.contains(['\r', '\n']) {
        input
            .replace("\r\n", " ")
            .replace('\r', " ")
            .replace('\n', " ")
    } else {
        input.to_string()
    }
}

fn strip_wrapping_quotes(input: &str) -> &str {
    for (open, close) in [('"', '"'), ('\u{201C}', '\u{201D}')] {
        if input.len() >= 2 && input.starts_with(open) && input.ends_with(close) {
            let inner = &input[open.len_utf8()..input.len() - close.len_utf8()];
            // Only strip a pair that wraps the whole reply, not interior quotes
            if !inner.contains(open) && !inner.contains(close) {
                return inner.trim();
            }
        }
    }
    input
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_reply_passes_through_trimmed() {
        assert_eq!(clean_reply("  A bear explores.  "), "A bear explores.");
    }

    #[test]
    fn line_breaks_collapse_to_single_spaces() {
        assert_eq!(
            clean_reply("A bear\nexplores the\r\nforest."),
            "A bear explores the forest."
        );
    }

    #[test]
    fn wrapping_quotes_are_stripped() {
        assert_eq!(clean_reply("\"A bear explores.\""), "A bear explores.");
        assert_eq!(clean_reply("\u{201C}A bear explores.\u{201D}"), "A bear explores.");
    }

    #[test]
    fn interior_quotes_survive() {
        assert_eq!(
            clean_reply("\"A bear\" explores \"the forest\""),
            "\"A bear\" explores \"the forest\""
        );
    }

    #[test]
    fn whitespace_only_reply_becomes_empty() {
        assert_eq!(clean_reply("   \n \t "), "");
    }
}
