use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};
use std::fmt;
use time::{format_description::FormatItem, macros::format_description, OffsetDateTime};
use tracing::{Level, Subscriber};
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields},
    registry::LookupSpan,
};

const TRACE_TARGET: &str = "promptwand::compose_trace";
const MAX_DIFF_CHARS: usize = 2048;
const PREVIEW_CHAR_LIMIT: usize = 120;
const TARGET_GUTTER_WIDTH: usize = 26;
const TIMESTAMP_FORMAT: &[FormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Debug-level record of one composition cycle: the story idea going in, the
/// stages the text passed through, and the prompt coming out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposeTraceRecord {
    pub story_idea: String,
    pub final_prompt: String,
    pub stages: Vec<ComposeStageRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposeStageRecord {
    pub name: String,
    pub before: String,
    pub after: String,
    pub applied: bool,
}

impl ComposeTraceRecord {
    pub fn new(story_idea: String, final_prompt: String, stages: Vec<ComposeStageRecord>) -> Self {
        Self {
            story_idea,
            final_prompt,
            stages,
        }
    }

    pub fn applied_stages(&self) -> usize {
        self.stages.iter().filter(|stage| stage.applied).count()
    }

    pub fn render_pretty(&self, use_color: bool) -> String {
        let mut lines = Vec::new();
        lines.push(format!(
            "┌─ Prompt Composition (stages: {}, changed: {})",
            self.stages.len(),
            self.applied_stages()
        ));
        lines.push(format!(
            "│ IDEA: {}",
            preview_value(&self.story_idea, use_color)
        ));

        for stage in &self.stages {
            for line in stage.render_lines(use_color) {
                lines.push(format!("│ {line}"));
            }
        }

        lines.push(format!(
            "│ OUT : {}",
            preview_value(&self.final_prompt, use_color)
        ));
        lines.push("└─".to_string());

        lines.join("\n")
    }
}

impl ComposeStageRecord {
    pub fn new(name: impl Into<String>, before: String, after: String) -> Self {
        let applied = before != after;
        Self {
            name: name.into(),
            before,
            after,
            applied,
        }
    }

    fn render_lines(&self, use_color: bool) -> Vec<String> {
        if !self.applied {
            return Vec::new();
        }

        let mut lines = vec![format!("• {} (applied)", self.name)];
        if let Some(diff_lines) = self.inline_diff(use_color) {
            for diff in diff_lines {
                lines.push(format!("  {diff}"));
            }
        } else {
            lines.push(format!("  - {}", preview_value(&self.before, use_color)));
            lines.push(format!("  + {}", preview_value(&self.after, use_color)));
        }
        lines
    }

    fn inline_diff(&self, use_color: bool) -> Option<Vec<String>> {
        if self.before.len() + self.after.len() > MAX_DIFF_CHARS {
            return None;
        }

        let diff = TextDiff::from_words(&self.before, &self.after);
        let mut removed = String::new();
        let mut added = String::new();
        let mut has_delete = false;
        let mut has_insert = false;

        for change in diff.iter_all_changes() {
            let fragment = escape_fragment(change.value());
            match change.tag() {
                ChangeTag::Delete => {
                    has_delete = true;
                    removed.push_str(&paint(&fragment, use_color, DiffStyle::Delete));
                }
                ChangeTag::Insert => {
                    has_insert = true;
                    added.push_str(&paint(&fragment, use_color, DiffStyle::Insert));
                }
                ChangeTag::Equal => {
                    removed.push_str(&paint(&fragment, use_color, DiffStyle::Context));
                    added.push_str(&paint(&fragment, use_color, DiffStyle::Context));
                }
            }
        }

        if !has_delete && !has_insert {
            return None;
        }

        let mut lines = Vec::new();
        if has_delete {
            lines.push(format!("- {removed}"));
        }
        if has_insert {
            lines.push(format!("+ {added}"));
        }
        Some(lines)
    }
}

#[derive(Debug, Clone, Copy)]
enum DiffStyle {
    Delete,
    Insert,
    Context,
}

fn paint(fragment: &str, use_color: bool, style: DiffStyle) -> String {
    if !use_color {
        return fragment.to_string();
    }
    match style {
        DiffStyle::Delete => fragment.red().to_string(),
        DiffStyle::Insert => fragment.green().to_string(),
        DiffStyle::Context => fragment.dimmed().to_string(),
    }
}

fn escape_fragment(value: &str) -> String {
    let mut rendered = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\n' => rendered.push('⏎'),
            '\t' => rendered.push('⇥'),
            '\r' => rendered.push('␍'),
            c if c.is_control() => rendered.push_str(&format!("\\u{{{:04X}}}", c as u32)),
            c => rendered.push(c),
        }
    }
    rendered
}

fn preview_value(value: &str, use_color: bool) -> String {
    let mut preview: String = value.chars().take(PREVIEW_CHAR_LIMIT).collect();
    if value.chars().count() > PREVIEW_CHAR_LIMIT {
        preview.push_str("...");
    }
    let escaped = escape_fragment(&preview);
    if use_color {
        escaped.cyan().to_string()
    } else {
        escaped
    }
}

#[derive(Debug, Default)]
struct TraceEventVisitor {
    trace_json: Option<String>,
}

impl tracing::field::Visit for TraceEventVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "trace_json" {
            self.trace_json = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "trace_json" && self.trace_json.is_none() {
            self.trace_json = Some(format!("{value:?}"));
        }
    }
}

/// Event formatter: timestamp / level / target gutter, plus a pretty box for
/// composition-trace events emitted via [`record_compose_trace`].
#[derive(Default)]
pub struct ComposeTraceFormatter;

impl ComposeTraceFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl<S, N> FormatEvent<S, N> for ComposeTraceFormatter
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        let use_color = writer.has_ansi_escapes();

        write_prefix(&mut writer, metadata, use_color)?;
        ctx.format_fields(writer.by_ref(), event)?;
        writer.write_char('\n')?;

        if metadata.target() == TRACE_TARGET {
            let mut visitor = TraceEventVisitor::default();
            event.record(&mut visitor);
            if let Some(json) = visitor.trace_json {
                match serde_json::from_str::<ComposeTraceRecord>(&json) {
                    Ok(record) => {
                        writer.write_str(&record.render_pretty(use_color))?;
                        writer.write_char('\n')?;
                    }
                    Err(err) => {
                        writer.write_str("│ Failed to render composition trace: ")?;
                        writer.write_str(&err.to_string())?;
                        writer.write_char('\n')?;
                    }
                }
            }
        }

        Ok(())
    }
}

pub fn record_compose_trace(record: ComposeTraceRecord) {
    if !tracing::level_enabled!(tracing::Level::DEBUG) {
        return;
    }
    if let Ok(json) = serde_json::to_string(&record) {
        tracing::event!(
            target: TRACE_TARGET,
            tracing::Level::DEBUG,
            trace_json = json.as_str(),
            stages = record.stages.len(),
            applied_stages = record.applied_stages(),
            "prompt composition trace"
        );
    } else {
        tracing::event!(
            target: TRACE_TARGET,
            tracing::Level::DEBUG,
            "prompt composition trace (serialization failure)"
        );
    }
}

fn write_prefix(
    writer: &mut Writer<'_>,
    metadata: &tracing::Metadata<'_>,
    use_color: bool,
) -> fmt::Result {
    let timestamp = format_timestamp();
    if use_color {
        writer.write_str(&timestamp.dimmed().to_string())?;
    } else {
        writer.write_str(&timestamp)?;
    }

    let level = format!(" {:>5} ", metadata.level());
    if use_color {
        writer.write_str(&color_level(&level, *metadata.level()))?;
    } else {
        writer.write_str(&level)?;
    }

    let target = format!("{:<width$}", metadata.target(), width = TARGET_GUTTER_WIDTH);
    if use_color {
        writer.write_str(&target.blue().dimmed().to_string())?;
    } else {
        writer.write_str(&target)?;
    }
    writer.write_str(": ")?;

    Ok(())
}

fn color_level(text: &str, level: Level) -> String {
    match level {
        Level::ERROR => text.red().bold().to_string(),
        Level::WARN => text.yellow().bold().to_string(),
        Level::INFO => text.green().to_string(),
        Level::DEBUG => text.cyan().to_string(),
        Level::TRACE => text.dimmed().to_string(),
    }
}

fn format_timestamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(&TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| "0000-00-00 00:00:00".to_string())
}
