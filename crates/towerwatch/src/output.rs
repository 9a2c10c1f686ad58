//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use towerwatch_core::Tower;

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Two-state marker, green when good and red when bad if color is on.
pub fn state_label(good: bool, good_text: &str, bad_text: &str, color: bool) -> String {
    let text = if good { good_text } else { bad_text };
    match (color, good) {
        (false, _) => text.to_owned(),
        (true, true) => text.green().to_string(),
        (true, false) => text.red().to_string(),
    }
}

pub fn online_label(online: bool, color: bool) -> String {
    state_label(online, "online", "offline", color)
}

/// Alarm summary for one tower, `-` when clear.
pub fn alarm_label(tower: &Tower, color: bool) -> String {
    let text = match (tower.low_water_alarm, tower.overflow_alarm) {
        (false, false) => return "-".into(),
        (true, false) => "low water",
        (false, true) => "overflow",
        (true, true) => "low water, overflow",
    };
    if color {
        text.yellow().bold().to_string()
    } else {
        text.to_owned()
    }
}

pub fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since single-item views are not
/// tabular.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Print a status notice to stderr, respecting quiet mode.
pub fn notice(message: &str, quiet: bool, color: bool) {
    if quiet {
        return;
    }
    if color {
        eprintln!("{}", message.cyan());
    } else {
        eprintln!("{message}");
    }
}

// ── Format-specific renderers ────────────────────────────────────────

pub(crate) fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

pub(crate) fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {e}\"}}"))
}

pub(crate) fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("error: serialization failed: {e}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(serde::Serialize, Tabled)]
    struct Row {
        id: u32,
        name: &'static str,
    }

    #[test]
    fn plain_list_is_one_id_per_line() {
        let data = [Row { id: 1, name: "a" }, Row { id: 2, name: "b" }];
        let out = render_list(
            OutputFormat::Plain,
            &data,
            |r| Row { id: r.id, name: r.name },
            |r| r.id.to_string(),
        );
        assert_eq!(out, "1\n2");
    }

    #[test]
    fn compact_json_is_single_line() {
        let data = [Row { id: 1, name: "a" }];
        let out = render_json(&data, true);
        assert_eq!(out, r#"[{"id":1,"name":"a"}]"#);
    }

    #[test]
    fn labels_without_color() {
        assert_eq!(online_label(false, false), "offline");
        assert_eq!(on_off(true), "on");
    }
}
