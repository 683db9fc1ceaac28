use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Something a subcommand prints: serialized as-is for JSON, or flattened to
/// labelled fields for humans.
pub trait Report: Serialize {
    fn fields(&self) -> Vec<(&'static str, String)>;
}

pub fn print_report<R: Report>(report: &R, format: OutputFormat) {
    println!("{}", render(report, format));
}

pub fn render<R: Report>(report: &R, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string())
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (name, value) in report.fields() {
                table.add_row(vec![name.to_string(), value]);
            }
            table.to_string()
        }
        OutputFormat::Pretty => {
            let fields = report.fields();
            let width = fields.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
            fields
                .into_iter()
                .map(|(name, value)| format!("{name:<width$}  {value}"))
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}

/// Render mailbox bytes as text when they are printable, hex otherwise.
pub fn message_preview(data: &[u8]) -> String {
    let text = data.strip_suffix(&[0u8]).unwrap_or(data);
    match std::str::from_utf8(text) {
        Ok(text) if !text.contains('\0') => text.to_string(),
        _ => data
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(" "),
    }
}
