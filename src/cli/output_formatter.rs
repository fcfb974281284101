use colored::*;
use serde_json::{json, Value as JsonValue};
use crate::cli::cli_args::OutputFormat;
use crate::engine::Frame;
use crate::utils::{
    types::{Table, Value},
    error::{FrameError, FrameResult},
};

/// Formats frames for CLI output
pub struct OutputFormatter;

impl OutputFormatter {
    /// Format a frame according to the specified format
    pub fn format_frame(frame: &Frame, format: OutputFormat) -> FrameResult<String> {
        let table = frame.to_table();
        match format {
            OutputFormat::Table => Ok(Self::format_table(&table, frame.backend())),
            OutputFormat::Json => Ok(Self::format_json(&table, frame)),
            OutputFormat::Csv => Self::format_csv(&table),
        }
    }

    /// Format a table as a bordered grid
    pub fn format_table(table: &Table, backend: &str) -> String {
        if table.num_columns() == 0 {
            return "Empty frame.".dimmed().to_string();
        }

        let headers: Vec<String> = table.columns.iter().map(|c| c.to_string()).collect();
        let mut col_widths: Vec<usize> = headers.iter().map(|h| h.len().max(8)).collect();
        for row in table.rows() {
            for (i, value) in row.iter().enumerate() {
                col_widths[i] = col_widths[i].max(Self::value_to_string(value).len());
            }
        }

        let mut output = String::new();
        output.push_str(&Self::format_table_separator(&col_widths, true));
        output.push('|');
        for (i, header) in headers.iter().enumerate() {
            output.push_str(&format!(" {} |", Self::pad(header, col_widths[i]).bold().cyan()));
        }
        output.push('\n');
        output.push_str(&Self::format_table_separator(&col_widths, false));

        for row in table.rows() {
            output.push('|');
            for (i, value) in row.iter().enumerate() {
                let text = Self::pad(&Self::value_to_string(value), col_widths[i]);
                output.push_str(&format!(" {} |", Self::colorize(value, text)));
            }
            output.push('\n');
        }
        output.push_str(&Self::format_table_separator(&col_widths, true));

        output.push_str(&format!(
            "\n{} {} x {} columns on {}\n",
            table.num_rows().to_string().green().bold(),
            if table.num_rows() == 1 { "row" } else { "rows" },
            table.num_columns(),
            backend.cyan()
        ));
        output
    }

    fn pad(text: &str, width: usize) -> String {
        format!("{:<width$}", text, width = width)
    }

    fn format_table_separator(col_widths: &[usize], is_border: bool) -> String {
        let edge = if is_border { '+' } else { '|' };
        let mut separator = String::new();
        separator.push(edge);
        for &width in col_widths {
            separator.push_str(&"-".repeat(width + 2));
            separator.push(edge);
        }
        separator.push('\n');
        separator
    }

    /// Format a frame as a JSON document with its backend metadata
    fn format_json(table: &Table, frame: &Frame) -> String {
        let headers: Vec<String> = table.columns.iter().map(|c| c.to_string()).collect();
        let rows: Vec<JsonValue> = table
            .rows()
            .iter()
            .map(|row| {
                let mut row_obj = serde_json::Map::new();
                for (header, value) in headers.iter().zip(row) {
                    row_obj.insert(header.clone(), Self::value_to_json(value));
                }
                JsonValue::Object(row_obj)
            })
            .collect();

        let output = json!({
            "data": rows,
            "metadata": {
                "kind": frame.kind().to_string(),
                "backend": frame.backend(),
                "execution": frame.execution(),
                "columns": headers,
                "row_count": table.num_rows(),
            }
        });

        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format a table as CSV with a header row
    fn format_csv(table: &Table) -> FrameResult<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(table.columns.iter().map(|c| c.to_string()))?;
        for row in table.rows() {
            writer.write_record(row.iter().map(Self::value_to_string))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| FrameError::Internal(format!("Failed to flush CSV output: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| FrameError::Internal(format!("CSV output is not UTF-8: {}", e)))
    }

    fn value_to_string(value: &Value) -> String {
        match value {
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    fn colorize(value: &Value, text: String) -> ColoredString {
        match value {
            Value::Text(_) => text.normal(),
            Value::Integer(_) | Value::Float(_) => text.blue(),
            Value::Boolean(true) => text.green(),
            Value::Boolean(false) => text.red(),
            Value::Null => text.dimmed(),
        }
    }

    fn value_to_json(value: &Value) -> JsonValue {
        match value {
            Value::Text(s) => JsonValue::String(s.clone()),
            Value::Integer(i) => JsonValue::Number((*i).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::Boolean(b) => JsonValue::Bool(*b),
            Value::Null => JsonValue::Null,
        }
    }

    /// Format error message for CLI display
    pub fn format_error(error: &FrameError) -> String {
        format!("{} {}", "Error:".red().bold(), error.to_string().red())
    }

    /// Format info message for CLI display
    pub fn format_info(message: &str) -> String {
        format!("{} {}", "Info:".blue().bold(), message)
    }
}
