//! Report output in JSON or JSON Lines.
//!
//! Batch runs yield reports one at a time as workers finish, so the writer
//! streams: JSON Lines emits one object per line, and JSON emits a single
//! array whose elements are written as they arrive and closed by `finish`.

use serde::Serialize;
use std::io::{self, Write};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single JSON array of all items
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Streaming serializer for reports.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
    finished: bool,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer.
    ///
    /// `pretty` only affects the JSON format; JSON Lines is always compact.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
            finished: false,
        }
    }

    /// Write one item.
    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                let separator = if self.items_written == 0 { "[" } else { "," };
                if self.pretty {
                    writeln!(self.writer, "{}", separator)?;
                    serde_json::to_writer_pretty(&mut self.writer, item)
                        .map_err(io::Error::other)?;
                } else {
                    write!(self.writer, "{}", separator)?;
                    serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
                }
            }
            OutputFormat::JsonLines => {
                serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
                writeln!(self.writer)?;
            }
        }
        self.items_written += 1;
        Ok(())
    }

    /// Close the JSON array (an empty one if nothing was written) and flush.
    ///
    /// Calling it more than once has no further effect.
    pub fn finish(&mut self) -> io::Result<()> {
        if !self.finished && self.format == OutputFormat::Json {
            if self.items_written == 0 {
                writeln!(self.writer, "[]")?;
            } else if self.pretty {
                writeln!(self.writer, "\n]")?;
            } else {
                writeln!(self.writer, "]")?;
            }
        }
        self.finished = true;
        self.writer.flush()
    }

    /// Get the number of items written.
    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Finish and return the underlying writer.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.finish()?;
        Ok(self.writer)
    }
}

/// Serialize an item to a JSON string.
pub fn to_json<T: Serialize>(item: &T, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(item)
    } else {
        serde_json::to_string(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SizeOutcome, SizeReport};

    fn reports() -> Vec<SizeReport> {
        vec![
            SizeReport {
                size: "tile_50".to_string(),
                outcome: SizeOutcome::Generated {
                    produced: "tile_50".to_string(),
                },
            },
            SizeReport {
                size: "fit_7680".to_string(),
                outcome: SizeOutcome::Ineligible,
            },
        ]
    }

    fn written(format: OutputFormat, pretty: bool, items: &[SizeReport]) -> String {
        let mut writer = OutputWriter::new(Vec::new(), format, pretty);
        for item in items {
            writer.write(item).unwrap();
        }
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_json_is_one_array() {
        for pretty in [false, true] {
            let output = written(OutputFormat::Json, pretty, &reports());
            let parsed: Vec<SizeReport> = serde_json::from_str(&output).unwrap();
            assert_eq!(parsed, reports());
        }
    }

    #[test]
    fn test_empty_json_array() {
        let output = written(OutputFormat::Json, false, &[]);
        assert_eq!(output.trim(), "[]");
    }

    #[test]
    fn test_jsonl_one_object_per_line() {
        let output = written(OutputFormat::JsonLines, true, &reports());
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("\"status\":\"ineligible\""));
    }

    #[test]
    fn test_finish_is_idempotent() {
        let mut writer = OutputWriter::new(Vec::new(), OutputFormat::Json, false);
        writer.write(&reports()[0]).unwrap();
        writer.finish().unwrap();
        writer.finish().unwrap();
        assert_eq!(writer.items_written(), 1);
        let output = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(output.matches(']').count(), 1);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("jsonl"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("NDJSON"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("invalid"), None);
    }
}
