//! Flat text and HTML projections of components

use ddms_ir::escape;
use ddms_schema::{Config, OutputIndexLevel};

/// Projection format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// `key: value` lines
    Text,
    /// `<meta name="key" content="value" />` lines
    Html,
}

/// Formats individual key/value lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renderer {
    pub format: OutputFormat,
    pub level: OutputIndexLevel,
}

impl Renderer {
    #[must_use]
    pub fn new(format: OutputFormat, level: OutputIndexLevel) -> Self {
        Self { format, level }
    }

    #[must_use]
    pub fn text(level: OutputIndexLevel) -> Self {
        Self::new(OutputFormat::Text, level)
    }

    #[must_use]
    pub fn html(level: OutputIndexLevel) -> Self {
        Self::new(OutputFormat::Html, level)
    }

    /// Uses the index level a session was configured with
    #[must_use]
    pub fn from_config(config: &Config, format: OutputFormat) -> Self {
        Self::new(format, config.output_index_level)
    }

    /// One line, or nothing when the value is empty
    #[must_use]
    pub fn field(&self, key: &str, value: &str) -> String {
        if value.is_empty() {
            return String::new();
        }
        match self.format {
            OutputFormat::Text => format!("{key}: {value}\n"),
            OutputFormat::Html => format!(
                "<meta name=\"{}\" content=\"{}\" />\n",
                escape(key),
                escape(value)
            ),
        }
    }

    /// Positional suffix for the item at `index` of `total`
    #[must_use]
    pub fn suffix(&self, index: usize, total: usize) -> String {
        self.level.suffix(index, total)
    }

    /// One line per value, each key carrying its positional suffix
    #[must_use]
    pub fn list<S: AsRef<str>>(&self, key: &str, values: &[S]) -> String {
        values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                self.field(&format!("{key}{}", self.suffix(i, values.len())), value.as_ref())
            })
            .collect()
    }
}
