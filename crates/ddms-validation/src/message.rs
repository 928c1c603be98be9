//! Validation messages

use std::fmt;

/// Severity of a validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Issue that does not block construction
    Warning,
    /// Issue that rejected construction
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("WARNING"),
            Severity::Error => f.write_str("ERROR"),
        }
    }
}

/// A single validation message with the locator of the component that raised it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidationMessage {
    pub severity: Severity,
    pub text: String,
    /// Slash-separated qualified names, e.g. `/ddms:resource/ddms:security`
    pub locator: String,
}

impl ValidationMessage {
    /// Create a warning
    pub fn warning(text: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            text: text.into(),
            locator: locator.into(),
        }
    }

    /// Create an error message from a structural error
    #[must_use]
    pub fn from_error(error: &crate::Error) -> Self {
        Self {
            severity: Severity::Error,
            text: error.to_string(),
            locator: error.locator().unwrap_or_default().to_string(),
        }
    }

    /// Copy of this message re-rooted under a parent locator
    #[must_use]
    pub fn under(&self, parent_locator: &str) -> Self {
        Self {
            severity: self.severity,
            text: self.text.clone(),
            locator: format!("{parent_locator}{}", self.locator),
        }
    }
}

impl fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.severity, self.locator, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_under_prefixes_locator() {
        let message = ValidationMessage::warning("empty", "/ntk:Access");
        let rooted = message.under("/ddms:security").under("/ddms:resource");
        assert_eq!(rooted.locator, "/ddms:resource/ddms:security/ntk:Access");
        assert_eq!(rooted.text, "empty");
        assert_eq!(message.locator, "/ntk:Access");
    }

    #[test]
    fn test_from_error() {
        let err = crate::Error::invalid_at("title value is required.", "/ddms:title");
        let message = ValidationMessage::from_error(&err);
        assert_eq!(message.severity, Severity::Error);
        assert_eq!(message.to_string(), "ERROR /ddms:title: title value is required.");
    }
}
