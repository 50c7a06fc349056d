//! Transient, dismissible user notifications.

use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A message shown to the user after an action completes or fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
            description: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }

    pub fn report_downloaded() -> Self {
        Self::success("PDF report downloaded successfully")
    }

    pub fn report_failed() -> Self {
        Self::error("Failed to generate PDF report").with_description("Please try again later")
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(d) => write!(f, "{}: {}", self.message, d),
            None => f.write_str(&self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_notice_reads_like_a_toast() {
        let n = Notice::report_failed();
        assert!(n.is_error());
        assert_eq!(
            n.to_string(),
            "Failed to generate PDF report: Please try again later"
        );
        assert!(!Notice::report_downloaded().is_error());
    }
}
