//! Progress reporting sink
//!
//! Chat invocations can forward incremental and final progress to an
//! externally supplied reporter, keyed by segment/tag identifiers. Emitting
//! report lines is the only observable side effect of an invocation beyond
//! the network call itself.

use serde::{Deserialize, Serialize};

/// Status attached to a report line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportStatus {
    /// Intermediate progress; the line carries the text accumulated so far
    Running,
    /// Final line carrying the finished text
    Finish,
}

impl ReportStatus {
    /// Wire representation (`RUNNING` / `FINISH`)
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Finish => "FINISH",
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// External sink accepting progress notifications
pub trait Reporter: Send + Sync {
    /// Record one progress line
    fn add_report_line(
        &self,
        segment_name: Option<&str>,
        tag_name: Option<&str>,
        content: &str,
        status: ReportStatus,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_strings() {
        assert_eq!(ReportStatus::Running.as_str(), "RUNNING");
        assert_eq!(ReportStatus::Finish.to_string(), "FINISH");
        assert_eq!(
            serde_json::to_string(&ReportStatus::Finish).unwrap(),
            "\"FINISH\""
        );
    }
}
