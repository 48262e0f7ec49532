// crates/core/src/status.rs
//! Status buckets derived from percent complete.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../client/src/types/generated/")]
pub enum ProjectStatus {
    #[serde(rename = "Completed")]
    Completed,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "In Planning")]
    InPlanning,
}

impl ProjectStatus {
    /// `>= 100` completed, `> 0` in progress, anything else in planning.
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 100.0 {
            Self::Completed
        } else if percent > 0.0 {
            Self::InProgress
        } else {
            Self::InPlanning
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::InProgress => "In Progress",
            Self::InPlanning => "In Planning",
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucketing() {
        assert_eq!(ProjectStatus::from_percent(0.0), ProjectStatus::InPlanning);
        assert_eq!(ProjectStatus::from_percent(-3.0), ProjectStatus::InPlanning);
        assert_eq!(ProjectStatus::from_percent(45.0), ProjectStatus::InProgress);
        assert_eq!(ProjectStatus::from_percent(99.0), ProjectStatus::InProgress);
        assert_eq!(ProjectStatus::from_percent(100.0), ProjectStatus::Completed);
        assert_eq!(ProjectStatus::from_percent(130.0), ProjectStatus::Completed);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&ProjectStatus::InProgress).unwrap(),
            "\"In Progress\""
        );
        assert_eq!(ProjectStatus::InPlanning.to_string(), "In Planning");
    }
}
