/*
[INPUT]:  YAML configuration file
[OUTPUT]: Parsed runner configuration
[POS]:    Configuration layer - sequence and pacing setup
[UPDATE]: When adding new configuration options
*/

use crate::task::Task;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Top-level configuration for the verification runner
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunnerConfig {
    /// Bridge base URL; a CLI flag may override it
    #[serde(default)]
    pub bridge_url: Option<String>,
    /// Pacing delay before each dispatch, in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Status poll period, in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Fixed parameters merged into every dispatch
    #[serde(default)]
    pub fixed_params: BTreeMap<String, Value>,
    /// Ordered verification steps
    pub sequence: Vec<TaskSpec>,
}

/// Configuration for a single verification step
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TaskSpec {
    /// Action identifier sent to the bridge
    pub action: String,
    /// Human-readable step description
    #[serde(default)]
    pub message: Option<String>,
    /// Extraction strategy name, if this step's response feeds later steps
    #[serde(default)]
    pub extract: Option<String>,
}

impl TaskSpec {
    pub fn to_task(&self) -> Task {
        Task {
            action: self.action.clone(),
            message: self.message.clone().unwrap_or_else(|| self.action.clone()),
            extract: self.extract.clone(),
        }
    }
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_poll_interval_ms() -> u64 {
    3000
}

impl RunnerConfig {
    /// Load configuration from YAML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.sequence.iter().map(TaskSpec::to_task).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let yaml = r#"
sequence:
  - action: install_pages
  - action: sync_courses
    message: Creating verification course
    extract: course_id
"#;
        let config: RunnerConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.interval_ms, 1000);
        assert_eq!(config.poll_interval_ms, 3000);
        assert!(config.fixed_params.is_empty());

        let tasks = config.tasks();
        assert_eq!(tasks[0].action, "install_pages");
        assert_eq!(tasks[0].message, "install_pages");
        assert_eq!(tasks[0].extract, None);
        assert_eq!(tasks[1].extract.as_deref(), Some("course_id"));
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
bridge_url: "http://bridge.local"
interval_ms: 15
poll_interval_ms: 500
fixed_params:
  key: connect
sequence:
  - action: sync_users
    extract: user_id
"#;
        let config: RunnerConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.bridge_url.as_deref(), Some("http://bridge.local"));
        assert_eq!(config.interval(), Duration::from_millis(15));
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.fixed_params["key"], serde_json::json!("connect"));
    }
}
