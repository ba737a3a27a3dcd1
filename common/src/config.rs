use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::CountdownFormat;

/// Tunables for the challenge widget. Every field falls back to its default,
/// so a page only needs to embed the keys it wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Path segment appended to the page URL to reach the challenge API.
    pub endpoint_path: String,
    pub csrf_cookie: String,
    pub csrf_header: String,
    pub tick_millis: u32,
    pub error_message: String,
    /// Appended to the busy verb on a clicked button ("Creating" + suffix).
    pub busy_suffix: String,
    /// Owner value of shared instances, which this client may not delete.
    pub public_owner: String,
    pub countdown: CountdownFormat,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            endpoint_path: "challenge".to_string(),
            csrf_cookie: "csrftoken".to_string(),
            csrf_header: "X-CSRFToken".to_string(),
            tick_millis: 1_000,
            error_message: "An error has occurred. Please try again later.".to_string(),
            busy_suffix: " instance...".to_string(),
            public_owner: "everyone".to_string(),
            countdown: CountdownFormat::default(),
        }
    }
}

impl WidgetConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(u64::from(self.tick_millis.max(1)))
    }
}
