//! Conversation loop options.

use std::time::Duration;

use bon::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tokio_util::sync::CancellationToken;

use crate::config::{GenbindConfig, DEFAULT_MAX_ROUNDS};
use crate::types::GenerationSettings;

/// What the loop does when a tool fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ToolErrorPolicy {
    /// Any tool failure ends the conversation with that error.
    #[default]
    Abort,
    /// The tool's own failure, or a failure to decode the model's
    /// arguments, is sent back to the model as `{"error": "..."}` and the
    /// conversation continues. Failing to encode a tool's output still
    /// aborts.
    ReportToModel,
}

/// Options for one conversation.
#[derive(Debug, Clone, Builder)]
pub struct LoopOptions {
    #[builder(default)]
    pub settings: GenerationSettings,
    /// Maximum number of transport calls before the loop gives up.
    #[builder(default = DEFAULT_MAX_ROUNDS)]
    pub max_rounds: usize,
    /// Applied to each transport call.
    pub request_timeout: Option<Duration>,
    /// Applied to each tool dispatch.
    pub tool_timeout: Option<Duration>,
    pub cancel: Option<CancellationToken>,
    #[builder(default)]
    pub tool_error_policy: ToolErrorPolicy,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl LoopOptions {
    /// Defaults taken from a config's round limit and request timeout.
    pub fn from_config(config: &GenbindConfig) -> Self {
        Self::builder()
            .max_rounds(config.max_rounds())
            .maybe_request_timeout(config.request_timeout())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_abort_after_twenty_rounds() {
        let options = LoopOptions::default();

        assert_eq!(options.max_rounds, 20);
        assert_eq!(options.tool_error_policy, ToolErrorPolicy::Abort);
        assert!(options.request_timeout.is_none());
        assert!(options.cancel.is_none());
    }

    #[test]
    fn config_supplies_limits() {
        let config = GenbindConfig::new();
        config.set_max_rounds(4);
        config.set_request_timeout(Duration::from_secs(9));

        let options = LoopOptions::from_config(&config);

        assert_eq!(options.max_rounds, 4);
        assert_eq!(options.request_timeout, Some(Duration::from_secs(9)));
    }

    #[test]
    fn policy_parses_from_snake_case() {
        assert_eq!(
            "report_to_model".parse::<ToolErrorPolicy>().unwrap(),
            ToolErrorPolicy::ReportToModel
        );
    }
}
