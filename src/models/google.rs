//! Google Gemini model definitions.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Google Gemini models.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
pub enum GoogleModel {
    #[default]
    #[strum(serialize = "gemini-3-flash-preview")]
    Gemini3FlashPreview,
    #[strum(serialize = "gemini-3-pro-preview")]
    Gemini3ProPreview,
    #[strum(serialize = "gemini-2.5-pro")]
    Gemini25Pro,
    #[strum(serialize = "gemini-2.5-flash")]
    Gemini25Flash,
    #[strum(serialize = "gemini-2.5-flash-lite")]
    Gemini25FlashLite,
    #[strum(serialize = "gemini-2.0-flash")]
    Gemini20Flash,
    /// Custom/unknown Gemini model ID.
    #[strum(default)]
    Custom(String),
}

impl GoogleModel {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Gemini3FlashPreview => "gemini-3-flash-preview",
            Self::Gemini3ProPreview => "gemini-3-pro-preview",
            Self::Gemini25Pro => "gemini-2.5-pro",
            Self::Gemini25Flash => "gemini-2.5-flash",
            Self::Gemini25FlashLite => "gemini-2.5-flash-lite",
            Self::Gemini20Flash => "gemini-2.0-flash",
            Self::Custom(s) => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parses_known_and_custom_ids() {
        assert_eq!(
            GoogleModel::from_str("gemini-3-pro-preview").unwrap(),
            GoogleModel::Gemini3ProPreview
        );
        assert_eq!(
            GoogleModel::from_str("gemini-exp-1").unwrap(),
            GoogleModel::Custom("gemini-exp-1".into())
        );
    }

    #[test]
    fn display_matches_api_id() {
        assert_eq!(GoogleModel::Gemini3FlashPreview.to_string(), "gemini-3-flash-preview");
        assert_eq!(GoogleModel::default().as_str(), "gemini-3-flash-preview");
    }
}
