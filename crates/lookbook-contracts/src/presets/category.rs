use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PresetCategory {
    Standing,
    Sitting,
    Side,
    #[serde(rename = "Close-up")]
    CloseUp,
    Creative,
}

impl PresetCategory {
    pub const ALL: [PresetCategory; 5] = [
        PresetCategory::Standing,
        PresetCategory::Sitting,
        PresetCategory::Side,
        PresetCategory::CloseUp,
        PresetCategory::Creative,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PresetCategory::Standing => "Standing",
            PresetCategory::Sitting => "Sitting",
            PresetCategory::Side => "Side",
            PresetCategory::CloseUp => "Close-up",
            PresetCategory::Creative => "Creative",
        }
    }
}

impl fmt::Display for PresetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PresetCategory {
    type Err = String;

    /// Case-insensitive; `closeup`, `close_up` and `close up` all map to
    /// `Close-up`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw
            .trim()
            .to_ascii_lowercase()
            .replace(['_', ' '], "-");
        match normalized.as_str() {
            "standing" => Ok(PresetCategory::Standing),
            "sitting" => Ok(PresetCategory::Sitting),
            "side" => Ok(PresetCategory::Side),
            "close-up" | "closeup" => Ok(PresetCategory::CloseUp),
            "creative" => Ok(PresetCategory::Creative),
            _ => Err(format!("Unknown preset category '{}'.", raw.trim())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PresetCategory;

    #[test]
    fn parses_labels_and_loose_spellings() {
        for category in PresetCategory::ALL {
            assert_eq!(category.label().parse::<PresetCategory>(), Ok(category));
        }
        assert_eq!("close up".parse(), Ok(PresetCategory::CloseUp));
        assert_eq!("CLOSE_UP".parse(), Ok(PresetCategory::CloseUp));
        assert_eq!(
            "lying".parse::<PresetCategory>(),
            Err("Unknown preset category 'lying'.".to_string())
        );
    }

    #[test]
    fn serializes_with_display_label() {
        let encoded = serde_json::to_string(&PresetCategory::CloseUp).unwrap_or_default();
        assert_eq!(encoded, "\"Close-up\"");
    }
}
