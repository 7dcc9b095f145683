//! Runtime Configuration
//!
//! Every field has a default, so a partial JSON override is enough.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DescriptionLimits {
    /// Characters of element text kept in a description.
    pub text_chars: usize,
    /// Characters of a link target kept in a description.
    pub link_chars: usize,
}

impl Default for DescriptionLimits {
    fn default() -> Self {
        Self {
            text_chars: 50,
            link_chars: 40,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RemoverConfig {
    /// `KeyboardEvent.key` values that act as the selection modifier.
    pub modifier_keys: Vec<String>,
    /// Class applied to the candidate element.
    pub highlight_class: String,
    /// Guidance shown while the modifier is released.
    pub idle_guidance: String,
    /// Guidance shown while the modifier is held and nothing is hovered.
    pub hover_guidance: String,
    /// File name offered when exporting the store.
    pub export_file_name: String,
    pub descriptions: DescriptionLimits,
}

impl Default for RemoverConfig {
    fn default() -> Self {
        Self {
            modifier_keys: vec!["Control".to_string(), "Meta".to_string()],
            highlight_class: "remover-highlight".to_string(),
            idle_guidance: "Hold [Ctrl]/[Cmd] to select".to_string(),
            hover_guidance: "Hover an element...".to_string(),
            export_file_name: "remover_settings.json".to_string(),
            descriptions: DescriptionLimits::default(),
        }
    }
}

impl RemoverConfig {
    /// Parse a JSON override; missing fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn is_modifier(&self, key: &str) -> bool {
        self.modifier_keys.iter().any(|k| k == key)
    }
}
