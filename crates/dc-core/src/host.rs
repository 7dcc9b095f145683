//! Action Icon State
//!
//! What the host process shows on the extension action for a tab. Kept here
//! so the background script and the content script agree on the states.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// URLs where content scripts never run.
const RESTRICTED_PREFIXES: &[&str] = &["chrome://", "https://chrome.google.com"];

pub fn is_restricted_url(url: &str) -> bool {
    url.is_empty() || RESTRICTED_PREFIXES.iter().any(|prefix| url.starts_with(prefix))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum ActionState {
    Active,
    Inactive,
    Unavailable,
}

impl ActionState {
    /// State for a tab, given its URL and the outcome of a `queryState`
    /// round trip (`None` when the content script could not be reached).
    pub fn for_tab(url: &str, is_active: Option<bool>) -> Self {
        if is_restricted_url(url) {
            return Self::Unavailable;
        }
        Self::from_query(is_active)
    }

    /// A failed query counts as inactive.
    pub fn from_query(is_active: Option<bool>) -> Self {
        match is_active {
            Some(true) => Self::Active,
            _ => Self::Inactive,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Active => "Click to Remove Element (Active - Press ESC to exit)",
            Self::Inactive => "Click to Remove Element (Ctrl+Shift+X)",
            Self::Unavailable => "Click to Remove Element (Unavailable on this page)",
        }
    }

    fn icon_stem(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Unavailable => "unavailable",
        }
    }

    /// Icon paths keyed by pixel size.
    pub fn icon_paths(self) -> [(u32, String); 2] {
        let stem = self.icon_stem();
        [
            (16, format!("icons/{}-16.png", stem)),
            (32, format!("icons/{}-32.png", stem)),
        ]
    }

    pub fn is_enabled(self) -> bool {
        self != Self::Unavailable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restricted_urls() {
        assert!(is_restricted_url(""));
        assert!(is_restricted_url("chrome://extensions"));
        assert!(is_restricted_url("https://chrome.google.com/webstore"));
        assert!(!is_restricted_url("https://example.com"));
    }

    #[test]
    fn test_state_for_tab() {
        assert_eq!(ActionState::for_tab("chrome://newtab", Some(true)), ActionState::Unavailable);
        assert_eq!(ActionState::for_tab("https://example.com", Some(true)), ActionState::Active);
        assert_eq!(ActionState::for_tab("https://example.com", Some(false)), ActionState::Inactive);
        assert_eq!(ActionState::for_tab("https://example.com", None), ActionState::Inactive);
        assert!(!ActionState::Unavailable.is_enabled());
    }

    #[test]
    fn test_icons() {
        assert_eq!(
            ActionState::Active.icon_paths(),
            [(16, "icons/active-16.png".to_string()), (32, "icons/active-32.png".to_string())]
        );
        assert_eq!(ActionState::Inactive.title(), "Click to Remove Element (Ctrl+Shift+X)");
    }
}
