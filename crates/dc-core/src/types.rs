//! Core type definitions for Declutter
//!
//! These types map directly to the persisted store layout and are shared with
//! the extension's JavaScript side through generated TypeScript bindings.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Forbidden Sentinels
// =============================================================================

/// Selector reserved for the document root element.
pub const ROOT_SENTINEL: &str = "html";

/// Selector reserved for the primary content container.
pub const CONTAINER_SENTINEL: &str = "body";

/// Returns true if `selector` names the document root or its content
/// container. Such selectors can never be stored or applied.
pub fn is_forbidden_selector(selector: &str) -> bool {
    let selector = selector.trim();
    selector.eq_ignore_ascii_case(ROOT_SENTINEL) || selector.eq_ignore_ascii_case(CONTAINER_SENTINEL)
}

// =============================================================================
// Description Icons
// =============================================================================

pub mod icon {
    pub const PAGE: &str = "📄";
    pub const IMAGE: &str = "🖼️";
    pub const BOX: &str = "📦";
    pub const LINK: &str = "🔗";
    pub const MEDIA: &str = "📹";
    /// Used for upgraded legacy entries and elements that could not be described.
    pub const GENERIC: &str = "🔧";
}

// =============================================================================
// Rules
// =============================================================================

/// Human-readable label shown next to a rule in the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Description {
    pub text: String,
    pub icon: String,
}

impl Description {
    pub fn new(text: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            icon: icon.into(),
        }
    }

    /// Description for an entry upgraded from the bare-string layout.
    pub fn legacy(selector: &str) -> Self {
        Self::new(selector, icon::GENERIC)
    }
}

/// One hidden element: the selector that finds it and how to show it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rule {
    pub selector: String,
    pub description: Description,
}

impl Rule {
    pub fn new(selector: impl Into<String>, description: Description) -> Self {
        Self {
            selector: selector.into(),
            description,
        }
    }

    /// A rule may be stored or applied only if it has a non-sentinel selector.
    pub fn is_valid(&self) -> bool {
        !self.selector.trim().is_empty() && !is_forbidden_selector(&self.selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_selectors() {
        assert!(is_forbidden_selector("html"));
        assert!(is_forbidden_selector("body"));
        assert!(is_forbidden_selector(" BODY "));
        assert!(!is_forbidden_selector("body > div"));
        assert!(!is_forbidden_selector("#body"));
    }

    #[test]
    fn test_rule_serialization_layout() {
        let rule = Rule::new("#banner", Description::new("Sale!", icon::PAGE));
        let value = serde_json::to_value(&rule).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "selector": "#banner",
                "description": { "text": "Sale!", "icon": "📄" }
            })
        );
    }

    #[test]
    fn test_rule_validity() {
        assert!(Rule::new("div.ad", Description::legacy("div.ad")).is_valid());
        assert!(!Rule::new("", Description::legacy("")).is_valid());
        assert!(!Rule::new("html", Description::legacy("html")).is_valid());
    }
}
