//! Document Abstraction
//!
//! The engine works against these traits instead of a concrete DOM so the same
//! code drives a browser page through `web-sys` and a headless `scraper` tree.

use std::fmt;

use crate::coordinator::HostNotice;
use crate::types::Rule;

/// Error type for document queries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("Invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },
    #[error("Mutation subscription failed: {0}")]
    Subscription(String),
}

impl DomError {
    pub fn invalid_selector(selector: &str, reason: impl fmt::Display) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// A live, queryable document.
///
/// Methods take `&self`: the DOM is shared mutable state and implementations
/// provide their own interior mutability for the visual state.
pub trait Document {
    /// Handle to an element. Cheap to clone, compared by identity.
    type Node: Clone + PartialEq + fmt::Debug;

    /// The document root element.
    fn root(&self) -> Option<Self::Node>;

    /// The primary content container.
    fn body(&self) -> Option<Self::Node>;

    fn is_element(&self, node: &Self::Node) -> bool;

    /// Lower-cased tag name, `None` for non-element nodes.
    fn tag_name(&self, node: &Self::Node) -> Option<String>;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    /// Rendered text of the element and its descendants.
    fn text(&self, node: &Self::Node) -> String;

    fn parent_element(&self, node: &Self::Node) -> Option<Self::Node>;

    fn previous_element_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

    fn next_element_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

    /// All elements in the document matching `selector`, in tree order.
    fn query_all(&self, selector: &str) -> Result<Vec<Self::Node>, DomError>;

    /// Descendants of `scope` matching `selector`. `scope` itself is excluded.
    fn query_within(&self, scope: &Self::Node, selector: &str) -> Result<Vec<Self::Node>, DomError>;

    fn matches(&self, node: &Self::Node, selector: &str) -> Result<bool, DomError>;

    /// Set or clear the highest-priority hidden state.
    fn set_hidden(&self, node: &Self::Node, hidden: bool);

    fn is_hidden(&self, node: &Self::Node) -> bool;

    /// Set or clear the selection highlight.
    fn set_highlight(&self, node: &Self::Node, highlighted: bool);

    /// True for the root element and the content container.
    fn is_protected(&self, node: &Self::Node) -> bool {
        self.root().as_ref() == Some(node) || self.body().as_ref() == Some(node)
    }
}

/// The on-page panel listing the rules for the current domain.
///
/// Only the top-level context has one; nested frames use `()`.
pub trait Panel<N> {
    fn show(&self);

    fn hide(&self);

    /// True if `node` is part of the panel itself.
    fn contains(&self, node: &N) -> bool;

    /// Replace the guidance line (placeholder text or the hovered selector).
    fn set_guidance(&self, text: &str);

    /// Re-render the rule list.
    fn render(&self, rules: &[Rule]);
}

impl<N> Panel<N> for () {
    fn show(&self) {}

    fn hide(&self) {}

    fn contains(&self, _node: &N) -> bool {
        false
    }

    fn set_guidance(&self, _text: &str) {}

    fn render(&self, _rules: &[Rule]) {}
}

/// Outbound channel to the host process.
pub trait HostLink {
    fn notify(&self, notice: HostNotice);
}

impl HostLink for () {
    fn notify(&self, _notice: HostNotice) {}
}

impl<N, P: Panel<N>> Panel<N> for Option<P> {
    fn show(&self) {
        if let Some(panel) = self {
            panel.show();
        }
    }

    fn hide(&self) {
        if let Some(panel) = self {
            panel.hide();
        }
    }

    fn contains(&self, node: &N) -> bool {
        self.as_ref().map_or(false, |panel| panel.contains(node))
    }

    fn set_guidance(&self, text: &str) {
        if let Some(panel) = self {
            panel.set_guidance(text);
        }
    }

    fn render(&self, rules: &[Rule]) {
        if let Some(panel) = self {
            panel.render(rules);
        }
    }
}

impl<H: HostLink> HostLink for Option<H> {
    fn notify(&self, notice: HostNotice) {
        if let Some(host) = self {
            host.notify(notice);
        }
    }
}
