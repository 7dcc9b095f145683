//! Recording collaborators for unit tests.

use std::cell::RefCell;

use ego_tree::NodeId;

use crate::coordinator::HostNotice;
use crate::dom::{HostLink, Panel};
use crate::html::HtmlDocument;
use crate::types::Rule;

/// Panel that remembers what it was told. Optionally backed by a subtree of
/// the document so `contains` behaves like the real panel.
#[derive(Debug, Default)]
pub struct RecordingPanel {
    members: Vec<NodeId>,
    visible: RefCell<bool>,
    guidance: RefCell<Option<String>>,
    rendered: RefCell<Vec<Vec<Rule>>>,
}

impl RecordingPanel {
    pub fn over(doc: &HtmlDocument, root: NodeId) -> Self {
        Self {
            members: doc.subtree(root),
            ..Self::default()
        }
    }

    pub fn is_visible(&self) -> bool {
        *self.visible.borrow()
    }

    pub fn guidance(&self) -> Option<String> {
        self.guidance.borrow().clone()
    }

    /// The most recently rendered rule list.
    pub fn listed(&self) -> Option<Vec<Rule>> {
        self.rendered.borrow().last().cloned()
    }
}

impl Panel<NodeId> for RecordingPanel {
    fn show(&self) {
        *self.visible.borrow_mut() = true;
    }

    fn hide(&self) {
        *self.visible.borrow_mut() = false;
    }

    fn contains(&self, node: &NodeId) -> bool {
        self.members.contains(node)
    }

    fn set_guidance(&self, text: &str) {
        *self.guidance.borrow_mut() = Some(text.to_string());
    }

    fn render(&self, rules: &[Rule]) {
        self.rendered.borrow_mut().push(rules.to_vec());
    }
}

#[derive(Debug, Default)]
pub struct RecordingHost {
    notices: RefCell<Vec<HostNotice>>,
}

impl RecordingHost {
    pub fn notices(&self) -> Vec<HostNotice> {
        self.notices.borrow().clone()
    }
}

impl HostLink for RecordingHost {
    fn notify(&self, notice: HostNotice) {
        self.notices.borrow_mut().push(notice);
    }
}
