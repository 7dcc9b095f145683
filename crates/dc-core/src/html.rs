//! Headless Document Backend
//!
//! A [`Document`] over a `scraper` tree. Visual state (hidden, highlighted)
//! lives beside the tree since it is not part of the markup. Fragments can be
//! inserted after parsing; while a subscription is open every insertion is
//! recorded as one mutation batch, mirroring a `MutationObserver` callback.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use ego_tree::{NodeId, NodeRef, Tree};
use scraper::{ElementRef, Html, Node, Selector};

use crate::dom::{DomError, Document};
use crate::reconciler::MutationSource;

#[derive(Debug, Default)]
struct ObserverState {
    subscriptions: usize,
    batches: Vec<Vec<NodeId>>,
}

/// Parsed HTML document with mutable visual state.
pub struct HtmlDocument {
    html: Html,
    hidden: RefCell<HashSet<NodeId>>,
    highlighted: RefCell<HashSet<NodeId>>,
    observer: Rc<RefCell<ObserverState>>,
}

impl HtmlDocument {
    /// Parse a full HTML document.
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
            hidden: RefCell::new(HashSet::new()),
            highlighted: RefCell::new(HashSet::new()),
            observer: Rc::new(RefCell::new(ObserverState::default())),
        }
    }

    fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.html.tree.get(id).and_then(ElementRef::wrap)
    }

    fn selector(selector: &str) -> Result<Selector, DomError> {
        Selector::parse(selector).map_err(|err| DomError::invalid_selector(selector, err))
    }

    /// Append the nodes of `fragment` as the last children of `parent`.
    ///
    /// Returns the ids of the inserted top-level nodes, text nodes included.
    pub fn insert_html(&mut self, parent: NodeId, fragment: &str) -> Vec<NodeId> {
        let parsed = Html::parse_fragment(fragment);
        let mut inserted = Vec::new();
        for child in parsed.root_element().children() {
            if let Some(id) = graft(&mut self.html.tree, parent, child) {
                inserted.push(id);
            }
        }

        let mut observer = self.observer.borrow_mut();
        if observer.subscriptions > 0 && !inserted.is_empty() {
            observer.batches.push(inserted.clone());
        }
        inserted
    }

    /// Drain the insertion batches recorded since the last call.
    pub fn take_mutations(&self) -> Vec<Vec<NodeId>> {
        std::mem::take(&mut self.observer.borrow_mut().batches)
    }

    /// Number of open mutation subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.observer.borrow().subscriptions
    }

    /// `node` and every node below it, in tree order.
    pub fn subtree(&self, node: NodeId) -> Vec<NodeId> {
        self.html
            .tree
            .get(node)
            .map(|n| n.descendants().map(|d| d.id()).collect())
            .unwrap_or_default()
    }

    pub fn hidden_nodes(&self) -> HashSet<NodeId> {
        self.hidden.borrow().clone()
    }

    pub fn is_highlighted(&self, node: &NodeId) -> bool {
        self.highlighted.borrow().contains(node)
    }
}

fn graft(tree: &mut Tree<Node>, parent: NodeId, source: NodeRef<'_, Node>) -> Option<NodeId> {
    let id = tree.get_mut(parent)?.append(source.value().clone()).id();
    for child in source.children() {
        graft(tree, id, child);
    }
    Some(id)
}

impl Document for HtmlDocument {
    type Node = NodeId;

    fn root(&self) -> Option<NodeId> {
        Some(self.html.root_element().id())
    }

    fn body(&self) -> Option<NodeId> {
        self.html
            .root_element()
            .children()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name().eq_ignore_ascii_case("body"))
            .map(|el| el.id())
    }

    fn is_element(&self, node: &NodeId) -> bool {
        self.html.tree.get(*node).map_or(false, |n| n.value().is_element())
    }

    fn tag_name(&self, node: &NodeId) -> Option<String> {
        self.element(*node).map(|el| el.value().name().to_ascii_lowercase())
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.element(*node)
            .and_then(|el| el.value().attr(name).map(str::to_string))
    }

    fn text(&self, node: &NodeId) -> String {
        self.element(*node)
            .map(|el| el.text().collect())
            .unwrap_or_default()
    }

    fn parent_element(&self, node: &NodeId) -> Option<NodeId> {
        self.html
            .tree
            .get(*node)?
            .parent()
            .and_then(ElementRef::wrap)
            .map(|el| el.id())
    }

    fn previous_element_sibling(&self, node: &NodeId) -> Option<NodeId> {
        self.html
            .tree
            .get(*node)?
            .prev_siblings()
            .find(|n| n.value().is_element())
            .map(|n| n.id())
    }

    fn next_element_sibling(&self, node: &NodeId) -> Option<NodeId> {
        self.html
            .tree
            .get(*node)?
            .next_siblings()
            .find(|n| n.value().is_element())
            .map(|n| n.id())
    }

    fn query_all(&self, selector: &str) -> Result<Vec<NodeId>, DomError> {
        let selector = Self::selector(selector)?;
        Ok(self.html.select(&selector).map(|el| el.id()).collect())
    }

    fn query_within(&self, scope: &NodeId, selector: &str) -> Result<Vec<NodeId>, DomError> {
        let selector = Self::selector(selector)?;
        Ok(self
            .element(*scope)
            .map(|el| el.select(&selector).map(|found| found.id()).collect())
            .unwrap_or_default())
    }

    fn matches(&self, node: &NodeId, selector: &str) -> Result<bool, DomError> {
        let selector = Self::selector(selector)?;
        Ok(self.element(*node).map_or(false, |el| selector.matches(&el)))
    }

    fn set_hidden(&self, node: &NodeId, hidden: bool) {
        let mut set = self.hidden.borrow_mut();
        if hidden {
            set.insert(*node);
        } else {
            set.remove(node);
        }
    }

    fn is_hidden(&self, node: &NodeId) -> bool {
        self.hidden.borrow().contains(node)
    }

    fn set_highlight(&self, node: &NodeId, highlighted: bool) {
        let mut set = self.highlighted.borrow_mut();
        if highlighted {
            set.insert(*node);
        } else {
            set.remove(node);
        }
    }
}

/// Open subscription on an [`HtmlDocument`]; closes when dropped.
#[derive(Debug)]
pub struct HtmlSubscription {
    state: Rc<RefCell<ObserverState>>,
}

impl Drop for HtmlSubscription {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.subscriptions = state.subscriptions.saturating_sub(1);
        if state.subscriptions == 0 {
            state.batches.clear();
        }
    }
}

impl MutationSource for HtmlDocument {
    type Subscription = HtmlSubscription;

    fn observe(&self) -> Result<HtmlSubscription, DomError> {
        self.observer.borrow_mut().subscriptions += 1;
        Ok(HtmlSubscription {
            state: Rc::clone(&self.observer),
        })
    }
}
