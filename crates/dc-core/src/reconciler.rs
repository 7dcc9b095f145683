//! Mutation Reconciler
//!
//! Keeps dynamically inserted content hidden. The reconciler is WATCHING
//! exactly while the rule set is non-empty; activation of the selection
//! panel has no say in it. At most one subscription is open at a time.

use crate::applier::apply_to_subtree;
use crate::dom::{DomError, Document};
use crate::types::Rule;

/// Source of subtree-insertion notifications.
///
/// The returned subscription stays open until it is dropped.
pub trait MutationSource {
    type Subscription;

    fn observe(&self) -> Result<Self::Subscription, DomError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Watching,
}

/// Two-state watch machine around an optional subscription.
#[derive(Debug)]
pub struct Reconciler<S> {
    subscription: Option<S>,
}

impl<S> Default for Reconciler<S> {
    fn default() -> Self {
        Self { subscription: None }
    }
}

impl<S> Reconciler<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> WatchState {
        if self.subscription.is_some() {
            WatchState::Watching
        } else {
            WatchState::Idle
        }
    }

    pub fn is_watching(&self) -> bool {
        self.subscription.is_some()
    }

    /// Enter WATCHING. A no-op while already watching.
    pub fn start<M>(&mut self, source: &M) -> Result<(), DomError>
    where
        M: MutationSource<Subscription = S>,
    {
        if self.subscription.is_none() {
            self.subscription = Some(source.observe()?);
            log::debug!("Watching for inserted content");
        }
        Ok(())
    }

    /// Enter IDLE, closing the subscription.
    pub fn stop(&mut self) {
        if self.subscription.take().is_some() {
            log::debug!("Stopped watching for inserted content");
        }
    }

    /// Follow the rule set's cardinality.
    pub fn sync<M>(&mut self, source: &M, rules: &[Rule])
    where
        M: MutationSource<Subscription = S>,
    {
        if rules.is_empty() {
            self.stop();
        } else if let Err(err) = self.start(source) {
            log::warn!("Cannot watch for inserted content: {}", err);
        }
    }

    /// Apply `rules` to each batch of inserted nodes, in delivery order.
    /// Returns the number of elements hidden.
    pub fn reconcile<D, B>(&self, doc: &D, batches: B, rules: &[Rule]) -> usize
    where
        D: Document,
        B: IntoIterator,
        B::Item: IntoIterator<Item = D::Node>,
    {
        if !self.is_watching() || rules.is_empty() {
            return 0;
        }

        let mut hidden = 0;
        for batch in batches {
            for node in batch {
                hidden += apply_to_subtree(doc, &node, rules);
            }
        }
        hidden
    }
}
