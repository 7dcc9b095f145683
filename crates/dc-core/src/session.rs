//! Execution Context Session
//!
//! One `Session` per frame. It owns the rule store, the reconciler and the
//! selection state, and routes page events through the controller. Only the
//! top-level frame drives the panel and talks to the host; nested frames load
//! their rules and watch for inserted content on their own.
//!
//! Mutating operations return a [`Flush`]. The caller commits it to storage;
//! nothing here awaits.

use crate::applier;
use crate::config::RemoverConfig;
use crate::controller::{self, Command, Context, Handled, Selection};
use crate::coordinator::HostNotice;
use crate::describe::describe;
use crate::dom::{Document, HostLink, Panel};
use crate::reconciler::{MutationSource, Reconciler};
use crate::selector::derive_selector;
use crate::store::{Flush, Loaded, RuleStore};
use crate::types::Rule;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRole {
    /// The top-level browsing context.
    Top,
    /// Any nested frame.
    Nested,
}

/// Pick the domain key for a frame.
///
/// `top` is the top-level hostname, or `None` when cross-origin rules hide it.
/// Returns `None` for pages without a hostname.
pub fn resolve_domain_key(top: Option<&str>, local: &str) -> Option<String> {
    let host = top.unwrap_or(local).trim();
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

/// Result of routing one page event.
#[derive(Debug, Default)]
pub struct EventOutcome {
    /// Suppress the default action and stop propagation.
    pub consumed: bool,
    pub flush: Option<Flush>,
}

pub struct Session<D, P, H>
where
    D: Document + MutationSource,
{
    doc: D,
    panel: P,
    host: H,
    role: FrameRole,
    config: RemoverConfig,
    store: RuleStore,
    reconciler: Reconciler<D::Subscription>,
    selection: Selection<D::Node>,
}

impl<D, P, H> Session<D, P, H>
where
    D: Document + MutationSource,
    P: Panel<D::Node>,
    H: HostLink,
{
    pub fn new(
        doc: D,
        panel: P,
        host: H,
        role: FrameRole,
        domain_key: impl Into<String>,
        config: RemoverConfig,
    ) -> Self {
        Self {
            doc,
            panel,
            host,
            role,
            config,
            store: RuleStore::new(domain_key),
            reconciler: Reconciler::new(),
            selection: Selection::default(),
        }
    }

    pub fn document(&self) -> &D {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn role(&self) -> FrameRole {
        self.role
    }

    pub fn config(&self) -> &RemoverConfig {
        &self.config
    }

    pub fn domain_key(&self) -> &str {
        self.store.key()
    }

    pub fn rules(&self) -> &[Rule] {
        self.store.rules()
    }

    pub fn selection(&self) -> &Selection<D::Node> {
        &self.selection
    }

    pub fn is_active(&self) -> bool {
        self.selection.active
    }

    pub fn is_watching(&self) -> bool {
        self.reconciler.is_watching()
    }

    fn is_top(&self) -> bool {
        self.role == FrameRole::Top
    }

    // =========================================================================
    // Rule lifecycle
    // =========================================================================

    /// Adopt loaded rules, hide what they match and start watching if any.
    ///
    /// Returns the repair write for upgraded or cleaned entries. Only the top
    /// frame persists repairs, so frames of one page do not all rewrite the
    /// same key at load.
    pub fn install(&mut self, loaded: Loaded) -> Option<Flush> {
        let Loaded { store, repair } = loaded;
        self.store = store;

        let hidden = applier::apply_all(&self.doc, self.store.rules());
        if !self.store.is_empty() {
            log::info!(
                "Applied {} rule(s) for {} ({} element(s) hidden)",
                self.store.len(),
                self.store.key(),
                hidden
            );
        }
        self.reconciler.sync(&self.doc, self.store.rules());
        self.render_list();

        match self.role {
            FrameRole::Top => repair,
            FrameRole::Nested => {
                if repair.is_some() {
                    log::debug!("Leaving rule repair for {} to the top frame", self.store.key());
                }
                None
            }
        }
    }

    /// Replace the current rules after the store was overwritten.
    pub fn reload(&mut self, loaded: Loaded) -> Option<Flush> {
        applier::restore_all(&self.doc, self.store.rules());
        self.deactivate();
        self.install(loaded)
    }

    /// The removal pipeline: derive, store, hide, watch.
    pub fn remove(&mut self, element: &D::Node) -> Option<Flush> {
        if self.doc.is_protected(element) || self.panel.contains(element) {
            log::warn!("Blocked attempt to remove a protected element");
            return None;
        }
        let selector = match derive_selector(&self.doc, element) {
            Ok(selector) => selector,
            Err(err) => {
                log::warn!("Blocked removal: {}", err);
                return None;
            }
        };

        let description = describe(&self.doc, element, &self.config.descriptions);
        let flush = match self.store.add(&selector, description) {
            Ok(flush) => flush,
            Err(err) => {
                log::debug!("Rule not added: {}", err);
                return None;
            }
        };

        self.doc.set_hidden(element, true);
        self.render_list();
        let cx = Context {
            doc: &self.doc,
            panel: &self.panel,
            config: &self.config,
        };
        controller::clear_highlight(&mut self.selection, &cx);
        self.reconciler.sync(&self.doc, self.store.rules());
        log::info!("Removed element {}", selector);
        Some(flush)
    }

    /// Show the elements of one rule again and forget it.
    pub fn undo(&mut self, selector: &str) -> Flush {
        applier::restore_selector(&self.doc, selector);
        let flush = self.store.remove(selector);
        // Elements matched by another rule stay hidden.
        applier::apply_all(&self.doc, self.store.rules());
        self.render_list();
        self.reconciler.sync(&self.doc, self.store.rules());
        flush
    }

    /// Restore and forget every rule for this domain. The caller asks for
    /// confirmation first; an unconfirmed reset changes nothing.
    pub fn reset(&mut self, confirmed: bool) -> Option<Flush> {
        if !self.is_top() || !confirmed {
            return None;
        }
        applier::restore_all(&self.doc, self.store.rules());
        let flush = self.store.clear();
        self.reconciler.stop();
        self.render_list();
        log::info!("Reset rules for {}", self.store.key());
        Some(flush)
    }

    /// Temporarily show every hidden element (pointer over the rule list).
    pub fn preview_restore(&mut self) {
        if self.is_top() {
            applier::restore_all(&self.doc, self.store.rules());
        }
    }

    /// End the preview started by [`Session::preview_restore`].
    pub fn preview_reapply(&mut self) {
        if self.is_top() {
            applier::apply_all(&self.doc, self.store.rules());
        }
    }

    /// Reconcile batches of inserted nodes against the current rules.
    pub fn on_mutations<B>(&mut self, batches: B) -> usize
    where
        B: IntoIterator,
        B::Item: IntoIterator<Item = D::Node>,
    {
        let panel = &self.panel;
        let batches = batches.into_iter().map(|batch| {
            batch
                .into_iter()
                .filter(|node| !panel.contains(node))
                .collect::<Vec<_>>()
        });
        self.reconciler.reconcile(&self.doc, batches, self.store.rules())
    }

    // =========================================================================
    // Activation
    // =========================================================================

    /// Flip between INACTIVE and ACTIVE. Returns the new state.
    pub fn toggle(&mut self) -> bool {
        if self.selection.active {
            self.deactivate();
        } else {
            self.activate();
        }
        self.selection.active
    }

    pub fn activate(&mut self) {
        if self.selection.active || !self.is_top() {
            return;
        }
        self.selection.active = true;
        log::info!("Element remover activated");
        self.host.notify(HostNotice::StateChange { active: true });
        self.panel.show();
        self.panel.render(self.store.rules());
        self.panel.set_guidance(&self.config.idle_guidance);
    }

    pub fn deactivate(&mut self) {
        if !self.selection.active || !self.is_top() {
            return;
        }
        let cx = Context {
            doc: &self.doc,
            panel: &self.panel,
            config: &self.config,
        };
        controller::reset(&mut self.selection, &cx);
        log::info!("Element remover deactivated");
        self.host.notify(HostNotice::StateChange { active: false });
        self.panel.hide();
    }

    // =========================================================================
    // Page events
    // =========================================================================

    pub fn pointer_moved(&mut self, target: D::Node) {
        if !self.is_top() {
            return;
        }
        let cx = Context {
            doc: &self.doc,
            panel: &self.panel,
            config: &self.config,
        };
        controller::pointer_moved(&mut self.selection, &cx, target);
    }

    pub fn clicked(&mut self, target: &D::Node, primary: bool) -> EventOutcome {
        if !self.is_top() {
            return EventOutcome::default();
        }
        let cx = Context {
            doc: &self.doc,
            panel: &self.panel,
            config: &self.config,
        };
        let handled = controller::clicked(&mut self.selection, &cx, target, primary);
        self.run(handled)
    }

    pub fn key_down(&mut self, key: &str) -> EventOutcome {
        if !self.is_top() {
            return EventOutcome::default();
        }
        let cx = Context {
            doc: &self.doc,
            panel: &self.panel,
            config: &self.config,
        };
        let handled = controller::key_down(&mut self.selection, &cx, key);
        self.run(handled)
    }

    pub fn key_up(&mut self, key: &str) -> EventOutcome {
        if !self.is_top() {
            return EventOutcome::default();
        }
        let cx = Context {
            doc: &self.doc,
            panel: &self.panel,
            config: &self.config,
        };
        let handled = controller::key_up(&mut self.selection, &cx, key);
        self.run(handled)
    }

    fn run(&mut self, handled: Handled<D::Node>) -> EventOutcome {
        let flush = match handled.command {
            Command::Nothing => None,
            Command::Remove(node) => self.remove(&node),
            Command::Deactivate => {
                self.deactivate();
                None
            }
        };
        EventOutcome {
            consumed: handled.consumed,
            flush,
        }
    }

    fn render_list(&self) {
        if self.selection.active && self.is_top() {
            self.panel.render(self.store.rules());
        }
    }
}
