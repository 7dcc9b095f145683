//! Selection State Machine
//!
//! INACTIVE / ACTIVE selection driven by pointer and keyboard events. The
//! state lives in [`Selection`]; the handlers below are plain functions over
//! it, so any event source (native listeners, synthetic test events) can
//! drive them. Handlers report whether the event must be swallowed and which
//! command the session should run.

use crate::config::RemoverConfig;
use crate::dom::{Document, Panel};
use crate::selector::derive_selector;

/// Keys the state machine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Modifier,
    Escape,
    Space,
    Other,
}

impl Key {
    /// Classify a `KeyboardEvent.key` value.
    pub fn classify(key: &str, config: &RemoverConfig) -> Self {
        if config.is_modifier(key) {
            return Self::Modifier;
        }
        match key {
            "Escape" => Self::Escape,
            " " => Self::Space,
            _ => Self::Other,
        }
    }
}

/// Transient per-context selection state. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<N> {
    pub active: bool,
    pub modifier_held: bool,
    pub candidate: Option<N>,
}

impl<N> Default for Selection<N> {
    fn default() -> Self {
        Self {
            active: false,
            modifier_held: false,
            candidate: None,
        }
    }
}

/// What the session must do after an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Command<N> {
    Nothing,
    Remove(N),
    Deactivate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Handled<N> {
    /// Suppress the default action and stop propagation.
    pub consumed: bool,
    pub command: Command<N>,
}

impl<N> Handled<N> {
    pub fn ignored() -> Self {
        Self {
            consumed: false,
            command: Command::Nothing,
        }
    }

    pub fn consumed(command: Command<N>) -> Self {
        Self {
            consumed: true,
            command,
        }
    }
}

/// Borrowed collaborators for the handlers.
pub struct Context<'a, D, P> {
    pub doc: &'a D,
    pub panel: &'a P,
    pub config: &'a RemoverConfig,
}

pub fn pointer_moved<D, P>(selection: &mut Selection<D::Node>, cx: &Context<'_, D, P>, target: D::Node)
where
    D: Document,
    P: Panel<D::Node>,
{
    if !selection.active || !selection.modifier_held {
        clear_highlight(selection, cx);
        return;
    }
    if selection.candidate.as_ref() != Some(&target) {
        highlight(selection, cx, target);
    }
}

pub fn clicked<D, P>(
    selection: &mut Selection<D::Node>,
    cx: &Context<'_, D, P>,
    target: &D::Node,
    primary: bool,
) -> Handled<D::Node>
where
    D: Document,
    P: Panel<D::Node>,
{
    if cx.panel.contains(target) {
        return Handled::ignored();
    }
    if !primary || !selection.active || !selection.modifier_held {
        return Handled::ignored();
    }
    let Some(candidate) = selection.candidate.clone() else {
        return Handled::ignored();
    };

    if cx.doc.is_protected(&candidate) {
        log::warn!("Blocked attempt to remove the document root or body");
        return Handled::consumed(Command::Nothing);
    }
    Handled::consumed(Command::Remove(candidate))
}

pub fn key_down<D, P>(selection: &mut Selection<D::Node>, cx: &Context<'_, D, P>, key: &str) -> Handled<D::Node>
where
    D: Document,
    P: Panel<D::Node>,
{
    if !selection.active {
        return Handled::ignored();
    }

    match Key::classify(key, cx.config) {
        Key::Modifier => {
            selection.modifier_held = true;
            cx.panel.set_guidance(&cx.config.hover_guidance);
            Handled::consumed(Command::Nothing)
        }
        Key::Escape => Handled::consumed(Command::Deactivate),
        Key::Space => match (&selection.candidate, selection.modifier_held) {
            (Some(candidate), true) => Handled::consumed(Command::Remove(candidate.clone())),
            _ => Handled::consumed(Command::Nothing),
        },
        Key::Other => Handled::ignored(),
    }
}

pub fn key_up<D, P>(selection: &mut Selection<D::Node>, cx: &Context<'_, D, P>, key: &str) -> Handled<D::Node>
where
    D: Document,
    P: Panel<D::Node>,
{
    if !selection.active || Key::classify(key, cx.config) != Key::Modifier {
        return Handled::ignored();
    }
    selection.modifier_held = false;
    clear_highlight(selection, cx);
    Handled::consumed(Command::Nothing)
}

/// Drop the candidate and its highlight.
pub fn clear_highlight<D, P>(selection: &mut Selection<D::Node>, cx: &Context<'_, D, P>)
where
    D: Document,
    P: Panel<D::Node>,
{
    if let Some(previous) = selection.candidate.take() {
        cx.doc.set_highlight(&previous, false);
    }
    if selection.active {
        cx.panel.set_guidance(&cx.config.idle_guidance);
    }
}

/// Return to the INACTIVE baseline.
pub fn reset<D, P>(selection: &mut Selection<D::Node>, cx: &Context<'_, D, P>)
where
    D: Document,
    P: Panel<D::Node>,
{
    selection.active = false;
    selection.modifier_held = false;
    clear_highlight(selection, cx);
}

fn highlight<D, P>(selection: &mut Selection<D::Node>, cx: &Context<'_, D, P>, target: D::Node)
where
    D: Document,
    P: Panel<D::Node>,
{
    if cx.doc.is_protected(&target) || cx.panel.contains(&target) {
        clear_highlight(selection, cx);
        return;
    }
    if let Some(previous) = selection.candidate.take() {
        cx.doc.set_highlight(&previous, false);
    }
    cx.doc.set_highlight(&target, true);
    let shown = derive_selector(cx.doc, &target).unwrap_or_default();
    cx.panel.set_guidance(&shown);
    selection.candidate = Some(target);
}

#[cfg(all(test, feature = "html"))]
mod tests {
    use super::*;
    use crate::html::HtmlDocument;
    use crate::testing::RecordingPanel;

    const PAGE: &str = r#"<html><body><div id="ad">x</div><p>y</p><aside id="panel"><button>undo</button></aside></body></html>"#;

    struct Fixture {
        doc: HtmlDocument,
        panel: RecordingPanel,
        config: RemoverConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let doc = HtmlDocument::parse(PAGE);
            let panel_root = doc.query_all("#panel").unwrap()[0];
            let panel = RecordingPanel::over(&doc, panel_root);
            Self {
                doc,
                panel,
                config: RemoverConfig::default(),
            }
        }

        fn cx(&self) -> Context<'_, HtmlDocument, RecordingPanel> {
            Context {
                doc: &self.doc,
                panel: &self.panel,
                config: &self.config,
            }
        }

        fn node(&self, selector: &str) -> ego_tree::NodeId {
            self.doc.query_all(selector).unwrap()[0]
        }
    }

    fn active() -> Selection<ego_tree::NodeId> {
        Selection {
            active: true,
            ..Selection::default()
        }
    }

    #[test]
    fn test_key_classification() {
        let config = RemoverConfig::default();
        assert_eq!(Key::classify("Control", &config), Key::Modifier);
        assert_eq!(Key::classify("Meta", &config), Key::Modifier);
        assert_eq!(Key::classify("Escape", &config), Key::Escape);
        assert_eq!(Key::classify(" ", &config), Key::Space);
        assert_eq!(Key::classify("a", &config), Key::Other);
    }

    #[test]
    fn test_hover_requires_modifier() {
        let fx = Fixture::new();
        let mut selection = active();
        let ad = fx.node("#ad");

        pointer_moved(&mut selection, &fx.cx(), ad);
        assert_eq!(selection.candidate, None);

        key_down(&mut selection, &fx.cx(), "Control");
        assert_eq!(fx.panel.guidance().as_deref(), Some("Hover an element..."));
        pointer_moved(&mut selection, &fx.cx(), ad);
        assert_eq!(selection.candidate, Some(ad));
        assert!(fx.doc.is_highlighted(&ad));
        assert_eq!(fx.panel.guidance().as_deref(), Some("#ad"));
    }

    #[test]
    fn test_moving_replaces_highlight() {
        let fx = Fixture::new();
        let mut selection = active();
        selection.modifier_held = true;
        let (ad, p) = (fx.node("#ad"), fx.node("p"));

        pointer_moved(&mut selection, &fx.cx(), ad);
        pointer_moved(&mut selection, &fx.cx(), p);
        assert!(!fx.doc.is_highlighted(&ad));
        assert!(fx.doc.is_highlighted(&p));
        assert_eq!(selection.candidate, Some(p));
    }

    #[test]
    fn test_protected_and_panel_targets_are_not_candidates() {
        let fx = Fixture::new();
        let mut selection = active();
        selection.modifier_held = true;

        pointer_moved(&mut selection, &fx.cx(), fx.doc.body().unwrap());
        assert_eq!(selection.candidate, None);
        pointer_moved(&mut selection, &fx.cx(), fx.doc.root().unwrap());
        assert_eq!(selection.candidate, None);
        pointer_moved(&mut selection, &fx.cx(), fx.node("#panel > button"));
        assert_eq!(selection.candidate, None);
        assert_eq!(fx.panel.guidance().as_deref(), Some("Hold [Ctrl]/[Cmd] to select"));
    }

    #[test]
    fn test_click_removes_candidate() {
        let fx = Fixture::new();
        let mut selection = active();
        selection.modifier_held = true;
        let ad = fx.node("#ad");
        pointer_moved(&mut selection, &fx.cx(), ad);

        let handled = clicked(&mut selection, &fx.cx(), &ad, true);
        assert_eq!(handled, Handled::consumed(Command::Remove(ad)));

        assert_eq!(clicked(&mut selection, &fx.cx(), &ad, false), Handled::ignored());
        let button = fx.node("#panel > button");
        assert_eq!(clicked(&mut selection, &fx.cx(), &button, true), Handled::ignored());
    }

    #[test]
    fn test_click_on_protected_candidate_is_swallowed() {
        let fx = Fixture::new();
        let body = fx.doc.body().unwrap();
        let mut selection = Selection {
            active: true,
            modifier_held: true,
            candidate: Some(body),
        };
        assert_eq!(
            clicked(&mut selection, &fx.cx(), &body, true),
            Handled::consumed(Command::Nothing)
        );
    }

    #[test]
    fn test_space_and_escape() {
        let fx = Fixture::new();
        let mut selection = active();
        let ad = fx.node("#ad");

        assert_eq!(key_down(&mut selection, &fx.cx(), " "), Handled::consumed(Command::Nothing));

        key_down(&mut selection, &fx.cx(), "Meta");
        pointer_moved(&mut selection, &fx.cx(), ad);
        assert_eq!(key_down(&mut selection, &fx.cx(), " "), Handled::consumed(Command::Remove(ad)));
        assert_eq!(key_down(&mut selection, &fx.cx(), "Escape"), Handled::consumed(Command::Deactivate));
        assert_eq!(key_down(&mut selection, &fx.cx(), "x"), Handled::ignored());
    }

    #[test]
    fn test_modifier_release_clears_highlight() {
        let fx = Fixture::new();
        let mut selection = active();
        let ad = fx.node("#ad");
        key_down(&mut selection, &fx.cx(), "Control");
        pointer_moved(&mut selection, &fx.cx(), ad);

        key_up(&mut selection, &fx.cx(), "Control");
        assert!(!selection.modifier_held);
        assert_eq!(selection.candidate, None);
        assert!(!fx.doc.is_highlighted(&ad));
    }

    #[test]
    fn test_inactive_ignores_everything() {
        let fx = Fixture::new();
        let mut selection = Selection::default();
        assert_eq!(key_down(&mut selection, &fx.cx(), "Escape"), Handled::ignored());
        assert_eq!(key_up(&mut selection, &fx.cx(), "Control"), Handled::ignored());
        assert!(!selection.modifier_held);
    }

    #[test]
    fn test_reset_returns_to_baseline() {
        let fx = Fixture::new();
        let mut selection = active();
        key_down(&mut selection, &fx.cx(), "Control");
        pointer_moved(&mut selection, &fx.cx(), fx.node("p"));

        reset(&mut selection, &fx.cx());
        assert_eq!(selection, Selection::default());
        assert!(!fx.doc.is_highlighted(&fx.node("p")));
    }
}
