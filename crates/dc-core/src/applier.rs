//! Rule Application
//!
//! Hides and restores the elements matched by a rule set. A rule whose
//! selector fails to parse is skipped; it never stops the remaining rules.
//! Hiding is idempotent.

use crate::dom::Document;
use crate::types::{is_forbidden_selector, Rule};

/// Hide every element matched by `rules`. Returns the number of matches.
pub fn apply_all<D: Document>(doc: &D, rules: &[Rule]) -> usize {
    rules
        .iter()
        .map(|rule| set_matching(doc, &rule.selector, true))
        .sum()
}

/// Clear the hidden state of every element matched by `rules`.
pub fn restore_all<D: Document>(doc: &D, rules: &[Rule]) -> usize {
    rules
        .iter()
        .map(|rule| set_matching(doc, &rule.selector, false))
        .sum()
}

/// Clear the hidden state of the elements matched by one selector.
pub fn restore_selector<D: Document>(doc: &D, selector: &str) -> usize {
    set_matching(doc, selector, false)
}

/// Hide `node` and its descendants where they match `rules`.
///
/// Non-element nodes are ignored.
pub fn apply_to_subtree<D: Document>(doc: &D, node: &D::Node, rules: &[Rule]) -> usize {
    if !doc.is_element(node) {
        return 0;
    }

    let mut hidden = 0;
    for rule in rules {
        if is_forbidden_selector(&rule.selector) {
            continue;
        }
        match doc.matches(node, &rule.selector) {
            Ok(true) => {
                doc.set_hidden(node, true);
                hidden += 1;
            }
            Ok(false) => {}
            Err(err) => {
                log::debug!("Skipping rule: {}", err);
                continue;
            }
        }
        if let Ok(found) = doc.query_within(node, &rule.selector) {
            for child in &found {
                doc.set_hidden(child, true);
            }
            hidden += found.len();
        }
    }
    hidden
}

fn set_matching<D: Document>(doc: &D, selector: &str, hidden: bool) -> usize {
    if hidden && is_forbidden_selector(selector) {
        log::warn!("Skipped applying protected rule: {}", selector);
        return 0;
    }
    match doc.query_all(selector) {
        Ok(found) => {
            for node in &found {
                doc.set_hidden(node, hidden);
            }
            found.len()
        }
        Err(err) => {
            log::debug!("Skipping rule: {}", err);
            0
        }
    }
}
