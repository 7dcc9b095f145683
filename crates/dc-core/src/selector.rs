//! Durable Selector Derivation
//!
//! Produces a selector for a live element that matches it now and should keep
//! matching the same element after a reload. A document-unique `id` wins;
//! otherwise the selector is a child-combinator path anchored at `body`, with
//! `:nth-of-type` qualifiers only where same-tag siblings make them necessary.

use std::fmt::Write;

use crate::dom::Document;
use crate::store::RuleError;
use crate::types::{CONTAINER_SENTINEL, ROOT_SENTINEL};

/// Derive a selector for `node`.
///
/// Fails with [`RuleError::Empty`] for nodes without a tag name and with
/// [`RuleError::Forbidden`] for the document root and the content container.
pub fn derive_selector<D: Document>(doc: &D, node: &D::Node) -> Result<String, RuleError> {
    if doc.tag_name(node).map_or(true, |tag| tag.is_empty()) {
        return Err(RuleError::Empty);
    }
    if doc.root().as_ref() == Some(node) {
        return Err(RuleError::Forbidden(ROOT_SENTINEL.to_string()));
    }
    let body = doc.body();
    if body.as_ref() == Some(node) {
        return Err(RuleError::Forbidden(CONTAINER_SENTINEL.to_string()));
    }

    if let Some(id) = doc.attribute(node, "id").filter(|id| !id.is_empty()) {
        let id_selector = format!("#{}", escape_identifier(&id));
        match doc.query_all(&id_selector) {
            Ok(found) if found.len() == 1 => return Ok(id_selector),
            Ok(found) => {
                log::debug!("id selector {} is not unique ({} matches)", id_selector, found.len());
            }
            Err(err) => log::debug!("id selector rejected: {}", err),
        }
    }

    let mut steps = Vec::new();
    let mut current = Some(node.clone());
    while let Some(element) = current {
        if body.as_ref() == Some(&element) {
            steps.push(CONTAINER_SENTINEL.to_string());
            break;
        }
        let Some(tag) = doc.tag_name(&element) else {
            break;
        };
        steps.push(path_step(doc, &element, tag));
        current = doc.parent_element(&element);
    }

    steps.reverse();
    Ok(steps.join(" > "))
}

/// One path step: the tag, qualified by its 1-based position among same-tag
/// siblings when it has any.
fn path_step<D: Document>(doc: &D, element: &D::Node, mut tag: String) -> String {
    let mut index = 1;
    let mut sibling = doc.previous_element_sibling(element);
    while let Some(node) = sibling {
        if doc.tag_name(&node).as_deref() == Some(tag.as_str()) {
            index += 1;
        }
        sibling = doc.previous_element_sibling(&node);
    }

    let mut ambiguous = index > 1;
    if !ambiguous {
        let mut sibling = doc.next_element_sibling(element);
        while let Some(node) = sibling {
            if doc.tag_name(&node).as_deref() == Some(tag.as_str()) {
                ambiguous = true;
                break;
            }
            sibling = doc.next_element_sibling(&node);
        }
    }

    if ambiguous {
        let _ = write!(tag, ":nth-of-type({})", index);
    }
    tag
}

/// Escape a string for use as a CSS identifier (CSSOM `CSS.escape`).
pub fn escape_identifier(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        match c {
            '\0' => out.push('\u{FFFD}'),
            '\u{1}'..='\u{1F}' | '\u{7F}' => {
                let _ = write!(out, "\\{:x} ", c as u32);
            }
            '0'..='9' if i == 0 || (i == 1 && chars[0] == '-') => {
                let _ = write!(out, "\\{:x} ", c as u32);
            }
            '-' if i == 0 && chars.len() == 1 => out.push_str("\\-"),
            c if c as u32 >= 0x80 || c == '-' || c == '_' || c.is_ascii_alphanumeric() => out.push(c),
            c => {
                out.push('\\');
                out.push(c);
            }
        }
    }

    out
}
