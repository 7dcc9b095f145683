//! Rule Descriptions
//!
//! Turns a removed element into the short label and icon shown in the panel.

use crate::config::DescriptionLimits;
use crate::dom::Document;
use crate::types::{icon, Description};

const UNNAMED: &str = "Unnamed element";

/// Describe `node` for display next to its rule.
pub fn describe<D: Document>(doc: &D, node: &D::Node, limits: &DescriptionLimits) -> Description {
    let Some(tag) = doc.tag_name(node) else {
        return Description::new("A complex element", icon::GENERIC);
    };

    let (text, glyph) = if tag == "img" {
        (describe_image(doc, node), icon::IMAGE)
    } else {
        let text = collapse_whitespace(&doc.text(node));
        if !text.is_empty() {
            (truncate_marked(&text, limits.text_chars), icon::PAGE)
        } else {
            match tag.as_str() {
                "a" => {
                    let text = match doc.attribute(node, "href").filter(|h| !h.is_empty()) {
                        Some(href) => format!("Link: {}...", take_chars(&href, limits.link_chars)),
                        None => "A link".to_string(),
                    };
                    (text, icon::LINK)
                }
                "video" | "iframe" => (format!("A <{}> element", tag), icon::MEDIA),
                _ => (format!("An empty <{}> element", tag), icon::BOX),
            }
        }
    };

    if text.is_empty() {
        Description::new(UNNAMED, glyph)
    } else {
        Description::new(text, glyph)
    }
}

fn describe_image<D: Document>(doc: &D, node: &D::Node) -> String {
    if let Some(alt) = doc.attribute(node, "alt").filter(|alt| !alt.is_empty()) {
        return alt.trim().to_string();
    }
    match doc.attribute(node, "src").filter(|src| !src.is_empty()) {
        Some(src) => {
            let file = src.rsplit('/').next().unwrap_or_default();
            let file = file.split('?').next().unwrap_or_default();
            format!("Image: {}", file)
        }
        None => "An image".to_string(),
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn take_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Truncate to `limit` characters, marking a cut at the limit with `...`.
fn truncate_marked(text: &str, limit: usize) -> String {
    let mut out = take_chars(text, limit);
    if out.chars().count() == limit {
        out.push_str("...");
    }
    out
}
