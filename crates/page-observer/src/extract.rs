//! §4.2 extracted-text rendering, clickable-text collection, stable-selector
//! collection and field-inventory extraction, all driven off a parsed DOM.

use scraper::{ElementRef, Html, Node};

use crate::selector::build_stable_selector;
use crate::snapshot::{FieldDescriptor, FieldInventory, FieldKind};

const SKIP_TAGS: &[&str] = &["script", "style", "nav", "footer", "form", "button"];
const MAX_BLOCKS: usize = 100;

fn collect_text(node: ego_tree::NodeRef<'_, Node>) -> String {
    let mut out = String::new();
    for descendant in node.descendants() {
        if let Node::Text(text) = descendant.value() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(trimmed);
            }
        }
    }
    out
}

fn walk_content(node: ego_tree::NodeRef<'_, Node>, blocks: &mut Vec<String>) {
    let Some(el) = ElementRef::wrap(node) else {
        return;
    };
    let tag = el.value().name();
    if SKIP_TAGS.contains(&tag) {
        return;
    }

    match tag {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let text = collect_text(node);
            if !text.is_empty() {
                blocks.push(format!("### {text}"));
            }
        }
        "li" => {
            let text = collect_text(node);
            if !text.is_empty() {
                blocks.push(format!("- {text}"));
            }
        }
        "a" => {
            let text = collect_text(node);
            if !text.is_empty() {
                let href = el.value().attr("href").unwrap_or("");
                blocks.push(format!("Link: '{text}' (href: {href})"));
            }
        }
        "p" => {
            let text = collect_text(node);
            if !text.is_empty() {
                blocks.push(text);
            }
        }
        _ => {
            for child in node.children() {
                walk_content(child, blocks);
            }
        }
    }
}

/// Render the §4.2 extracted text: headers as `### ...`, list items as
/// `- ...`, anchors as `Link: 'text' (href: ...)`, adjacent duplicates
/// suppressed, capped at the first 100 significant blocks.
pub fn extract_content_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut blocks = Vec::new();
    walk_content(*document.root_element(), &mut blocks);

    let mut deduped: Vec<String> = Vec::with_capacity(blocks.len());
    for block in blocks {
        if deduped.last() != Some(&block) {
            deduped.push(block);
        }
    }

    let truncated = deduped.len() > MAX_BLOCKS;
    deduped.truncate(MAX_BLOCKS);
    let mut out = deduped.join("\n");
    if truncated {
        out.push_str("\n...[truncated: additional content omitted]");
    }
    out
}

fn is_clickable_hint(el: &ElementRef<'_>) -> bool {
    let tag = el.value().name();
    if tag == "a" {
        return true;
    }
    if el.value().attr("role") == Some("link") {
        return true;
    }
    if el.value().attr("onclick").is_some() {
        return true;
    }
    let id_class = format!(
        "{} {}",
        el.value().attr("id").unwrap_or(""),
        el.value().attr("class").unwrap_or("")
    )
    .to_lowercase();
    id_class.contains("result-title") || id_class.contains("result__title")
}

/// Visible link/button texts, 3-200 chars, deduplicated, order preserved (§4.2).
pub fn extract_clickable_texts(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();

    for node in document.tree.nodes() {
        let Some(el) = ElementRef::wrap(node) else {
            continue;
        };
        if !is_clickable_hint(&el) {
            continue;
        }
        let text = collect_text(node).trim().to_string();
        let len = text.chars().count();
        if len < 3 || len > 200 {
            continue;
        }
        if seen.insert(text.clone()) {
            out.push(text);
        }
    }
    out
}

/// Every stable selector (§4.2) derivable from the document's elements, in
/// document order, deduplicated.
pub fn extract_stable_selectors(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();

    for node in document.tree.nodes() {
        let Some(el) = ElementRef::wrap(node) else {
            continue;
        };
        let tag = el.value().name();
        let attrs: Vec<(String, String)> = el
            .value()
            .attrs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        if let Some(selector) = build_stable_selector(tag, &attrs) {
            if seen.insert(selector.clone()) {
                out.push(selector);
            }
        }
    }
    out
}

/// Structured inventory of inputs, selects, textareas, buttons and links (§3).
pub fn extract_field_inventory(html: &str) -> FieldInventory {
    let document = Html::parse_document(html);
    let mut fields = Vec::new();

    for node in document.tree.nodes() {
        let Some(el) = ElementRef::wrap(node) else {
            continue;
        };
        let tag = el.value().name();
        let kind = match tag {
            "input" => FieldKind::Input,
            "select" => FieldKind::Select,
            "textarea" => FieldKind::Textarea,
            "button" => FieldKind::Button,
            "a" if el.value().attr("href").is_some() => FieldKind::Link,
            _ => continue,
        };

        let attrs: Vec<(String, String)> = el
            .value()
            .attrs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let selector = build_stable_selector(tag, &attrs);

        let mut label = el
            .value()
            .attr("aria-label")
            .or_else(|| el.value().attr("placeholder"))
            .or_else(|| el.value().attr("name"))
            .map(|s| s.to_string());
        if label.is_none() {
            let text = collect_text(node);
            if !text.is_empty() {
                label = Some(text);
            } else {
                label = el.value().attr("value").map(|s| s.to_string());
            }
        }

        fields.push(FieldDescriptor {
            kind,
            selector,
            label,
        });
    }

    FieldInventory { fields }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <nav><a href="/ignored">Nav link</a></nav>
          <h1>Search Results</h1>
          <p>Some intro paragraph.</p>
          <ul>
            <li>First item</li>
            <li>Second item</li>
          </ul>
          <a href="https://github.com/Josh-XT/AGiXT">AGiXT</a>
          <form><input name="q" placeholder="Search" /><button>Go</button></form>
        </body></html>
    "#;

    #[test]
    fn extracted_text_skips_nav_and_form() {
        let text = extract_content_text(PAGE);
        assert!(text.contains("### Search Results"));
        assert!(text.contains("- First item"));
        assert!(text.contains("Link: 'AGiXT' (href: https://github.com/Josh-XT/AGiXT)"));
        assert!(!text.contains("Nav link"));
        assert!(!text.contains("Go"));
    }

    #[test]
    fn clickable_texts_collect_anchor_text() {
        let texts = extract_clickable_texts(PAGE);
        assert!(texts.contains(&"AGiXT".to_string()));
    }

    #[test]
    fn field_inventory_finds_input_with_stable_selector() {
        let inventory = extract_field_inventory(PAGE);
        let input = inventory
            .fields
            .iter()
            .find(|f| f.kind == FieldKind::Input)
            .expect("input present");
        assert_eq!(input.selector.as_deref(), Some("input[name=\"q\"]"));
        assert_eq!(input.label.as_deref(), Some("Search"));
    }

    #[test]
    fn stable_selectors_exclude_class_only_elements() {
        let html = r#"<html><body><div class="card"></div><input id="x" /></body></html>"#;
        let selectors = extract_stable_selectors(html);
        assert!(selectors.contains(&"#x".to_string()));
        assert!(!selectors.iter().any(|s| s.starts_with('.')));
    }
}
