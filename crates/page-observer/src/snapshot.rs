//! `PageSnapshot` and the field-inventory shape it carries (§3).

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub kind: FieldKind,
    pub selector: Option<String>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Input,
    Select,
    Textarea,
    Button,
    Link,
}

impl FieldKind {
    fn as_str(self) -> &'static str {
        match self {
            FieldKind::Input => "input",
            FieldKind::Select => "select",
            FieldKind::Textarea => "textarea",
            FieldKind::Button => "button",
            FieldKind::Link => "link",
        }
    }
}

/// Structured description of inputs, selects, textareas, buttons, links (§3).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldInventory {
    pub fields: Vec<FieldDescriptor>,
}

impl FieldInventory {
    /// Rendered for the Planner prompt, truncated to `max_chars` (§4.1: ~1500).
    pub fn render(&self, max_chars: usize) -> String {
        let mut out = String::new();
        for field in &self.fields {
            let line = format!(
                "{}: selector={} label={}\n",
                field.kind.as_str(),
                field.selector.as_deref().unwrap_or("-"),
                field.label.as_deref().unwrap_or("-"),
            );
            if out.len() + line.len() > max_chars {
                out.push_str("...[truncated]");
                break;
            }
            out.push_str(&line);
        }
        out
    }
}

/// Immutable view of the page used for planning (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot {
    pub url: String,
    pub content_text: String,
    pub content_digest: String,
    pub stable_selectors: Vec<String>,
    pub clickable_texts: Vec<String>,
    pub field_inventory: FieldInventory,
}
