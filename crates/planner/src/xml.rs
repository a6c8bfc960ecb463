//! §4.4 steps 3–6: tolerant extraction of the `<interaction><step>…</step>
//! </interaction>` block and its parse into a `Step`.

use std::collections::HashMap;
use std::str::FromStr;

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use webagent_core_types::{Operation, RetryPolicy, Step};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlError(pub String);

impl std::fmt::Display for XmlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pulls the first `<interaction>…</interaction>` block out of a raw LLM
/// response, tolerating markdown fences, leading/trailing prose, and a bare
/// `<step>…</step>` (wrapped into `<interaction>` automatically).
pub fn extract_xml_block(raw: &str) -> Result<String, XmlError> {
    let stripped = strip_markdown_fences(raw);

    if let Some(block) = slice_between(&stripped, "<interaction>", "</interaction>") {
        return Ok(format!("<interaction>{block}</interaction>"));
    }

    if let Some(block) = slice_between(&stripped, "<step>", "</step>") {
        return Ok(format!("<interaction><step>{block}</step></interaction>"));
    }

    Err(XmlError("no <interaction> or <step> block found in response".into()))
}

fn strip_markdown_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(rest) = trimmed.strip_prefix("```") {
        let rest = rest.strip_prefix("xml").unwrap_or(rest);
        if let Some(end) = rest.rfind("```") {
            return rest[..end].trim().to_string();
        }
    }
    trimmed.to_string()
}

fn slice_between<'a>(haystack: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let start = haystack.find(open)? + open.len();
    let end = haystack[start..].find(close)? + start;
    Some(&haystack[start..end])
}

/// Parse a `<interaction><step>…</step></interaction>` document into a `Step`.
/// Unknown/missing `<operation>` is reported as an `XmlError` so the caller
/// can classify it as `malformed`.
pub fn parse_step(xml: &str) -> Result<Step, XmlError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut fields: HashMap<String, String> = HashMap::new();
    let mut tag_stack: Vec<String> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                tag_stack.push(name);
            }
            Ok(Event::Text(e)) => {
                if let Some(tag) = tag_stack.last() {
                    let text = e.unescape().map_err(|err| XmlError(err.to_string()))?.into_owned();
                    fields.entry(tag.clone()).or_default().push_str(&text);
                }
            }
            Ok(Event::End(_)) => {
                tag_stack.pop();
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(XmlError(format!("xml parse error: {err}"))),
        }
        buf.clear();
    }

    let operation_str = fields
        .get("operation")
        .map(|s| s.trim())
        .ok_or_else(|| XmlError("missing <operation>".into()))?;
    let operation =
        Operation::from_str(operation_str).map_err(|_| XmlError(format!("unknown operation '{operation_str}'")))?;

    let selector = fields.get("selector").cloned().unwrap_or_default();
    let value = fields.get("value").cloned().unwrap_or_default();
    let description = fields.get("description").cloned().unwrap_or_default();

    let max_attempts = fields.get("max_attempts").and_then(|s| s.trim().parse::<u32>().ok());
    let alternate_selector = fields.get("alternate_selector").cloned();
    let retry_policy = match (max_attempts, &alternate_selector) {
        (None, None) => None,
        (attempts, alt) => Some(RetryPolicy::new(attempts.unwrap_or(1), alt.clone())),
    };

    Ok(Step {
        operation,
        selector: sanitize_selector(&selector),
        value,
        description,
        retry_policy,
    })
}

/// §4.4 step 5: strip extraneous trailing `}` (unless `]}`), strip leading
/// `{` (unless `{[`), trim whitespace.
pub fn sanitize_selector(raw: &str) -> String {
    let mut s = raw.trim().to_string();
    if s.ends_with('}') && !s.ends_with("]}") {
        s.pop();
    }
    if s.starts_with('{') && !s.starts_with("{[") {
        s.remove(0);
    }
    s.trim().to_string()
}
