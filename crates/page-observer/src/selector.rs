//! The §4.2 stable-selector rule.
//!
//! Grounded in the teacher's `agent_loop::element_tree::build_css_selector`,
//! but stricter: the teacher accepts `tag.firstclass` selectors, this rule
//! rejects anything class-based outright.

/// Attributes considered durable across app versions (§4.2).
pub const STABLE_ATTRIBUTES: &[&str] = &[
    "id",
    "name",
    "data-testid",
    "aria-label",
    "placeholder",
    "type",
    "href",
    "role",
];

const COMBINATORS: &[&str] = &[" > ", " + ", " ~ "];
const POSITION_PSEUDOS: &[&str] = &[":nth-child", ":first-child", ":last-child"];

/// Whether `selector` passes the §4.2 stability rule.
pub fn is_stable_selector(selector: &str) -> bool {
    let selector = selector.trim();
    if selector.is_empty() {
        return false;
    }

    if selector.starts_with('.') {
        return false;
    }

    if COMBINATORS.iter().any(|c| selector.contains(c)) {
        return false;
    }

    if POSITION_PSEUDOS.iter().any(|p| selector.contains(p)) {
        return false;
    }

    if selector.starts_with('#') {
        return true;
    }

    STABLE_ATTRIBUTES
        .iter()
        .any(|attr| selector.contains(&format!("{attr}=")))
}

/// Build the most specific stable selector possible for an element's
/// attributes, preferring `id`, falling back through the allow-list in
/// §4.2's declared order. Returns `None` if nothing stable is available.
pub fn build_stable_selector(tag: &str, attrs: &[(String, String)]) -> Option<String> {
    if let Some((_, id)) = attrs.iter().find(|(k, v)| k == "id" && !v.is_empty()) {
        if !id.contains(' ') {
            return Some(format!("#{id}"));
        }
    }

    for attr in STABLE_ATTRIBUTES.iter().filter(|a| **a != "id") {
        if let Some((_, v)) = attrs.iter().find(|(k, _)| k == *attr) {
            if !v.is_empty() {
                let candidate = format!("{tag}[{attr}=\"{v}\"]");
                if is_stable_selector(&candidate) {
                    return Some(candidate);
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_selectors_are_stable() {
        assert!(is_stable_selector("#login-button"));
    }

    #[test]
    fn class_selectors_are_rejected() {
        assert!(!is_stable_selector(".btn-primary"));
    }

    #[test]
    fn attribute_allow_list_is_accepted() {
        assert!(is_stable_selector("input[name=\"q\"]"));
        assert!(is_stable_selector("a[data-testid=\"result-link\"]"));
        assert!(is_stable_selector("button[aria-label=\"Submit\"]"));
        assert!(is_stable_selector("input[placeholder=\"Search\"]"));
        assert!(is_stable_selector("input[type=\"submit\"]"));
        assert!(is_stable_selector("a[href=\"/home\"]"));
        assert!(is_stable_selector("div[role=\"button\"]"));
    }

    #[test]
    fn unknown_attribute_is_rejected() {
        assert!(!is_stable_selector("div[data-foo=\"bar\"]"));
    }

    #[test]
    fn combinators_are_rejected_even_with_stable_attribute() {
        assert!(!is_stable_selector("div[id=\"x\"] > span"));
        assert!(!is_stable_selector("div[id=\"x\"] + span"));
        assert!(!is_stable_selector("div[id=\"x\"] ~ span"));
    }

    #[test]
    fn position_pseudo_classes_are_rejected() {
        assert!(!is_stable_selector("li:nth-child(2)"));
        assert!(!is_stable_selector("input[name=\"q\"]:first-child"));
        assert!(!is_stable_selector("input[name=\"q\"]:last-child"));
    }

    #[test]
    fn empty_selector_is_rejected() {
        assert!(!is_stable_selector(""));
        assert!(!is_stable_selector("   "));
    }

    #[test]
    fn builder_prefers_id_over_attributes() {
        let attrs = vec![
            ("id".to_string(), "search-box".to_string()),
            ("name".to_string(), "q".to_string()),
        ];
        assert_eq!(
            build_stable_selector("input", &attrs),
            Some("#search-box".to_string())
        );
    }

    #[test]
    fn builder_falls_back_to_attribute_allow_list() {
        let attrs = vec![("name".to_string(), "q".to_string())];
        assert_eq!(
            build_stable_selector("input", &attrs),
            Some("input[name=\"q\"]".to_string())
        );
    }

    #[test]
    fn builder_returns_none_without_stable_attributes() {
        let attrs = vec![("class".to_string(), "btn btn-primary".to_string())];
        assert_eq!(build_stable_selector("div", &attrs), None);
    }
}
