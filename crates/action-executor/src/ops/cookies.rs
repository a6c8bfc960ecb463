//! §4.3 `get_cookies` / `set_cookies`.

use webagent_core_types::{Cookie, Step};

use crate::errors::ExecutorError;
use crate::ops::OpContext;

pub async fn get_cookies(ctx: &OpContext, step: &Step) -> Result<String, ExecutorError> {
    let cookies = ctx
        .browser
        .cookies()
        .await
        .map_err(|e| ExecutorError::BrowserError(e.to_string()))?;

    let pattern = step.value.trim();
    let matched: Vec<&Cookie> = if pattern.is_empty() {
        cookies.iter().collect()
    } else {
        cookies.iter().filter(|c| glob_match(pattern, &c.name)).collect()
    };

    let json = serde_json::to_string(
        &matched
            .iter()
            .map(|c| serde_json::json!({"name": c.name, "value": c.value, "domain": c.domain, "path": c.path}))
            .collect::<Vec<_>>(),
    )
    .map_err(|e| ExecutorError::BadArgument(e.to_string()))?;

    Ok(json)
}

pub async fn set_cookies(ctx: &OpContext, step: &Step) -> Result<String, ExecutorError> {
    if step.value.trim().is_empty() {
        return Err(ExecutorError::BadArgument("set_cookies requires cookie data in value".into()));
    }

    let current_url = ctx
        .browser
        .current_url()
        .await
        .map_err(|e| ExecutorError::BrowserError(e.to_string()))?;
    let default_domain = default_domain_from_url(&current_url);

    let cookies = parse_cookies(&step.value, &default_domain)?;
    if cookies.is_empty() {
        return Err(ExecutorError::BadArgument("no cookies parsed from value".into()));
    }

    ctx.browser
        .add_cookies(&cookies)
        .await
        .map_err(|e| ExecutorError::BrowserError(e.to_string()))?;

    Ok(format!("set {} cookie(s)", cookies.len()))
}

fn default_domain_from_url(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| format!(".{h}")))
        .unwrap_or_default()
}

/// Accepts a JSON object, a JSON array of objects, or a semicolon-delimited
/// `name=value` list (§4.3).
fn parse_cookies(value: &str, default_domain: &str) -> Result<Vec<Cookie>, ExecutorError> {
    let trimmed = value.trim();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        let json: serde_json::Value =
            serde_json::from_str(trimmed).map_err(|e| ExecutorError::BadArgument(format!("invalid cookie JSON: {e}")))?;
        let entries: Vec<serde_json::Value> = match json {
            serde_json::Value::Array(items) => items,
            obj @ serde_json::Value::Object(_) => vec![obj],
            _ => return Err(ExecutorError::BadArgument("cookie JSON must be an object or array".into())),
        };
        entries
            .into_iter()
            .map(|entry| cookie_from_json(&entry, default_domain))
            .collect()
    } else {
        Ok(trimmed
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .map(|(name, value)| Cookie {
                name: name.trim().to_string(),
                value: value.trim().to_string(),
                domain: default_domain.to_string(),
                path: "/".to_string(),
            })
            .collect())
    }
}

fn cookie_from_json(entry: &serde_json::Value, default_domain: &str) -> Result<Cookie, ExecutorError> {
    let name = entry
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ExecutorError::BadArgument("cookie entry missing 'name'".into()))?
        .to_string();
    let value = entry
        .get("value")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ExecutorError::BadArgument("cookie entry missing 'value'".into()))?
        .to_string();
    let domain = entry
        .get("domain")
        .and_then(|v| v.as_str())
        .unwrap_or(default_domain)
        .to_string();
    let path = entry.get("path").and_then(|v| v.as_str()).unwrap_or("/").to_string();
    Ok(Cookie { name, value, domain, path })
}

/// Minimal `*`-only glob matcher (cookie-name filters don't need more).
fn glob_match(pattern: &str, candidate: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == candidate;
    }
    let parts: Vec<&str> = pattern.split('*').collect();
    let mut rest = candidate;
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if i == 0 {
            if !rest.starts_with(part) {
                return false;
            }
            rest = &rest[part.len()..];
        } else if i == parts.len() - 1 {
            return rest.ends_with(part);
        } else if let Some(pos) = rest.find(part) {
            rest = &rest[pos + part.len()..];
        } else {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_matches_prefix_wildcard() {
        assert!(glob_match("session*", "session_id"));
        assert!(!glob_match("session*", "other"));
    }

    #[test]
    fn glob_matches_exact_when_no_wildcard() {
        assert!(glob_match("sid", "sid"));
        assert!(!glob_match("sid", "sidx"));
    }

    #[test]
    fn parses_semicolon_list() {
        let cookies = parse_cookies("a=1; b=2", ".example.test").unwrap();
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0].name, "a");
        assert_eq!(cookies[0].domain, ".example.test");
    }

    #[test]
    fn parses_json_array() {
        let cookies = parse_cookies(
            r#"[{"name":"sid","value":"abc","domain":".x.test","path":"/"}]"#,
            ".ignored.test",
        )
        .unwrap();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].domain, ".x.test");
    }

    #[test]
    fn default_domain_uses_host() {
        assert_eq!(default_domain_from_url("https://example.test/path"), ".example.test");
    }
}
