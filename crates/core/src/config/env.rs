//! `${VAR}` placeholder expansion for config files.

use std::sync::OnceLock;

use regex_lite::Regex;

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder regex is valid"))
}

/// Expand `${VAR_NAME}` patterns using `lookup`.
///
/// Unknown variables are left in place.
pub fn expand_with<F>(s: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = s.to_string();

    for cap in placeholder().captures_iter(s) {
        if let (Some(full_match), Some(var_match)) = (cap.get(0), cap.get(1)) {
            if let Some(value) = lookup(var_match.as_str()) {
                result = result.replace(full_match.as_str(), &value);
            }
        }
    }

    result
}

/// Expand `${VAR_NAME}` patterns with process environment values.
pub fn expand_env(s: &str) -> String {
    expand_with(s, |name| std::env::var(name).ok())
}
