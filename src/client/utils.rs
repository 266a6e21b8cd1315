//! URL and query-string helpers.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything `encodeURIComponent` escapes; its unreserved marks are
/// removed from the non-alphanumeric set.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode one path or query component.
#[must_use]
pub fn encode_component(raw: &str) -> String {
    utf8_percent_encode(raw, COMPONENT).to_string()
}

/// Build a query string from name/value pairs.
///
/// Both names and values are percent-encoded; the leading `?` appears
/// only when there is at least one pair.
#[must_use]
pub fn build_query_string(params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return String::new();
    }
    let built: Vec<String> = params
        .iter()
        .map(|(name, value)| format!("{}={}", encode_component(name), encode_component(value)))
        .collect();
    format!("?{}", built.join("&"))
}

/// Remove any trailing slashes from a URL.
#[must_use]
pub fn trim_trailing_slashes(url: &str) -> &str {
    url.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_params_build_empty_string() {
        assert_eq!(build_query_string(&[]), "");
    }

    #[test]
    fn test_params_are_encoded() {
        let query = build_query_string(&[("bbox", "-0.5,44,0.25,44.5"), ("q", "fish & chips")]);
        assert_eq!(query, "?bbox=-0.5%2C44%2C0.25%2C44.5&q=fish%20%26%20chips");
    }

    #[test]
    fn test_unreserved_marks_pass_through() {
        assert_eq!(encode_component("a-b_c.d!e~f*g'h(i)j"), "a-b_c.d!e~f*g'h(i)j");
        assert_eq!(encode_component("a/b=c"), "a%2Fb%3Dc");
    }

    #[test]
    fn test_trim_trailing_slashes() {
        assert_eq!(trim_trailing_slashes("https://x.test/api/"), "https://x.test/api");
        assert_eq!(trim_trailing_slashes("https://x.test/api///"), "https://x.test/api");
        assert_eq!(trim_trailing_slashes("https://x.test/api"), "https://x.test/api");
    }
}
