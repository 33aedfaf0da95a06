//! Cookie filtering and URL helpers.

use crate::types::{CallbackParams, CookieRecord};
use url::Url;

/// Keep only cookies whose domain matches the given origin's host.
///
/// A cookie matches when its domain (leading dot ignored) equals the origin
/// host or is a parent domain of it. Cookies scoped to unrelated hosts or to
/// subdomains of the origin are dropped.
pub fn filter_cookies(cookies: &[CookieRecord], origin: &str) -> Vec<CookieRecord> {
    let Some(host) = Url::parse(origin).ok().and_then(|u| u.host_str().map(str::to_string)) else {
        tracing::warn!("Cannot parse origin {origin}, returning no cookies");
        return Vec::new();
    };

    cookies
        .iter()
        .filter(|c| domain_matches(&c.domain, &host))
        .cloned()
        .collect()
}

fn domain_matches(cookie_domain: &str, host: &str) -> bool {
    let domain = cookie_domain.trim_start_matches('.');
    if domain.is_empty() {
        return false;
    }
    host == domain || host.ends_with(&format!(".{domain}"))
}

/// Parse the query string of a URL into a multi-valued parameter map.
///
/// Invalid URLs yield an empty map; absence of parameters is not an error.
pub fn parse_query_params(url_str: &str) -> CallbackParams {
    let mut params = CallbackParams::new();
    let Ok(url) = Url::parse(url_str) else {
        return params;
    };
    for (key, value) in url.query_pairs() {
        params
            .entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }
    params
}

/// Glob-style URL pattern match.
///
/// `*` matches any run of characters; literal segments must appear in order.
/// `**https://app.example/console/token**` matches any URL containing that
/// path, mirroring the redirect patterns in provider configuration.
pub fn pattern_matches(pattern: &str, url: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').filter(|p| !p.is_empty()).collect();
    if parts.is_empty() {
        return true;
    }

    let anchored_start = !pattern.starts_with('*');
    let anchored_end = !pattern.ends_with('*');

    let mut rest = url;
    for (i, part) in parts.iter().enumerate() {
        match rest.find(part) {
            Some(pos) => {
                if i == 0 && anchored_start && pos != 0 {
                    return false;
                }
                rest = &rest[pos + part.len()..];
            }
            None => return false,
        }
    }

    !anchored_end || rest.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookie(name: &str, domain: &str) -> CookieRecord {
        CookieRecord::new(name, "v").with_domain(domain)
    }

    #[test]
    fn test_filter_keeps_matching_domain() {
        let cookies = vec![
            cookie("session", "app.example.com"),
            cookie("parent", ".example.com"),
            cookie("other", "linux.do"),
            cookie("sub", "deep.app.example.com"),
        ];

        let kept = filter_cookies(&cookies, "https://app.example.com");
        let names: Vec<&str> = kept.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["session", "parent"]);
    }

    #[test]
    fn test_filter_empty_domain_dropped() {
        let kept = filter_cookies(&[cookie("c", "")], "https://example.com");
        assert!(kept.is_empty());
    }

    #[test]
    fn test_filter_bad_origin() {
        let kept = filter_cookies(&[cookie("c", "example.com")], "not a url");
        assert!(kept.is_empty());
    }

    #[test]
    fn test_parse_query_params() {
        let params = parse_query_params("https://app.example.com/cb?code=abc123&state=xyz");
        assert_eq!(params["code"], vec!["abc123"]);
        assert_eq!(params["state"], vec!["xyz"]);
    }

    #[test]
    fn test_parse_query_multi_valued() {
        let params = parse_query_params("https://x.test/?a=1&a=2");
        assert_eq!(params["a"], vec!["1", "2"]);
    }

    #[test]
    fn test_parse_query_no_params() {
        assert!(parse_query_params("https://x.test/path").is_empty());
        assert!(parse_query_params("garbage").is_empty());
    }

    #[rstest::rstest]
    #[case(
        "**https://app.example.com/console/token**",
        "https://app.example.com/console/token?expand=1",
        true
    )]
    #[case(
        "**https://app.example.com/console/token**",
        "https://connect.linux.do/oauth2/authorize",
        false
    )]
    #[case("https://a.test/*", "https://a.test/path", true)]
    #[case("https://a.test/*", "http://evil/https://a.test/", false)]
    #[case("*/callback", "https://a.test/callback", true)]
    #[case("*/callback", "https://a.test/callback?x=1", false)]
    #[case("**", "anything", true)]
    #[case("*one*two*", "xx one yy two zz", true)]
    #[case("*one*two*", "xx two yy one zz", false)]
    fn test_pattern_matches(#[case] pattern: &str, #[case] url: &str, #[case] expected: bool) {
        assert_eq!(pattern_matches(pattern, url), expected);
    }
}
