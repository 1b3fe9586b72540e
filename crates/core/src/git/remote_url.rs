//! Host-aware GitHub URL helpers.
//!
//! The web base URL is derived from the configured API URL so compare links
//! also work against GitHub Enterprise Server (`https://<host>/api/v3`).

use std::sync::OnceLock;

use regex_lite::Regex;

/// Placeholder slug used in compare links when `origin` is not a
/// recognisable GitHub remote.
pub const PLACEHOLDER_SLUG: &str = "YOUR_ORG/YOUR_REPO";

/// Derive the web base URL from the API URL.
///
/// - `https://api.github.com` → `https://github.com`
/// - `https://<host>/api/v3`  → `https://<host>`
/// - anything else            → trailing slash stripped, used as-is
pub fn derive_git_base_url(api_url: &str) -> String {
    let url = api_url.trim().trim_end_matches('/');

    if url.eq_ignore_ascii_case("https://api.github.com") {
        return "https://github.com".to_string();
    }

    if let Some(base) = url.strip_suffix("/api/v3") {
        return base.to_string();
    }

    url.to_string()
}

fn slug_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:https?://(?:[^@/]+@)?[^/]+/|ssh://git@[^/]+/|git@[^:]+:)([^/\s]+)/([^/\s]+?)(?:\.git)?/?$")
            .unwrap_or_else(|e| unreachable!("static slug pattern: {e}"))
    })
}

/// Extract `owner/repo` from a remote URL.
///
/// Accepts `https://host/owner/repo(.git)`, `git@host:owner/repo(.git)` and
/// `ssh://git@host/owner/repo(.git)`. Local paths and anything else yield
/// `None`.
pub fn parse_repo_slug(remote_url: &str) -> Option<String> {
    let caps = slug_regex().captures(remote_url.trim())?;
    let owner = caps.get(1)?.as_str();
    let repo = caps.get(2)?.as_str();
    if repo.is_empty() {
        return None;
    }
    Some(format!("{owner}/{repo}"))
}

/// Link to GitHub's "open a pull request" compare view.
pub fn compare_url(web_base: &str, slug: Option<&str>, base: &str, branch: &str) -> String {
    format!(
        "{}/{}/compare/{}...{}?expand=1",
        web_base.trim_end_matches('/'),
        slug.unwrap_or(PLACEHOLDER_SLUG),
        base,
        branch
    )
}
