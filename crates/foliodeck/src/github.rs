use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use crate::deck::Deck;

/// Repository statistics shown on project slides. A fetch failure yields the
/// zeroed default so the slide still renders a consistent record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepoInfo {
    pub stars: u64,
    pub forks: u64,
    pub issues: u64,
    pub language: String,
    pub license: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiRepo {
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    open_issues_count: u64,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    license: Option<ApiLicense>,
}

#[derive(Debug, Deserialize)]
struct ApiLicense {
    spdx_id: Option<String>,
}

fn fetch(repo: &str) -> Option<RepoInfo> {
    let url = format!("https://api.github.com/repos/{repo}");
    let api: ApiRepo = ureq::get(&url)
        .header("User-Agent", "foliodeck")
        .call()
        .ok()?
        .body_mut()
        .read_json()
        .ok()?;
    Some(RepoInfo {
        stars: api.stargazers_count,
        forks: api.forks_count,
        issues: api.open_issues_count,
        language: api.language.unwrap_or_default(),
        license: api.license.and_then(|l| l.spdx_id),
    })
}

/// Fetch metadata for every linked repository in the deck. Failures fall
/// back to `RepoInfo::default()` per repo; nothing here is fatal.
pub fn fetch_all(deck: &Deck) -> HashMap<String, RepoInfo> {
    let mut out = HashMap::new();
    for project in &deck.projects {
        for link in &project.links {
            let Some(repo) = link.github_repo.as_deref() else {
                continue;
            };
            let info = fetch(repo).unwrap_or_else(|| {
                debug!(repo, "metadata fetch failed, using empty record");
                RepoInfo::default()
            });
            out.insert(repo.to_string(), info);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record_is_zeroed() {
        let info = RepoInfo::default();
        assert_eq!(info.stars, 0);
        assert_eq!(info.forks, 0);
        assert_eq!(info.issues, 0);
        assert!(info.language.is_empty());
        assert!(info.license.is_none());
    }

    #[test]
    fn api_payload_tolerates_missing_fields() {
        let api: ApiRepo = serde_json::from_str(r#"{"stargazers_count": 7}"#).unwrap();
        assert_eq!(api.stargazers_count, 7);
        assert_eq!(api.forks_count, 0);
        assert!(api.license.is_none());
    }
}
