use anyhow::{Context, Result};
use url::Url;

use super::UrlState;

/// The current entry of a page's session history. Only replace semantics
/// are exposed: updating the URL never adds an entry.
#[derive(Debug, Clone)]
pub struct History {
    current: Url,
}

impl History {
    pub fn new(url: Url) -> Self {
        Self { current: url }
    }

    pub fn parse(url: &str) -> Result<Self> {
        let url = Url::parse(url).with_context(|| format!("invalid page URL: {url}"))?;
        Ok(Self::new(url))
    }

    pub fn current(&self) -> &Url {
        &self.current
    }

    /// Swap the current entry for `url`.
    pub fn replace(&mut self, url: Url) {
        self.current = url;
    }
}

impl UrlState for History {
    fn query(&self, key: &str) -> Option<String> {
        self.current()
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    fn replace_query(&mut self, key: &str, value: &str) {
        let mut url = self.current().clone();
        let mut pairs: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != key)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let position = url
            .query_pairs()
            .position(|(k, _)| k == key)
            .unwrap_or(pairs.len());
        pairs.insert(position.min(pairs.len()), (key.to_string(), value.to_string()));

        url.query_pairs_mut().clear().extend_pairs(&pairs);
        self.replace(url);
    }
}
