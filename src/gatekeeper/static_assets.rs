//! Static asset short-circuit.
//!
//! Asset requests skip the whole pipeline, decorator included. A path that
//! fails the hostile-input check never qualifies, so traversal payloads dressed
//! up as `.png` still go through the locale redirect.

use std::collections::HashSet;

use crate::config::StaticAssetConfig;
use crate::security::sanitizer::is_header_safe;

#[derive(Debug, Clone)]
pub struct StaticAssetMatcher {
    prefixes: Vec<String>,
    extensions: HashSet<String>,
}

impl StaticAssetMatcher {
    pub fn new<P, E>(prefixes: P, extensions: E) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &StaticAssetConfig) -> Self {
        Self::new(config.prefixes.iter().cloned(), &config.extensions)
    }

    pub fn matches(&self, path: &str) -> bool {
        if !is_header_safe(path) {
            return false;
        }
        if self.prefixes.iter().any(|p| path.starts_with(p.as_str())) {
            return true;
        }
        let file = path.rsplit('/').next().unwrap_or_default();
        match file.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => {
                self.extensions.contains(&ext.to_ascii_lowercase())
            }
            _ => false,
        }
    }
}
