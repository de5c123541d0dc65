//! Retesting questions answered wrong
//!
//! A run remembers every question it got wrong. On unload the names are
//! written to session storage under a key derived from the page address,
//! and reopening the page with `retest=wrong` asks only those questions.

use std::collections::BTreeSet;

use itertools::Itertools;
use url::{Url, form_urlencoded};

use crate::{
    constants::storage::{RETEST_KEY_PREFIX, RETEST_PARAM, RETEST_VALUE},
    progress::KeyValueStore,
};

/// Canonical form of a question name
///
/// Markup tags become spaces, whitespace runs collapse to one space and the
/// ends are trimmed. Case is kept.
pub fn normalize_name(value: &str) -> String {
    let mut plain = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(open) = rest.find('<') {
        let Some(close) = rest[open..].find('>') else {
            break;
        };
        plain.push_str(&rest[..open]);
        plain.push(' ');
        rest = &rest[open + close + 1..];
    }
    plain.push_str(rest);
    plain.split_whitespace().join(" ")
}

/// Whether the page asks for wrong answers only
pub fn is_retest_mode(url: &Url) -> bool {
    url.query_pairs()
        .any(|(key, value)| key == RETEST_PARAM && value == RETEST_VALUE)
}

/// The page address with retest mode switched on or off
pub fn retest_url(url: &Url, enable: bool) -> Url {
    let mut replaced = false;
    let mut pairs = Vec::new();
    for (key, value) in url.query_pairs() {
        if key != RETEST_PARAM {
            pairs.push((key.into_owned(), value.into_owned()));
        } else if enable && !replaced {
            replaced = true;
            pairs.push((key.into_owned(), RETEST_VALUE.to_string()));
        }
    }
    if enable && !replaced {
        pairs.push((RETEST_PARAM.to_string(), RETEST_VALUE.to_string()));
    }

    let mut url = url.clone();
    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
    url
}

/// Session key of a page, ignoring the retest parameter
pub fn context_key(url: &Url) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(url.query_pairs().filter(|(key, _)| key != RETEST_PARAM))
        .finish();
    if query.is_empty() {
        format!("{RETEST_KEY_PREFIX}{}", url.path())
    } else {
        format!("{RETEST_KEY_PREFIX}{}?{query}", url.path())
    }
}

/// Wrong-answer list of one page in session storage
#[derive(Debug, Clone)]
pub struct RetestStore<K> {
    store: K,
    key: String,
}

impl<K: KeyValueStore> RetestStore<K> {
    /// Binds `store` to the list of the page at `url`
    pub fn for_page(store: K, url: &Url) -> Self {
        Self {
            store,
            key: context_key(url),
        }
    }

    /// The storage key in use
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Gives the underlying store back
    pub fn into_inner(self) -> K {
        self.store
    }

    /// The saved names, `None` when nothing usable is stored
    pub fn load(&self) -> Option<BTreeSet<String>> {
        let raw = self
            .store
            .get(&self.key)
            .inspect_err(|error| tracing::warn!(%error, "retest list unreadable"))
            .ok()
            .flatten()?;
        let names: Vec<String> = serde_json::from_str(&raw)
            .inspect_err(|error| tracing::debug!(%error, "retest list ignored"))
            .ok()?;
        Some(
            names
                .iter()
                .map(|name| normalize_name(name))
                .filter(|name| !name.is_empty())
                .collect(),
        )
    }

    /// Replaces the saved names
    pub fn persist(&mut self, names: &BTreeSet<String>) {
        let result = serde_json::to_string(names)
            .map_err(|error| crate::progress::StorageError::WriteRejected(error.to_string()))
            .and_then(|json| self.store.set(&self.key, &json));
        if let Err(error) = result {
            tracing::warn!(%error, "retest list not saved");
        }
    }

    /// Names to restrict the pool to, empty outside retest mode
    pub fn focus(&self, url: &Url) -> BTreeSet<String> {
        if is_retest_mode(url) {
            self.load().unwrap_or_default()
        } else {
            BTreeSet::new()
        }
    }
}
