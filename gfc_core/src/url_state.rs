//! State kept in the query string of the current URL.
//!
//! Nothing here caches parsed state. Every read goes back to [`Location::href`] and every write
//! builds a complete new URL and hands it to [`Location::replace`], so the URL stays the single
//! source of truth and a copied link carries the full state.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use url::Url;

/// Flags for a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigateOptions {
    pub keep_focus: bool,
    pub no_scroll: bool,
}

impl NavigateOptions {
    /// Leave focus and scroll position untouched.
    pub const IN_PLACE: NavigateOptions = NavigateOptions {
        keep_focus: true,
        no_scroll: true,
    };
}

/// Access to the page's current URL and to navigation.
pub trait Location {
    /// The current absolute URL.
    fn href(&self) -> String;

    /// Navigate to `url`, adding a history entry.
    fn push(&mut self, url: &Url, options: NavigateOptions) -> Result<()>;

    /// Navigate to `url`, replacing the current history entry.
    fn replace(&mut self, url: &Url, options: NavigateOptions) -> Result<()>;
}

impl<L: Location + ?Sized> Location for &mut L {
    fn href(&self) -> String {
        (**self).href()
    }

    fn push(&mut self, url: &Url, options: NavigateOptions) -> Result<()> {
        (**self).push(url, options)
    }

    fn replace(&mut self, url: &Url, options: NavigateOptions) -> Result<()> {
        (**self).replace(url, options)
    }
}

/// A history entry of a [`MemoryLocation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub href: String,
    pub options: NavigateOptions,
}

/// An in-process [`Location`] with its own history stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryLocation {
    history: Vec<HistoryEntry>,
}

impl MemoryLocation {
    pub fn new(href: impl Into<String>) -> Self {
        MemoryLocation {
            history: vec![HistoryEntry {
                href: href.into(),
                options: NavigateOptions::default(),
            }],
        }
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    fn current(&self) -> &HistoryEntry {
        // `new` seeds one entry and `replace` only swaps it
        &self.history[self.history.len() - 1]
    }
}

impl Location for MemoryLocation {
    fn href(&self) -> String {
        self.current().href.clone()
    }

    fn push(&mut self, url: &Url, options: NavigateOptions) -> Result<()> {
        self.history.push(HistoryEntry {
            href: url.to_string(),
            options,
        });
        Ok(())
    }

    fn replace(&mut self, url: &Url, options: NavigateOptions) -> Result<()> {
        let last = self.history.len() - 1;
        self.history[last] = HistoryEntry {
            href: url.to_string(),
            options,
        };
        Ok(())
    }
}

/// Split a comma separated list of ids, dropping empty segments.
pub fn parse_ids(raw: Option<&str>) -> BTreeSet<String> {
    raw.map(|raw| {
        raw.split(',')
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

/// The first value of `name` in the url's query string.
pub fn read_scalar(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// The first value of `name` in a raw query string, e.g. one taken from a request.
pub fn read_query_scalar(query: &str, name: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

pub fn read_set(url: &Url, name: &str) -> BTreeSet<String> {
    parse_ids(read_scalar(url, name).as_deref())
}

/// Build a copy of `url` where `name` is set to `value`, or removed for `None`.
///
/// An existing parameter keeps its position, a new one is appended and duplicates are dropped.
pub fn with_param(url: &Url, name: &str, value: Option<&str>) -> Url {
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut written = false;
    for (key, current) in url.query_pairs() {
        if key != name {
            pairs.push((key.into_owned(), current.into_owned()));
            continue;
        }
        if !written {
            if let Some(value) = value {
                pairs.push((key.into_owned(), value.to_owned()));
            }
            written = true;
        }
    }
    if let (false, Some(value)) = (written, value) {
        pairs.push((name.to_owned(), value.to_owned()));
    }
    let mut url = url.clone();
    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
    url
}

fn current_url(location: &impl Location) -> Option<Url> {
    Url::parse(&location.href()).ok()
}

fn commit(location: &mut impl Location, name: &str, value: Option<&str>) -> Result<()> {
    let href = location.href();
    let url = Url::parse(&href).with_context(|| format!("current location {href:?} is no URL"))?;
    location.replace(&with_param(&url, name, value), NavigateOptions::IN_PLACE)
}

/// A query parameter holding a set of comma separated ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetParam {
    name: &'static str,
}

impl SetParam {
    pub const fn new(name: &'static str) -> Self {
        SetParam { name }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn ids(&self, location: &impl Location) -> BTreeSet<String> {
        current_url(location)
            .map(|url| read_set(&url, self.name))
            .unwrap_or_default()
    }

    pub fn has(&self, location: &impl Location, id: &str) -> bool {
        self.ids(location).contains(id)
    }

    /// Add `id` if it is missing, remove it otherwise.
    pub fn toggle(&self, location: &mut impl Location, id: &str) -> Result<()> {
        let mut ids = self.ids(&*location);
        if !ids.remove(id) {
            ids.insert(id.to_owned());
        }
        let joined = ids.into_iter().collect::<Vec<String>>().join(",");
        let value = (!joined.is_empty()).then_some(joined.as_str());
        commit(location, self.name, value)
    }
}

/// A query parameter holding one string, absent while it equals its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarParam {
    name: &'static str,
    default: &'static str,
}

impl ScalarParam {
    pub const fn new(name: &'static str, default: &'static str) -> Self {
        ScalarParam { name, default }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn default_value(&self) -> &'static str {
        self.default
    }

    pub fn value(&self, location: &impl Location) -> String {
        current_url(location)
            .and_then(|url| read_scalar(&url, self.name))
            .unwrap_or_else(|| self.default.to_owned())
    }

    pub fn set(&self, location: &mut impl Location, value: &str) -> Result<()> {
        let value = (value != self.default).then_some(value);
        commit(location, self.name, value)
    }
}
