//! Navigable locations and the navigator contract used by the url
//! synchronized state.

use parking_lot::Mutex;
use std::{
    fmt,
    sync::Arc,
};

/// A path with its decoded query parameters, in order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Location {
    path: String,
    query: Vec<(String, String)>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    pub replace: bool,
}

pub trait Navigator: Send + Sync {
    fn current_location(&self) -> Location;
    fn navigate(&self, target: &str, options: NavigateOptions);
    /// Go back to the previous location.
    fn pop(&self);
    /// Whether there is a previous location to go back to.
    fn can_pop(&self) -> bool {
        self.previous_location().is_some()
    }
    /// The location `pop` would return to, if known.
    fn previous_location(&self) -> Option<Location>;
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Parse a navigation target such as `/repos?page=2`; any fragment
    /// is dropped.
    pub fn parse(target: &str) -> Self {
        let target = target
            .split_once('#')
            .map(|(target, _)| target)
            .unwrap_or(target);
        let (path, query) = target
            .split_once('?')
            .unwrap_or((target, ""));
        let query = serde_urlencoded::from_str::<Vec<(String, String)>>(query)
            .unwrap_or_else(|e| {
                log::warn!("discarding undecodable query {query:?}: {e}");
                Vec::new()
            });
        Self {
            path: path.to_string(),
            query,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// A copy with `key` set to `value`, keeping the position of an
    /// existing parameter.
    pub fn with(&self, key: &str, value: impl Into<String>) -> Self {
        let mut result = self.clone();
        let value = value.into();
        match result.query.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => result.query.push((key.to_string(), value)),
        }
        result.query.retain({
            let mut seen = false;
            move |(k, _)| {
                if k != key {
                    true
                } else if seen {
                    false
                } else {
                    seen = true;
                    true
                }
            }
        });
        result
    }

    pub fn without(&self, key: &str) -> Self {
        let mut result = self.clone();
        result.query.retain(|(k, _)| k != key);
        result
    }

    pub fn query_string(&self) -> String {
        serde_urlencoded::to_string(&self.query)
            .unwrap_or_else(|e| {
                log::warn!("unable to encode query {:?}: {e}", self.query);
                String::new()
            })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.path)?;
        if !self.query.is_empty() {
            write!(f, "?{}", self.query_string())?;
        }
        Ok(())
    }
}

impl From<&str> for Location {
    fn from(target: &str) -> Self {
        Self::parse(target)
    }
}

impl<N: Navigator + ?Sized> Navigator for Arc<N> {
    fn current_location(&self) -> Location {
        (**self).current_location()
    }

    fn navigate(&self, target: &str, options: NavigateOptions) {
        (**self).navigate(target, options)
    }

    fn pop(&self) {
        (**self).pop()
    }

    fn can_pop(&self) -> bool {
        (**self).can_pop()
    }

    fn previous_location(&self) -> Option<Location> {
        (**self).previous_location()
    }
}

/// A history stack kept in memory, for use where there is no browser.
#[derive(Debug)]
pub struct MemoryHistory {
    entries: Mutex<Vec<Location>>,
}

impl MemoryHistory {
    pub fn new(initial: impl Into<Location>) -> Self {
        Self {
            entries: Mutex::new(vec![initial.into()]),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new(Location::new("/"))
    }
}

impl Navigator for MemoryHistory {
    fn current_location(&self) -> Location {
        self.entries
            .lock()
            .last()
            .cloned()
            .unwrap_or_default()
    }

    fn navigate(&self, target: &str, options: NavigateOptions) {
        let location = Location::parse(target);
        log::trace!("navigate to {location} (replace: {})", options.replace);
        let mut entries = self.entries.lock();
        if options.replace {
            entries.pop();
        }
        entries.push(location);
    }

    fn pop(&self) {
        let mut entries = self.entries.lock();
        if entries.len() > 1 {
            entries.pop();
        } else {
            log::warn!("no previous location to return to");
        }
    }

    fn can_pop(&self) -> bool {
        self.entries.lock().len() > 1
    }

    fn previous_location(&self) -> Option<Location> {
        let entries = self.entries.lock();
        entries.len()
            .checked_sub(2)
            .and_then(|i| entries.get(i))
            .cloned()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_display() {
        let location = Location::parse("/repos?page=2&q=acme+corp#top");
        assert_eq!(location.path(), "/repos");
        assert_eq!(location.get("page"), Some("2"));
        assert_eq!(location.get("q"), Some("acme corp"));
        assert_eq!(location.to_string(), "/repos?page=2&q=acme+corp");

        assert_eq!(Location::parse("/users").to_string(), "/users");
        assert!(Location::parse("/users?").query().is_empty());
    }

    #[test]
    fn with_without() {
        let location = Location::parse("/repos?page=2&q=x");
        let edited = location.with("page", "3").with("edit", "a&b");
        assert_eq!(edited.to_string(), "/repos?page=3&q=x&edit=a%26b");
        assert_eq!(Location::parse(&edited.to_string()).get("edit"), Some("a&b"));
        assert_eq!(edited.without("q").to_string(), "/repos?page=3&edit=a%26b");
        // the original is left alone
        assert_eq!(location.to_string(), "/repos?page=2&q=x");

        let dup = Location::parse("/repos?page=1&page=2").with("page", "5");
        assert_eq!(dup.to_string(), "/repos?page=5");
    }

    #[test]
    fn memory_history() {
        let history = MemoryHistory::new("/repos");
        assert!(!history.can_pop());
        history.navigate("/repos?page=2", NavigateOptions::default());
        history.navigate("/repos?page=3", NavigateOptions { replace: true });
        assert_eq!(history.len(), 2);
        assert_eq!(history.current_location().get("page"), Some("3"));
        assert_eq!(history.previous_location(), Some(Location::parse("/repos")));
        history.pop();
        assert_eq!(history.current_location(), Location::parse("/repos"));
        assert_eq!(history.previous_location(), None);
        // popping the last entry does nothing
        history.pop();
        assert_eq!(history.len(), 1);
    }
}
