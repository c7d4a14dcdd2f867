//! HTTP header handling.

use indexmap::IndexMap;

/// HTTP header multimap (case-insensitive keys, order-preserving).
///
/// Keys are lower-cased on insertion and lookup. Each key holds its values
/// in arrival order, so repeated headers such as `set-cookie` keep every
/// occurrence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderMap {
    headers: IndexMap<String, Vec<String>>,
}

impl HeaderMap {
    /// Create a new empty header map.
    pub fn new() -> Self {
        Self {
            headers: IndexMap::new(),
        }
    }

    /// Append a value, keeping earlier values for the same name.
    pub fn append(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        let name = name.as_ref().to_lowercase();
        self.headers.entry(name).or_default().push(value.into());
    }

    /// Insert a header, replacing every earlier value for the same name.
    ///
    /// The key keeps its original position if it was already present.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        let name = name.as_ref().to_lowercase();
        self.headers.insert(name, vec![value.into()]);
    }

    /// Get the first value of a header.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    /// Get the most recent value of a header.
    pub fn last(&self, name: &str) -> Option<&str> {
        self.get_all(name).last().map(String::as_str)
    }

    /// Get every value of a header, in arrival order.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.headers
            .get(&name.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Check if a header exists.
    pub fn contains(&self, name: &str) -> bool {
        self.headers.contains_key(&name.to_lowercase())
    }

    /// Get number of distinct header names.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Iterate over header names with all their values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.headers
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Iterate over every (name, value) pair, repeated names included.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().flat_map(|(name, values)| {
            values.iter().map(move |value| (name.as_str(), value.as_str()))
        })
    }

    /// Render one `name: value` line per stored value.
    pub fn to_lines(&self) -> Vec<String> {
        self.pairs()
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect()
    }

    /// Clear all headers.
    pub fn clear(&mut self) {
        self.headers.clear();
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = HeaderMap::new();
        for (name, value) in iter {
            map.append(name, value);
        }
        map
    }
}

/// Common HTTP headers.
pub mod names {
    pub const CONTENT_LENGTH: &str = "content-length";
    pub const CONTENT_TYPE: &str = "content-type";
    pub const COOKIE: &str = "cookie";
    pub const LOCATION: &str = "location";
    pub const SET_COOKIE: &str = "set-cookie";
    pub const USER_AGENT: &str = "user-agent";
    pub const X_HTTP_METHOD_OVERRIDE: &str = "x-http-method-override";

    /// Synthetic key under which response status lines are stored.
    pub const STATUS: &str = "status";
}

/// Content type utilities.
pub mod content_type {
    pub const JSON: &str = "application/json";
    pub const FORM: &str = "application/x-www-form-urlencoded";

    /// Check if a bare MIME type is exactly JSON.
    pub fn is_json(mime_type: &str) -> bool {
        mime_type.eq_ignore_ascii_case(mime::APPLICATION_JSON.essence_str())
    }
}
