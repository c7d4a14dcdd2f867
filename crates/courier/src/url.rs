//! URL composition.
//!
//! URLs are split into their components without validation and put back
//! together with a merged query string. Malformed input (no scheme, no host)
//! passes through unchanged, which is why this module does not go through
//! [`url::Url`]: that type rejects or normalizes exactly the inputs that
//! must survive untouched here.

use indexmap::IndexMap;

/// A query string as an ordered mapping of keys to values.
pub type Query = IndexMap<String, QueryValue>;

/// A query parameter value.
///
/// Nested values serialize with bracketed keys: `key[0]=v`, `key[sub]=v`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryValue {
    Value(String),
    List(Vec<QueryValue>),
    Map(Query),
}

impl QueryValue {
    /// Get the scalar value, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            QueryValue::Value(value) => Some(value),
            _ => None,
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Value(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Value(value)
    }
}

impl<T: Into<QueryValue>> From<Vec<T>> for QueryValue {
    fn from(values: Vec<T>) -> Self {
        QueryValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<Query> for QueryValue {
    fn from(map: Query) -> Self {
        QueryValue::Map(map)
    }
}

/// Components of a URL, borrowed from the input string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UrlParts<'a> {
    pub scheme: Option<&'a str>,
    pub user: Option<&'a str>,
    pub pass: Option<&'a str>,
    pub host: Option<&'a str>,
    pub port: Option<&'a str>,
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub fragment: Option<&'a str>,
}

impl<'a> UrlParts<'a> {
    /// Split a URL into its components.
    pub fn parse(url: &'a str) -> Self {
        let mut parts = UrlParts::default();

        let (rest, fragment) = match url.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment)),
            None => (url, None),
        };
        parts.fragment = fragment;

        let (rest, query) = match rest.split_once('?') {
            Some((rest, query)) => (rest, Some(query)),
            None => (rest, None),
        };
        parts.query = query;

        let after_scheme = match rest.find("://") {
            Some(idx) if is_scheme(&rest[..idx]) => {
                parts.scheme = Some(&rest[..idx]);
                Some(&rest[idx + 3..])
            }
            _ => rest.strip_prefix("//"),
        };

        let Some(after_scheme) = after_scheme else {
            parts.path = rest;
            return parts;
        };

        let authority_end = after_scheme.find('/').unwrap_or(after_scheme.len());
        let (authority, path) = after_scheme.split_at(authority_end);
        parts.path = path;

        let host_port = match authority.rsplit_once('@') {
            Some((userinfo, host_port)) => {
                match userinfo.split_once(':') {
                    Some((user, pass)) => {
                        parts.user = Some(user);
                        parts.pass = Some(pass);
                    }
                    None => parts.user = Some(userinfo),
                }
                host_port
            }
            None => authority,
        };

        let (host, port) = split_port(host_port);
        parts.host = Some(host).filter(|h| !h.is_empty());
        parts.port = port;

        parts
    }

    /// Reassemble the URL with the given serialized query.
    ///
    /// Empty segments are omitted; credentials appear only with a user.
    pub fn assemble(&self, query: &str) -> String {
        let mut url = String::new();

        match self.scheme {
            Some(scheme) => {
                url.push_str(scheme);
                url.push_str("://");
            }
            None if self.host.is_some() => url.push_str("//"),
            None => {}
        }

        if let Some(user) = self.user.filter(|u| !u.is_empty()) {
            url.push_str(user);
            if let Some(pass) = self.pass.filter(|p| !p.is_empty()) {
                url.push(':');
                url.push_str(pass);
            }
            url.push('@');
        }

        if let Some(host) = self.host {
            url.push_str(host);
        }

        if let Some(port) = self.port.filter(|p| !p.is_empty()) {
            url.push(':');
            url.push_str(port);
        }

        url.push_str(self.path);

        if !query.is_empty() {
            url.push('?');
            url.push_str(query);
        }

        if let Some(fragment) = self.fragment.filter(|f| !f.is_empty()) {
            url.push('#');
            url.push_str(fragment);
        }

        url
    }
}

/// Merge `extra` into the query string of `url`.
///
/// Keys from `extra` win on collision; keys only present in the existing
/// query are kept after them.
pub fn compose(url: &str, extra: &Query) -> String {
    let parts = UrlParts::parse(url);

    let query = match parts.query {
        Some(existing) => {
            let mut merged = extra.clone();
            for (key, value) in parse_query(existing) {
                merged.entry(key).or_insert(value);
            }
            merged
        }
        None => extra.clone(),
    };

    parts.assemble(&build_query(&query))
}

/// Parse a query string, expanding bracketed keys into nested values.
///
/// `a[]=1&a[]=2` becomes a map with keys `0` and `1` under `a`; a later
/// plain `a=3` replaces the whole entry.
pub fn parse_query(query: &str) -> Query {
    let mut result = Query::new();

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let (base, path) = split_key(&key);
        if base.is_empty() {
            continue;
        }

        if path.is_empty() {
            result.insert(base.to_string(), QueryValue::Value(value.into_owned()));
            continue;
        }

        let slot = result
            .entry(base.to_string())
            .or_insert_with(|| QueryValue::Map(Query::new()));
        insert_nested(slot, &path, value.into_owned());
    }

    result
}

/// Serialize a query mapping as `application/x-www-form-urlencoded`.
pub fn build_query(query: &Query) -> String {
    let mut pairs = Vec::new();
    for (key, value) in query {
        flatten(key.clone(), value, &mut pairs);
    }

    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

fn flatten(prefix: String, value: &QueryValue, out: &mut Vec<(String, String)>) {
    match value {
        QueryValue::Value(value) => out.push((prefix, value.clone())),
        QueryValue::List(items) => {
            for (idx, item) in items.iter().enumerate() {
                flatten(format!("{}[{}]", prefix, idx), item, out);
            }
        }
        QueryValue::Map(map) => {
            for (key, item) in map {
                flatten(format!("{}[{}]", prefix, key), item, out);
            }
        }
    }
}

/// Split `a[b][]` into `("a", ["b", ""])`.
///
/// Text after an unterminated bracket is part of the base name.
fn split_key(key: &str) -> (&str, Vec<&str>) {
    let Some(open) = key.find('[') else {
        return (key, Vec::new());
    };
    if !key[open..].contains(']') {
        return (key, Vec::new());
    }

    let base = &key[..open];
    let mut path = Vec::new();
    let mut rest = &key[open..];

    while let Some(inner) = rest.strip_prefix('[') {
        let Some(close) = inner.find(']') else {
            break;
        };
        path.push(&inner[..close]);
        rest = &inner[close + 1..];
    }

    (base, path)
}

fn insert_nested(slot: &mut QueryValue, path: &[&str], value: String) {
    let Some((segment, rest)) = path.split_first() else {
        *slot = QueryValue::Value(value);
        return;
    };

    if !matches!(slot, QueryValue::Map(_)) {
        *slot = QueryValue::Map(Query::new());
    }
    let QueryValue::Map(map) = slot else {
        return;
    };

    let key = if segment.is_empty() {
        next_index(map).to_string()
    } else {
        segment.to_string()
    };

    let child = map
        .entry(key)
        .or_insert_with(|| QueryValue::Map(Query::new()));
    insert_nested(child, rest, value);
}

fn next_index(map: &Query) -> u64 {
    map.keys()
        .filter_map(|k| k.parse::<u64>().ok())
        .max()
        .map_or(0, |max| max + 1)
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn split_port(host_port: &str) -> (&str, Option<&str>) {
    // [::1]:8080
    if host_port.starts_with('[') {
        if let Some(close) = host_port.find(']') {
            let (host, rest) = host_port.split_at(close + 1);
            let port = rest.strip_prefix(':').filter(|p| is_port(p));
            return (host, port);
        }
        return (host_port, None);
    }

    match host_port.rsplit_once(':') {
        Some((host, port)) if is_port(port) => (host, Some(port)),
        Some((host, "")) => (host, None),
        _ => (host_port, None),
    }
}

fn is_port(candidate: &str) -> bool {
    !candidate.is_empty() && candidate.bytes().all(|b| b.is_ascii_digit())
}
