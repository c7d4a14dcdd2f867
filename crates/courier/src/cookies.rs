//! Cookie parsing and rendering.
//!
//! One `Set-Cookie` string may carry several `name=value` pairs followed
//! by attributes that apply to all of them:
//!
//! ```text
//! Set-Cookie: a=1; b=2; Domain=example.com; Secure
//! ```
//!
//! yields two cookies, both scoped to `example.com` and both secure.

use chrono::{DateTime, NaiveDateTime};
use indexmap::IndexMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Cookies keyed by name; a later cookie with the same name replaces an
/// earlier one.
pub type CookieMap = IndexMap<String, Cookie>;

/// A cookie.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Domain. Empty means host-only.
    pub domain: String,
    /// Path.
    pub path: String,
    /// Expiration time (Unix timestamp). `0` marks a session cookie.
    pub expires: i64,
    /// Secure flag.
    pub secure: bool,
    /// HttpOnly flag.
    pub http_only: bool,
    /// SameSite attribute, if the server sent one.
    pub same_site: Option<SameSite>,
}

/// SameSite attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SameSite {
    None,
    Lax,
    Strict,
}

impl SameSite {
    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "strict" => Some(SameSite::Strict),
            "lax" => Some(SameSite::Lax),
            "none" => Some(SameSite::None),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::None => "None",
            SameSite::Lax => "Lax",
            SameSite::Strict => "Strict",
        }
    }
}

impl Cookie {
    /// Create a new session cookie with path `/`.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: "/".to_string(),
            expires: 0,
            secure: false,
            http_only: false,
            same_site: None,
        }
    }

    /// Parse a single Set-Cookie string and return its first cookie.
    pub fn parse(header: &str) -> Option<Self> {
        Self::parse_all([header], None).into_iter().next()
    }

    /// Parse any number of Set-Cookie strings.
    ///
    /// Every string contributes its cookies in order; nothing is
    /// deduplicated across strings. `now` is the reference time for
    /// `Max-Age` and defaults to the wall clock.
    pub fn parse_all<I, S>(headers: I, now: Option<i64>) -> Vec<Cookie>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let now = now.unwrap_or_else(unix_now);
        let mut result = Vec::new();

        for header in headers {
            let header = strip_set_cookie_prefix(header.as_ref());

            let mut shared = SharedAttributes::default();
            let mut candidates: IndexMap<String, String> = IndexMap::new();

            for part in header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
                let (key, value) = match part.split_once('=') {
                    Some((key, value)) => (key.trim(), value.trim()),
                    None => (part, ""),
                };
                if key.is_empty() {
                    continue;
                }

                if !shared.apply(key, value) {
                    candidates.insert(key.to_string(), value.to_string());
                }
            }

            result.extend(
                candidates
                    .into_iter()
                    .map(|(name, value)| shared.finish(Cookie::new(name, value), now)),
            );
        }

        result
    }

    /// Render as a `Set-Cookie` response header line.
    pub fn to_set_cookie(&self) -> String {
        let mut result = format!("Set-Cookie: {}={}", self.name, self.value);

        if self.expires != 0 {
            if let Some(date) = format_cookie_date(self.expires) {
                result.push_str(&format!("; Expires={}", date));
            }
        }

        if !self.domain.is_empty() {
            result.push_str(&format!("; Domain={}", self.domain));
        }

        if !self.path.is_empty() {
            result.push_str(&format!("; Path={}", self.path));
        }

        if self.secure {
            result.push_str("; Secure");
        }

        if self.http_only {
            result.push_str("; HttpOnly");
        }

        if let Some(same_site) = self.same_site {
            result.push_str(&format!("; SameSite={}", same_site.as_str()));
        }

        result
    }

    /// Check if this is a session cookie.
    pub fn is_session(&self) -> bool {
        self.expires == 0
    }

    /// Check if the cookie has expired at `now` (Unix timestamp).
    pub fn is_expired(&self, now: i64) -> bool {
        !self.is_session() && self.expires <= now
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Attributes collected while scanning one Set-Cookie string.
#[derive(Debug, Default)]
struct SharedAttributes {
    domain: Option<String>,
    path: Option<String>,
    expires: Option<i64>,
    max_age: Option<i64>,
    secure: bool,
    http_only: bool,
    same_site: Option<SameSite>,
}

impl SharedAttributes {
    /// Record `key` if it is an attribute. Returns false for cookie pairs.
    fn apply(&mut self, key: &str, value: &str) -> bool {
        match key.to_lowercase().as_str() {
            "domain" => self.domain = Some(value.to_string()),
            "path" => self.path = Some(value.to_string()),
            "expires" => match parse_cookie_date(value) {
                Some(expires) => self.expires = Some(expires),
                None => tracing::trace!(value, "ignoring unparseable cookie expiry"),
            },
            "max-age" => match value.parse() {
                Ok(max_age) => self.max_age = Some(max_age),
                Err(_) => tracing::trace!(value, "ignoring unparseable cookie max-age"),
            },
            "secure" => self.secure = true,
            "httponly" => self.http_only = true,
            "samesite" => self.same_site = SameSite::parse(value),
            _ => return false,
        }
        true
    }

    /// Apply the collected attributes; unset ones keep the cookie defaults.
    fn finish(&self, mut cookie: Cookie, now: i64) -> Cookie {
        if let Some(domain) = self.domain.as_ref().filter(|d| !d.is_empty()) {
            cookie.domain = domain.clone();
        }
        if let Some(path) = self.path.as_ref().filter(|p| !p.is_empty()) {
            cookie.path = path.clone();
        }

        let expires = match self.max_age {
            Some(max_age) => Some(now.saturating_add(max_age)),
            None => self.expires,
        };
        if let Some(expires) = expires.filter(|e| *e != 0) {
            cookie.expires = expires;
        }

        cookie.secure = self.secure;
        cookie.http_only = self.http_only;
        cookie.same_site = self.same_site;
        cookie
    }
}

fn strip_set_cookie_prefix(header: &str) -> &str {
    const PREFIX: &str = "set-cookie:";

    match header.get(..PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(PREFIX) => &header[PREFIX.len()..],
        _ => header,
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// Parse a cookie date to a Unix timestamp.
///
/// Accepts RFC 1123 / RFC 2822 dates, the dashed Netscape form
/// (`Wed, 21-Oct-2015 07:28:00 GMT`), RFC 850 and asctime.
pub fn parse_cookie_date(value: &str) -> Option<i64> {
    // Two-digit years first: %Y would happily read "15" as year 15.
    const FORMATS: &[&str] = &[
        "%a, %d-%b-%y %H:%M:%S",
        "%A, %d-%b-%y %H:%M:%S",
        "%a, %d-%b-%Y %H:%M:%S",
        "%a, %d %b %Y %H:%M:%S",
        "%a %b %e %H:%M:%S %Y",
    ];

    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date.timestamp());
    }

    let bare = value
        .strip_suffix("GMT")
        .or_else(|| value.strip_suffix("UTC"))
        .unwrap_or(value)
        .trim_end();

    FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(bare, format)
            .ok()
            .map(|naive| naive.and_utc().timestamp())
    })
}

/// Format a Unix timestamp as an RFC 1123 GMT date.
pub fn format_cookie_date(timestamp: i64) -> Option<String> {
    DateTime::from_timestamp(timestamp, 0)
        .map(|date| date.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
}
