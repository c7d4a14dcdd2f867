//! Request composition.
//!
//! [`Request`] accumulates everything that goes into one exchange. Headers,
//! cookies and base options persist across executions; the body and the
//! pending query are consumed by the execution (or URL build) that uses
//! them.

use crate::error::{Error, Result};
use crate::headers::{content_type, names, HeaderMap};
use crate::proxy::Proxy;
use crate::url::{compose, Query};
use bytes::Bytes;
use http::Method;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// A request body.
#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    /// Bytes sent as-is.
    Raw(Bytes),
    /// Text sent as UTF-8.
    Text(String),
    /// A structured value, serialized to JSON on the wire.
    Json(Value),
    /// Form fields, sent `application/x-www-form-urlencoded`.
    Form(IndexMap<String, String>),
}

impl Body {
    /// Wire payload.
    pub fn to_bytes(&self) -> Bytes {
        match self {
            Body::Raw(bytes) => bytes.clone(),
            Body::Text(text) => Bytes::from(text.clone()),
            Body::Json(value) => Bytes::from(value.to_string()),
            Body::Form(fields) => Bytes::from(
                form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(fields)
                    .finish(),
            ),
        }
    }

    /// Check if there is nothing to send.
    pub fn is_empty(&self) -> bool {
        match self {
            Body::Raw(bytes) => bytes.is_empty(),
            Body::Text(text) => text.is_empty(),
            Body::Json(value) => value.is_null(),
            Body::Form(fields) => fields.is_empty(),
        }
    }

    /// Convert structured payloads into JSON text.
    fn into_json_text(self) -> Body {
        match self {
            Body::Json(value) => Body::Text(value.to_string()),
            Body::Form(fields) => {
                let object = fields
                    .into_iter()
                    .map(|(key, value)| (key, Value::String(value)))
                    .collect::<serde_json::Map<_, _>>();
                Body::Text(Value::Object(object).to_string())
            }
            other => other,
        }
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Raw(Bytes::from(bytes))
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Raw(bytes)
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::Json(value)
    }
}

impl From<IndexMap<String, String>> for Body {
    fn from(fields: IndexMap<String, String>) -> Self {
        Body::Form(fields)
    }
}

/// Persistent transport options.
#[derive(Clone, Debug)]
pub struct RequestOptions {
    /// Request method.
    pub method: Method,
    /// Target URL, already composed.
    pub url: String,
    /// Follow `Location` redirects.
    pub follow_redirects: bool,
    /// Maximum redirects when following.
    pub max_redirects: u32,
    /// Put the header block in front of the body in the transport output.
    pub include_headers: bool,
    /// Ask the transport to echo the outgoing header.
    pub capture_request_header: bool,
    /// Skip downloading the body.
    pub no_body: bool,
    /// Verify TLS peers.
    pub verify_peer: bool,
    /// Request timeout.
    pub timeout: Option<Duration>,
    /// Connect timeout.
    pub connect_timeout: Option<Duration>,
    /// Proxy server.
    pub proxy: Option<Proxy>,
    /// Transport-specific options this crate does not interpret.
    pub extra: IndexMap<String, String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            url: String::new(),
            follow_redirects: false,
            max_redirects: 20,
            include_headers: true,
            capture_request_header: true,
            no_body: false,
            verify_peer: true,
            timeout: None,
            connect_timeout: None,
            proxy: None,
            extra: IndexMap::new(),
        }
    }
}

/// The option set handed to the transport for one execution.
#[derive(Clone, Debug)]
pub struct TransportOptions {
    pub options: RequestOptions,
    /// Rendered `name: value` header lines.
    pub headers: Vec<String>,
    pub body: Option<Body>,
    /// `Cookie` header value, only when there are cookies.
    pub cookie: Option<String>,
}

impl TransportOptions {
    /// Shorthand for the target URL.
    pub fn url(&self) -> &str {
        &self.options.url
    }
}

/// A reusable request description.
#[derive(Clone, Debug, Default)]
pub struct Request {
    options: RequestOptions,
    headers: HeaderMap,
    cookies: IndexMap<String, String>,
    body: Option<Body>,
    query: Query,
}

impl Request {
    /// Create an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a request with base options.
    pub fn with_options(options: RequestOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Get the base options.
    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    /// Get the base options mutably.
    pub fn options_mut(&mut self) -> &mut RequestOptions {
        &mut self.options
    }

    /// Store a transport passthrough option.
    pub fn set_option(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.options.extra.insert(key.into(), value.into());
        self
    }

    /// Get a transport passthrough option.
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.extra.get(key).map(String::as_str)
    }

    /// Set the method.
    pub fn set_method(&mut self, method: Method) -> &mut Self {
        self.options.method = method;
        self
    }

    /// Set query parameters for the next URL build.
    pub fn set_query(&mut self, query: Query) -> &mut Self {
        self.query = query;
        self
    }

    /// Set the URL, merging and then clearing the pending query.
    pub fn set_url(&mut self, url: &str) -> &mut Self {
        let query = std::mem::take(&mut self.query);
        self.options.url = compose(url, &query);
        self
    }

    /// Get the composed URL.
    pub fn url(&self) -> &str {
        &self.options.url
    }

    /// Set a proxy.
    pub fn set_proxy(&mut self, proxy: Proxy) -> &mut Self {
        self.options.proxy = Some(proxy);
        self
    }

    /// Set a proxy from its URL.
    pub fn set_proxy_url(&mut self, url: &str) -> Result<&mut Self> {
        Ok(self.set_proxy(Proxy::from_url(url)?))
    }

    /// Set a header, replacing any earlier value.
    pub fn set_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    /// Set several headers.
    pub fn set_headers<I, K, V>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.headers.insert(name, value);
        }
        self
    }

    /// Set a header from a `Name: Value` line.
    pub fn set_header_line(&mut self, line: &str) -> Result<&mut Self> {
        let (name, value) = line
            .split_once(':')
            .filter(|(name, _)| !name.trim().is_empty())
            .ok_or_else(|| Error::invalid_header(line))?;
        Ok(self.set_header(name.trim(), value.trim()))
    }

    /// Get a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Get all headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Remove all headers.
    pub fn reset_headers(&mut self) -> &mut Self {
        self.headers.clear();
        self
    }

    /// Set a request cookie.
    pub fn set_cookie(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// Set several request cookies.
    pub fn set_cookies<I, K, V>(&mut self, cookies: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in cookies {
            self.set_cookie(name, value);
        }
        self
    }

    /// Get request cookies.
    pub fn cookies(&self) -> &IndexMap<String, String> {
        &self.cookies
    }

    /// Set the body for the next execution.
    ///
    /// With `as_json`, structured bodies are encoded to JSON text and the
    /// content type is forced to `application/json`.
    pub fn set_body(&mut self, body: impl Into<Body>, as_json: bool) -> &mut Self {
        let mut body = body.into();
        if as_json {
            self.set_header(names::CONTENT_TYPE, content_type::JSON);
            body = body.into_json_text();
        }
        self.body = Some(body);
        self
    }

    /// Serialize `data` as the JSON body.
    pub fn set_json<T: Serialize>(&mut self, data: &T) -> Result<&mut Self> {
        let value = serde_json::to_value(data).map_err(|e| Error::encode(e.to_string()))?;
        Ok(self.set_body(value, true))
    }

    /// Get the pending body.
    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Render header lines.
    pub fn build_headers(&self) -> Vec<String> {
        self.headers.to_lines()
    }

    /// Render the `Cookie` header value.
    pub fn build_cookies(&self) -> String {
        self.cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Produce the option set for one execution, consuming the body.
    pub fn build_options(&mut self) -> TransportOptions {
        let cookie = self.build_cookies();

        TransportOptions {
            options: self.options.clone(),
            headers: self.build_headers(),
            body: self.body.take().filter(|body| !body.is_empty()),
            cookie: Some(cookie).filter(|c| !c.is_empty()),
        }
    }
}
