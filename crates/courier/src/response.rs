//! HTTP response handling.
//!
//! [`Response::parse`] turns raw transport output into a [`Response`]. A
//! response is either a transport failure or a completed exchange, never
//! both: see [`Outcome`].

use crate::cookies::{Cookie, CookieMap};
use crate::headers::{content_type, names, HeaderMap};
use crate::request::TransportOptions;
use crate::status;
use crate::transport::{TransportFailure, TransportInfo};
use bytes::Bytes;
use encoding_rs::Encoding;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

/// An HTTP response.
#[derive(Clone, Debug)]
pub struct Response {
    /// When the response was built (Unix time, fractional seconds).
    pub request_time: f64,
    /// URL the request was sent to.
    pub url: String,
    /// Proxy address used, if any.
    pub proxy: Option<String>,
    /// Failure or completed exchange.
    pub outcome: Outcome,
}

/// The two terminal states of a response.
#[derive(Clone, Debug)]
pub enum Outcome {
    Failed(TransportFailure),
    Completed(Box<Exchange>),
}

/// Everything known about a completed exchange.
#[derive(Clone, Debug, Default)]
pub struct Exchange {
    /// Final status code.
    pub code: u16,
    /// Raw header block, when headers were captured.
    pub header: Option<String>,
    /// Raw body.
    pub body: Option<Bytes>,
    /// Announced content length.
    pub content_length: Option<u64>,
    /// Body bytes received.
    pub download_size: u64,
    /// MIME type without parameters. Empty when unknown.
    pub mime_type: String,
    /// Charset parameter of the content type. Empty when absent.
    pub charset: String,
    /// Parsed header block, status lines under `status`.
    pub headers: HeaderMap,
    /// Cookies set by the response, by name.
    pub cookies: CookieMap,
    /// Cookies the transport holds for the effective URL.
    pub cookie_list: Vec<String>,
    /// Outgoing header text, when captured.
    pub request_header: Option<String>,
    /// Outgoing body, when the request header was captured.
    pub request_body: Option<Bytes>,
    /// Redirects followed.
    pub redirect_count: u32,
    /// Final URL after redirects. Only set when following.
    pub effective_url: String,
    /// Redirect target not followed. Only set when not following.
    pub redirect_url: String,
    /// Decoded body for recognized MIME types.
    pub data: Option<Value>,
}

impl Response {
    /// Build a response from transport output.
    ///
    /// `options` are the options the request was actually sent with.
    pub fn parse(
        result: Result<Bytes, TransportFailure>,
        info: &TransportInfo,
        options: &TransportOptions,
    ) -> Self {
        let base = &options.options;
        let request_time = unix_time();
        let url = base.url.clone();
        let proxy = base.proxy.as_ref().map(|p| p.address());

        let raw = match result {
            Ok(raw) => raw,
            Err(failure) => {
                tracing::debug!(url = %url, code = failure.code, "request failed");
                return Self {
                    request_time,
                    url,
                    proxy,
                    outcome: Outcome::Failed(failure),
                };
            }
        };

        let mut exchange = Exchange {
            code: info.response_code,
            cookie_list: info.cookie_list.clone(),
            download_size: info.download_size,
            ..Exchange::default()
        };

        if base.capture_request_header {
            exchange.request_header = info.request_header.clone();
            exchange.request_body = options.body.as_ref().map(|body| body.to_bytes());
        }

        if base.follow_redirects {
            exchange.redirect_count = info.redirect_count;
            exchange.effective_url = info.effective_url.clone();
        } else {
            exchange.redirect_url = info.redirect_url.clone().unwrap_or_default();
        }

        if let Some(raw_type) = info.content_type.as_deref() {
            let parsed = ContentType::parse(raw_type);
            exchange.mime_type = parsed.mime_type;
            exchange.charset = parsed.charset.unwrap_or_default();
        }

        if base.include_headers {
            let split = info.header_size.min(raw.len());
            let header = String::from_utf8_lossy(&raw[..split]).into_owned();
            exchange.headers = parse_header_block(&header);
            exchange.header = Some(header);
            exchange.body = Some(raw.slice(split..));

            let set_cookies = exchange.headers.get_all(names::SET_COOKIE);
            if !set_cookies.is_empty() {
                for cookie in Cookie::parse_all(set_cookies, None) {
                    exchange.cookies.insert(cookie.name.clone(), cookie);
                }
            }
        } else {
            exchange.body = Some(raw);
        }

        if let Some(body) = exchange.body.as_ref().filter(|b| !b.is_empty()) {
            exchange.data = decode_body(&exchange.mime_type, body);
        }

        exchange.content_length = info.content_length;

        tracing::debug!(
            url = %url,
            code = exchange.code,
            mime_type = %exchange.mime_type,
            cookies = exchange.cookies.len(),
            "request completed"
        );

        Self {
            request_time,
            url,
            proxy,
            outcome: Outcome::Completed(Box::new(exchange)),
        }
    }

    /// Get the failure, if the transport could not complete the exchange.
    pub fn error(&self) -> Option<&TransportFailure> {
        match &self.outcome {
            Outcome::Failed(failure) => Some(failure),
            Outcome::Completed(_) => None,
        }
    }

    /// Get the completed exchange.
    pub fn exchange(&self) -> Option<&Exchange> {
        match &self.outcome {
            Outcome::Completed(exchange) => Some(exchange),
            Outcome::Failed(_) => None,
        }
    }

    /// Take the completed exchange, or the failure.
    pub fn into_result(self) -> Result<Exchange, TransportFailure> {
        match self.outcome {
            Outcome::Completed(exchange) => Ok(*exchange),
            Outcome::Failed(failure) => Err(failure),
        }
    }

    /// Check if the transport failed.
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_))
    }

    /// Get the status code of a completed exchange.
    pub fn code(&self) -> Option<u16> {
        self.exchange().map(|e| e.code)
    }
}

impl Exchange {
    /// Get the first value of a response header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Get a cookie set by this response.
    pub fn cookie(&self, name: &str) -> Option<&Cookie> {
        self.cookies.get(name)
    }

    /// Final status line.
    pub fn status_line(&self) -> Option<&str> {
        self.headers.last(names::STATUS)
    }

    /// Reason phrase from the final status line, or the registered one.
    pub fn reason(&self) -> Option<&str> {
        self.status_line()
            .and_then(|line| line.splitn(3, ' ').nth(2))
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .or_else(|| status::reason_phrase(self.code))
    }

    /// Check if the response was successful (2xx).
    pub fn is_success(&self) -> bool {
        status::class(self.code) == Some(2)
    }

    /// Check if the response was a redirect (3xx).
    pub fn is_redirect(&self) -> bool {
        status::class(self.code) == Some(3)
    }

    /// Check if the response was a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        status::class(self.code) == Some(4)
    }

    /// Check if the response was a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        status::class(self.code) == Some(5)
    }

    /// Get the body bytes, empty when there is no body.
    pub fn bytes(&self) -> &[u8] {
        self.body.as_deref().unwrap_or(&[])
    }

    /// Get the body as text.
    pub fn text(&self) -> String {
        let bytes = self.bytes();
        let (text, _, _) = self.detect_encoding(bytes).decode(bytes);
        text.into_owned()
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(self.bytes())
    }

    /// Detect character encoding.
    fn detect_encoding(&self, bytes: &[u8]) -> &'static Encoding {
        if let Some(encoding) = Encoding::for_label(self.charset.as_bytes()) {
            return encoding;
        }

        if let Some((encoding, _)) = Encoding::for_bom(bytes) {
            return encoding;
        }

        encoding_rs::UTF_8
    }
}

/// A parsed `Content-Type` value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContentType {
    pub mime_type: String,
    pub charset: Option<String>,
}

impl ContentType {
    /// Parse `type/subtype[; key=value]*`. Unknown parameters are ignored.
    ///
    /// Spaces around `=` are accepted and the case of the type and the
    /// charset is kept, neither of which `mime::Mime` allows.
    pub fn parse(value: &str) -> Self {
        let mut parts = value.split(';');
        let mime_type = parts.next().unwrap_or_default().trim().to_string();

        let mut charset = None;
        for part in parts {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .trim_matches('"');
            if key.is_empty() || key.contains(char::is_whitespace) || value.is_empty() {
                continue;
            }

            if key.eq_ignore_ascii_case("charset") {
                charset = Some(value.to_string());
            }
        }

        Self { mime_type, charset }
    }
}

/// Parse a raw header block.
///
/// Status lines are stored under `status`, one entry per line, so a
/// `100 Continue` ahead of the final status keeps both. Lines without a
/// colon are skipped.
pub fn parse_header_block(block: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();

    for line in block.split("\r\n") {
        if line.trim().is_empty() {
            continue;
        }

        if line.starts_with("HTTP/") {
            headers.append(names::STATUS, line.trim());
            continue;
        }

        match line.split_once(':') {
            Some((name, value)) if !name.trim().is_empty() => {
                headers.append(name.trim(), value.trim());
            }
            _ => tracing::trace!(line, "skipping malformed header line"),
        }
    }

    headers
}

/// Decode a body according to its MIME type.
///
/// Returns `None` for unrecognized types and for payloads that fail to
/// decode.
pub fn decode_body(mime_type: &str, body: &[u8]) -> Option<Value> {
    if !content_type::is_json(mime_type) {
        return None;
    }

    serde_json::from_slice(body)
        .map_err(|e| tracing::trace!(error = %e, "response body is not valid JSON"))
        .ok()
}

fn unix_time() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}
