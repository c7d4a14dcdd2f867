//! Transport seam.
//!
//! A [`Transport`] performs the network exchange and hands back the raw
//! response (header block followed by body when
//! [`RequestOptions::include_headers`] is set) plus a [`TransportInfo`]
//! snapshot. [`ReqwestTransport`] is the default implementation.

use crate::error::{Error, Result};
use crate::headers::{content_type, names};
use crate::proxy::Proxy;
use crate::request::{Body, RequestOptions, TransportOptions};
use bytes::{Bytes, BytesMut};
use indexmap::IndexMap;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::redirect::Policy;
use std::fmt::Write as _;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Runtime;
use url::Url;

/// Performs one HTTP exchange at a time.
pub trait Transport {
    /// Execute the request described by `options`.
    fn execute(&mut self, options: &TransportOptions) -> std::result::Result<Bytes, TransportFailure>;

    /// Metadata of the most recent execution.
    fn info(&self) -> &TransportInfo;
}

/// Metadata reported alongside the raw response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransportInfo {
    /// Final status code.
    pub response_code: u16,
    /// Length of the header block at the front of the output.
    pub header_size: usize,
    /// Body bytes received.
    pub download_size: u64,
    /// `Content-Length` announced by the server.
    pub content_length: Option<u64>,
    /// Raw `Content-Type` of the final response.
    pub content_type: Option<String>,
    /// Redirects followed.
    pub redirect_count: u32,
    /// Last URL used.
    pub effective_url: String,
    /// Redirect target that was not followed.
    pub redirect_url: Option<String>,
    /// Outgoing request header text.
    pub request_header: Option<String>,
    /// Cookies the transport holds for the effective URL.
    pub cookie_list: Vec<String>,
}

/// Curl-compatible failure codes.
pub mod codes {
    pub const FAILED_INIT: i32 = 2;
    pub const URL_MALFORMAT: i32 = 3;
    pub const COULDNT_RESOLVE_HOST: i32 = 6;
    pub const COULDNT_CONNECT: i32 = 7;
    pub const OPERATION_TIMEDOUT: i32 = 28;
    pub const TOO_MANY_REDIRECTS: i32 = 47;
    pub const RECV_ERROR: i32 = 56;
}

/// The exchange could not be completed.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("{text} ({code}): {description}")]
pub struct TransportFailure {
    pub code: i32,
    pub text: String,
    pub description: String,
}

impl TransportFailure {
    /// Create a failure; `text` is derived from `code`.
    pub fn new(code: i32, description: impl Into<String>) -> Self {
        Self {
            code,
            text: error_text(code).to_string(),
            description: description.into(),
        }
    }

    /// Check if the failure was a timeout.
    pub fn is_timeout(&self) -> bool {
        self.code == codes::OPERATION_TIMEDOUT
    }
}

/// Short text for a failure code.
pub fn error_text(code: i32) -> &'static str {
    match code {
        0 => "No error",
        codes::FAILED_INIT => "Failed initialization",
        codes::URL_MALFORMAT => "URL using bad/illegal format or missing URL",
        codes::COULDNT_RESOLVE_HOST => "Couldn't resolve host name",
        codes::COULDNT_CONNECT => "Couldn't connect to server",
        codes::OPERATION_TIMEDOUT => "Timeout was reached",
        codes::TOO_MANY_REDIRECTS => "Number of redirects hit maximum amount",
        codes::RECV_ERROR => "Failure when receiving data from the peer",
        _ => "Unknown error",
    }
}

/// A cookie store shared by several transports.
///
/// Clones point at the same store. The store synchronizes itself.
#[derive(Clone, Debug, Default)]
pub struct CookieShare {
    jar: Arc<Jar>,
}

impl CookieShare {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a `Set-Cookie` value as if received from `url`.
    pub fn add_cookie_str(&self, cookie: &str, url: &Url) {
        self.jar.add_cookie_str(cookie, url);
    }

    /// `name=value` pairs the store would send to `url`.
    pub fn cookies_for(&self, url: &Url) -> Vec<String> {
        self.jar
            .cookies(url)
            .and_then(|value| value.to_str().map(str::to_string).ok())
            .map(|value| value.split("; ").map(str::to_string).collect())
            .unwrap_or_default()
    }
}

/// Settings that require building a new client when they change.
#[derive(Clone, Debug, PartialEq)]
struct ClientKey {
    proxy: Option<Proxy>,
    follow_redirects: bool,
    max_redirects: u32,
    verify_peer: bool,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    extra: IndexMap<String, String>,
}

impl From<&RequestOptions> for ClientKey {
    fn from(options: &RequestOptions) -> Self {
        Self {
            proxy: options.proxy.clone(),
            follow_redirects: options.follow_redirects,
            max_redirects: options.max_redirects,
            verify_peer: options.verify_peer,
            timeout: options.timeout,
            connect_timeout: options.connect_timeout,
            extra: options.extra.clone(),
        }
    }
}

/// Blocking transport on top of reqwest.
///
/// Owns a single-threaded tokio runtime, so it must not be used from
/// inside another runtime.
pub struct ReqwestTransport {
    runtime: Runtime,
    client: Option<(ClientKey, reqwest::Client)>,
    share: Option<CookieShare>,
    redirects: Arc<AtomicU32>,
    info: TransportInfo,
}

impl ReqwestTransport {
    /// Create a transport.
    pub fn new() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::runtime(e.to_string()))?;

        Ok(Self {
            runtime,
            client: None,
            share: None,
            redirects: Arc::new(AtomicU32::new(0)),
            info: TransportInfo::default(),
        })
    }

    /// Create a transport that keeps cookies in a shared store.
    pub fn with_share(share: CookieShare) -> Result<Self> {
        let mut transport = Self::new()?;
        transport.share = Some(share);
        Ok(transport)
    }

    fn client_for(&mut self, options: &RequestOptions) -> std::result::Result<reqwest::Client, TransportFailure> {
        let key = ClientKey::from(options);
        if let Some((cached, client)) = &self.client {
            if *cached == key {
                return Ok(client.clone());
            }
        }

        let client = self.build_client(&key)?;
        self.client = Some((key, client.clone()));
        Ok(client)
    }

    fn build_client(&self, key: &ClientKey) -> std::result::Result<reqwest::Client, TransportFailure> {
        let policy = if key.follow_redirects {
            let redirects = self.redirects.clone();
            let max = key.max_redirects as usize;
            Policy::custom(move |attempt| {
                let hops = attempt.previous().len();
                redirects.store(hops as u32, Ordering::Relaxed);
                if hops > max {
                    attempt.error("too many redirects")
                } else {
                    attempt.follow()
                }
            })
        } else {
            Policy::none()
        };

        let mut builder = reqwest::Client::builder()
            .redirect(policy)
            .danger_accept_invalid_certs(!key.verify_peer);

        if let Some(timeout) = key.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = key.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(proxy) = &key.proxy {
            let proxy = reqwest::Proxy::all(proxy.to_url())
                .map_err(|e| TransportFailure::new(codes::FAILED_INIT, e.to_string()))?;
            builder = builder.proxy(proxy);
        }
        if let Some(share) = &self.share {
            builder = builder.cookie_provider(share.jar.clone());
        }

        let (builder, ignored) = apply_extra(builder, &key.extra);
        for option in ignored {
            tracing::debug!(option, "transport option not supported, ignoring");
        }

        builder
            .build()
            .map_err(|e| TransportFailure::new(codes::FAILED_INIT, e.to_string()))
    }
}

impl Transport for ReqwestTransport {
    fn execute(&mut self, options: &TransportOptions) -> std::result::Result<Bytes, TransportFailure> {
        self.info = TransportInfo::default();
        self.redirects.store(0, Ordering::Relaxed);

        let base = &options.options;
        let client = self.client_for(base)?;
        let request = build_request(&client, options)?;

        if base.capture_request_header {
            self.info.request_header = Some(render_request_header(&request));
        }

        tracing::debug!(method = %base.method, url = %base.url, "sending request");

        let no_body = base.no_body;
        let result = self.runtime.block_on(async move {
            let response = client.execute(request).await?;
            let status = response.status();
            let version = response.version();
            let headers = response.headers().clone();
            let url = response.url().clone();
            let body = if no_body {
                Bytes::new()
            } else {
                response.bytes().await?
            };
            Ok::<_, reqwest::Error>((status, version, headers, url, body))
        });
        let (status, version, headers, url, body) = result.map_err(failure_from)?;

        let header_block = render_header_block(status, version, &headers);

        let header_str = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        self.info.response_code = status.as_u16();
        self.info.header_size = if base.include_headers { header_block.len() } else { 0 };
        self.info.download_size = body.len() as u64;
        self.info.content_length = header_str(names::CONTENT_LENGTH).and_then(|v| v.trim().parse().ok());
        self.info.content_type = header_str(names::CONTENT_TYPE);
        self.info.redirect_count = self.redirects.load(Ordering::Relaxed);
        self.info.effective_url = url.to_string();
        if !base.follow_redirects && status.is_redirection() {
            self.info.redirect_url = header_str(names::LOCATION)
                .and_then(|location| url.join(&location).ok())
                .map(|target| target.to_string());
        }
        if let Some(share) = &self.share {
            self.info.cookie_list = share.cookies_for(&url);
        }

        if !base.include_headers {
            return Ok(body);
        }

        let mut output = BytesMut::with_capacity(header_block.len() + body.len());
        output.extend_from_slice(header_block.as_bytes());
        output.extend_from_slice(&body);
        Ok(output.freeze())
    }

    fn info(&self) -> &TransportInfo {
        &self.info
    }
}

fn build_request(
    client: &reqwest::Client,
    options: &TransportOptions,
) -> std::result::Result<reqwest::Request, TransportFailure> {
    let base = &options.options;
    let mut builder = client.request(base.method.clone(), base.url.as_str());
    let mut has_content_type = false;

    for line in &options.headers {
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            has_content_type |= name.eq_ignore_ascii_case(names::CONTENT_TYPE);
            builder = builder.header(name, value.trim());
        }
    }

    if let Some(cookie) = &options.cookie {
        builder = builder.header(names::COOKIE, cookie.as_str());
    }

    if let Some(body) = &options.body {
        if matches!(body, Body::Form(_)) && !has_content_type {
            builder = builder.header(names::CONTENT_TYPE, content_type::FORM);
        }
        builder = builder.body(body.to_bytes());
    }

    builder.build().map_err(failure_from)
}

/// Apply the passthrough options reqwest has a setting for.
///
/// Returns the keys that were not applied: unknown keys and values that do
/// not parse. Durations are in seconds.
fn apply_extra<'a>(
    mut builder: reqwest::ClientBuilder,
    extra: &'a IndexMap<String, String>,
) -> (reqwest::ClientBuilder, Vec<&'a str>) {
    let mut ignored = Vec::new();

    for (key, value) in extra {
        builder = match apply_option(builder, key, value.trim()) {
            Ok(builder) => builder,
            Err(builder) => {
                ignored.push(key.as_str());
                builder
            }
        };
    }

    (builder, ignored)
}

fn apply_option(
    builder: reqwest::ClientBuilder,
    key: &str,
    value: &str,
) -> std::result::Result<reqwest::ClientBuilder, reqwest::ClientBuilder> {
    match key {
        "local_address" => match value.parse::<IpAddr>() {
            Ok(addr) => Ok(builder.local_address(addr)),
            Err(_) => Err(builder),
        },
        "tcp_nodelay" => match parse_flag(value) {
            Some(enabled) => Ok(builder.tcp_nodelay(enabled)),
            None => Err(builder),
        },
        "tcp_keepalive" => match value.parse::<u64>() {
            Ok(secs) => Ok(builder.tcp_keepalive(Duration::from_secs(secs))),
            Err(_) => Err(builder),
        },
        "pool_idle_timeout" => match value.parse::<u64>() {
            Ok(secs) => Ok(builder.pool_idle_timeout(Duration::from_secs(secs))),
            Err(_) => Err(builder),
        },
        "pool_max_idle_per_host" => match value.parse::<usize>() {
            Ok(max) => Ok(builder.pool_max_idle_per_host(max)),
            Err(_) => Err(builder),
        },
        _ => Err(builder),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Headers the client adds while sending when the request has none.
const SEND_DEFAULTS: &[(&str, &str)] = &[
    ("accept", "*/*"),
    ("accept-encoding", "gzip,deflate,br"),
];

/// Render the outgoing header as sent.
///
/// Cookies contributed by a shared cookie store are added on the wire and
/// do not appear here.
fn render_request_header(request: &reqwest::Request) -> String {
    let url = request.url();
    let mut target = url.path().to_string();
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }

    let mut text = format!("{} {} HTTP/1.1\r\n", request.method(), target);
    if let Some(host) = url.host_str() {
        match url.port() {
            Some(port) => {
                let _ = write!(text, "Host: {}:{}\r\n", host, port);
            }
            None => {
                let _ = write!(text, "Host: {}\r\n", host);
            }
        }
    }
    for (name, value) in request.headers() {
        let _ = write!(text, "{}: {}\r\n", name, String::from_utf8_lossy(value.as_bytes()));
    }
    for (name, value) in SEND_DEFAULTS {
        if !request.headers().contains_key(*name) {
            let _ = write!(text, "{}: {}\r\n", name, value);
        }
    }
    text.push_str("\r\n");
    text
}

fn render_header_block(
    status: http::StatusCode,
    version: http::Version,
    headers: &http::HeaderMap,
) -> String {
    let version = match version {
        http::Version::HTTP_09 => "HTTP/0.9",
        http::Version::HTTP_10 => "HTTP/1.0",
        http::Version::HTTP_2 => "HTTP/2",
        http::Version::HTTP_3 => "HTTP/3",
        _ => "HTTP/1.1",
    };

    let mut block = format!(
        "{} {} {}\r\n",
        version,
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    );
    for (name, value) in headers {
        let _ = write!(block, "{}: {}\r\n", name, String::from_utf8_lossy(value.as_bytes()));
    }
    block.push_str("\r\n");
    block
}

fn failure_from(err: reqwest::Error) -> TransportFailure {
    let description = error_chain(&err);

    let code = if err.is_timeout() {
        codes::OPERATION_TIMEDOUT
    } else if err.is_redirect() {
        codes::TOO_MANY_REDIRECTS
    } else if err.is_builder() {
        codes::URL_MALFORMAT
    } else if err.is_connect() && description.contains("dns error") {
        codes::COULDNT_RESOLVE_HOST
    } else if err.is_connect() {
        codes::COULDNT_CONNECT
    } else {
        codes::RECV_ERROR
    };

    TransportFailure::new(code, description)
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut description = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        description.push_str(": ");
        description.push_str(&cause.to_string());
        source = cause.source();
    }
    description
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;
    use http::{HeaderValue, Method, StatusCode, Version};
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    #[test]
    fn test_failure_text() {
        let failure = TransportFailure::new(28, "Operation timed out after 5000 milliseconds");
        assert_eq!(failure.text, "Timeout was reached");
        assert!(failure.is_timeout());
        assert_eq!(
            failure.to_string(),
            "Timeout was reached (28): Operation timed out after 5000 milliseconds"
        );
        assert_eq!(error_text(9999), "Unknown error");
    }

    #[test]
    fn test_render_header_block() {
        let mut headers = http::HeaderMap::new();
        headers.append("content-type", HeaderValue::from_static("text/plain"));
        headers.append("set-cookie", HeaderValue::from_static("a=1"));
        headers.append("set-cookie", HeaderValue::from_static("b=2"));

        let block = render_header_block(StatusCode::OK, Version::HTTP_11, &headers);
        assert_eq!(
            block,
            "HTTP/1.1 200 OK\r\ncontent-type: text/plain\r\nset-cookie: a=1\r\nset-cookie: b=2\r\n\r\n"
        );
    }

    #[test]
    fn test_build_request() {
        let client = reqwest::Client::new();
        let mut request = Request::new();
        request
            .set_method(Method::POST)
            .set_url("http://example.com:8080/form?x=1")
            .set_header("X-Id", "7")
            .set_cookie("sid", "abc");

        let mut fields = indexmap::IndexMap::new();
        fields.insert("a".to_string(), "b c".to_string());
        request.set_body(fields, false);

        let built = build_request(&client, &request.build_options()).unwrap();
        assert_eq!(built.method(), Method::POST);
        assert_eq!(built.headers()["x-id"], "7");
        assert_eq!(built.headers()["cookie"], "sid=abc");
        assert_eq!(built.headers()["content-type"], content_type::FORM);

        let text = render_request_header(&built);
        assert!(text.starts_with("POST /form?x=1 HTTP/1.1\r\nHost: example.com:8080\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_request_header_lists_send_defaults() {
        let client = reqwest::Client::new();
        let mut request = Request::new();
        request.set_url("http://example.com/");

        let text = render_request_header(&build_request(&client, &request.build_options()).unwrap());
        assert!(text.contains("accept: */*\r\n"));
        assert!(text.contains("accept-encoding: gzip,deflate,br\r\n"));

        request.set_header("Accept", "application/json");
        let text = render_request_header(&build_request(&client, &request.build_options()).unwrap());
        assert!(text.contains("accept: application/json\r\n"));
        assert!(!text.contains("accept: */*"));
    }

    #[test]
    fn test_apply_extra_reports_ignored_options() {
        let mut extra = IndexMap::new();
        extra.insert("tcp_nodelay".to_string(), "true".to_string());
        extra.insert("local_address".to_string(), "127.0.0.1".to_string());
        extra.insert("pool_max_idle_per_host".to_string(), "many".to_string());
        extra.insert("interface".to_string(), "eth0".to_string());
        extra.insert("tcp_keepalive".to_string(), " 30 ".to_string());

        let (builder, ignored) = apply_extra(reqwest::Client::builder(), &extra);
        assert_eq!(ignored, vec!["pool_max_idle_per_host", "interface"]);
        assert!(builder.build().is_ok());
    }

    #[test]
    fn test_build_request_rejects_bad_url() {
        let client = reqwest::Client::new();
        let mut request = Request::new();
        request.set_url("not a url");

        let failure = build_request(&client, &request.build_options()).unwrap_err();
        assert_eq!(failure.code, codes::URL_MALFORMAT);
    }

    /// Serve one canned reply per connection, in order.
    fn serve(replies: Vec<&'static str>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            for reply in replies {
                let Ok((mut stream, _)) = listener.accept() else {
                    return;
                };
                read_head(&mut stream);
                let _ = stream.write_all(reply.as_bytes());
            }
        });

        format!("http://{}", addr)
    }

    fn read_head(stream: &mut TcpStream) {
        let mut head = Vec::new();
        let mut byte = [0u8; 1];
        while !head.ends_with(b"\r\n\r\n") {
            match stream.read(&mut byte) {
                Ok(1) => head.push(byte[0]),
                _ => break,
            }
        }
    }

    fn options_for(url: &str, follow_redirects: bool) -> TransportOptions {
        let mut request = Request::new();
        request.set_url(url);
        request.options_mut().follow_redirects = follow_redirects;
        request.options_mut().timeout = Some(Duration::from_secs(5));
        request.build_options()
    }

    const REDIRECT: &str = "HTTP/1.1 302 Found\r\nLocation: /final\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
    const HELLO: &str = "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello";

    #[test]
    fn test_follows_redirect_and_counts_hops() {
        let base = serve(vec![REDIRECT, HELLO, HELLO]);
        let mut transport = ReqwestTransport::new().unwrap();

        let output = transport.execute(&options_for(&format!("{}/start", base), true)).unwrap();
        let info = transport.info().clone();

        assert_eq!(info.response_code, 200);
        assert_eq!(info.redirect_count, 1);
        assert_eq!(info.effective_url, format!("{}/final", base));
        assert_eq!(info.redirect_url, None);
        assert_eq!(info.content_length, Some(5));
        assert_eq!(info.download_size, 5);

        let (header, body) = output.split_at(info.header_size);
        let header = String::from_utf8_lossy(header);
        assert!(header.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(header.ends_with("\r\n\r\n"));
        assert!(header.contains("content-type: text/plain\r\n"));
        assert_eq!(body, b"hello");
        assert!(info.request_header.unwrap().starts_with("GET /start HTTP/1.1\r\n"));

        // Same cached client, no redirect this time.
        transport.execute(&options_for(&format!("{}/again", base), true)).unwrap();
        assert_eq!(transport.info().redirect_count, 0);
        assert_eq!(transport.info().effective_url, format!("{}/again", base));
    }

    #[test]
    fn test_redirect_not_followed() {
        let base = serve(vec![REDIRECT]);
        let mut transport = ReqwestTransport::new().unwrap();

        let output = transport.execute(&options_for(&format!("{}/start?x=1", base), false)).unwrap();
        let info = transport.info();

        assert_eq!(info.response_code, 302);
        assert_eq!(info.redirect_count, 0);
        assert_eq!(info.redirect_url, Some(format!("{}/final", base)));
        assert_eq!(info.header_size, output.len());
    }

    #[test]
    fn test_body_only_output() {
        let base = serve(vec![HELLO]);
        let mut transport = ReqwestTransport::new().unwrap();

        let mut options = options_for(&base, false);
        options.options.include_headers = false;

        let output = transport.execute(&options).unwrap();
        assert_eq!(transport.info().header_size, 0);
        assert_eq!(output, Bytes::from_static(b"hello"));
    }

    #[test]
    fn test_too_many_redirects() {
        let base = serve(vec![REDIRECT]);
        let mut transport = ReqwestTransport::new().unwrap();

        let mut options = options_for(&base, true);
        options.options.max_redirects = 0;

        let failure = transport.execute(&options).unwrap_err();
        assert_eq!(failure.code, codes::TOO_MANY_REDIRECTS);
        assert_eq!(failure.text, "Number of redirects hit maximum amount");
    }

    #[test]
    fn test_connection_refused() {
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let mut transport = ReqwestTransport::new().unwrap();

        let failure = transport
            .execute(&options_for(&format!("http://127.0.0.1:{}/", port), false))
            .unwrap_err();
        assert_eq!(failure.code, codes::COULDNT_CONNECT);
    }

    #[test]
    fn test_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        let mut transport = ReqwestTransport::new().unwrap();

        let mut options = options_for(&url, false);
        options.options.timeout = Some(Duration::from_millis(200));

        let failure = transport.execute(&options).unwrap_err();
        assert_eq!(failure.code, codes::OPERATION_TIMEDOUT);
        assert!(failure.is_timeout());
        drop(listener);
    }

    #[test]
    fn test_dropped_connection_is_receive_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());

        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                read_head(&mut stream);
            }
        });

        let mut transport = ReqwestTransport::new().unwrap();
        let failure = transport.execute(&options_for(&url, false)).unwrap_err();
        assert_eq!(failure.code, codes::RECV_ERROR);
    }

    #[test]
    fn test_cookie_share() {
        let share = CookieShare::new();
        let url = Url::parse("https://example.com/").unwrap();
        share.add_cookie_str("sid=abc; Path=/", &url);

        let other = share.clone();
        assert_eq!(other.cookies_for(&url), vec!["sid=abc".to_string()]);
    }
}
