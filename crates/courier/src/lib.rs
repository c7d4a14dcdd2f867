//! HTTP client façade.
//!
//! This crate handles:
//! - URL and query composition
//! - Request headers, cookies and bodies
//! - Set-Cookie parsing and rendering
//! - Raw response parsing (status lines, headers, cookies, decoded body)
//! - A reqwest-backed transport with curl-style failure codes

pub mod client;
pub mod cookies;
pub mod error;
pub mod headers;
pub mod proxy;
pub mod request;
pub mod response;
pub mod status;
pub mod transport;
pub mod url;

pub use client::{Client, ClientBuilder, ClientConfig};
pub use cookies::{Cookie, CookieMap, SameSite};
pub use error::{Error, Result};
pub use headers::HeaderMap;
pub use proxy::{Proxy, ProxyKind};
pub use request::{Body, Request, RequestOptions, TransportOptions};
pub use response::{ContentType, Exchange, Outcome, Response};
pub use transport::{CookieShare, ReqwestTransport, Transport, TransportFailure, TransportInfo};
pub use url::{Query, QueryValue};
