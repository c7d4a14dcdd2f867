//! Proxy descriptors.

use crate::error::{Error, Result};
use url::Url;

/// Proxy protocol.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProxyKind {
    #[default]
    Http,
    Https,
    Socks4,
    Socks4a,
    Socks5,
    /// SOCKS5 with name resolution on the proxy side.
    Socks5Hostname,
}

impl ProxyKind {
    /// Map a URL scheme to a proxy kind. `socks5a` names hostname-resolving SOCKS5.
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme.to_lowercase().as_str() {
            "http" => Some(ProxyKind::Http),
            "https" => Some(ProxyKind::Https),
            "socks4" => Some(ProxyKind::Socks4),
            "socks4a" => Some(ProxyKind::Socks4a),
            "socks5" => Some(ProxyKind::Socks5),
            "socks5a" | "socks5h" => Some(ProxyKind::Socks5Hostname),
            _ => None,
        }
    }

    /// Scheme understood by the transport.
    pub fn scheme(&self) -> &'static str {
        match self {
            ProxyKind::Http => "http",
            ProxyKind::Https => "https",
            ProxyKind::Socks4 => "socks4",
            ProxyKind::Socks4a => "socks4a",
            ProxyKind::Socks5 => "socks5",
            ProxyKind::Socks5Hostname => "socks5h",
        }
    }
}

/// A proxy server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proxy {
    pub kind: ProxyKind,
    pub host: String,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub pass: Option<String>,
    /// Tunnel through the proxy with CONNECT.
    pub use_tunnel: bool,
}

impl Proxy {
    /// Create a proxy. The password is dropped when there is no user.
    pub fn new(
        host: impl Into<String>,
        port: Option<u16>,
        kind: ProxyKind,
        user: Option<String>,
        pass: Option<String>,
    ) -> Self {
        let pass = if user.is_some() { pass } else { None };
        Self {
            kind,
            host: host.into(),
            port,
            user,
            pass,
            use_tunnel: true,
        }
    }

    /// Parse `scheme://[user[:pass]@]host[:port]`.
    ///
    /// A missing scheme or an unknown one means an HTTP proxy.
    pub fn from_url(url: &str) -> Result<Self> {
        let with_scheme = if url.contains("://") {
            url.to_string()
        } else {
            format!("http://{}", url)
        };

        let parsed = Url::parse(&with_scheme).map_err(|e| Error::invalid_proxy(format!("{}: {}", url, e)))?;

        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::invalid_proxy(format!("{}: url must contain a host", url)))?;

        let kind = ProxyKind::from_scheme(parsed.scheme()).unwrap_or_default();
        let user = Some(parsed.username())
            .filter(|u| !u.is_empty())
            .map(str::to_string);
        let pass = parsed.password().map(str::to_string);

        Ok(Self::new(host, parsed.port(), kind, user, pass))
    }

    /// `host[:port]`.
    pub fn address(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{}", self.host, port),
            None => self.host.clone(),
        }
    }

    /// `user[:pass]`, if a user is set.
    pub fn credentials(&self) -> Option<String> {
        let user = self.user.as_ref()?;
        Some(match &self.pass {
            Some(pass) => format!("{}:{}", user, pass),
            None => user.clone(),
        })
    }

    /// Full proxy URL for the transport, credentials included.
    pub fn to_url(&self) -> String {
        match self.credentials() {
            Some(credentials) => format!("{}://{}@{}", self.kind.scheme(), credentials, self.address()),
            None => format!("{}://{}", self.kind.scheme(), self.address()),
        }
    }
}
