use std::fmt;
use std::net::Ipv6Addr;

pub const PROXY_ENABLED_ENV: &str = "BOUNDREQ_PROXY_ENABLED";
pub const HTTP_PROXY_HOST_ENV: &str = "BOUNDREQ_HTTP_PROXY_HOST";
pub const HTTP_PROXY_PORT_ENV: &str = "BOUNDREQ_HTTP_PROXY_PORT";
pub const HTTPS_PROXY_HOST_ENV: &str = "BOUNDREQ_HTTPS_PROXY_HOST";
pub const HTTPS_PROXY_PORT_ENV: &str = "BOUNDREQ_HTTPS_PROXY_PORT";

/// Proxy configuration handed to an [`HttpClient`](crate::HttpClient).
///
/// Hosts and ports are kept as raw text: a malformed entry silently disables
/// proxying for its scheme at resolution time instead of failing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProxySettings {
    enabled: bool,
    http_host: Option<String>,
    http_port: Option<String>,
    https_host: Option<String>,
    https_port: Option<String>,
}

impl ProxySettings {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let enabled = lookup(PROXY_ENABLED_ENV)
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"));
        Self {
            enabled,
            http_host: lookup(HTTP_PROXY_HOST_ENV),
            http_port: lookup(HTTP_PROXY_PORT_ENV),
            https_host: lookup(HTTPS_PROXY_HOST_ENV),
            https_port: lookup(HTTPS_PROXY_PORT_ENV),
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn http_proxy(mut self, host: impl Into<String>, port: impl ToString) -> Self {
        self.http_host = Some(host.into());
        self.http_port = Some(port.to_string());
        self
    }

    pub fn https_proxy(mut self, host: impl Into<String>, port: impl ToString) -> Self {
        self.https_host = Some(host.into());
        self.https_port = Some(port.to_string());
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Proxy to use for a target URL scheme, if any.
    pub fn resolve(&self, scheme: &str) -> Option<ProxyAddress> {
        let (host, port) = if scheme.eq_ignore_ascii_case("http") {
            (&self.http_host, &self.http_port)
        } else if scheme.eq_ignore_ascii_case("https") {
            (&self.https_host, &self.https_port)
        } else {
            return None;
        };
        resolve_proxy(scheme, self.enabled, host.as_deref(), port.as_deref())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyAddress {
    host: String,
    port: u16,
}

impl ProxyAddress {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `http://host:port`, with IPv6 literals bracketed.
    pub(crate) fn to_uri(&self) -> String {
        format!("http://{self}")
    }
}

impl fmt::Display for ProxyAddress {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.parse::<Ipv6Addr>().is_ok() {
            write!(formatter, "[{}]:{}", self.host, self.port)
        } else {
            write!(formatter, "{}:{}", self.host, self.port)
        }
    }
}

/// Never fails: anything but an enabled flag, an http(s) scheme, a non-blank
/// host and a port in `1..=65535` yields no proxy.
pub fn resolve_proxy(
    scheme: &str,
    enabled: bool,
    host: Option<&str>,
    port: Option<&str>,
) -> Option<ProxyAddress> {
    if !enabled {
        return None;
    }
    if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
        return None;
    }
    let host = host.map(str::trim).filter(|host| !host.is_empty())?;
    let port = port?.trim().parse::<u16>().ok().filter(|port| *port != 0)?;
    let host = host
        .strip_prefix('[')
        .and_then(|inner| inner.strip_suffix(']'))
        .unwrap_or(host);
    Some(ProxyAddress {
        host: host.to_owned(),
        port,
    })
}
