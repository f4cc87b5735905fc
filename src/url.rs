//! URL resolution for services exposed by the challenge environment.
//!
//! Behind the hosted reverse proxy every service port is published under
//! its own subdomain; locally it is plain `localhost`.

use serde_json::{Map, Value};

use crate::error::{Result, SdkError};

/// Ingress host of the reverse proxy.
pub const ENV_PROXY_INGRESS_HOST: &str = "AVATAO_PROXY_INGRESS_HOST";
/// JSON object mapping proxy id to `"{port}/{rest}"`.
pub const ENV_PROXY_SERVICES: &str = "AVATAO_PROXY_SERVICES";

/// Resolves reachable URLs for local service ports.
///
/// A pure function of the captured variables and the port.
///
/// # Example
///
/// ```
/// use tfw_sdk::UrlResolver;
///
/// let local = UrlResolver::new(None, None);
/// assert_eq!(local.url_for_port(8080).unwrap(), "http://localhost:8080/");
///
/// let proxied = UrlResolver::new(
///     Some("x.example.com".into()),
///     Some(r#"{"abc123": "8080/path"}"#.into()),
/// );
/// assert_eq!(proxied.url_for_port(8080).unwrap(), "https://abc123.x.example.com/");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlResolver {
    ingress_host: Option<String>,
    proxy_services: Option<String>,
}

impl UrlResolver {
    /// Create a resolver from explicit values.
    pub fn new(ingress_host: Option<String>, proxy_services: Option<String>) -> Self {
        Self {
            ingress_host,
            proxy_services,
        }
    }

    /// Capture the proxy variables from the process environment.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var(ENV_PROXY_INGRESS_HOST).ok(),
            std::env::var(ENV_PROXY_SERVICES).ok(),
        )
    }

    /// Resolve the URL for `port`.
    ///
    /// # Errors
    ///
    /// - `Config` if only one of the two variables is set, or the services
    ///   variable is not a JSON object of strings
    /// - `NoProxyForPort` if no service entry targets the port
    pub fn url_for_port(&self, port: u16) -> Result<String> {
        let (host, services) = match (&self.ingress_host, &self.proxy_services) {
            (None, None) => return Ok(format!("http://localhost:{}/", port)),
            (Some(host), Some(services)) => (host, services),
            (None, Some(_)) => return Err(missing(ENV_PROXY_INGRESS_HOST)),
            (Some(_), None) => return Err(missing(ENV_PROXY_SERVICES)),
        };

        // Document order matters: the last matching entry wins.
        let services: Map<String, Value> =
            serde_json::from_str(services).map_err(|e| not_strings(&e.to_string()))?;

        let wanted = port.to_string();
        let mut proxy_id = None;
        for (id, service) in &services {
            let service = service
                .as_str()
                .ok_or_else(|| not_strings(&format!("{} maps to {}", id, service)))?;
            if service.split('/').next() == Some(wanted.as_str()) {
                proxy_id = Some(id);
            }
        }

        let proxy_id = proxy_id.ok_or(SdkError::NoProxyForPort(port))?;
        Ok(format!("https://{}.{}/", proxy_id, host))
    }
}

fn not_strings(detail: &str) -> SdkError {
    SdkError::Config(format!("{} is not a JSON object of strings: {}", ENV_PROXY_SERVICES, detail))
}

fn missing(name: &str) -> SdkError {
    SdkError::Config(format!("{} is not set while the other proxy variable is", name))
}
