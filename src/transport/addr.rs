//! Bus addresses and connection setup.
//!
//! - `tcp://host:port`
//! - `unix:///path/to/socket` or a bare path (Unix only)

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

use crate::error::{Result, SdkError};

/// Default bus address.
pub const DEFAULT_BUS_ADDR: &str = "tcp://127.0.0.1:7654";

/// Read half of a connected bus.
pub type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;

/// Write half of a connected bus.
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Where the message bus lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusAddr {
    /// `host:port`
    Tcp(String),
    /// Unix Domain Socket path.
    Unix(PathBuf),
}

impl FromStr for BusAddr {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(rest) = s.strip_prefix("tcp://") {
            if rest.rsplit_once(':').map_or(true, |(host, port)| {
                host.is_empty() || port.parse::<u16>().is_err()
            }) {
                return Err(SdkError::Config(format!("invalid tcp address: {}", s)));
            }
            return Ok(BusAddr::Tcp(rest.to_string()));
        }

        let path = s.strip_prefix("unix://").unwrap_or(s);
        if path.is_empty() || path.contains("://") {
            return Err(SdkError::Config(format!("invalid bus address: {}", s)));
        }
        Ok(BusAddr::Unix(PathBuf::from(path)))
    }
}

impl fmt::Display for BusAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusAddr::Tcp(addr) => write!(f, "tcp://{}", addr),
            BusAddr::Unix(path) => write!(f, "unix://{}", path.display()),
        }
    }
}

impl Default for BusAddr {
    fn default() -> Self {
        BusAddr::Tcp(DEFAULT_BUS_ADDR["tcp://".len()..].to_string())
    }
}

/// Connect to the bus and split the stream.
pub async fn connect(addr: &BusAddr) -> Result<(BoxedReader, BoxedWriter)> {
    match addr {
        BusAddr::Tcp(host) => {
            let stream = TcpStream::connect(host.as_str()).await?;
            stream.set_nodelay(true)?;
            let (r, w) = stream.into_split();
            Ok((Box::new(r), Box::new(w)))
        }

        #[cfg(unix)]
        BusAddr::Unix(path) => {
            let stream = tokio::net::UnixStream::connect(path).await?;
            let (r, w) = stream.into_split();
            Ok((Box::new(r), Box::new(w)))
        }

        #[cfg(not(unix))]
        BusAddr::Unix(path) => Err(SdkError::Config(format!(
            "unix sockets are not supported on this platform: {}",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tcp() {
        let addr: BusAddr = "tcp://127.0.0.1:5555".parse().unwrap();
        assert_eq!(addr, BusAddr::Tcp("127.0.0.1:5555".into()));
        assert_eq!(addr.to_string(), "tcp://127.0.0.1:5555");
    }

    #[test]
    fn test_parse_unix() {
        let addr: BusAddr = "unix:///run/tfw.sock".parse().unwrap();
        assert_eq!(addr, BusAddr::Unix("/run/tfw.sock".into()));

        let bare: BusAddr = "/run/tfw.sock".parse().unwrap();
        assert_eq!(bare, addr);
    }

    #[test]
    fn test_parse_invalid() {
        for bad in ["tcp://nohost", "tcp://:80", "tcp://host:notaport", "", "zmq://x"] {
            assert!(
                matches!(bad.parse::<BusAddr>(), Err(SdkError::Config(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_default() {
        assert_eq!(BusAddr::default().to_string(), DEFAULT_BUS_ADDR);
    }

    #[tokio::test]
    async fn test_connect_tcp() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let addr: BusAddr = format!("tcp://127.0.0.1:{}", port).parse().unwrap();

        let accept = tokio::spawn(async move { listener.accept().await.map(|_| ()) });
        assert!(connect(&addr).await.is_ok());
        assert!(accept.await.unwrap().is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_connect_unix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bus.sock");
        let listener = tokio::net::UnixListener::bind(&path).unwrap();

        let accept = tokio::spawn(async move { listener.accept().await.map(|_| ()) });
        assert!(connect(&BusAddr::Unix(path)).await.is_ok());
        assert!(accept.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let dir = tempfile::tempdir().unwrap();
        let addr = BusAddr::Unix(dir.path().join("missing.sock"));
        assert!(connect(&addr).await.is_err());
    }
}
