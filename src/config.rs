//! Startup configuration.
//!
//! Read from the environment by [`SdkConfig::from_env`]; every field can be
//! overridden with the fluent setters.
//!
//! | variable | meaning |
//! |---|---|
//! | `TFW_EVENT_HANDLERS` | handler source passed to the loader (required) |
//! | `TFW_BUS_ADDR` | bus address, default `tcp://127.0.0.1:7654` |
//! | `TFW_MAX_FRAME_SIZE` | largest accepted inbound message in bytes |

use std::path::{Path, PathBuf};

use crate::error::{Result, SdkError};
use crate::protocol::DEFAULT_MAX_FRAME_SIZE;
use crate::transport::BusAddr;
use crate::writer::DEFAULT_CHANNEL_CAPACITY;

/// Environment variable naming the handler source.
pub const ENV_EVENT_HANDLERS: &str = "TFW_EVENT_HANDLERS";
/// Environment variable holding the bus address.
pub const ENV_BUS_ADDR: &str = "TFW_BUS_ADDR";
/// Environment variable holding the message size limit.
pub const ENV_MAX_FRAME_SIZE: &str = "TFW_MAX_FRAME_SIZE";

/// SDK configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SdkConfig {
    /// Handler source handed to the loader.
    pub handlers_path: PathBuf,
    /// Message bus address.
    pub bus_addr: BusAddr,
    /// Outbound queue capacity.
    pub channel_capacity: usize,
    /// Largest accepted inbound message, all parts included.
    pub max_frame_size: u32,
}

impl SdkConfig {
    /// Create a configuration with defaults for everything but the handler source.
    pub fn new(handlers_path: impl Into<PathBuf>) -> Self {
        Self {
            handlers_path: handlers_path.into(),
            bus_addr: BusAddr::default(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Read the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// `MissingConfig` if `TFW_EVENT_HANDLERS` is unset or empty, `Config`
    /// if any other variable holds an invalid value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through a variable lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let handlers_path = lookup(ENV_EVENT_HANDLERS)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                SdkError::MissingConfig(format!(
                    "{} is not set; point it at the event handler source",
                    ENV_EVENT_HANDLERS
                ))
            })?;

        let mut config = Self::new(handlers_path);

        if let Some(addr) = lookup(ENV_BUS_ADDR) {
            config.bus_addr = addr.parse()?;
        }

        if let Some(size) = lookup(ENV_MAX_FRAME_SIZE) {
            config.max_frame_size = size.trim().parse().map_err(|_| {
                SdkError::Config(format!("{} must be a byte count, got {:?}", ENV_MAX_FRAME_SIZE, size))
            })?;
        }

        Ok(config)
    }

    /// Override the handler source.
    pub fn handlers_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.handlers_path = path.into();
        self
    }

    /// Override the bus address.
    pub fn bus_addr(mut self, addr: BusAddr) -> Self {
        self.bus_addr = addr;
        self
    }

    /// Override the outbound queue capacity.
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Override the message size limit.
    pub fn max_frame_size(mut self, size: u32) -> Self {
        self.max_frame_size = size;
        self
    }

    /// Check that the handler source exists.
    pub fn validate(&self) -> Result<()> {
        check_handlers_path(&self.handlers_path)
    }
}

fn check_handlers_path(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(SdkError::HandlerLoad(format!(
            "{} does not exist or is not a file",
            path.display()
        )))
    }
}
