//! SDK builder and runtime lifecycle.
//!
//! The [`SdkBuilder`] wires configuration and the handler loader together;
//! the [`Sdk`] owns the connection and the dispatch loop:
//! 1. Read configuration (or take it from the builder)
//! 2. Load the handler set, handing it a [`Commander`]
//! 3. Connect to the message bus
//! 4. Read messages and dispatch them until shutdown
//!
//! Handlers are loaded before connecting, so a bad handler source never
//! opens a connection.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use tfw_sdk::{Commander, EventHandlers, HandlerResult, Result, Sdk};
//!
//! struct App;
//!
//! impl EventHandlers for App {
//!     fn on_deploy(&mut self, _current_state: i64) -> HandlerResult<bool> {
//!         Ok(true)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let sdk = Sdk::builder()
//!         .loader(|_path: &Path, _commander: Commander| -> Result<Box<dyn EventHandlers>> {
//!             Ok(Box::new(App))
//!         })
//!         .start()
//!         .await?;
//!
//!     sdk.run_until_interrupted().await
//! }
//! ```

use std::future::Future;
use std::process::ExitCode;
use std::sync::Arc;

use tokio::sync::{oneshot, Notify};
use tokio::task::JoinHandle;

use crate::commands::Commander;
use crate::config::SdkConfig;
use crate::dispatcher::Dispatcher;
use crate::error::{Result, SdkError};
use crate::handler::HandlerLoader;
use crate::transport::{connect, BoxedReader, FrameReader};
use crate::writer::{spawn_writer_task, WriterHandle};

/// Builder for configuring and starting the SDK.
#[derive(Default)]
pub struct SdkBuilder {
    config: Option<SdkConfig>,
    loader: Option<Box<dyn HandlerLoader>>,
}

impl SdkBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this configuration instead of reading the environment.
    pub fn config(mut self, config: SdkConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the loader that produces the handler set.
    pub fn loader<L>(mut self, loader: L) -> Self
    where
        L: HandlerLoader + 'static,
    {
        self.loader = Some(Box::new(loader));
        self
    }

    /// Load handlers and connect.
    ///
    /// # Errors
    ///
    /// - `MissingConfig` if no configuration was given and
    ///   `TFW_EVENT_HANDLERS` is unset
    /// - `HandlerLoad` if no loader was set, the handler source is missing,
    ///   or the loader fails
    /// - `Io` if the bus cannot be reached
    pub async fn start(self) -> Result<Sdk> {
        let config = match self.config {
            Some(c) => c,
            None => SdkConfig::from_env()?,
        };

        let loader = self
            .loader
            .ok_or_else(|| SdkError::HandlerLoad("no handler loader configured".into()))?;

        config.validate()?;
        tracing::info!(path = %config.handlers_path.display(), "Loading event handlers");

        let (writer, outbound_rx) = WriterHandle::channel(config.channel_capacity);
        let commander = Commander::new(writer.clone());

        // The loader is not `Send`; it must be gone before the first await.
        let handlers = { loader }
            .load(&config.handlers_path, commander.clone())
            .map_err(|e| match e {
                SdkError::HandlerLoad(_) => e,
                other => SdkError::HandlerLoad(other.to_string()),
            })?;

        let (read_half, write_half) = connect(&config.bus_addr).await?;
        tracing::info!(addr = %config.bus_addr, "Connected to message bus");

        let (close_tx, close_rx) = oneshot::channel();
        let writer_task = spawn_writer_task(write_half, outbound_rx, close_rx);

        Ok(Sdk {
            dispatcher: Dispatcher::new(handlers, writer),
            source: FrameReader::with_max_frame_size(read_half, config.max_frame_size),
            commander,
            shutdown: ShutdownHandle::new(),
            close_tx,
            writer_task,
        })
    }
}

/// Stops a running [`Sdk`] from anywhere.
///
/// A request made before the loop starts is remembered.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    notify: Arc<Notify>,
}

impl ShutdownHandle {
    fn new() -> Self {
        Self::default()
    }

    /// Ask the dispatch loop to stop after the current message.
    pub fn shutdown(&self) {
        self.notify.notify_one();
    }

    async fn wait(&self) {
        self.notify.notified().await;
    }
}

/// A connected SDK, ready to run its dispatch loop.
pub struct Sdk {
    dispatcher: Dispatcher,
    source: FrameReader<BoxedReader>,
    commander: Commander,
    shutdown: ShutdownHandle,
    close_tx: oneshot::Sender<()>,
    writer_task: JoinHandle<Result<()>>,
}

impl Sdk {
    /// Create a new builder.
    pub fn builder() -> SdkBuilder {
        SdkBuilder::new()
    }

    /// Commander for sending commands outside of handlers.
    pub fn commander(&self) -> Commander {
        self.commander.clone()
    }

    /// Handle that stops the loop.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Run until `signal` resolves, [`ShutdownHandle::shutdown`] is called,
    /// or the host closes the connection.
    ///
    /// On return the connection is closed: the reader is dropped and
    /// outbound messages already queued are written first.
    pub async fn run_until<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let Sdk {
            mut dispatcher,
            mut source,
            commander,
            shutdown,
            close_tx,
            writer_task,
        } = self;

        let stop = async {
            tokio::select! {
                _ = signal => {}
                _ = shutdown.wait() => {}
            }
        };

        let result = dispatcher.run(&mut source, stop).await;

        drop(source);
        drop(dispatcher);
        drop(commander);
        let _ = close_tx.send(());

        let flushed = match writer_task.await {
            Ok(r) => r,
            Err(e) => Err(SdkError::Protocol(format!("writer task failed: {}", e))),
        };

        tracing::info!("Message bus connection released");
        result.and(flushed)
    }

    /// Run until Ctrl+C (SIGINT).
    pub async fn run_until_interrupted(self) -> Result<()> {
        self.run_until(interrupted()).await
    }
}

async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for interrupts: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Process entry: set up logging, start from the environment, run until
/// interrupted, and map the outcome to an exit status.
///
/// Exit status is 0 after a clean stop, 1 when `TFW_EVENT_HANDLERS` is
/// missing, and 2 for any other failure.
pub async fn bootstrap<L>(loader: L) -> ExitCode
where
    L: HandlerLoader + 'static,
{
    crate::logging::init_logging();
    ExitCode::from(launch(SdkConfig::from_env(), loader, interrupted()).await)
}

/// Start with `config` and run until `signal`; returns the exit status.
async fn launch<L, F>(config: Result<SdkConfig>, loader: L, signal: F) -> u8
where
    L: HandlerLoader + 'static,
    F: Future<Output = ()>,
{
    let started = match config {
        Ok(config) => Sdk::builder().config(config).loader(loader).start().await,
        Err(e) => Err(e),
    };

    let sdk = match started {
        Ok(sdk) => sdk,
        Err(e) => {
            tracing::error!("{}", e);
            return e.exit_code();
        }
    };

    tracing::info!("SDK started");

    match sdk.run_until(signal).await {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!("{}", e);
            2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::EventHandlers;
    use crate::protocol::{encode_message, FrameBuffer, RawMessage};
    use crate::transport::BusAddr;
    use std::path::Path;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    struct Deployer;

    impl EventHandlers for Deployer {
        fn on_deploy(&mut self, _current_state: i64) -> crate::HandlerResult<bool> {
            Ok(true)
        }
    }

    fn loader(_path: &Path, _commander: Commander) -> Result<Box<dyn EventHandlers>> {
        Ok(Box::new(Deployer))
    }

    #[test]
    fn test_builder_default() {
        let builder = SdkBuilder::default();
        assert!(builder.config.is_none());
        assert!(builder.loader.is_none());
    }

    #[tokio::test]
    async fn test_start_without_loader() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let result = Sdk::builder().config(SdkConfig::new(file.path())).start().await;
        assert!(matches!(result, Err(SdkError::HandlerLoad(_))));
    }

    #[tokio::test]
    async fn test_start_with_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let result = Sdk::builder()
            .config(SdkConfig::new(dir.path().join("app.rs")))
            .loader(loader)
            .start()
            .await;

        match result {
            Err(e @ SdkError::HandlerLoad(_)) => assert_eq!(e.exit_code(), 2),
            Err(other) => panic!("unexpected: {}", other),
            Ok(_) => panic!("start should fail"),
        }
    }

    #[tokio::test]
    async fn test_loader_error_becomes_handler_load() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let failing = |_: &Path, _: Commander| -> Result<Box<dyn EventHandlers>> {
            Err(SdkError::Config("syntax error on line 3".into()))
        };

        let result = Sdk::builder()
            .config(SdkConfig::new(file.path()))
            .loader(failing)
            .start()
            .await;

        match result {
            Err(SdkError::HandlerLoad(msg)) => assert!(msg.contains("syntax error")),
            Err(other) => panic!("unexpected: {}", other),
            Ok(_) => panic!("start should fail"),
        }
    }

    #[tokio::test]
    async fn test_launch_without_handlers_variable_exits_1() {
        let config = SdkConfig::from_lookup(|_| None);
        assert_eq!(launch(config, loader, std::future::pending()).await, 1);
    }

    #[tokio::test]
    async fn test_launch_with_missing_source_exits_2() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.rs");
        let config = SdkConfig::from_lookup(|name| {
            (name == crate::config::ENV_EVENT_HANDLERS).then(|| path.display().to_string())
        });

        assert_eq!(launch(config, loader, std::future::pending()).await, 2);
    }

    #[tokio::test]
    async fn test_launch_clean_stop_exits_0() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let host = tokio::spawn(async move { listener.accept().await.unwrap() });

        let config = SdkConfig::new(file.path()).bus_addr(BusAddr::Tcp(format!("127.0.0.1:{}", port)));
        assert_eq!(launch(Ok(config), loader, async {}).await, 0);
        host.await.unwrap();
    }

    #[tokio::test]
    async fn test_deploy_round_trip_and_shutdown() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let config = SdkConfig::new(file.path()).bus_addr(BusAddr::Tcp(format!("127.0.0.1:{}", port)));
        let (sdk, accepted) = tokio::join!(
            Sdk::builder().config(config).loader(loader).start(),
            listener.accept()
        );
        let sdk = sdk.unwrap();
        let (mut host, _) = accepted.unwrap();

        let shutdown = sdk.shutdown_handle();
        let running = tokio::spawn(sdk.run_until(std::future::pending()));

        let start = RawMessage::from_parts(["deploy.start", "{}"]);
        host.write_all(&encode_message(&start)).await.unwrap();

        let mut frames = FrameBuffer::new();
        let mut buf = vec![0u8; 1024];
        let reply = loop {
            let n = host.read(&mut buf).await.unwrap();
            assert!(n > 0, "connection closed before reply");
            if let Some(m) = frames.push(&buf[..n]).unwrap().pop() {
                break m;
            }
        };
        assert_eq!(&reply.parts()[0][..], b"deploy.finish");
        assert_eq!(&reply.parts()[1][..], br#"{"key":"deploy.finish"}"#);

        shutdown.shutdown();
        assert!(running.await.unwrap().is_ok());

        let n = host.read(&mut buf).await.unwrap();
        assert_eq!(n, 0);
    }
}
