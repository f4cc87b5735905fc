//! Dedicated writer task for outbound messages.
//!
//! Handlers, the dispatcher and any [`Commander`](crate::Commander) clone
//! hand envelopes to a bounded mpsc channel; a single task encodes them and
//! writes them to the transport.
//!
//! # Architecture
//!
//! ```text
//! Dispatcher ─┐
//! Handlers   ─┼─► mpsc::Sender<OutboundMessage> ─► Writer Task ─► Socket
//! Commander  ─┘
//! ```

use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::{Result, SdkError};
use crate::message::OutboundMessage;
use crate::protocol::encode_message;

/// Default channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Maximum messages to batch in a single write.
const MAX_BATCH_SIZE: usize = 64;

/// Handle for queueing outbound messages.
///
/// Cheap to clone; every clone feeds the same writer task.
#[derive(Debug, Clone)]
pub struct WriterHandle {
    tx: mpsc::Sender<OutboundMessage>,
}

impl WriterHandle {
    /// Create a handle and the receiving end of its channel.
    ///
    /// Pass the receiver to [`spawn_writer_task`], or read it directly to
    /// observe what would be sent.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<OutboundMessage>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Queue a message, waiting for channel capacity.
    pub async fn send(&self, message: OutboundMessage) -> Result<()> {
        self.tx
            .send(message)
            .await
            .map_err(|_| SdkError::ConnectionClosed)
    }

    /// Queue a message without waiting.
    ///
    /// Fails with `Protocol` if the channel is full and `ConnectionClosed`
    /// if the writer task is gone.
    pub fn try_send(&self, message: OutboundMessage) -> Result<()> {
        self.tx.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(m) => SdkError::Protocol(format!(
                "outbound queue full, dropped {}",
                m.key()
            )),
            mpsc::error::TrySendError::Closed(_) => SdkError::ConnectionClosed,
        })
    }

    /// Check whether the writer task has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Spawn the writer task.
///
/// The task ends when every [`WriterHandle`] is dropped, or when `close`
/// fires. On close, messages already queued are written before returning.
/// The transport's write half is shut down on exit.
pub fn spawn_writer_task<W>(
    writer: W,
    rx: mpsc::Receiver<OutboundMessage>,
    close: oneshot::Receiver<()>,
) -> JoinHandle<Result<()>>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(writer_loop(rx, writer, close))
}

/// Main writer loop - receives envelopes and writes them in batches.
async fn writer_loop<W>(
    mut rx: mpsc::Receiver<OutboundMessage>,
    mut writer: W,
    mut close: oneshot::Receiver<()>,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    loop {
        let first = tokio::select! {
            biased;
            msg = rx.recv() => match msg {
                Some(m) => m,
                None => break,
            },
            _ = &mut close => {
                rx.close();
                let mut rest = Vec::new();
                while let Ok(m) = rx.try_recv() {
                    rest.push(m);
                }
                write_batch(&mut writer, &rest).await?;
                break;
            }
        };

        let mut batch = Vec::with_capacity(MAX_BATCH_SIZE);
        batch.push(first);

        while batch.len() < MAX_BATCH_SIZE {
            match rx.try_recv() {
                Ok(m) => batch.push(m),
                Err(_) => break,
            }
        }

        write_batch(&mut writer, &batch).await?;
    }

    writer.shutdown().await?;
    Ok(())
}

/// Encode a batch into one buffer and write it with a single flush.
async fn write_batch<W>(writer: &mut W, batch: &[OutboundMessage]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    if batch.is_empty() {
        return Ok(());
    }

    let mut buf = BytesMut::new();
    for message in batch {
        match message.to_raw() {
            Ok(raw) => buf.extend_from_slice(&encode_message(&raw)),
            Err(e) => tracing::error!(key = %message.key(), "Dropping unencodable message: {}", e),
        }
    }

    writer.write_all(&buf).await?;
    writer.flush().await?;
    tracing::trace!(count = batch.len(), bytes = buf.len(), "Wrote outbound batch");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::FrameBuffer;
    use std::io::Cursor;
    use std::time::Duration;
    use tokio::io::{duplex, AsyncReadExt};

    #[tokio::test]
    async fn test_write_batch_frames_each_message() {
        let mut buf = Cursor::new(Vec::new());
        let batch = vec![
            OutboundMessage::console_write("a"),
            OutboundMessage::reload_iframe(),
        ];

        write_batch(&mut buf, &batch).await.unwrap();

        let mut frames = FrameBuffer::new();
        let messages = frames.push(&buf.into_inner()).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(&messages[0].parts()[0][..], b"console.write");
        assert_eq!(&messages[1].parts()[0][..], b"frontend.reloadIframe");
    }

    #[tokio::test]
    async fn test_write_batch_empty() {
        let mut buf = Cursor::new(Vec::new());
        write_batch(&mut buf, &[]).await.unwrap();
        assert!(buf.into_inner().is_empty());
    }

    #[tokio::test]
    async fn test_writer_task_delivers() {
        let (client, mut server) = duplex(4096);
        let (handle, rx) = WriterHandle::channel(8);
        let (_close_tx, close_rx) = oneshot::channel();
        let _task = spawn_writer_task(client, rx, close_rx);

        handle.send(OutboundMessage::terminal_write("x")).await.unwrap();

        let mut buf = vec![0u8; 256];
        let n = tokio::time::timeout(Duration::from_secs(1), server.read(&mut buf))
            .await
            .unwrap()
            .unwrap();

        let messages = FrameBuffer::new().push(&buf[..n]).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(&messages[0].parts()[0][..], b"terminal.write");
    }

    #[tokio::test]
    async fn test_writer_stops_when_handles_dropped() {
        let (client, _server) = duplex(4096);
        let (handle, rx) = WriterHandle::channel(8);
        let (_close_tx, close_rx) = oneshot::channel();
        let task = spawn_writer_task(client, rx, close_rx);

        drop(handle);

        assert!(task.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_close_flushes_queued_messages() {
        let (client, mut server) = duplex(64 * 1024);
        let (handle, rx) = WriterHandle::channel(8);
        let (close_tx, close_rx) = oneshot::channel();

        handle.try_send(OutboundMessage::console_write("1")).unwrap();
        handle.try_send(OutboundMessage::console_write("2")).unwrap();
        close_tx.send(()).unwrap();

        let task = spawn_writer_task(client, rx, close_rx);
        assert!(task.await.unwrap().is_ok());
        assert!(handle.is_closed());

        let mut bytes = Vec::new();
        server.read_to_end(&mut bytes).await.unwrap();
        let messages = FrameBuffer::new().push(&bytes).unwrap();
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn test_try_send_full() {
        let (handle, _rx) = WriterHandle::channel(1);
        handle.try_send(OutboundMessage::reload_iframe()).unwrap();

        let result = handle.try_send(OutboundMessage::reload_iframe());
        assert!(matches!(result, Err(SdkError::Protocol(_))));
    }

    #[test]
    fn test_try_send_closed() {
        let (handle, rx) = WriterHandle::channel(1);
        drop(rx);

        let result = handle.try_send(OutboundMessage::reload_iframe());
        assert!(matches!(result, Err(SdkError::ConnectionClosed)));
    }
}
