//! Inbound message sources.

use std::collections::VecDeque;
use std::future::Future;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;

use crate::error::Result;
use crate::protocol::{FrameBuffer, RawMessage};

/// Read buffer size per socket read.
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Something the dispatcher can pull inbound messages from.
///
/// `Ok(None)` means the source is exhausted (connection closed).
/// Implementations must be cancel-safe: dropping the future before it
/// completes must not lose a message.
pub trait MessageSource {
    /// Wait for the next message.
    fn next_message(&mut self) -> impl Future<Output = Result<Option<RawMessage>>> + Send;
}

/// Message source over an async byte stream.
pub struct FrameReader<R> {
    reader: R,
    frames: FrameBuffer,
    ready: VecDeque<RawMessage>,
    buf: Vec<u8>,
}

impl<R> FrameReader<R>
where
    R: AsyncRead + Unpin + Send,
{
    /// Create a reader with the default message size limit.
    pub fn new(reader: R) -> Self {
        Self::with_frame_buffer(reader, FrameBuffer::new())
    }

    /// Create a reader with a custom message size limit.
    pub fn with_max_frame_size(reader: R, max_frame_size: u32) -> Self {
        Self::with_frame_buffer(reader, FrameBuffer::with_max_frame_size(max_frame_size))
    }

    fn with_frame_buffer(reader: R, frames: FrameBuffer) -> Self {
        Self {
            reader,
            frames,
            ready: VecDeque::new(),
            buf: vec![0u8; READ_BUFFER_SIZE],
        }
    }

    /// Consume the reader, returning the underlying stream.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R> MessageSource for FrameReader<R>
where
    R: AsyncRead + Unpin + Send,
{
    async fn next_message(&mut self) -> Result<Option<RawMessage>> {
        loop {
            if let Some(message) = self.ready.pop_front() {
                return Ok(Some(message));
            }

            let n = self.reader.read(&mut self.buf).await?;
            if n == 0 {
                if !self.frames.is_empty() {
                    tracing::warn!(
                        buffered = self.frames.len(),
                        "Connection closed with a partial message buffered"
                    );
                }
                return Ok(None);
            }

            self.ready.extend(self.frames.push(&self.buf[..n])?);
        }
    }
}

impl MessageSource for mpsc::Receiver<RawMessage> {
    async fn next_message(&mut self) -> Result<Option<RawMessage>> {
        Ok(self.recv().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SdkError;
    use crate::protocol::encode_message;
    use tokio::io::{duplex, AsyncWriteExt};

    #[tokio::test]
    async fn test_reads_messages_in_order() {
        let (mut host, worker) = duplex(4096);
        let mut reader = FrameReader::new(worker);

        let first = RawMessage::from_parts(["fsm.update", r#"{"current_state":1}"#]);
        let second = RawMessage::from_parts(["deploy.start", "{}"]);
        host.write_all(&encode_message(&first)).await.unwrap();
        host.write_all(&encode_message(&second)).await.unwrap();
        drop(host);

        assert_eq!(reader.next_message().await.unwrap(), Some(first));
        assert_eq!(reader.next_message().await.unwrap(), Some(second));
        assert_eq!(reader.next_message().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_oversized_part_is_an_error() {
        let (mut host, worker) = duplex(4096);
        let mut reader = FrameReader::with_max_frame_size(worker, 8);

        let message = RawMessage::from_parts(["a key longer than eight bytes"]);
        host.write_all(&encode_message(&message)).await.unwrap();

        assert!(matches!(
            reader.next_message().await,
            Err(SdkError::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn test_partial_message_then_close() {
        let (mut host, worker) = duplex(4096);
        let mut reader = FrameReader::new(worker);

        let wire = encode_message(&RawMessage::from_parts(["ide.write", "{}"]));
        host.write_all(&wire[..wire.len() - 1]).await.unwrap();
        drop(host);

        assert_eq!(reader.next_message().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_channel_source() {
        let (tx, mut rx) = mpsc::channel(2);
        let message = RawMessage::from_parts(["history.bash", r#"{"command":"id"}"#]);
        tx.send(message.clone()).await.unwrap();
        drop(tx);

        assert_eq!(rx.next_message().await.unwrap(), Some(message));
        assert_eq!(rx.next_message().await.unwrap(), None);
    }
}
