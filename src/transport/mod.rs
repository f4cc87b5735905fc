//! Transport module - connecting to the framework host's message bus.
//!
//! Provides:
//! - [`BusAddr`] - TCP or Unix Domain Socket address
//! - [`connect`] - open the bus and split it into reader and writer
//! - [`MessageSource`] - where the dispatcher gets its next message
//! - [`FrameReader`] - message source over any async byte stream

mod addr;
mod reader;

pub use addr::{connect, BoxedReader, BoxedWriter, BusAddr, DEFAULT_BUS_ADDR};
pub use reader::{FrameReader, MessageSource};
