// src/transport/channel.rs
//! Framed message channel with receive timeouts
//!
//! Wraps any async byte stream in a length-delimited codec and exposes the
//! two primitives the rest of the engine builds on: `send` and
//! `receive(timeout)`. `receive` returns control exactly once the deadline
//! elapses; it never blocks indefinitely on a hung peer.

use crate::utils::errors::{EngineError, Result};
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Framed, LengthDelimitedCodec};

/// Upper bound on a single frame; a full serialized game state is a few
/// kilobytes, so anything near this size is a misbehaving peer.
const MAX_FRAME_BYTES: usize = 4 * 1024 * 1024;

/// A framed, bidirectional message channel over an arbitrary byte stream
#[derive(Debug)]
pub struct MessageChannel<T> {
    framed: Framed<T, LengthDelimitedCodec>,
}

impl<T: AsyncRead + AsyncWrite + Unpin> MessageChannel<T> {
    /// Wrap a byte stream in length-delimited framing
    pub fn new(io: T) -> Self {
        let codec = LengthDelimitedCodec::builder()
            .max_frame_length(MAX_FRAME_BYTES)
            .new_codec();
        Self {
            framed: Framed::new(io, codec),
        }
    }

    /// Send one message, flushing it to the peer
    pub async fn send(&mut self, payload: &[u8]) -> Result<()> {
        self.framed
            .send(Bytes::copy_from_slice(payload))
            .await
            .map_err(|e| EngineError::Transport(format!("send failed: {}", e)))
    }

    /// Receive one complete message within `timeout`.
    ///
    /// Returns `ReceiveTimeout` once the deadline elapses, `ChannelClosed`
    /// if the peer hung up, and `Transport` on framing or I/O errors.
    pub async fn receive(&mut self, timeout: Duration) -> Result<Vec<u8>> {
        match tokio::time::timeout(timeout, self.framed.next()).await {
            Err(_) => Err(EngineError::ReceiveTimeout),
            Ok(None) => Err(EngineError::ChannelClosed),
            Ok(Some(Err(e))) => Err(EngineError::Transport(format!("receive failed: {}", e))),
            Ok(Some(Ok(frame))) => Ok(frame.to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_send_receive_round_trip() {
        let (a, b) = tokio::io::duplex(4096);
        let mut left = MessageChannel::new(a);
        let mut right = MessageChannel::new(b);

        left.send(b"hello agent").await.unwrap();
        let msg = right.receive(Duration::from_secs(1)).await.unwrap();
        assert_eq!(msg, b"hello agent");
    }

    #[tokio::test]
    async fn test_framing_preserves_message_boundaries() {
        let (a, b) = tokio::io::duplex(4096);
        let mut left = MessageChannel::new(a);
        let mut right = MessageChannel::new(b);

        left.send(b"first").await.unwrap();
        left.send(b"second, longer message").await.unwrap();

        assert_eq!(right.receive(Duration::from_secs(1)).await.unwrap(), b"first");
        assert_eq!(
            right.receive(Duration::from_secs(1)).await.unwrap(),
            b"second, longer message"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_receive_times_out_without_hanging() {
        let (a, _b) = tokio::io::duplex(4096);
        let mut chan = MessageChannel::new(a);

        let err = chan.receive(Duration::from_millis(50)).await.unwrap_err();
        assert!(matches!(err, EngineError::ReceiveTimeout));
    }

    #[tokio::test]
    async fn test_channel_usable_after_timeout() {
        let (a, b) = tokio::io::duplex(4096);
        let mut left = MessageChannel::new(a);
        let mut right = MessageChannel::new(b);

        let err = right.receive(Duration::from_millis(10)).await.unwrap_err();
        assert!(matches!(err, EngineError::ReceiveTimeout));

        // A clean timeout leaves the channel open and frame-aligned
        left.send(b"late but intact").await.unwrap();
        let msg = right.receive(Duration::from_secs(1)).await.unwrap();
        assert_eq!(msg, b"late but intact");
    }

    #[tokio::test]
    async fn test_peer_hangup_reports_closed() {
        let (a, b) = tokio::io::duplex(4096);
        let mut chan = MessageChannel::new(a);
        drop(b);

        let err = chan.receive(Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, EngineError::ChannelClosed));
    }

    #[tokio::test]
    async fn test_timeout_returns_promptly() {
        let (a, _b) = tokio::io::duplex(4096);
        let mut chan = MessageChannel::new(a);

        let start = Instant::now();
        let _ = chan.receive(Duration::from_millis(100)).await;
        // Deadline plus bounded overhead, nowhere near a hang
        assert!(start.elapsed() < Duration::from_secs(2));
    }
}
