// src/transport/mod.rs
//! Message transport
//!
//! A bidirectional asynchronous channel abstraction over a byte stream,
//! with length-prefixed framing so partial reads and writes can never
//! corrupt adjacent messages:
//!
//! - **channel**: [`MessageChannel`], framed send/receive-with-timeout
//! - **tcp**: listener/connector helpers for socket-backed channels
//!
//! Timeout policy: a `receive` deadline expiring cleanly leaves the channel
//! open and frame-aligned (the length-delimited codec guarantees message
//! boundaries), so the caller may keep using it; the abandoned reply is
//! filtered out upstream by round tagging. Any framing or I/O error leaves
//! the channel in an undefined state and the caller must discard it.

pub mod channel;
pub mod tcp;

pub use channel::MessageChannel;
pub use tcp::{connect_agent, AgentListener, TcpChannel};
