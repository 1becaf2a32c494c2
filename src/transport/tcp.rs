// src/transport/tcp.rs
//! Socket establishment for agent channels
//!
//! Locally spawned agents are handed a listen address and dial back in;
//! remote agents are dialed directly. Both paths end in the same
//! [`TcpChannel`].

use crate::transport::MessageChannel;
use crate::utils::errors::{EngineError, Result};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tracing::debug;

/// A framed channel over a TCP socket
pub type TcpChannel = MessageChannel<TcpStream>;

/// Listener an engine-spawned agent dials back into
pub struct AgentListener {
    listener: TcpListener,
    addr: SocketAddr,
}

impl AgentListener {
    /// Bind an ephemeral loopback port for one agent to connect to
    pub async fn bind() -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let addr = listener.local_addr()?;
        debug!("Agent listener bound on {}", addr);
        Ok(Self { listener, addr })
    }

    /// The address the agent must dial, passed to it at spawn time
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Accept exactly one agent connection within `deadline`
    pub async fn accept(self, deadline: Duration) -> Result<TcpChannel> {
        match tokio::time::timeout(deadline, self.listener.accept()).await {
            Err(_) => Err(EngineError::Setup(format!(
                "agent did not connect to {} within {:?}",
                self.addr, deadline
            ))),
            Ok(Err(e)) => Err(EngineError::Transport(format!("accept failed: {}", e))),
            Ok(Ok((stream, peer))) => {
                debug!("Agent connected from {}", peer);
                stream.set_nodelay(true).ok();
                Ok(MessageChannel::new(stream))
            }
        }
    }
}

/// Dial a remotely hosted agent within `deadline`
pub async fn connect_agent(addr: SocketAddr, deadline: Duration) -> Result<TcpChannel> {
    match tokio::time::timeout(deadline, TcpStream::connect(addr)).await {
        Err(_) => Err(EngineError::Setup(format!(
            "could not reach agent at {} within {:?}",
            addr, deadline
        ))),
        Ok(Err(e)) => Err(EngineError::Setup(format!(
            "could not reach agent at {}: {}",
            addr, e
        ))),
        Ok(Ok(stream)) => {
            stream.set_nodelay(true).ok();
            Ok(MessageChannel::new(stream))
        }
    }
}
