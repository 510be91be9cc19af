//! `WhodunitServer` builder and accept loop.

use std::sync::Arc;

use whodunit_protocol::{Codec, JsonCodec};
use whodunit_room::{RoomHandle, spawn_room};
use whodunit_session::{
    MasterGate, OpenGate, Passphrase, RandomSolutions, Session,
    SolutionSource,
};
use whodunit_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{ServerConfig, WhodunitError};

/// Shared state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) room: RoomHandle,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a whodunit server.
///
/// # Example
///
/// ```rust,ignore
/// let server = WhodunitServer::builder()
///     .bind("0.0.0.0:3000")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct WhodunitServerBuilder {
    bind_addr: String,
    master_passphrase: Option<String>,
    room_channel_size: usize,
    solutions: Option<Box<dyn SolutionSource>>,
}

impl WhodunitServerBuilder {
    /// Creates a builder with [`ServerConfig::default`] settings.
    pub fn new() -> Self {
        Self::from_config(&ServerConfig::default())
    }

    /// Creates a builder from loaded configuration.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            bind_addr: config.bind_addr.clone(),
            master_passphrase: config.master_passphrase.clone(),
            room_channel_size: config.room_channel_size,
            solutions: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Requires this passphrase to claim the game-master seat.
    pub fn master_passphrase(mut self, secret: impl Into<String>) -> Self {
        self.master_passphrase = Some(secret.into());
        self
    }

    /// Sets the capacity of the room's command queue.
    pub fn room_channel_size(mut self, size: usize) -> Self {
        self.room_channel_size = size;
        self
    }

    /// Replaces the random solution draw, e.g. with a `FixedSolution`.
    pub fn solution_source(
        mut self,
        source: impl SolutionSource + 'static,
    ) -> Self {
        self.solutions = Some(Box::new(source));
        self
    }

    /// Binds the listener and spawns the room.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<WhodunitServer<JsonCodec>, WhodunitError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let session = match self.solutions {
            Some(source) => Session::new(source),
            None => Session::new(RandomSolutions::new()),
        };
        let gate: Box<dyn MasterGate> = match self.master_passphrase {
            Some(secret) => Box::new(Passphrase::new(secret)),
            None => Box::new(OpenGate),
        };
        let room = spawn_room(session, gate, self.room_channel_size.max(1));

        let state = Arc::new(ServerState {
            room,
            codec: JsonCodec,
        });

        Ok(WhodunitServer { transport, state })
    }
}

impl Default for WhodunitServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound whodunit server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct WhodunitServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl WhodunitServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> WhodunitServerBuilder {
        WhodunitServerBuilder::new()
    }
}

impl<C> WhodunitServer<C>
where
    C: Codec + Clone,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Handle to the room, for inspection or shutdown.
    pub fn room(&self) -> RoomHandle {
        self.state.room.clone()
    }

    /// Runs the accept loop, spawning a handler task per connection.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), WhodunitError> {
        tracing::info!(addr = ?self.local_addr().ok(), "whodunit server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
