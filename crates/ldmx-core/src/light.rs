//! Per-channel handle.
//!
//! A [`Light`] is just a channel number and a shared connection. It keeps no
//! state of its own: every call is one request on the engine connection.

use std::time::Duration;

use tracing::debug;

use ldmx_api::protocol::OK_REPLY;
use ldmx_api::{Connection, Connector, TcpConnector};

use crate::command::Command;
use crate::error::SendError;
use crate::model::{Channel, StateReply};

/// One DMX channel on an engine. Obtained from
/// [`Engine::light`](crate::Engine::light).
pub struct Light<C: Connector = TcpConnector> {
    connection: Connection<C>,
    channel: Channel,
}

impl<C: Connector> Clone for Light<C> {
    fn clone(&self) -> Self {
        Self {
            connection: self.connection.clone(),
            channel: self.channel,
        }
    }
}

impl<C: Connector> std::fmt::Debug for Light<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Light")
            .field("engine", &self.connection.addr())
            .field("channel", &self.channel)
            .finish()
    }
}

impl<C: Connector> Light<C> {
    pub(crate) fn new(connection: Connection<C>, channel: Channel) -> Self {
        Self {
            connection,
            channel,
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Stable identifier of this light across restarts: `"{host}-{channel}"`.
    pub fn unique_id(&self) -> String {
        format!("{}-{}", self.connection.config().host, self.channel)
    }

    /// Turn the channel on, optionally at `brightness` and fading over
    /// `transition`.
    pub async fn turn_on(
        &self,
        brightness: Option<u8>,
        transition: Option<Duration>,
    ) -> Result<(), SendError> {
        self.send_expecting_ok(&Command::TurnOn {
            channel: self.channel,
            brightness,
            transition,
        })
        .await
    }

    /// Turn the channel off, optionally fading over `transition`.
    pub async fn turn_off(&self, transition: Option<Duration>) -> Result<(), SendError> {
        self.send_expecting_ok(&Command::TurnOff {
            channel: self.channel,
            transition,
        })
        .await
    }

    /// Ask the engine for the channel's current output.
    pub async fn get_state(&self) -> Result<StateReply, SendError> {
        let command = Command::QueryState {
            channel: self.channel,
        };
        let reply = self.connection.request(&command.encode()).await?;
        let state = StateReply::parse(&reply, self.channel)?;
        debug!(channel = %self.channel, is_on = state.is_on, brightness = state.brightness, "state received");
        Ok(state)
    }

    /// Whether the engine connection is currently up.
    pub fn is_available(&self) -> bool {
        self.connection.is_connected()
    }

    async fn send_expecting_ok(&self, command: &Command) -> Result<(), SendError> {
        let line = command.encode();
        let reply = self.connection.request(&line).await?;
        if reply == OK_REPLY {
            debug!(command = %line, "command acknowledged");
            Ok(())
        } else {
            Err(SendError::UnexpectedReply {
                command: line,
                reply,
            })
        }
    }
}
