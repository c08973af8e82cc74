use crate::types::CommandResult;
use crate::{BridgeConfig, BridgeError, Result, Transport};

/// One connected remote-control session. Owns its transport for its whole lifetime.
#[derive(Debug)]
pub struct Session<T: Transport> {
    transport: T,
    endpoint: String,
    attempts: u32,
}

impl<T: Transport> Session<T> {
    /// Polls the transport until it reports connected, once per `poll_interval`,
    /// for at most `connect_attempts` attempts.
    ///
    /// Retryable failures (refused connection, busy server, missing greeting) are
    /// logged and polled again; any other failure ends the loop immediately.
    pub async fn connect(mut transport: T, config: &BridgeConfig) -> Result<Self> {
        let endpoint = config.endpoint();
        let max = config.connect_attempts;

        for attempt in 1..=max {
            if transport.is_connected() {
                return Ok(Self::connected(transport, endpoint, attempt));
            }

            match transport.connect().await {
                Ok(()) if transport.is_connected() => {
                    return Ok(Self::connected(transport, endpoint, attempt));
                }
                Ok(()) => {}
                Err(e) if e.is_retryable() => {
                    tracing::debug!("Connect attempt {} to {} failed: {}", attempt, endpoint, e);
                }
                Err(e) => {
                    tracing::warn!("Giving up on {}: {}", endpoint, e);
                    return Err(e);
                }
            }

            tracing::info!("Waiting for UnrealCV connection... {}/{}", attempt, max);
            if attempt < max {
                tokio::time::sleep(config.poll_interval).await;
            }
        }

        Err(BridgeError::ConnectionTimeout { attempts: max })
    }

    fn connected(transport: T, endpoint: String, attempts: u32) -> Self {
        tracing::info!("Connected to {} after {} attempt(s)", endpoint, attempts);
        Self {
            transport,
            endpoint,
            attempts,
        }
    }

    /// Sends `command` verbatim and classifies the reply. No timeout, no retry.
    pub async fn request(&mut self, command: &str) -> Result<CommandResult> {
        tracing::debug!("request: {}", command);
        let raw = self.transport.request(command).await?;
        let result = CommandResult::from_raw(raw);
        if result.is_error {
            tracing::warn!("`{}` answered with: {}", command, result.raw);
        }
        Ok(result)
    }

    /// Releases the transport. Safe to call more than once.
    pub async fn disconnect(&mut self) {
        if self.transport.is_connected() {
            tracing::info!("Disconnecting from {}", self.endpoint);
        }
        self.transport.disconnect().await;
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// How many connect attempts it took to open the session.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}
