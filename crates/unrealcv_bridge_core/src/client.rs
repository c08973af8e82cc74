use crate::codec::{read_text_frame, write_frame};
use crate::{BridgeConfig, BridgeError, Result, Transport};
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufStream};
use tokio::net::TcpStream;

/// Greeting prefix the plugin sends to the client it accepts.
const GREETING_PREFIX: &str = "connected";

/// UnrealCV client over a plain TCP socket.
#[derive(Debug)]
pub struct UnrealCvClient {
    host: String,
    port: u16,
    handshake_timeout: Duration,
    stream: Option<BufStream<TcpStream>>,
    greeting: Option<String>,
    next_id: u32,
}

impl UnrealCvClient {
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            handshake_timeout: config.handshake_timeout,
            stream: None,
            greeting: None,
            next_id: 0,
        }
    }

    /// The greeting the server sent on the current connection.
    pub fn greeting(&self) -> Option<&str> {
        self.greeting.as_deref()
    }
}

impl Transport for UnrealCvClient {
    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn connect(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let socket = TcpStream::connect((self.host.as_str(), self.port)).await?;
        socket.set_nodelay(true)?;
        let mut stream = BufStream::new(socket);

        let greeting = tokio::time::timeout(self.handshake_timeout, read_text_frame(&mut stream))
            .await
            .map_err(|_| BridgeError::HandshakeTimeout(self.handshake_timeout))??;

        if !greeting.starts_with(GREETING_PREFIX) {
            tracing::debug!("UnrealCV refused session: {}", greeting);
            return Err(BridgeError::ServerBusy(greeting));
        }

        tracing::info!("UnrealCV session opened: {}", greeting);
        self.stream = Some(stream);
        self.greeting = Some(greeting);
        Ok(())
    }

    async fn request(&mut self, command: &str) -> Result<String> {
        let stream = self.stream.as_mut().ok_or(BridgeError::NotConnected)?;

        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        let result = exchange(stream, id, command).await;
        if let Err(e) = &result {
            // The frame stream can't be trusted after a failed exchange.
            tracing::warn!("Dropping UnrealCV connection after error: {}", e);
            self.stream = None;
            self.greeting = None;
        }
        result
    }

    async fn disconnect(&mut self) {
        self.greeting = None;
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                tracing::debug!("Ignoring error on shutdown: {}", e);
            }
        }
    }
}

async fn exchange(stream: &mut BufStream<TcpStream>, id: u32, command: &str) -> Result<String> {
    tracing::debug!("Sending UnrealCV request: id={}, command={}", id, command);
    write_frame(stream, format!("{id}:{command}").as_bytes()).await?;

    let prefix = format!("{id}:");
    loop {
        let reply = read_text_frame(stream).await?;
        match reply.strip_prefix(&prefix) {
            Some(payload) => {
                tracing::debug!("UnrealCV reply: id={}, bytes={}", id, payload.len());
                return Ok(payload.to_string());
            }
            None => tracing::warn!("Skipping reply for another request: {}", reply),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn config_for(port: u16) -> BridgeConfig {
        BridgeConfig::new("127.0.0.1", port).with_handshake_timeout(Duration::from_millis(200))
    }

    /// Accepts one client, greets it, and answers `vget /objects` with a stale
    /// reply followed by the real one. Everything else gets an error reply.
    async fn fake_server(greeting: &'static str) -> (u16, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            write_frame(&mut socket, greeting.as_bytes()).await.unwrap();

            let mut received = Vec::new();
            while let Ok(message) = read_text_frame(&mut socket).await {
                let (id, command) = message.split_once(':').unwrap();
                received.push(command.to_string());
                if command == "vget /objects" {
                    write_frame(&mut socket, b"999:stale").await.unwrap();
                    write_frame(&mut socket, format!("{id}:Cube_1 MeshBP_C_0").as_bytes())
                        .await
                        .unwrap();
                } else {
                    write_frame(&mut socket, format!("{id}:error Can not find a handler").as_bytes())
                        .await
                        .unwrap();
                }
            }
            received
        });

        (port, handle)
    }

    #[test]
    fn test_client_creation() {
        let client = UnrealCvClient::new(&BridgeConfig::default());
        assert!(!client.is_connected());
        assert!(client.greeting().is_none());
        assert_eq!(client.next_id, 0);
    }

    #[tokio::test]
    async fn test_request_round_trip() {
        let (port, server) = fake_server("connected to UnrealProject").await;
        let mut client = UnrealCvClient::new(&config_for(port));

        client.connect().await.unwrap();
        assert!(client.is_connected());
        assert_eq!(client.greeting(), Some("connected to UnrealProject"));

        let reply = client.request("vget /objects").await.unwrap();
        assert_eq!(reply, "Cube_1 MeshBP_C_0");

        let reply = client.request("vget /nope").await.unwrap();
        assert_eq!(reply, "error Can not find a handler");

        client.disconnect().await;
        client.disconnect().await;
        assert!(!client.is_connected());

        let received = server.await.unwrap();
        assert_eq!(received, vec!["vget /objects", "vget /nope"]);
    }

    #[tokio::test]
    async fn test_request_ids_increment() {
        let (port, _server) = fake_server("connected to UnrealProject").await;
        let mut client = UnrealCvClient::new(&config_for(port));
        client.connect().await.unwrap();

        client.request("a").await.unwrap();
        client.request("b").await.unwrap();
        assert_eq!(client.next_id, 2);
    }

    #[tokio::test]
    async fn test_busy_greeting_is_retryable() {
        let (port, _server) = fake_server("Server is busy").await;
        let mut client = UnrealCvClient::new(&config_for(port));

        let err = client.connect().await.unwrap_err();
        assert!(matches!(err, BridgeError::ServerBusy(ref msg) if msg == "Server is busy"));
        assert!(err.is_retryable());
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn test_silent_server_times_out_handshake() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let _server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let mut client = UnrealCvClient::new(&config_for(port));
        let err = client.connect().await.unwrap_err();
        assert!(matches!(err, BridgeError::HandshakeTimeout(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_request_without_connection() {
        let mut client = UnrealCvClient::new(&BridgeConfig::default());
        let err = client.request("vget /objects").await.unwrap_err();
        assert!(matches!(err, BridgeError::NotConnected));
    }
}
