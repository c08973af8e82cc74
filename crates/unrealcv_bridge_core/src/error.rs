use std::io::ErrorKind;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection timeout after {attempts} attempts")]
    ConnectionTimeout { attempts: u32 },

    #[error("Server refused the session: {0}")]
    ServerBusy(String),

    #[error("No server greeting within {0:?}")]
    HandshakeTimeout(Duration),

    #[error("Frame error: {0}")]
    Frame(String),

    #[error("Not connected")]
    NotConnected,

    #[error("Command `{command}` failed: {response}")]
    Protocol { command: String, response: String },

    #[error("All {tried} spawn candidates failed, last response: {last_response}")]
    CandidatesExhausted { tried: usize, last_response: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Import failed: {0}")]
    Import(String),
}

impl BridgeError {
    pub fn protocol(command: impl Into<String>, response: impl Into<String>) -> Self {
        Self::Protocol {
            command: command.into(),
            response: response.into(),
        }
    }

    /// Whether the connect loop should keep polling after this error.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Io(e) => matches!(
                e.kind(),
                ErrorKind::ConnectionRefused
                    | ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::HostUnreachable
                    | ErrorKind::NetworkUnreachable
                    | ErrorKind::AddrNotAvailable
                    | ErrorKind::NotConnected
                    | ErrorKind::TimedOut
                    | ErrorKind::WouldBlock
                    | ErrorKind::Interrupted
                    | ErrorKind::UnexpectedEof
            ),
            Self::ServerBusy(_) | Self::HandshakeTimeout(_) | Self::NotConnected => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_construction() {
        let err = BridgeError::protocol("vget /objects", "error: unknown");
        match err {
            BridgeError::Protocol { command, response } => {
                assert_eq!(command, "vget /objects");
                assert_eq!(response, "error: unknown");
            }
            _ => panic!("Expected Protocol variant"),
        }
    }

    #[test]
    fn test_error_display_messages() {
        let timeout_err = BridgeError::ConnectionTimeout { attempts: 30 };
        assert_eq!(timeout_err.to_string(), "Connection timeout after 30 attempts");

        let handshake_err = BridgeError::HandshakeTimeout(Duration::from_secs(5));
        assert_eq!(handshake_err.to_string(), "No server greeting within 5s");

        let exhausted = BridgeError::CandidatesExhausted {
            tried: 3,
            last_response: "error: nope".to_string(),
        };
        assert_eq!(
            exhausted.to_string(),
            "All 3 spawn candidates failed, last response: error: nope"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(ErrorKind::ConnectionRefused, "refused");
        let err: BridgeError = io_err.into();
        match err {
            BridgeError::Io(ref e) => assert_eq!(e.kind(), ErrorKind::ConnectionRefused),
            _ => panic!("Expected Io variant"),
        }
    }

    #[test]
    fn test_retry_classification() {
        let refused: BridgeError = std::io::Error::from(ErrorKind::ConnectionRefused).into();
        assert!(refused.is_retryable());
        for kind in [
            ErrorKind::HostUnreachable,
            ErrorKind::NetworkUnreachable,
            ErrorKind::AddrNotAvailable,
        ] {
            let err: BridgeError = std::io::Error::from(kind).into();
            assert!(err.is_retryable(), "{kind:?}");
        }
        assert!(BridgeError::ServerBusy("busy".into()).is_retryable());
        assert!(BridgeError::HandshakeTimeout(Duration::from_secs(1)).is_retryable());

        let bad_addr: BridgeError = std::io::Error::from(ErrorKind::InvalidInput).into();
        assert!(!bad_addr.is_retryable());
        assert!(!BridgeError::Frame("bad magic".into()).is_retryable());
        assert!(!BridgeError::InvalidArgument("x".into()).is_retryable());
    }
}
