//! UnrealCV Bridge Core
//!
//! A small async library for driving a running Unreal Engine instance through the
//! UnrealCV plugin's TCP command protocol. Provides structured config, error handling,
//! a retrying connection manager, and the spawn/placement operations built on top of it.

pub mod codec;
pub mod config;
pub mod error;
pub mod client;
pub mod editor;
pub mod ops;
pub mod session;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use config::BridgeConfig;
pub use error::BridgeError;
pub use client::UnrealCvClient;
pub use session::Session;
pub use transport::Transport;

/// Result type alias using BridgeError
pub type Result<T> = std::result::Result<T, BridgeError>;
