use crate::Result;

/// The request/response channel a [`crate::Session`] drives.
///
/// `request` returns the reply text exactly as the server sent it; classifying
/// it is left to [`crate::types::CommandResult`].
#[allow(async_fn_in_trait)]
pub trait Transport {
    fn is_connected(&self) -> bool;

    async fn connect(&mut self) -> Result<()>;

    async fn request(&mut self, command: &str) -> Result<String>;

    /// Releases the underlying connection. Must be idempotent and never fail.
    async fn disconnect(&mut self);
}
