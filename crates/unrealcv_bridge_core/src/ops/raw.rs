use crate::types::CommandResult;
use crate::{Result, Session, Transport};

pub async fn raw<T: Transport>(session: &mut Session<T>, command: &str) -> Result<CommandResult> {
    session.request(command).await
}
