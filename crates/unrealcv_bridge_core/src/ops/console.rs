use crate::ops::raw::raw;
use crate::{Result, Session, Transport};
use std::future::Future;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

pub const PROMPT: &str = "\nEnter a custom UnrealCV command (or 'exit' to quit): ";
pub const EXIT_COMMAND: &str = "exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleExit {
    /// The user typed `exit`.
    Requested,
    EndOfInput,
    /// `shutdown` resolved, normally on Ctrl+C.
    Interrupted,
}

/// Forwards each input line to the session and writes back the raw reply until
/// `exit`, end of input, or `shutdown`. Disconnecting is left to the caller.
pub async fn run<T, R, W, F>(
    session: &mut Session<T>,
    input: R,
    output: &mut W,
    shutdown: F,
) -> Result<ConsoleExit>
where
    T: Transport,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    F: Future<Output = ()>,
{
    let mut lines = input.lines();
    let mut shutdown = std::pin::pin!(shutdown);

    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let line = tokio::select! {
            biased;
            _ = &mut shutdown => return Ok(ConsoleExit::Interrupted),
            line = lines.next_line() => line?,
        };

        let Some(line) = line else {
            return Ok(ConsoleExit::EndOfInput);
        };

        // `lines` already dropped the terminator; the rest goes out as typed.
        if line.eq_ignore_ascii_case(EXIT_COMMAND) {
            return Ok(ConsoleExit::Requested);
        }

        let result = tokio::select! {
            biased;
            _ = &mut shutdown => return Ok(ConsoleExit::Interrupted),
            result = raw(session, &line) => result?,
        };

        output
            .write_all(format!("Response: {}\n", result.raw).as_bytes())
            .await?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::ScriptedTransport;
    use crate::BridgeConfig;
    use std::future::pending;

    async fn session_with(replies: &[&str]) -> Session<ScriptedTransport> {
        let config = BridgeConfig::default().with_connect_attempts(1);
        Session::connect(ScriptedTransport::new(replies.iter().copied()), &config)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_forwards_lines_until_exit() {
        let mut session = session_with(&["ok", "error: bad"]).await;
        let input: &[u8] = b"vset /object/Obj_1/location 1 2 3\r\nvget /bogus\nEXIT\nvget /never\n";
        let mut output = Vec::new();

        let exit = run(&mut session, input, &mut output, pending()).await.unwrap();

        assert_eq!(exit, ConsoleExit::Requested);
        assert_eq!(
            session.transport().sent,
            vec!["vset /object/Obj_1/location 1 2 3", "vget /bogus"]
        );
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Response: ok\n"));
        assert!(text.contains("Response: error: bad\n"));
    }

    #[tokio::test]
    async fn test_lines_are_forwarded_literally() {
        let mut session = session_with(&["a", "b", "c"]).await;
        let input: &[u8] = b"  vget /objects \n\n exit\nexit\n";
        let mut output = Vec::new();

        let exit = run(&mut session, input, &mut output, pending()).await.unwrap();

        assert_eq!(exit, ConsoleExit::Requested);
        assert_eq!(session.transport().sent, vec!["  vget /objects ", "", " exit"]);
    }

    #[tokio::test]
    async fn test_end_of_input() {
        let mut session = session_with(&["ok"]).await;
        let input: &[u8] = b"vget /objects";
        let mut output = Vec::new();

        let exit = run(&mut session, input, &mut output, pending()).await.unwrap();
        assert_eq!(exit, ConsoleExit::EndOfInput);
        assert_eq!(session.transport().sent, vec!["vget /objects"]);
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_waiting_prompt() {
        let mut session = session_with(&[]).await;
        // Keep the writer alive so reads stay pending.
        let (_writer, reader) = tokio::io::duplex(64);
        let input = tokio::io::BufReader::new(reader);
        let mut output = Vec::new();

        let exit = run(&mut session, input, &mut output, async {}).await.unwrap();
        assert_eq!(exit, ConsoleExit::Interrupted);
        assert!(session.transport().sent.is_empty());
        assert!(String::from_utf8(output).unwrap().contains("'exit' to quit"));
    }
}
