//! UnrealCV socket framing.
//!
//! Every message on the wire is `magic (u32 LE) | payload length (u32 LE) | payload`.

use crate::{BridgeError, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const MAGIC: u32 = 0x9E2B_83C1;
pub const MAX_PAYLOAD: u32 = 64 * 1024 * 1024;

pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let len = u32::try_from(payload.len())
        .ok()
        .filter(|len| *len <= MAX_PAYLOAD)
        .ok_or_else(|| BridgeError::Frame(format!("payload too large: {} bytes", payload.len())))?;

    writer.write_u32_le(MAGIC).await?;
    writer.write_u32_le(len).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn read_frame<R>(reader: &mut R) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let magic = reader.read_u32_le().await?;
    if magic != MAGIC {
        return Err(BridgeError::Frame(format!("bad magic {magic:#010x}")));
    }

    let len = reader.read_u32_le().await?;
    if len > MAX_PAYLOAD {
        return Err(BridgeError::Frame(format!("payload too large: {len} bytes")));
    }

    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await?;
    Ok(payload)
}

/// Reads one frame and decodes it as text.
pub async fn read_text_frame<R>(reader: &mut R) -> Result<String>
where
    R: AsyncRead + Unpin,
{
    let payload = read_frame(reader).await?;
    String::from_utf8(payload).map_err(|e| BridgeError::Frame(format!("payload is not UTF-8: {e}")))
}
