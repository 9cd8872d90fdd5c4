//! Reading a raw request off a connection.

use crate::AsyncRead;
use futures_util::AsyncReadExt;
use std::io;

/// Size of each read off the connection.
pub const READ_CHUNK_SIZE: usize = 1024;

/// Read a whole request off a connection.
///
/// Reads `READ_CHUNK_SIZE` at a time and stops at the first read that comes
/// back short, taking that as "nothing more pending". Returns `None` if the
/// peer closed before sending anything.
///
/// This is a heuristic, not a length aware read. A request that is an exact
/// multiple of the chunk size waits for one more read, which only returns
/// when the client sends more or shuts down its write half. There is no
/// timeout.
pub async fn read_request<S>(io: &mut S) -> Result<Option<Vec<u8>>, io::Error>
where
    S: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(READ_CHUNK_SIZE);
    let mut chunk = [0_u8; READ_CHUNK_SIZE];

    loop {
        let amount = io.read(&mut chunk[..]).await?;
        trace!("read_request: {} bytes", amount);

        buf.extend_from_slice(&chunk[..amount]);

        if amount < READ_CHUNK_SIZE {
            break;
        }
    }

    if buf.is_empty() {
        trace!("Connection closed before any request data");
        return Ok(None);
    }

    Ok(Some(buf))
}
