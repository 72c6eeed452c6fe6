//! Stdio transport: one JSON-RPC message per line
//!
//! stdout carries protocol traffic only; logs go to stderr.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use super::McpServer;
use crate::Result;

/// Serve the process's stdin/stdout until stdin closes
///
/// # Errors
///
/// Returns error if stdin cannot be read or stdout cannot be written
pub async fn serve(server: &McpServer) -> Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve_streams(server, stdin, stdout).await
}

/// Serve newline-delimited JSON-RPC over arbitrary streams
///
/// Every message runs in the single shared session, one at a time.
///
/// # Errors
///
/// Returns error on read or write failure
pub async fn serve_streams<R, W>(server: &McpServer, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let session = server.sessions().shared();
    let mut lines = reader.lines();

    tracing::info!("stdio transport ready");

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(response) = server.handle_message(&session, line).await else {
            continue;
        };

        let mut payload = serde_json::to_vec(&response)?;
        payload.push(b'\n');
        writer.write_all(&payload).await?;
        writer.flush().await?;
    }

    tracing::info!("stdin closed, stopping");
    Ok(())
}
