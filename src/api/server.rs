/*!
 * Line Protocol Server
 * Newline-delimited JSON over TCP; one response line per request line
 */

use super::handlers::handle_line;
use super::types::ApiResponse;
use crate::admission::AllocationEngine;
use crate::core::limits::MAX_FRAME_BYTES;
use crate::core::types::KernelResult;
use std::net::SocketAddr;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

/// Bind `addr` and serve until the task is dropped
pub async fn start_server(addr: SocketAddr, engine: AllocationEngine) -> KernelResult<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "allocation server listening");
    serve(listener, engine).await
}

/// Accept connections on an already bound listener
pub async fn serve(listener: TcpListener, engine: AllocationEngine) -> KernelResult<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let engine = engine.clone();
        debug!(%peer, "connection accepted");

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, engine).await {
                warn!(%peer, error = %e, "connection closed with error");
            }
        });
    }
}

async fn handle_connection(stream: TcpStream, engine: AllocationEngine) -> KernelResult<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut frame = Vec::new();

    loop {
        frame.clear();
        let read = (&mut reader)
            .take(MAX_FRAME_BYTES as u64 + 1)
            .read_until(b'\n', &mut frame)
            .await?;
        if read == 0 {
            break;
        }

        let mut content = frame.as_slice();
        if let Some(rest) = content.strip_suffix(b"\n") {
            content = rest;
        }
        if let Some(rest) = content.strip_suffix(b"\r") {
            content = rest;
        }
        if content.len() > MAX_FRAME_BYTES {
            warn!(limit = MAX_FRAME_BYTES, "request line too long; closing connection");
            let response = ApiResponse::error(format!(
                "request line exceeds {} bytes",
                MAX_FRAME_BYTES
            ));
            write_response(&mut writer, &response).await?;
            break;
        }

        let response = match std::str::from_utf8(content) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => handle_line(&engine, line.trim()),
            Err(e) => {
                warn!(error = %e, "request line is not valid UTF-8");
                ApiResponse::error(format!("request line is not valid UTF-8: {}", e))
            }
        };
        write_response(&mut writer, &response).await?;
    }

    Ok(())
}

async fn write_response<W>(writer: &mut W, response: &ApiResponse) -> KernelResult<()>
where
    W: AsyncWrite + Unpin,
{
    let mut encoded = serde_json::to_vec(response)?;
    encoded.push(b'\n');
    writer.write_all(&encoded).await?;
    writer.flush().await?;
    Ok(())
}
