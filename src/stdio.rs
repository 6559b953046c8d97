//! Line-oriented stdio transport
//!
//! Each input line is handed to the framer as one raw byte chunk, so a line
//! that is not UTF-8 is reported as a parse error like any other malformed
//! JSON. Each framed unit is written and flushed immediately.

use bytes::Bytes;
use futures_util::StreamExt;
use tokio::io::{self, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio_stream::wrappers::SplitStream;
use tracing::info;

use crate::mcp::{dispatcher::Dispatcher, framer::frame_stream};

pub async fn serve_stdio(dispatcher: Dispatcher) -> io::Result<()> {
    info!("serving MCP over stdio");
    serve(dispatcher, io::stdin(), io::stdout()).await
}

pub async fn serve<R, W>(dispatcher: Dispatcher, reader: R, mut writer: W) -> io::Result<()>
where
    R: AsyncRead + Send + Unpin + 'static,
    W: AsyncWrite + Unpin,
{
    let lines = SplitStream::new(BufReader::new(reader).split(b'\n'))
        .map(|line| line.map(Bytes::from));
    let mut frames = Box::pin(frame_stream(dispatcher, lines));

    while let Some(frame) = frames.next().await {
        writer.write_all(&frame).await?;
        writer.flush().await?;
    }

    Ok(())
}
