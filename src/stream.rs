// src/stream.rs
use futures_util::StreamExt;
use log::debug;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, PartialEq, Eq)]
pub enum StreamEvent {
    Text(String),
    Closed,
}

/// One open push connection, tagged with the epoch it was opened under.
pub struct LiveStream {
    epoch: u64,
    inner: WsStream,
}

impl LiveStream {
    pub async fn open(url: &str, epoch: u64) -> Result<Self, tungstenite::Error> {
        let (inner, _response) = connect_async(url).await?;
        Ok(Self { epoch, inner })
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Next text payload. Control and binary frames are skipped; read errors
    /// and the end of the stream both end up as `Closed`.
    pub async fn next_event(&mut self) -> StreamEvent {
        loop {
            match self.inner.next().await {
                Some(Ok(Message::Text(text))) => return StreamEvent::Text(text),
                Some(Ok(Message::Close(_))) | None => return StreamEvent::Closed,
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    debug!("stream read error: {e}");
                    return StreamEvent::Closed;
                }
            }
        }
    }
}

/// Waits on the current stream, or forever when there is none.
pub async fn next_event(stream: &mut Option<LiveStream>) -> StreamEvent {
    match stream {
        Some(live) => live.next_event().await,
        None => std::future::pending().await,
    }
}
