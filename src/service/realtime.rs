//! WebSocket change-notification channel for marksync.
//!
//! Connects to the hosted service's realtime endpoint, subscribes to a
//! per-owner topic, and forwards row-level insert/delete events to a
//! [`ChangeSubscription`]. One connection per subscription; closing the
//! socket releases the server-side channel.

use futures_util::stream::{SplitStream, StreamExt};
use futures_util::SinkExt;
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use uuid::Uuid;

use crate::service::ChangeSubscription;
use crate::types::bookmark::Bookmark;
use crate::types::change::ChangeEvent;
use crate::types::errors::RealtimeError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Wire messages exchanged with the realtime endpoint.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireMessage {
    /// Client request to join a topic.
    Subscribe { message_id: Uuid, topic: String },
    /// Server acknowledgement of a subscribe.
    Subscribed { message_id: Uuid, topic: String },
    /// A row was inserted into the subscribed table.
    Insert {
        message_id: Uuid,
        topic: String,
        record: Bookmark,
    },
    /// A row was deleted; only the old row's id is delivered.
    Delete {
        message_id: Uuid,
        topic: String,
        id: i64,
    },
}

/// Returns the realtime topic for an owner's bookmark rows.
pub fn topic_for(owner: &str) -> String {
    format!("bookmarks:{}", owner)
}

/// WebSocket client for the change-notification channel.
pub struct RealtimeClient {
    ws_url: String,
    api_key: String,
}

impl RealtimeClient {
    /// Creates a realtime client for the given service base URL.
    ///
    /// The HTTP scheme is swapped for the matching WebSocket scheme
    /// (`http` → `ws`, `https` → `wss`).
    pub fn new(service_url: &str, api_key: &str) -> Self {
        let base = service_url.trim_end_matches('/');
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            base.to_string()
        };
        Self {
            ws_url: format!("{}/realtime/v1/websocket", ws_base),
            api_key: api_key.to_string(),
        }
    }

    /// Returns the full WebSocket URL the client connects to.
    pub fn endpoint(&self) -> String {
        format!("{}?apikey={}", self.ws_url, self.api_key)
    }

    /// Opens a connection, joins the owner's topic, and spawns a reader
    /// task that forwards events until the socket closes or the
    /// subscription is dropped.
    pub async fn subscribe(&self, owner: &str) -> Result<ChangeSubscription, RealtimeError> {
        let (ws, _) = connect_async(self.endpoint())
            .await
            .map_err(|e| RealtimeError::ConnectError(e.to_string()))?;
        let (mut sink, mut stream) = ws.split();

        let topic = topic_for(owner);
        let join = WireMessage::Subscribe {
            message_id: Uuid::new_v4(),
            topic: topic.clone(),
        };
        let json = serde_json::to_string(&join)
            .map_err(|e| RealtimeError::ProtocolError(e.to_string()))?;
        sink.send(Message::Text(json.into()))
            .await
            .map_err(|e| RealtimeError::ConnectError(e.to_string()))?;

        wait_for_ack(&mut stream, &topic).await?;

        let (tx, rx) = mpsc::channel(32);
        let reader = tokio::spawn(read_loop(stream, tx));
        Ok(ChangeSubscription::new(rx, Some(reader.abort_handle())))
    }
}

/// Waits for the server to acknowledge the subscribe for `topic`.
async fn wait_for_ack(
    stream: &mut SplitStream<WsStream>,
    topic: &str,
) -> Result<(), RealtimeError> {
    loop {
        match stream.next().await {
            Some(Ok(Message::Text(txt))) => match serde_json::from_str::<WireMessage>(&txt) {
                Ok(WireMessage::Subscribed { topic: t, .. }) if t == topic => return Ok(()),
                Ok(other) => {
                    return Err(RealtimeError::ProtocolError(format!(
                        "expected subscribe ack, got {:?}",
                        other
                    )))
                }
                Err(e) => return Err(RealtimeError::ProtocolError(e.to_string())),
            },
            Some(Ok(Message::Close(_))) | None => return Err(RealtimeError::ChannelClosed),
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(RealtimeError::ConnectError(e.to_string())),
        }
    }
}

/// Forwards insert/delete wire messages to the subscription queue until
/// the socket closes or the subscriber goes away.
async fn read_loop(mut stream: SplitStream<WsStream>, tx: mpsc::Sender<ChangeEvent>) {
    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(txt)) => match serde_json::from_str::<WireMessage>(&txt) {
                Ok(WireMessage::Insert { record, .. }) => {
                    if tx.send(ChangeEvent::Inserted(record)).await.is_err() {
                        break;
                    }
                }
                Ok(WireMessage::Delete { id, .. }) => {
                    if tx.send(ChangeEvent::Deleted { id }).await.is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!("realtime: dropping undecodable message: {}", e);
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!("realtime: socket error, ending feed: {}", e);
                break;
            }
        }
    }
}
