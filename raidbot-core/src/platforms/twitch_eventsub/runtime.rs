// twitch_eventsub/runtime.rs

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use tracing::{debug, error, info, trace, warn};
use std::sync::Arc;

use serde_json::json;

use crate::Error;
use crate::platforms::twitch::client::{TwitchHelixClient, HELIX_BASE};
use raidbot_common::models::ModerationAction;

use super::events::{parse_moderation_notification, EventSubNotificationEnvelope};

const EVENTSUB_URL: &str = "wss://eventsub.wss.twitch.tv/ws";
const RETRY_DELAY: Duration = Duration::from_secs(15);

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Outcome of one pass over an open socket.
enum ReadOutcome {
    /// Twitch asked us to hop to a new URL.
    Reconnect(String),
    /// Socket closed by the server.
    Closed,
    /// Nobody is listening for actions any more.
    ReceiverGone,
}

/// Delivers `channel.moderate` notifications as `ModerationAction`s, in order,
/// over a bounded channel.
pub struct ModerationEventSub {
    client: Arc<TwitchHelixClient>,
    broadcaster_id: String,
    actions_tx: mpsc::Sender<ModerationAction>,
}

impl ModerationEventSub {
    pub fn new(
        client: Arc<TwitchHelixClient>,
        broadcaster_id: impl Into<String>,
        actions_tx: mpsc::Sender<ModerationAction>,
    ) -> Self {
        Self {
            client,
            broadcaster_id: broadcaster_id.into(),
            actions_tx,
        }
    }

    /// Health check messages are logged at trace, everything else at debug.
    fn log_text_message(txt: &str, message_type: Option<&str>) {
        match message_type {
            Some("session_keepalive") => trace!("[EventSub] keepalive"),
            _ => debug!("[EventSub] Received TEXT: {}", txt),
        }
    }

    fn message_type(parsed: &serde_json::Value) -> Option<&str> {
        parsed
            .get("metadata")
            .and_then(|m| m.get("message_type"))
            .and_then(|v| v.as_str())
    }

    /// Keeps the socket alive and hops when Twitch says so. Returns once the
    /// action receiver has been dropped.
    pub async fn start_loop(&self) -> Result<(), Error> {
        let mut url = EVENTSUB_URL.to_string();
        let mut current_ws: Option<Ws> = None;

        loop {
            if current_ws.is_none() {
                let (ws, _) = match connect_async(&url).await {
                    Ok(pair) => pair,
                    Err(e) => {
                        error!("[EventSub] connect error: {}", e);
                        sleep(RETRY_DELAY).await;
                        continue;
                    }
                };
                info!("[EventSub] connected → {}", url);
                current_ws = Some(ws);
            }

            let Some(mut ws) = current_ws.take() else { continue };
            match self.run_read_loop(&mut ws).await {
                Ok(ReadOutcome::Reconnect(new_url)) => {
                    warn!("[EventSub] reconnecting → {}", new_url);
                    match Self::handle_reconnect(&mut ws, &new_url).await {
                        Ok(new_ws) => {
                            info!("[EventSub] Reconnect successful");
                            current_ws = Some(new_ws);
                            url = new_url;
                        }
                        Err(e) => {
                            error!("[EventSub] Reconnect failed: {}", e);
                            let _ = ws.close(None).await;
                            url = EVENTSUB_URL.to_string();
                            sleep(RETRY_DELAY).await;
                        }
                    }
                }
                Ok(ReadOutcome::Closed) => {
                    warn!("[EventSub] websocket closed by server; reconnecting");
                    url = EVENTSUB_URL.to_string();
                    sleep(RETRY_DELAY).await;
                }
                Ok(ReadOutcome::ReceiverGone) => {
                    info!("[EventSub] action receiver dropped; stopping");
                    let _ = ws.close(None).await;
                    return Ok(());
                }
                Err(e) => {
                    error!("[EventSub] loop error: {}", e);
                    url = EVENTSUB_URL.to_string();
                    sleep(RETRY_DELAY).await;
                }
            }
        }
    }

    /// Opens the new socket and waits for its welcome before dropping the old one.
    /// Subscriptions carry over, so no resubscribe happens here.
    async fn handle_reconnect(old_ws: &mut Ws, new_url: &str) -> Result<Ws, Error> {
        let (mut new_ws, _) = connect_async(new_url)
            .await
            .map_err(|e| Error::Platform(format!("Failed to connect to reconnect URL: {}", e)))?;

        match tokio::time::timeout(Duration::from_secs(10), Self::wait_for_welcome(&mut new_ws)).await {
            Ok(Ok(_)) => {
                let _ = old_ws.close(None).await;
                Ok(new_ws)
            }
            Ok(Err(e)) => {
                let _ = new_ws.close(None).await;
                Err(e)
            }
            Err(_) => {
                let _ = new_ws.close(None).await;
                Err(Error::Platform("Timeout waiting for welcome message on reconnect".into()))
            }
        }
    }

    /// Returns the session id from the first `session_welcome`.
    async fn wait_for_welcome(ws: &mut Ws) -> Result<String, Error> {
        while let Some(msg_res) = ws.next().await {
            let msg = msg_res.map_err(|e| Error::Platform(format!("ws error: {e}")))?;

            if msg.is_close() {
                return Err(Error::Platform("Connection closed while waiting for welcome".into()));
            }
            let Message::Text(txt) = msg else { continue };
            let parsed: serde_json::Value = serde_json::from_str(&txt)
                .map_err(|e| Error::Platform(format!("bad json: {e}")))?;

            if Self::message_type(&parsed) == Some("session_welcome") {
                return parsed
                    .pointer("/payload/session/id")
                    .and_then(|v| v.as_str())
                    .map(String::from)
                    .ok_or_else(|| Error::Platform("welcome without session id".into()));
            }
        }
        Err(Error::Platform("Connection closed without welcome message".into()))
    }

    async fn run_read_loop(&self, ws: &mut Ws) -> Result<ReadOutcome, Error> {
        while let Some(msg_res) = ws.next().await {
            let msg = msg_res.map_err(|e| Error::Platform(format!("ws error: {e}")))?;

            if msg.is_close() {
                return Ok(ReadOutcome::Closed);
            }
            let Message::Text(txt) = msg else { continue };
            let parsed: serde_json::Value = serde_json::from_str(&txt)
                .map_err(|e| Error::Platform(format!("bad json: {e}")))?;

            let message_type = Self::message_type(&parsed);
            Self::log_text_message(&txt, message_type);

            match message_type {
                Some("session_welcome") => {
                    if let Some(id) = parsed.pointer("/payload/session/id").and_then(|v| v.as_str()) {
                        self.subscribe_moderation(id).await?;
                    }
                }
                Some("session_keepalive") => {}
                Some("session_reconnect") => {
                    let url = parsed
                        .pointer("/payload/session/reconnect_url")
                        .and_then(|v| v.as_str())
                        .ok_or_else(|| Error::Platform("missing reconnect_url".into()))?
                        .to_string();
                    return Ok(ReadOutcome::Reconnect(url));
                }
                Some("notification") => {
                    let Some(payload) = parsed.get("payload") else { continue };
                    let env: EventSubNotificationEnvelope = match serde_json::from_value(payload.clone()) {
                        Ok(env) => env,
                        Err(e) => {
                            warn!("[EventSub] malformed notification: {}", e);
                            continue;
                        }
                    };
                    if let Some(action) = parse_moderation_notification(&env) {
                        if self.actions_tx.send(action).await.is_err() {
                            return Ok(ReadOutcome::ReceiverGone);
                        }
                    }
                }
                Some("revocation") => warn!("[EventSub] subscription revoked – check token scopes"),
                other => debug!("unhandled message_type={:?}", other),
            }
        }
        Ok(ReadOutcome::Closed)
    }

    async fn subscribe_moderation(&self, session_id: &str) -> Result<(), Error> {
        let body = json!({
            "type": "channel.moderate",
            "version": "2",
            "condition": {
                "broadcaster_user_id": self.broadcaster_id,
                "moderator_user_id": self.broadcaster_id
            },
            "transport": {
                "method": "websocket",
                "session_id": session_id
            }
        });
        debug!("Subscribing to channel.moderate v2 => {:?}", body);

        let url = format!("{}/eventsub/subscriptions", HELIX_BASE);
        self.client.post_json(&url, &body).await?;
        info!("[EventSub] listening for moderation actions on {}", self.broadcaster_id);
        Ok(())
    }
}
