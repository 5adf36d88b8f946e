use crate::{models::*, ObsError};
use crate::error::Result;
use futures_util::StreamExt;
use obws::events::Event;
use obws::requests::scene_items::{Id as SceneItemIdRequest, SetEnabled};
use obws::Client;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, trace};

pub struct ObsClient {
    instance: ObsInstance,
    client: Arc<RwLock<Option<Client>>>,
}

impl ObsClient {
    pub fn new(instance: ObsInstance) -> Self {
        Self {
            instance,
            client: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn connect(&self) -> Result<()> {
        info!("Connecting to OBS at {}:{}", self.instance.host, self.instance.port);

        let client = Client::connect(
            &self.instance.host,
            self.instance.port,
            self.instance.password.as_deref(),
        )
        .await
        .map_err(|e| ObsError::ConnectionError(e.to_string()))?;

        *self.client.write().await = Some(client);
        info!("Connected to OBS");
        Ok(())
    }

    /// Safe to call repeatedly; only the first call after a connect does anything.
    pub async fn disconnect(&self) -> Result<()> {
        if let Some(mut client) = self.client.write().await.take() {
            client.disconnect().await;
            info!("Disconnected from OBS");
        }
        Ok(())
    }

    pub async fn current_program_scene(&self) -> Result<String> {
        let client_guard = self.client.read().await;
        match client_guard.as_ref() {
            Some(client) => {
                let scene = client.scenes().current_program_scene().await
                    .map_err(|e| ObsError::WebSocketError(e.to_string()))?;
                Ok(scene.id.name)
            }
            None => Err(ObsError::NotConnected),
        }
    }

    pub async fn set_current_program_scene(&self, scene_name: &str) -> Result<()> {
        let client_guard = self.client.read().await;
        match client_guard.as_ref() {
            Some(client) => {
                client.scenes().set_current_program_scene(scene_name).await
                    .map_err(|e| ObsError::WebSocketError(e.to_string()))?;
                Ok(())
            }
            None => Err(ObsError::NotConnected),
        }
    }

    /// Numeric scene item id of `source_name` inside `scene_name`.
    pub async fn scene_item_id(&self, scene_name: &str, source_name: &str) -> Result<i64> {
        let client_guard = self.client.read().await;
        match client_guard.as_ref() {
            Some(client) => {
                let id = client
                    .scene_items()
                    .id(SceneItemIdRequest {
                        scene: scene_name.into(),
                        source: source_name,
                        search_offset: None,
                    })
                    .await
                    .map_err(|e| {
                        debug!("GetSceneItemId({scene_name}, {source_name}) failed: {e}");
                        ObsError::SourceNotFound {
                            scene: scene_name.to_string(),
                            source_name: source_name.to_string(),
                        }
                    })?;
                Ok(id)
            }
            None => Err(ObsError::NotConnected),
        }
    }

    pub async fn set_scene_item_enabled(&self, scene_name: &str, item_id: i64, enabled: bool) -> Result<()> {
        let client_guard = self.client.read().await;
        match client_guard.as_ref() {
            Some(client) => {
                client
                    .scene_items()
                    .set_enabled(SetEnabled {
                        scene: scene_name.into(),
                        item_id,
                        enabled,
                    })
                    .await
                    .map_err(|e| ObsError::WebSocketError(e.to_string()))?;
                Ok(())
            }
            None => Err(ObsError::NotConnected),
        }
    }

    /// Forwards the lifecycle-relevant subset of OBS events onto a channel.
    ///
    /// When the underlying event stream ends the channel receives a final
    /// `ConnectionClosed` and is then dropped.
    pub async fn lifecycle_events(&self) -> Result<mpsc::Receiver<ObsLifecycleEvent>> {
        let events = {
            let client_guard = self.client.read().await;
            match client_guard.as_ref() {
                Some(client) => client
                    .events()
                    .map_err(|e| ObsError::WebSocketError(e.to_string()))?,
                None => return Err(ObsError::NotConnected),
            }
        };

        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(async move {
            let mut events = Box::pin(events);
            while let Some(event) = events.next().await {
                let mapped = match event {
                    Event::StreamStateChanged { active, .. } => {
                        Some(ObsLifecycleEvent::StreamStateChanged { active })
                    }
                    Event::ExitStarted => Some(ObsLifecycleEvent::ExitStarted),
                    other => {
                        trace!("Ignoring OBS event: {:?}", other);
                        None
                    }
                };
                if let Some(evt) = mapped {
                    if tx.send(evt).await.is_err() {
                        return;
                    }
                }
            }
            let _ = tx.send(ObsLifecycleEvent::ConnectionClosed).await;
        });

        Ok(rx)
    }
}
