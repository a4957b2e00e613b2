//! Real-time push channel. Events go out over Redis pub/sub only when the
//! recipient currently has an open session; offline users rely on the
//! persisted notification stream instead.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use amora_shared::clients::redis::RedisClient;

#[derive(Debug, Clone, Serialize)]
pub struct PushEvent {
    pub kind: String,
    pub actor_user_id: Uuid,
    pub message: String,
}

#[axum::async_trait]
pub trait Pusher: Send + Sync {
    /// Best-effort delivery. Implementations log failures and never error.
    async fn push(&self, user_id: Uuid, event: PushEvent);
}

pub struct RedisPusher {
    redis: RedisClient,
}

impl RedisPusher {
    pub fn new(redis: RedisClient) -> Arc<Self> {
        Arc::new(Self { redis })
    }
}

#[axum::async_trait]
impl Pusher for RedisPusher {
    async fn push(&self, user_id: Uuid, event: PushEvent) {
        let presence_key = format!("online:{}", user_id);
        match self.redis.exists(&presence_key).await {
            Ok(true) => {}
            Ok(false) => return,
            Err(e) => {
                tracing::warn!("presence lookup failed for {}: {}", user_id, e);
                return;
            }
        }

        let payload = match serde_json::to_string(&event) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!("failed to serialize push event: {}", e);
                return;
            }
        };

        let channel = format!("push:{}", user_id);
        if let Err(e) = self.redis.publish(&channel, &payload).await {
            tracing::warn!("push publish to {} failed: {}", channel, e);
        }
    }
}

/// Stand-in for tests and environments without Redis.
pub struct NoopPusher;

#[axum::async_trait]
impl Pusher for NoopPusher {
    async fn push(&self, _user_id: Uuid, _event: PushEvent) {}
}
