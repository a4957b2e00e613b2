//! Notification fan-out. Notices are collected while a state transition runs
//! inside its transaction, then dispatched after commit: one durable event on
//! the bus for the notification service, one best-effort real-time push.
//! Neither delivery may fail the primary operation.

use serde::Serialize;
use uuid::Uuid;

use crate::events::publisher;
use crate::push::PushEvent;
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Like,
    Unlike,
    Match,
    Rematch,
    Unmatch,
    Visit,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Like => "like",
            NotificationKind::Unlike => "unlike",
            NotificationKind::Match => "match",
            NotificationKind::Rematch => "rematch",
            NotificationKind::Unmatch => "unmatch",
            NotificationKind::Visit => "visit",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pending notification produced by a committed state transition.
#[derive(Debug, Clone)]
pub struct Notice {
    pub recipient_user_id: Uuid,
    pub actor_user_id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
}

impl Notice {
    pub fn new(
        recipient_user_id: Uuid,
        actor_user_id: Uuid,
        kind: NotificationKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            recipient_user_id,
            actor_user_id,
            kind,
            message: message.into(),
        }
    }
}

/// Deliver notices. Fire-and-forget: failures are logged, never surfaced.
pub async fn dispatch(state: &AppState, notices: Vec<Notice>) {
    for notice in notices {
        publisher::publish_notification(&state.rabbitmq, &notice).await;

        state
            .pusher
            .push(
                notice.recipient_user_id,
                PushEvent {
                    kind: notice.kind.as_str().to_string(),
                    actor_user_id: notice.actor_user_id,
                    message: notice.message.clone(),
                },
            )
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_wire_names() {
        assert_eq!(NotificationKind::Like.as_str(), "like");
        assert_eq!(NotificationKind::Rematch.as_str(), "rematch");
        assert_eq!(NotificationKind::Unmatch.to_string(), "unmatch");
    }
}
