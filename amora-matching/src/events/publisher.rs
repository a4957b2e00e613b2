use uuid::Uuid;

use amora_shared::clients::rabbitmq::RabbitMQClient;
use amora_shared::types::event::{payloads, routing_keys, Event};

use crate::services::notify::Notice;

pub async fn publish_notification(rabbitmq: &RabbitMQClient, notice: &Notice) {
    let event = Event::new(
        "amora-matching",
        routing_keys::NOTIFICATION_EMITTED,
        payloads::NotificationEmitted {
            recipient_user_id: notice.recipient_user_id,
            actor_user_id: notice.actor_user_id,
            kind: notice.kind.as_str().to_string(),
            message: notice.message.clone(),
        },
    )
    .with_user(notice.recipient_user_id);

    if let Err(e) = rabbitmq.publish(&event).await {
        tracing::error!(error = %e, "failed to publish notification.emitted event");
    }
}

pub async fn publish_match_created(
    rabbitmq: &RabbitMQClient,
    user1_id: Uuid,
    user2_id: Uuid,
    rematch: bool,
) {
    let event = Event::new(
        "amora-matching",
        routing_keys::MATCH_CREATED,
        payloads::MatchCreated {
            user1_id,
            user2_id,
            rematch,
        },
    )
    .with_user(user1_id);

    if let Err(e) = rabbitmq.publish(&event).await {
        tracing::error!(error = %e, "failed to publish match.created event");
    }
}

pub async fn publish_match_ended(rabbitmq: &RabbitMQClient, user1_id: Uuid, user2_id: Uuid) {
    let event = Event::new(
        "amora-matching",
        routing_keys::MATCH_ENDED,
        payloads::MatchEnded { user1_id, user2_id },
    )
    .with_user(user1_id);

    if let Err(e) = rabbitmq.publish(&event).await {
        tracing::error!(error = %e, "failed to publish match.ended event");
    }
}
