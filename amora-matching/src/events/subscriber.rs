use std::sync::Arc;

use futures_lite::StreamExt;
use lapin::options::BasicAckOptions;

use amora_shared::types::event::{payloads, routing_keys, Event};

use crate::services::profiles;
use crate::AppState;

/// Listen for auth.user.registered events to seed local user and profile rows.
pub async fn listen_user_registered(state: Arc<AppState>) -> anyhow::Result<()> {
    let mut consumer = state
        .rabbitmq
        .subscribe(
            "amora-matching.auth.user.registered",
            &[routing_keys::AUTH_USER_REGISTERED],
        )
        .await?;

    tracing::info!("listening for auth.user.registered events");

    while let Some(delivery) = consumer.next().await {
        match delivery {
            Ok(delivery) => {
                match serde_json::from_slice::<Event<payloads::UserRegistered>>(&delivery.data) {
                    Ok(event) => {
                        let data = &event.data;
                        tracing::info!(
                            user_id = %data.user_id,
                            username = %data.username,
                            "received user.registered event"
                        );

                        match profiles::create_profile_for_user(&state.db, data) {
                            Ok(profile) => {
                                tracing::info!(
                                    profile_id = %profile.id,
                                    "profile seeded for new user"
                                );
                            }
                            Err(e) => {
                                tracing::error!(
                                    error = %e,
                                    user_id = %data.user_id,
                                    "failed to seed profile"
                                );
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to deserialize user.registered event");
                    }
                }
                let _ = delivery.ack(BasicAckOptions::default()).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "consumer error");
            }
        }
    }

    Ok(())
}
