//! Conversation Service (§4.3): message send/read, typing, and the
//! per-match image-unlock gate.

use super::moderation::{ModerationClient, Verdict};
use crate::db::Store;
use crate::domain::{Message, IMAGE_UNLOCK_MESSAGE_COUNT};
use crate::error::{CoreError, CoreResult};
use crate::notifications::NotificationDispatcher;
use crate::realtime::{Envelope, RealtimeHub};
use uuid::Uuid;

const PREVIEW_CHARS: usize = 100;

#[derive(Clone)]
pub struct ConversationService {
    store: Store,
    hub: RealtimeHub,
    notifications: NotificationDispatcher,
    moderation: ModerationClient,
}

impl ConversationService {
    pub fn new(
        store: Store,
        hub: RealtimeHub,
        notifications: NotificationDispatcher,
        moderation: ModerationClient,
    ) -> Self {
        Self {
            store,
            hub,
            notifications,
            moderation,
        }
    }

    /// §4.3 Send. Rejections in spec order: `NotInMatch`, `EmptyMessage`,
    /// `ImageNotEnabled`, `ContentBlocked`.
    pub async fn send_message(
        &self,
        actor_id: Uuid,
        match_id: Uuid,
        content: Option<&str>,
        encrypted_content: Option<&str>,
        image_url: Option<&str>,
    ) -> CoreResult<Message> {
        let match_row = self.store.matches.find_by_id(match_id).await?;
        if !match_row.contains(actor_id) {
            return Err(CoreError::NotInMatch);
        }

        let content = non_empty(content);
        let encrypted_content = non_empty(encrypted_content);
        let image_url = non_empty(image_url);

        if content.is_none() && encrypted_content.is_none() && image_url.is_none() {
            return Err(CoreError::EmptyMessage);
        }

        if image_url.is_some()
            && !self
                .store
                .image_permissions
                .both_enabled(match_id, match_row.user_a, match_row.user_b)
                .await?
        {
            return Err(CoreError::ImageNotEnabled);
        }

        if let Some(text) = content {
            match self.moderation.score(text).await {
                Verdict::Block => {
                    tracing::info!(%match_id, %actor_id, "message blocked by moderation");
                    return Err(CoreError::ContentBlocked);
                }
                Verdict::Review => {
                    tracing::warn!(%match_id, %actor_id, "message queued for moderation review");
                }
                Verdict::Pass => {}
            }
        }

        let message = self
            .store
            .messages
            .insert(match_id, actor_id, content, encrypted_content, image_url)
            .await?;

        let counterpart_id = match_row.counterpart(actor_id);
        self.hub
            .send_to_user(
                counterpart_id,
                Envelope::NewMessage {
                    match_id,
                    message_id: message.id,
                    sender_id: actor_id,
                    content: message.content.clone(),
                    image_url: message.image_url.clone(),
                    created_at: message.created_at,
                },
            )
            .await;

        let sender_name = self
            .store
            .profiles
            .find(actor_id)
            .await
            .map(|p| p.display_name)
            .unwrap_or_else(|_| "Someone".to_string());
        let preview = message
            .content
            .as_deref()
            .map(truncate_preview)
            .unwrap_or_else(|| "sent a photo".to_string());
        self.notifications
            .dispatch_message(counterpart_id, sender_name, preview);

        Ok(message)
    }

    /// §4.3 image unlock gate. Per-user toggle; enabling notifies the
    /// counterparty so their client can immediately allow image sends,
    /// disabling does not (spec: "no notification to counterparty").
    pub async fn set_images_enabled(
        &self,
        actor_id: Uuid,
        match_id: Uuid,
        enabled: bool,
    ) -> CoreResult<()> {
        let match_row = self.store.matches.find_by_id(match_id).await?;
        if !match_row.contains(actor_id) {
            return Err(CoreError::NotInMatch);
        }

        if enabled {
            let sent = self.store.messages.count_for_match(match_id).await?;
            if sent < IMAGE_UNLOCK_MESSAGE_COUNT {
                return Err(CoreError::NotEnoughMessages);
            }
        }

        self.store
            .image_permissions
            .set_enabled(match_id, actor_id, enabled)
            .await?;

        if enabled {
            let counterpart_id = match_row.counterpart(actor_id);
            self.hub
                .send_to_user(
                    counterpart_id,
                    Envelope::ImageEnabled {
                        match_id,
                        user_id: actor_id,
                    },
                )
                .await;
        }

        Ok(())
    }

    /// §4.3 read receipts: returns the page and marks counterparty
    /// messages read in the same call, emitting `message_read` if any row
    /// was newly flipped.
    pub async fn get_messages(
        &self,
        actor_id: Uuid,
        match_id: Uuid,
        before: Option<Uuid>,
        limit: i64,
    ) -> CoreResult<Vec<Message>> {
        let match_row = self.store.matches.find_by_id(match_id).await?;
        if !match_row.contains(actor_id) {
            return Err(CoreError::NotInMatch);
        }

        let messages = self
            .store
            .messages
            .list_for_match(match_id, before, limit)
            .await?;

        let newly_read = self.store.messages.mark_read(match_id, actor_id).await?;
        if !newly_read.is_empty() {
            let counterpart_id = match_row.counterpart(actor_id);
            self.hub
                .send_to_user(
                    counterpart_id,
                    Envelope::MessageRead {
                        match_id,
                        message_ids: newly_read,
                        read_at: chrono::Utc::now(),
                    },
                )
                .await;
        }

        Ok(messages)
    }

    /// §4.3 Typing: not persisted, fans out to the counterparty only.
    pub async fn typing(&self, actor_id: Uuid, match_id: Uuid, is_typing: bool) -> CoreResult<()> {
        let match_row = self.store.matches.find_by_id(match_id).await?;
        if !match_row.contains(actor_id) {
            return Err(CoreError::NotInMatch);
        }

        let counterpart_id = match_row.counterpart(actor_id);
        let envelope = if is_typing {
            Envelope::TypingStart {
                match_id,
                user_id: actor_id,
            }
        } else {
            Envelope::TypingStop {
                match_id,
                user_id: actor_id,
            }
        };
        self.hub.send_to_user(counterpart_id, envelope).await;
        Ok(())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn truncate_preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_preview_caps_at_100_chars() {
        let long = "a".repeat(250);
        assert_eq!(truncate_preview(&long).chars().count(), PREVIEW_CHARS);
    }

    #[test]
    fn non_empty_treats_blank_as_absent() {
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(non_empty(Some("hi")), Some("hi"));
        assert_eq!(non_empty(None), None);
    }
}
