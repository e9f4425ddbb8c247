use crate::application::{Page, paginate};
use crate::domain::notification::{LiveClass, Notification, PushMessage, SendOutcome};
use crate::domain::ports::{CustomerDirectoryRef, NotificationStoreRef, PushGatewayRef};
use crate::error::{CommerceError, Result};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

/// Push gateway chunk size; one gateway call carries at most this many
/// messages.
pub const PUSH_CHUNK_SIZE: usize = 500;

/// What a fan-out actually did; delivery is best-effort so partial numbers
/// are normal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FanOutSummary {
    pub batch_id: Option<Uuid>,
    pub rows_created: usize,
    pub tokens_targeted: usize,
    pub delivered: usize,
    pub tokens_scrubbed: usize,
    pub chunks_failed: usize,
}

pub struct NotificationService {
    notifications: NotificationStoreRef,
    customers: CustomerDirectoryRef,
    gateway: PushGatewayRef,
}

impl NotificationService {
    pub fn new(
        notifications: NotificationStoreRef,
        customers: CustomerDirectoryRef,
        gateway: PushGatewayRef,
    ) -> Self {
        Self {
            notifications,
            customers,
            gateway,
        }
    }

    /// Creates per-recipient rows for a live-class event, then pushes to every
    /// known device token in bounded chunks.
    ///
    /// Row creation is deduplicated per (user, liveClass, title, batch).
    /// Gateway failures never fail the operation: a failed chunk is logged and
    /// the loop moves on; tokens the gateway reports invalid are scrubbed from
    /// both directories.
    pub async fn notify_live_class(&self, live_class: &LiveClass) -> Result<FanOutSummary> {
        let batch_id = Uuid::new_v4();
        let mut summary = FanOutSummary {
            batch_id: Some(batch_id),
            ..FanOutSummary::default()
        };

        for user_id in &live_class.users {
            let row = Notification::for_student(live_class, *user_id, batch_id);
            if self.notifications.insert_if_absent(row).await? {
                summary.rows_created += 1;
            }
        }
        let teacher_row = Notification::for_teacher(live_class, batch_id);
        if self.notifications.insert_if_absent(teacher_row).await? {
            summary.rows_created += 1;
        }
        info!(
            live_class = %live_class.title,
            rows = summary.rows_created,
            "notification rows created"
        );

        let mut tokens = self.customers.student_tokens(&live_class.users).await?;
        if let Some(teacher_token) = self.customers.teacher_token(live_class.teacher).await? {
            if !tokens.contains(&teacher_token) {
                tokens.push(teacher_token);
            }
        }
        summary.tokens_targeted = tokens.len();
        if tokens.is_empty() {
            info!("no push tokens found for live class fan-out");
            return Ok(summary);
        }

        let messages: Vec<PushMessage> = tokens
            .into_iter()
            .map(|token| PushMessage::for_live_class(token, live_class, batch_id))
            .collect();

        for (chunk_index, chunk) in messages.chunks(PUSH_CHUNK_SIZE).enumerate() {
            match self.gateway.send_batch(chunk).await {
                Ok(outcomes) => {
                    for (message, outcome) in chunk.iter().zip(outcomes) {
                        match outcome {
                            SendOutcome::Delivered => summary.delivered += 1,
                            SendOutcome::InvalidToken => {
                                self.customers.remove_token(&message.token).await?;
                                summary.tokens_scrubbed += 1;
                            }
                            SendOutcome::Failed(reason) => {
                                warn!(token = %message.token, %reason, "push send failed");
                            }
                        }
                    }
                }
                Err(err) => {
                    // Best-effort: log and continue with the next chunk.
                    warn!(chunk = chunk_index + 1, error = %err, "push chunk failed");
                    summary.chunks_failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Per-user notification feed, newest first.
    pub async fn user_notifications(
        &self,
        user_id: Uuid,
        page: u64,
        limit: u64,
    ) -> Result<Page<Notification>> {
        let mut notifications = self.notifications.for_user(user_id).await?;
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(notifications, page, limit))
    }

    pub async fn mark_read(&self, id: Uuid) -> Result<Notification> {
        let mut notification = self
            .notifications
            .get(id)
            .await?
            .ok_or_else(|| CommerceError::not_found("Notification not found"))?;
        notification.mark_read();
        self.notifications.update(notification.clone()).await?;
        Ok(notification)
    }
}
