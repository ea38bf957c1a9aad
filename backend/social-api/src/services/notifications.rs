/// Notification sink - append-only events produced by likes and comments
use crate::domain::{
    NewNotification, Notification, NotificationStats, NotificationVerb, Page, PageRequest,
};
use crate::error::{AppError, Result};
use crate::metrics;
use crate::middleware::check_notification_recipient;
use crate::repository::NotificationRepository;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

pub struct NotificationService {
    notifications: Arc<dyn NotificationRepository>,
}

impl NotificationService {
    pub fn new(notifications: Arc<dyn NotificationRepository>) -> Self {
        Self { notifications }
    }

    /// Notification owed to `recipient` when `actor` does `verb` on their
    /// post. Self-actions produce nothing. The content store writes it in
    /// the same transaction as the like or comment.
    pub fn draft(
        &self,
        recipient_id: Uuid,
        actor_id: Uuid,
        verb: NotificationVerb,
        target_id: Uuid,
    ) -> Option<NewNotification> {
        (recipient_id != actor_id).then_some(NewNotification {
            recipient_id,
            actor_id,
            verb,
            target_id,
        })
    }

    /// Metrics and logging once a drafted notification is committed
    pub fn record(&self, notification: &Notification) {
        metrics::record_notification(notification.verb.as_str());
        info!(
            notification_id = %notification.id,
            recipient_id = %notification.recipient_id,
            actor_id = %notification.actor_id,
            verb = %notification.verb,
            "notification created"
        );
    }

    /// Newest first
    pub async fn list(&self, recipient_id: Uuid, page: PageRequest) -> Result<Page<Notification>> {
        let (items, total) = self
            .notifications
            .list_for_recipient(recipient_id, page.limit(), page.offset())
            .await?;
        debug!(recipient_id = %recipient_id, page = page.page, total, "listed notifications");
        Ok(Page::new(items, page, total))
    }

    pub async fn get(&self, recipient_id: Uuid, notification_id: Uuid) -> Result<Notification> {
        let notification = self
            .notifications
            .get_notification(notification_id)
            .await?
            .ok_or_else(|| AppError::NotFound("notification".to_string()))?;
        check_notification_recipient(recipient_id, &notification)?;
        Ok(notification)
    }

    pub async fn set_read(
        &self,
        recipient_id: Uuid,
        notification_id: Uuid,
        read: bool,
    ) -> Result<Notification> {
        self.get(recipient_id, notification_id).await?;
        self.notifications
            .set_read(notification_id, read)
            .await?
            .ok_or_else(|| AppError::NotFound("notification".to_string()))
    }

    /// Returns how many notifications were flipped to read
    pub async fn mark_all_read(&self, recipient_id: Uuid) -> Result<u64> {
        let updated = self.notifications.mark_all_read(recipient_id).await?;
        info!(recipient_id = %recipient_id, updated, "marked notifications read");
        Ok(updated)
    }

    pub async fn stats(&self, recipient_id: Uuid) -> Result<NotificationStats> {
        self.notifications.stats(recipient_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::Repositories;
    use crate::services::test_support::seed_user;

    fn service(repos: &Repositories) -> NotificationService {
        NotificationService::new(repos.notifications.clone())
    }

    async fn append(
        repos: &Repositories,
        recipient_id: Uuid,
        actor_id: Uuid,
        verb: NotificationVerb,
        target_id: Uuid,
    ) -> Notification {
        repos
            .notifications
            .create_notification(NewNotification {
                recipient_id,
                actor_id,
                verb,
                target_id,
            })
            .await
            .unwrap()
    }

    #[test]
    fn test_self_action_not_drafted() {
        let repos = Repositories::in_memory();
        let service = service(&repos);
        let (user, other) = (Uuid::new_v4(), Uuid::new_v4());
        let post = Uuid::new_v4();

        assert!(service
            .draft(user, user, NotificationVerb::Like, post)
            .is_none());
        let drafted = service
            .draft(user, other, NotificationVerb::Comment, post)
            .unwrap();
        assert_eq!(drafted.recipient_id, user);
        assert_eq!(drafted.actor_id, other);
        assert_eq!(drafted.target_id, post);
    }

    #[tokio::test]
    async fn test_list_newest_first_and_paged() {
        let repos = Repositories::in_memory();
        let service = service(&repos);
        let recipient = seed_user(&repos, "alice").await.id;
        let actor = seed_user(&repos, "bob").await.id;

        let mut targets = Vec::new();
        for _ in 0..12 {
            let target = Uuid::new_v4();
            append(&repos, recipient, actor, NotificationVerb::Comment, target).await;
            targets.push(target);
        }

        let first = service.list(recipient, PageRequest::new(1)).await.unwrap();
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.total_count, 12);
        assert!(first.has_next);
        assert_eq!(first.items[0].target_id, targets[11]);

        let second = service.list(recipient, PageRequest::new(2)).await.unwrap();
        assert_eq!(second.items.len(), 2);
        assert!(!second.has_next);
        assert_eq!(second.items[1].target_id, targets[0]);
    }

    #[tokio::test]
    async fn test_other_users_notification_is_not_found() {
        let repos = Repositories::in_memory();
        let service = service(&repos);
        let recipient = seed_user(&repos, "alice").await.id;
        let actor = seed_user(&repos, "bob").await.id;
        let stranger = seed_user(&repos, "mallory").await.id;
        let notification =
            append(&repos, recipient, actor, NotificationVerb::Like, Uuid::new_v4()).await;

        assert!(matches!(
            service.get(stranger, notification.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.set_read(stranger, notification.id, true).await,
            Err(AppError::NotFound(_))
        ));

        let read = service.set_read(recipient, notification.id, true).await.unwrap();
        assert!(read.read);
    }

    #[tokio::test]
    async fn test_mark_all_read_then_stats() {
        let repos = Repositories::in_memory();
        let service = service(&repos);
        let recipient = seed_user(&repos, "alice").await.id;
        let actor = seed_user(&repos, "bob").await.id;
        for verb in [NotificationVerb::Like, NotificationVerb::Comment] {
            append(&repos, recipient, actor, verb, Uuid::new_v4()).await;
        }

        assert_eq!(service.mark_all_read(recipient).await.unwrap(), 2);
        let stats = service.stats(recipient).await.unwrap();
        assert_eq!(stats.total_notifications, 2);
        assert_eq!(stats.unread_notifications, 0);
    }
}
