/// Ownership checks for posts and comments.
///
/// Reads are public; only the author may modify or delete content.
use crate::domain::{Comment, Notification, Post};
use crate::error::AppError;
use uuid::Uuid;

/// Result type for permission checks
pub type PermissionResult = Result<(), AppError>;

/// Check if a user authored a post
pub fn check_post_ownership(user_id: Uuid, post: &Post) -> PermissionResult {
    if post.author_id == user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You do not have permission to modify this post".to_string(),
        ))
    }
}

/// Check if a user authored a comment
pub fn check_comment_ownership(user_id: Uuid, comment: &Comment) -> PermissionResult {
    if comment.author_id == user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You do not have permission to modify this comment".to_string(),
        ))
    }
}

/// Notifications are private to their recipient. Someone else's
/// notification is reported as missing rather than forbidden.
pub fn check_notification_recipient(user_id: Uuid, notification: &Notification) -> PermissionResult {
    if notification.recipient_id == user_id {
        Ok(())
    } else {
        Err(AppError::NotFound("notification".to_string()))
    }
}
