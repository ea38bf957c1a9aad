//! PostgreSQL-backed repositories. Uniqueness (usernames, follow edges,
//! likes) is enforced by constraints and `ON CONFLICT DO NOTHING`.

mod comments;
mod follows;
mod likes;
mod notifications;
mod posts;
mod users;

pub use comments::PgCommentRepository;
pub use follows::PgFollowRepository;
pub use likes::PgLikeRepository;
pub use notifications::PgNotificationRepository;
pub use posts::PgPostRepository;
pub use users::PgUserRepository;

use std::collections::HashMap;
use uuid::Uuid;

/// Collect `(post_id, count)` rows from a `GROUP BY post_id` query
pub(crate) fn counts_by_post(rows: Vec<(Uuid, i64)>) -> HashMap<Uuid, i64> {
    rows.into_iter().collect()
}
