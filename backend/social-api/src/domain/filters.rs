use serde::Deserialize;
use uuid::Uuid;

/// Sort order accepted by the post listing (`?ordering=`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostOrdering {
    #[default]
    CreatedDesc,
    CreatedAsc,
    UpdatedDesc,
    UpdatedAsc,
}

impl PostOrdering {
    /// Unknown values fall back to newest-first
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("created_at") => PostOrdering::CreatedAsc,
            Some("-created_at") => PostOrdering::CreatedDesc,
            Some("updated_at") => PostOrdering::UpdatedAsc,
            Some("-updated_at") => PostOrdering::UpdatedDesc,
            _ => PostOrdering::default(),
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            PostOrdering::CreatedDesc => "created_at DESC, seq DESC",
            PostOrdering::CreatedAsc => "created_at ASC, seq ASC",
            PostOrdering::UpdatedDesc => "updated_at DESC, seq DESC",
            PostOrdering::UpdatedAsc => "updated_at ASC, seq ASC",
        }
    }
}

/// Criteria for `GET /posts`
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    /// Case-insensitive substring over title and content
    pub search: Option<String>,
    pub author_id: Option<Uuid>,
    pub ordering: PostOrdering,
}

/// Raw query string of `GET /posts`
#[derive(Debug, Default, Deserialize)]
pub struct PostListQuery {
    pub search: Option<String>,
    pub author: Option<Uuid>,
    pub ordering: Option<String>,
    pub page: Option<String>,
}

impl PostListQuery {
    pub fn filter(&self) -> PostFilter {
        PostFilter {
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            author_id: self.author,
            ordering: PostOrdering::parse(self.ordering.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_parse() {
        assert_eq!(PostOrdering::parse(None), PostOrdering::CreatedDesc);
        assert_eq!(
            PostOrdering::parse(Some("created_at")),
            PostOrdering::CreatedAsc
        );
        assert_eq!(
            PostOrdering::parse(Some("-updated_at")),
            PostOrdering::UpdatedDesc
        );
        assert_eq!(
            PostOrdering::parse(Some("title; DROP TABLE posts")),
            PostOrdering::CreatedDesc
        );
    }

    #[test]
    fn test_blank_search_ignored() {
        let query = PostListQuery {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(query.filter().search.is_none());
    }
}
