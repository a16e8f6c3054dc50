use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::blogs::repo::BlogWithAuthor;

/// Ceiling on the blog description, enforced on create and update.
pub const MAX_DESCRIPTION_LEN: usize = 300;

fn default_page() -> i64 {
    1
}
fn default_limit() -> i64 {
    10
}

#[derive(Debug, Deserialize)]
pub struct BlogListQuery {
    pub published: Option<bool>,
    pub category: Option<String>,
    pub author: Option<Uuid>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        let total_pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        Self {
            total,
            page,
            limit,
            total_pages,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: Uuid,
    pub name: String,
    pub profile_pic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub description: String,
    /// None when the author row no longer exists.
    pub author: Option<AuthorSummary>,
    pub image: String,
    pub tags: Vec<String>,
    pub category: String,
    pub views: i64,
    pub published: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl BlogResponse {
    /// Detail views (`with_bio`) expose the author's bio; listings don't.
    pub fn from_row(row: BlogWithAuthor, with_bio: bool) -> Self {
        let author = row.author_name.map(|name| AuthorSummary {
            id: row.author_id,
            name,
            profile_pic: row.author_profile_pic.unwrap_or_default(),
            bio: if with_bio { row.author_bio } else { None },
        });
        Self {
            id: row.id,
            title: row.title,
            slug: row.slug,
            content: row.content,
            description: row.description,
            author,
            image: row.image,
            tags: row.tags,
            category: row.category,
            views: row.views,
            published: row.published,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListBlogsResponse {
    pub message: String,
    pub blogs: Vec<BlogResponse>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize)]
pub struct BlogEnvelope {
    pub message: String,
    pub blog: BlogResponse,
}

#[derive(Debug, Serialize)]
pub struct CategoryBlogsResponse {
    pub message: String,
    pub count: usize,
    pub category: String,
    pub blogs: Vec<BlogResponse>,
}

#[derive(Debug, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub slug: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub message: String,
    pub categories: Vec<CategorySummary>,
}

#[derive(Debug, Serialize)]
pub struct UserBlogsResponse {
    pub message: String,
    pub blogs: Vec<BlogResponse>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row(author: bool) -> BlogWithAuthor {
        BlogWithAuthor {
            id: Uuid::new_v4(),
            title: "Borrow Checker Field Notes".into(),
            slug: "borrow-checker-field-notes".into(),
            content: "<p>notes</p>".into(),
            description: "Lifetimes in practice".into(),
            author_id: Uuid::new_v4(),
            image: String::new(),
            tags: vec!["rust".into()],
            category: "Systems".into(),
            views: 3,
            published: true,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
            author_name: author.then(|| "Ada".to_string()),
            author_profile_pic: author.then(String::new),
            author_bio: author.then(|| "writes about compilers".to_string()),
        }
    }

    #[test]
    fn pagination_rounds_up() {
        assert_eq!(PaginationMeta::new(0, 1, 10).total_pages, 0);
        assert_eq!(PaginationMeta::new(10, 1, 10).total_pages, 1);
        assert_eq!(PaginationMeta::new(11, 1, 10).total_pages, 2);
        assert_eq!(PaginationMeta::new(9, 1, 10).total_pages, 1);
    }

    #[test]
    fn list_query_defaults() {
        let q: BlogListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 10);
        assert!(q.published.is_none());
        assert!(q.category.is_none());
        assert!(q.author.is_none());
    }

    #[test]
    fn detail_view_includes_bio_listing_omits_it() {
        let detail = BlogResponse::from_row(sample_row(true), true);
        assert_eq!(
            detail.author.as_ref().unwrap().bio.as_deref(),
            Some("writes about compilers")
        );

        let listing = BlogResponse::from_row(sample_row(true), false);
        assert!(listing.author.as_ref().unwrap().bio.is_none());
        let json = serde_json::to_value(&listing).unwrap();
        assert!(json["author"].get("bio").is_none());
    }

    #[test]
    fn dangling_author_serializes_as_null() {
        let resp = BlogResponse::from_row(sample_row(false), true);
        assert!(resp.author.is_none());
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json["author"].is_null());
    }

    #[test]
    fn blog_response_uses_camel_case_timestamps() {
        let json = serde_json::to_value(BlogResponse::from_row(sample_row(true), false)).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("created_at").is_none());
    }
}
