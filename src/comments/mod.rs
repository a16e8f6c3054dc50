use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Comment on a blog. The table ships with the schema and the data layer is
/// in place, but no route exposes comments yet.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BlogComment {
    pub id: Uuid,
    pub blog_id: Uuid,
    pub user_id: Uuid,
    pub comment: String,
    pub created_at: OffsetDateTime,
}

#[allow(dead_code)]
pub async fn insert(
    db: &PgPool,
    blog_id: Uuid,
    user_id: Uuid,
    comment: &str,
) -> anyhow::Result<BlogComment> {
    let row = sqlx::query_as::<_, BlogComment>(
        r#"
        INSERT INTO blog_comments (blog_id, user_id, comment)
        VALUES ($1, $2, $3)
        RETURNING id, blog_id, user_id, comment, created_at
        "#,
    )
    .bind(blog_id)
    .bind(user_id)
    .bind(comment)
    .fetch_one(db)
    .await?;
    Ok(row)
}

#[allow(dead_code)]
pub async fn list_by_blog(db: &PgPool, blog_id: Uuid) -> anyhow::Result<Vec<BlogComment>> {
    let rows = sqlx::query_as::<_, BlogComment>(
        r#"
        SELECT id, blog_id, user_id, comment, created_at
        FROM blog_comments
        WHERE blog_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(blog_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_serializes_with_references() {
        let comment = BlogComment {
            id: Uuid::new_v4(),
            blog_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            comment: "great read".into(),
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_value(&comment).unwrap();
        assert_eq!(json["comment"], "great read");
        assert!(json.get("blog_id").is_some());
        assert!(json.get("user_id").is_some());
    }
}
