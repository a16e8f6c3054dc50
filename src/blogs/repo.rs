use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Blog {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub description: String,
    pub author_id: Uuid,
    pub image: String,
    pub tags: Vec<String>,
    pub category: String,
    pub views: i64,
    pub published: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Blog row with its author resolved via LEFT JOIN; the author columns are
/// NULL when the user row is gone.
#[derive(Debug, Clone, FromRow)]
pub struct BlogWithAuthor {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub description: String,
    pub author_id: Uuid,
    pub image: String,
    pub tags: Vec<String>,
    pub category: String,
    pub views: i64,
    pub published: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub author_name: Option<String>,
    pub author_profile_pic: Option<String>,
    pub author_bio: Option<String>,
}

pub struct NewBlog<'a> {
    pub title: &'a str,
    pub slug: &'a str,
    pub content: &'a str,
    pub description: &'a str,
    pub author_id: Uuid,
    pub image: &'a str,
    pub tags: &'a [String],
    pub category: &'a str,
    pub published: bool,
}

/// Partial update; None leaves the column untouched.
#[derive(Default)]
pub struct BlogChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub category: Option<String>,
    pub published: Option<bool>,
    pub image: Option<String>,
}

const JOINED_COLUMNS: &str = r#"b.id, b.title, b.slug, b.content, b.description, b.author_id,
       b.image, b.tags, b.category, b.views, b.published, b.created_at, b.updated_at,
       u.name AS author_name, u.profile_pic AS author_profile_pic, u.bio AS author_bio"#;

const FILTER_CLAUSE: &str = r#"($1::boolean IS NULL OR b.published = $1)
      AND ($2::text IS NULL OR b.category = $2)
      AND ($3::uuid IS NULL OR b.author_id = $3)"#;

pub struct BlogFilter {
    pub published: Option<bool>,
    pub category: Option<String>,
    pub author: Option<Uuid>,
}

pub async fn insert(db: &PgPool, new: &NewBlog<'_>) -> anyhow::Result<BlogWithAuthor> {
    let row = sqlx::query_as::<_, BlogWithAuthor>(&format!(
        r#"
        WITH inserted AS (
            INSERT INTO blogs (title, slug, content, description, author_id, image, tags, category, published)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
        )
        SELECT {JOINED_COLUMNS}
        FROM inserted b
        LEFT JOIN users u ON u.id = b.author_id
        "#,
    ))
    .bind(new.title)
    .bind(new.slug)
    .bind(new.content)
    .bind(new.description)
    .bind(new.author_id)
    .bind(new.image)
    .bind(new.tags)
    .bind(new.category)
    .bind(new.published)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Blog>> {
    let blog = sqlx::query_as::<_, Blog>(r#"SELECT * FROM blogs WHERE id = $1"#)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(blog)
}

pub async fn slug_exists(db: &PgPool, slug: &str) -> anyhow::Result<bool> {
    let exists =
        sqlx::query_scalar::<_, bool>(r#"SELECT EXISTS (SELECT 1 FROM blogs WHERE slug = $1)"#)
            .bind(slug)
            .fetch_one(db)
            .await?;
    Ok(exists)
}

/// Read-by-id with the view counter bumped in the same statement, so a fetch
/// increments exactly once.
pub async fn fetch_and_bump_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<BlogWithAuthor>> {
    let row = sqlx::query_as::<_, BlogWithAuthor>(&format!(
        r#"
        WITH bumped AS (
            UPDATE blogs SET views = views + 1 WHERE id = $1
            RETURNING *
        )
        SELECT {JOINED_COLUMNS}
        FROM bumped b
        LEFT JOIN users u ON u.id = b.author_id
        "#,
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn fetch_and_bump_by_slug(
    db: &PgPool,
    slug: &str,
) -> anyhow::Result<Option<BlogWithAuthor>> {
    let row = sqlx::query_as::<_, BlogWithAuthor>(&format!(
        r#"
        WITH bumped AS (
            UPDATE blogs SET views = views + 1 WHERE slug = $1
            RETURNING *
        )
        SELECT {JOINED_COLUMNS}
        FROM bumped b
        LEFT JOIN users u ON u.id = b.author_id
        "#,
    ))
    .bind(slug)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn fetch_and_bump_by_category_slug(
    db: &PgPool,
    category: &str,
    slug: &str,
) -> anyhow::Result<Option<BlogWithAuthor>> {
    let row = sqlx::query_as::<_, BlogWithAuthor>(&format!(
        r#"
        WITH bumped AS (
            UPDATE blogs SET views = views + 1
            WHERE LOWER(category) = LOWER($1) AND LOWER(slug) = LOWER($2)
            RETURNING *
        )
        SELECT {JOINED_COLUMNS}
        FROM bumped b
        LEFT JOIN users u ON u.id = b.author_id
        "#,
    ))
    .bind(category)
    .bind(slug)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn list(
    db: &PgPool,
    filter: &BlogFilter,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<BlogWithAuthor>> {
    let rows = sqlx::query_as::<_, BlogWithAuthor>(&format!(
        r#"
        SELECT {JOINED_COLUMNS}
        FROM blogs b
        LEFT JOIN users u ON u.id = b.author_id
        WHERE {FILTER_CLAUSE}
        ORDER BY b.created_at DESC
        LIMIT $4 OFFSET $5
        "#,
    ))
    .bind(filter.published)
    .bind(filter.category.as_deref())
    .bind(filter.author)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn count(db: &PgPool, filter: &BlogFilter) -> anyhow::Result<i64> {
    let total = sqlx::query_scalar::<_, i64>(&format!(
        r#"SELECT COUNT(*) FROM blogs b WHERE {FILTER_CLAUSE}"#,
    ))
    .bind(filter.published)
    .bind(filter.category.as_deref())
    .bind(filter.author)
    .fetch_one(db)
    .await?;
    Ok(total)
}

pub async fn list_published_by_category(
    db: &PgPool,
    category: &str,
) -> anyhow::Result<Vec<BlogWithAuthor>> {
    let rows = sqlx::query_as::<_, BlogWithAuthor>(&format!(
        r#"
        SELECT {JOINED_COLUMNS}
        FROM blogs b
        LEFT JOIN users u ON u.id = b.author_id
        WHERE LOWER(b.category) = LOWER($1) AND b.published = TRUE
        ORDER BY b.created_at DESC
        "#,
    ))
    .bind(category)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Distinct categories of published blogs with their post counts.
pub async fn published_categories(db: &PgPool) -> anyhow::Result<Vec<(String, i64)>> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT category, COUNT(*)
        FROM blogs
        WHERE published = TRUE
        GROUP BY category
        ORDER BY category
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn list_by_author(db: &PgPool, author_id: Uuid) -> anyhow::Result<Vec<BlogWithAuthor>> {
    let rows = sqlx::query_as::<_, BlogWithAuthor>(&format!(
        r#"
        SELECT {JOINED_COLUMNS}
        FROM blogs b
        LEFT JOIN users u ON u.id = b.author_id
        WHERE b.author_id = $1
        ORDER BY b.created_at DESC
        "#,
    ))
    .bind(author_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    changes: &BlogChanges,
) -> anyhow::Result<Option<BlogWithAuthor>> {
    let row = sqlx::query_as::<_, BlogWithAuthor>(&format!(
        r#"
        WITH updated AS (
            UPDATE blogs SET
                title = COALESCE($2, title),
                slug = COALESCE($3, slug),
                content = COALESCE($4, content),
                description = COALESCE($5, description),
                tags = COALESCE($6, tags),
                category = COALESCE($7, category),
                published = COALESCE($8, published),
                image = COALESCE($9, image),
                updated_at = now()
            WHERE id = $1
            RETURNING *
        )
        SELECT {JOINED_COLUMNS}
        FROM updated b
        LEFT JOIN users u ON u.id = b.author_id
        "#,
    ))
    .bind(id)
    .bind(changes.title.as_deref())
    .bind(changes.slug.as_deref())
    .bind(changes.content.as_deref())
    .bind(changes.description.as_deref())
    .bind(changes.tags.as_deref())
    .bind(changes.category.as_deref())
    .bind(changes.published)
    .bind(changes.image.as_deref())
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<u64> {
    let result = sqlx::query(r#"DELETE FROM blogs WHERE id = $1"#)
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
