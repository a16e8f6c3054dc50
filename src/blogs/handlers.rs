use axum::{
    extract::{
        multipart::{Field, MultipartError},
        Multipart, Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    blogs::{
        dto::{
            BlogEnvelope, BlogListQuery, BlogResponse, CategoriesResponse, CategoryBlogsResponse,
            CategorySummary, ListBlogsResponse, MessageResponse, PaginationMeta, UserBlogsResponse,
            MAX_DESCRIPTION_LEN,
        },
        repo::{self, BlogChanges, BlogFilter, NewBlog},
        slug::{category_slug, slugify},
    },
    error::ApiError,
    images::{self, ImageUpload},
    state::AppState,
};

fn bad_form(e: MultipartError) -> ApiError {
    ApiError::BadRequest(format!("Invalid form data: {}", e))
}

async fn read_image_field(field: Field<'_>) -> Result<ImageUpload, ApiError> {
    let content_type = field
        .content_type()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "application/octet-stream".into());
    let bytes = field.bytes().await.map_err(bad_form)?;
    Ok(ImageUpload {
        bytes,
        content_type,
    })
}

/// Multipart forms carry tags either as a JSON array string or as a
/// comma-separated value.
fn parse_tags(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        if let Ok(tags) = serde_json::from_str::<Vec<String>>(trimmed) {
            return tags;
        }
    }
    trimmed
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim(), "true" | "True" | "TRUE" | "1")
}

/// Text + file fields of the blog create/update form.
#[derive(Default)]
struct BlogForm {
    title: Option<String>,
    slug: Option<String>,
    content: Option<String>,
    description: Option<String>,
    tags: Option<Vec<String>>,
    category: Option<String>,
    published: Option<bool>,
    image: Option<ImageUpload>,
}

async fn collect_blog_form(mp: &mut Multipart) -> Result<BlogForm, ApiError> {
    let mut form = BlogForm::default();
    while let Some(field) = mp.next_field().await.map_err(bad_form)? {
        let field_name = field.name().map(|s| s.to_string());
        match field_name.as_deref() {
            Some("title") => form.title = Some(field.text().await.map_err(bad_form)?),
            Some("slug") => form.slug = Some(field.text().await.map_err(bad_form)?),
            Some("content") => form.content = Some(field.text().await.map_err(bad_form)?),
            Some("description") => form.description = Some(field.text().await.map_err(bad_form)?),
            Some("tags") => {
                form.tags = Some(parse_tags(&field.text().await.map_err(bad_form)?))
            }
            Some("category") => form.category = Some(field.text().await.map_err(bad_form)?),
            Some("published") => {
                form.published = Some(parse_bool(&field.text().await.map_err(bad_form)?))
            }
            Some("blogImages") => form.image = Some(read_image_field(field).await?),
            _ => {}
        }
    }
    form.image = form.image.filter(|f| !f.bytes.is_empty());
    // Empty text fields behave like absent ones
    form.title = form.title.filter(|s| !s.trim().is_empty());
    form.slug = form.slug.filter(|s| !s.trim().is_empty());
    form.content = form.content.filter(|s| !s.is_empty());
    form.description = form.description.filter(|s| !s.trim().is_empty());
    form.category = form.category.filter(|s| !s.trim().is_empty());
    Ok(form)
}

async fn upload_blog_image(state: &AppState, upload: ImageUpload) -> Result<String, ApiError> {
    images::validate_image(&upload)?;
    images::store_image(state, "blogs", upload).await.map_err(|e| {
        error!(error = %e, "blog image upload failed");
        ApiError::Internal("Failed to upload blog images".into())
    })
}

#[instrument(skip(state, mp))]
pub async fn create_blog(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut mp: Multipart,
) -> Result<(StatusCode, Json<BlogEnvelope>), ApiError> {
    let form = collect_blog_form(&mut mp).await?;

    let (Some(title), Some(content), Some(description), Some(category)) = (
        form.title,
        form.content,
        form.description,
        form.category,
    ) else {
        return Err(ApiError::BadRequest(
            "Title, content, description, and category are required".into(),
        ));
    };

    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ApiError::BadRequest(
            "Description must be 300 characters or less".into(),
        ));
    }

    let slug = form.slug.unwrap_or_else(|| slugify(&title));
    if repo::slug_exists(&state.db, &slug).await? {
        warn!(%slug, "slug collision on create");
        return Err(ApiError::Conflict("Slug already exists".into()));
    }

    let mut image_url = String::new();
    if let Some(upload) = form.image {
        image_url = upload_blog_image(&state, upload).await?;
    }

    let blog = repo::insert(
        &state.db,
        &NewBlog {
            title: &title,
            slug: &slug,
            content: &content,
            description: &description,
            author_id: user_id,
            image: &image_url,
            tags: form.tags.as_deref().unwrap_or(&[]),
            category: &category,
            published: form.published.unwrap_or(false),
        },
    )
    .await?;

    info!(blog_id = %blog.id, author_id = %user_id, %slug, "blog created");
    Ok((
        StatusCode::CREATED,
        Json(BlogEnvelope {
            message: "Blog created successfully".into(),
            blog: BlogResponse::from_row(blog, false),
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_blogs(
    State(state): State<AppState>,
    Query(q): Query<BlogListQuery>,
) -> Result<Json<ListBlogsResponse>, ApiError> {
    let page = q.page.max(1);
    let limit = q.limit.max(1);
    let offset = (page - 1) * limit;

    let filter = BlogFilter {
        published: q.published,
        category: q.category,
        author: q.author,
    };
    let total = repo::count(&state.db, &filter).await?;
    let rows = repo::list(&state.db, &filter, limit, offset).await?;

    Ok(Json(ListBlogsResponse {
        message: "Blogs retrieved successfully".into(),
        blogs: rows
            .into_iter()
            .map(|r| BlogResponse::from_row(r, false))
            .collect(),
        pagination: PaginationMeta::new(total, page, limit),
    }))
}

#[instrument(skip(state))]
pub async fn get_blog_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BlogEnvelope>, ApiError> {
    let blog = repo::fetch_and_bump_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Blog not found".into()))?;
    Ok(Json(BlogEnvelope {
        message: "Blog retrieved successfully".into(),
        blog: BlogResponse::from_row(blog, true),
    }))
}

#[instrument(skip(state))]
pub async fn get_blog_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<BlogEnvelope>, ApiError> {
    let blog = repo::fetch_and_bump_by_slug(&state.db, &slug)
        .await?
        .ok_or_else(|| ApiError::NotFound("Blog not found".into()))?;
    Ok(Json(BlogEnvelope {
        message: "Blog retrieved successfully".into(),
        blog: BlogResponse::from_row(blog, true),
    }))
}

#[instrument(skip(state))]
pub async fn blogs_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<CategoryBlogsResponse>, ApiError> {
    let rows = repo::list_published_by_category(&state.db, &category).await?;
    if rows.is_empty() {
        return Err(ApiError::NotFound("No blogs found in this category".into()));
    }
    Ok(Json(CategoryBlogsResponse {
        message: "Blogs retrieved successfully".into(),
        count: rows.len(),
        category,
        blogs: rows
            .into_iter()
            .map(|r| BlogResponse::from_row(r, true))
            .collect(),
    }))
}

#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    let rows = repo::published_categories(&state.db).await?;
    Ok(Json(CategoriesResponse {
        message: "Categories retrieved successfully".into(),
        categories: rows
            .into_iter()
            .map(|(category, count)| CategorySummary {
                slug: category_slug(&category),
                category,
                count,
            })
            .collect(),
    }))
}

#[instrument(skip(state))]
pub async fn get_blog_by_category_and_slug(
    State(state): State<AppState>,
    Path((category, slug)): Path<(String, String)>,
) -> Result<Json<BlogEnvelope>, ApiError> {
    let blog = repo::fetch_and_bump_by_category_slug(&state.db, &category, &slug)
        .await?
        .ok_or_else(|| ApiError::NotFound("Blog not found".into()))?;
    Ok(Json(BlogEnvelope {
        message: "Blog retrieved successfully".into(),
        blog: BlogResponse::from_row(blog, true),
    }))
}

#[instrument(skip(state, mp))]
pub async fn update_blog(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    mut mp: Multipart,
) -> Result<Json<BlogEnvelope>, ApiError> {
    let blog = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Blog not found".into()))?;

    if blog.author_id != user_id {
        warn!(blog_id = %id, %user_id, "update rejected, not the author");
        return Err(ApiError::Forbidden(
            "You are not authorized to update this blog".into(),
        ));
    }

    let form = collect_blog_form(&mut mp).await?;

    if let Some(description) = &form.description {
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(ApiError::BadRequest(
                "Description must be 300 characters or less".into(),
            ));
        }
    }

    if let Some(new_slug) = &form.slug {
        if *new_slug != blog.slug && repo::slug_exists(&state.db, new_slug).await? {
            warn!(slug = %new_slug, "slug collision on update");
            return Err(ApiError::Conflict("Slug already exists".into()));
        }
    }

    let mut image_url = None::<String>;
    if let Some(upload) = form.image {
        image_url = Some(upload_blog_image(&state, upload).await?);
    }

    let updated = repo::update(
        &state.db,
        id,
        &BlogChanges {
            title: form.title,
            slug: form.slug,
            content: form.content,
            description: form.description,
            tags: form.tags,
            category: form.category,
            published: form.published,
            image: image_url,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Blog not found".into()))?;

    info!(blog_id = %id, %user_id, "blog updated");
    Ok(Json(BlogEnvelope {
        message: "Blog updated successfully".into(),
        blog: BlogResponse::from_row(updated, false),
    }))
}

#[instrument(skip(state))]
pub async fn delete_blog(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let blog = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Blog not found".into()))?;

    if blog.author_id != user_id {
        warn!(blog_id = %id, %user_id, "delete rejected, not the author");
        return Err(ApiError::Forbidden(
            "You are not authorized to delete this blog".into(),
        ));
    }

    repo::delete(&state.db, id).await?;

    info!(blog_id = %id, %user_id, "blog deleted");
    Ok(Json(MessageResponse {
        message: "Blog deleted successfully".into(),
    }))
}

#[instrument(skip(state))]
pub async fn my_blogs(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserBlogsResponse>, ApiError> {
    let rows = repo::list_by_author(&state.db, user_id).await?;
    Ok(Json(UserBlogsResponse {
        message: "User blogs retrieved successfully".into(),
        blogs: rows
            .into_iter()
            .map(|r| BlogResponse::from_row(r, false))
            .collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_accept_json_arrays() {
        assert_eq!(
            parse_tags(r#"["rust", "axum"]"#),
            vec!["rust".to_string(), "axum".to_string()]
        );
    }

    #[test]
    fn tags_accept_comma_separated_values() {
        assert_eq!(
            parse_tags("rust, axum , web"),
            vec!["rust".to_string(), "axum".to_string(), "web".to_string()]
        );
        assert_eq!(parse_tags(" , ,"), Vec::<String>::new());
        assert_eq!(parse_tags(""), Vec::<String>::new());
    }

    #[test]
    fn malformed_json_tags_fall_back_to_csv() {
        assert_eq!(parse_tags("[not json"), vec!["[not json".to_string()]);
    }

    #[test]
    fn published_flag_parsing() {
        assert!(parse_bool("true"));
        assert!(parse_bool(" True "));
        assert!(parse_bool("1"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool(""));
        assert!(!parse_bool("yes"));
    }
}
