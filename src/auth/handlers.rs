use axum::{
    extract::{
        multipart::{Field, MultipartError},
        FromRef, Multipart, State,
    },
    http::StatusCode,
    Json,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{
            ChangePasswordRequest, CoverImageResponse, LoginRequest, LoginResponse,
            MessageResponse, ProfileResponse, PublicUser, RegisterResponse,
            UpdateProfileResponse,
        },
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, verify_password, MIN_PASSWORD_LEN},
        repo::User,
        validate::{is_valid_email, MAX_BIO_LEN},
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

#[instrument(skip(state, mp))]
pub async fn register(
    State(state): State<AppState>,
    mut mp: Multipart,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let mut name = None::<String>;
    let mut email = None::<String>;
    let mut password = None::<String>;
    let mut bio = None::<String>;
    let mut profile_pic = None::<ImageUpload>;

    while let Some(field) = mp.next_field().await.map_err(bad_form)? {
        let field_name = field.name().map(|s| s.to_string());
        match field_name.as_deref() {
            Some("name") => name = Some(field.text().await.map_err(bad_form)?),
            Some("email") => email = Some(field.text().await.map_err(bad_form)?),
            Some("password") => password = Some(field.text().await.map_err(bad_form)?),
            Some("bio") => bio = Some(field.text().await.map_err(bad_form)?),
            Some("profilePic") => profile_pic = Some(read_image_field(field).await?),
            _ => {}
        }
    }
    // Browsers submit an empty file part when no picture was chosen
    let profile_pic = profile_pic.filter(|f| !f.bytes.is_empty());

    let name = name.map(|n| n.trim().to_string()).unwrap_or_default();
    let email = email
        .map(|e| e.trim().to_lowercase())
        .unwrap_or_default();
    let password = password.unwrap_or_default();
    let bio = bio.unwrap_or_default();

    if name.is_empty() || email.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest(
            "Name, email, and password are required".into(),
        ));
    }
    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(ApiError::BadRequest("Invalid email format".into()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(
            "Password must be at least 6 characters".into(),
        ));
    }
    if bio.chars().count() > MAX_BIO_LEN {
        return Err(ApiError::BadRequest(
            "Bio must be 250 characters or less".into(),
        ));
    }

    if User::find_by_email(&state.db, &email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(ApiError::Conflict("User already exists".into()));
    }

    let mut profile_pic_url = String::new();
    if let Some(upload) = profile_pic {
        images::validate_image(&upload)?;
        profile_pic_url = images::store_image(&state, "profile", upload)
            .await
            .map_err(|e| {
                error!(error = %e, "profile picture upload failed");
                ApiError::Internal("Failed to upload profile picture".into())
            })?;
    }

    let hash = hash_password(&password)?;
    let user = User::create(&state.db, &name, &email, &hash, &profile_pic_url, &bio).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".into(),
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".into(),
        ));
    }

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::Unauthorized("Invalid credentials".into())
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(LoginResponse {
        message: "Login successful".into(),
        token,
        user: user.into(),
    }))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(ProfileResponse { user: user.into() }))
}

#[instrument(skip(state, mp))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut mp: Multipart,
) -> Result<Json<UpdateProfileResponse>, ApiError> {
    let mut name = None::<String>;
    let mut bio = None::<String>;
    let mut profile_pic = None::<ImageUpload>;
    let mut password_present = false;
    let mut email_present = false;

    while let Some(field) = mp.next_field().await.map_err(bad_form)? {
        let field_name = field.name().map(|s| s.to_string());
        match field_name.as_deref() {
            Some("name") => name = Some(field.text().await.map_err(bad_form)?),
            Some("bio") => bio = Some(field.text().await.map_err(bad_form)?),
            Some("profilePic") => profile_pic = Some(read_image_field(field).await?),
            Some("password") => {
                password_present = !field.text().await.map_err(bad_form)?.is_empty()
            }
            Some("email") => email_present = !field.text().await.map_err(bad_form)?.is_empty(),
            _ => {}
        }
    }
    let profile_pic = profile_pic.filter(|f| !f.bytes.is_empty());

    if password_present {
        return Err(ApiError::BadRequest(
            "Use the change password endpoint to update password".into(),
        ));
    }
    if email_present {
        return Err(ApiError::BadRequest("Email cannot be changed".into()));
    }
    if let Some(bio) = &bio {
        if bio.chars().count() > MAX_BIO_LEN {
            return Err(ApiError::BadRequest(
                "Bio must be 250 characters or less".into(),
            ));
        }
    }

    let mut profile_pic_url = None::<String>;
    if let Some(upload) = profile_pic {
        images::validate_image(&upload)?;
        let url = images::store_image(&state, "profile", upload)
            .await
            .map_err(|e| {
                error!(error = %e, "profile picture upload failed");
                ApiError::Internal("Failed to upload profile picture".into())
            })?;
        profile_pic_url = Some(url);
    }

    let user = User::update_profile(
        &state.db,
        user_id,
        name.as_deref(),
        bio.as_deref(),
        profile_pic_url.as_deref(),
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    info!(user_id = %user.id, "profile updated");
    Ok(Json(UpdateProfileResponse {
        message: "Profile updated successfully".into(),
        user: user.into(),
    }))
}

#[instrument(skip(state, mp))]
pub async fn update_cover_image(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut mp: Multipart,
) -> Result<Json<CoverImageResponse>, ApiError> {
    let mut cover = None::<ImageUpload>;
    while let Some(field) = mp.next_field().await.map_err(bad_form)? {
        let field_name = field.name().map(|s| s.to_string());
        if field_name.as_deref() == Some("coverImage") {
            cover = Some(read_image_field(field).await?);
        }
    }
    let cover = cover
        .filter(|f| !f.bytes.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Cover image file is required".into()))?;

    images::validate_image(&cover)?;
    let url = images::store_image(&state, "cover", cover).await.map_err(|e| {
        error!(error = %e, "cover image upload failed");
        ApiError::Internal("Failed to upload cover image".into())
    })?;

    let user = User::set_cover_image(&state.db, user_id, &url)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    info!(user_id = %user.id, "cover image updated");
    Ok(Json(CoverImageResponse {
        message: "Cover image updated successfully".into(),
        cover_image: user.cover_image.clone(),
        user: user.into(),
    }))
}

#[instrument(skip(state))]
pub async fn delete_cover_image(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UpdateProfileResponse>, ApiError> {
    let user = User::set_cover_image(&state.db, user_id, "")
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    info!(user_id = %user.id, "cover image removed");
    Ok(Json(UpdateProfileResponse {
        message: "Cover image removed successfully".into(),
        user: user.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if payload.current_password.is_empty() || payload.new_password.is_empty() {
        return Err(ApiError::BadRequest(
            "Current password and new password are required".into(),
        ));
    }
    if payload.new_password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(
            "New password must be at least 6 characters".into(),
        ));
    }

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    if !verify_password(&payload.current_password, &user.password_hash)? {
        warn!(user_id = %user.id, "change password with wrong current password");
        return Err(ApiError::Unauthorized(
            "Current password is incorrect".into(),
        ));
    }

    let hash = hash_password(&payload.new_password)?;
    User::set_password(&state.db, user_id, &hash).await?;

    info!(user_id = %user.id, "password changed");
    Ok(Json(MessageResponse {
        message: "Password changed successfully".into(),
    }))
}
